//! Access interception for record attributes.
//!
//! The interceptor swaps plain data slots for accessor slots. Every later
//! get or set on those attributes runs a three-phase protocol and reports
//! each phase to a [`Dispatch`] callback.
//!
//! # Architecture
//!
//! ```text
//! Record::get / Record::set
//!         |
//!   AccessorSlot (SessionId, Rc<dyn Dispatch>, stored value, original flags)
//!         |
//!   protocol::read / protocol::write
//!         |
//!   get:before -> [storage] -> get -> get:after
//!   set:before -> [commit]  -> set -> set:after
//! ```

mod dispatch;
mod error;
mod interceptor;
pub(crate) mod protocol;

pub use dispatch::{Access, AccessEvent, Dispatch, Payload, Reply, UnknownEvent};
pub use error::InterceptError;
pub use interceptor::{Interception, Interceptor, SessionId};
