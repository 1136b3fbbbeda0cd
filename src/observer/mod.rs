//! Single-attribute observation on top of the interceptor.
//!
//! [`PropertyObserver`] owns an [`Interceptor`](crate::intercept::Interceptor)
//! configured for exactly one attribute and translates the interceptor's
//! phase callbacks into the typed handlers of a [`Handlers`] table.

mod handlers;
mod property;

pub use handlers::{
    GetBeforeHandler, GetHandler, Handlers, ReadDecision, SetBeforeHandler, SetHandler,
    WriteDecision,
};
pub use property::{ObserverOptions, PropertyObserver};
