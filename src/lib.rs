//! Intercept and observe access to a single attribute of a record.
//!
//! A [`PropertyObserver`] swaps one attribute of a [`Record`] for an
//! accessor. Each read fires `get:before`, `get` and `get:after`; each write
//! fires `set:before`, `set` and `set:after`. Before-handlers can override a
//! read or veto a write. [`PropertyObserver::unobserve`] puts the plain
//! attribute back.
//!
//! ```
//! use propwatch::{Handlers, PropertyObserver, ReadDecision, Record};
//! use serde_json::json;
//!
//! let record = Record::new().with("x", json!(10));
//! let observer = PropertyObserver::new(
//!     &record,
//!     "x",
//!     Handlers::new()
//!         .on_get_before(|_, _| Ok(ReadDecision::Override(json!("hidden"))))
//!         .into(),
//! )
//! .unwrap();
//!
//! assert_eq!(record.get("x").unwrap(), json!("hidden"));
//! drop(observer);
//! assert_eq!(record.get("x").unwrap(), json!(10));
//! ```

pub mod cli;
pub mod config;
pub mod intercept;
pub mod logging;
pub mod observer;
pub mod record;

pub use config::{DispatchConfig, LoggingConfig, Settings};
pub use intercept::{
    Access, AccessEvent, Dispatch, InterceptError, Interception, Interceptor, Payload, Reply,
    SessionId,
};
pub use observer::{Handlers, ObserverOptions, PropertyObserver, ReadDecision, WriteDecision};
pub use record::{Descriptor, Record, RecordError, RecordResult, SetOutcome, SlotFlags, SlotKind};
