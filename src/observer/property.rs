//! Observer narrowed to a single attribute of a single record.

use std::rc::Rc;

use crate::config::DispatchConfig;
use crate::debug_event;
use crate::intercept::{
    Access, AccessEvent, Dispatch, Interception, InterceptError, Interceptor, Payload, Reply,
    SessionId,
};
use crate::record::Record;

use super::handlers::{Handlers, ReadDecision, WriteDecision};

/// Construction options for [`PropertyObserver`].
#[derive(Debug, Default)]
pub struct ObserverOptions {
    /// Handler per event name; missing entries skip their phase.
    pub on: Handlers,
    /// Settings for the underlying interceptor.
    pub dispatch: DispatchConfig,
}

impl From<Handlers> for ObserverOptions {
    fn from(on: Handlers) -> Self {
        Self {
            on,
            ..Default::default()
        }
    }
}

/// Adapts the typed handler table to the interceptor's dispatch contract.
struct HandlerDispatch {
    attribute: String,
    handlers: Handlers,
}

impl Dispatch for HandlerDispatch {
    fn dispatch(&self, access: &Access<'_>) -> anyhow::Result<Reply> {
        if access.attribute != self.attribute {
            return Ok(Reply::Continue);
        }
        let (record, name) = (access.record, access.attribute);
        let h = &self.handlers;

        match (access.event, access.payload) {
            (AccessEvent::GetBefore, _) => match &h.get_before {
                Some(handler) => Ok(match handler(record, name)? {
                    ReadDecision::Override(value) => Reply::Override(value),
                    ReadDecision::NoOverride => Reply::Continue,
                }),
                None => Ok(Reply::Continue),
            },
            (AccessEvent::Get, Payload::Value(value)) => {
                notify(&h.get, |f| f(record, name, value))
            }
            (AccessEvent::GetAfter, Payload::Value(value)) => {
                notify(&h.get_after, |f| f(record, name, value))
            }
            (AccessEvent::SetBefore, Payload::Change { new, old }) => match &h.set_before {
                Some(handler) => Ok(match handler(record, name, new, old)? {
                    WriteDecision::Veto => Reply::Veto,
                    WriteDecision::Proceed => Reply::Continue,
                }),
                None => Ok(Reply::Continue),
            },
            (AccessEvent::Set, Payload::Change { new, old }) => {
                notify(&h.set, |f| f(record, name, new, old))
            }
            (AccessEvent::SetAfter, Payload::Change { new, old }) => {
                notify(&h.set_after, |f| f(record, name, new, old))
            }
            (event, payload) => {
                debug_event!("observer", "unexpected payload", "{payload:?} for {event}");
                Ok(Reply::Continue)
            }
        }
    }
}

/// Run an informational handler if present; its result never steers the
/// protocol.
fn notify<H: ?Sized>(
    handler: &Option<Box<H>>,
    call: impl FnOnce(&H) -> anyhow::Result<()>,
) -> anyhow::Result<Reply> {
    if let Some(handler) = handler {
        call(handler)?;
    }
    Ok(Reply::Continue)
}

/// Watches one attribute of one record.
///
/// Construction installs the interception; [`unobserve`](Self::unobserve)
/// or drop removes it and leaves the attribute as a plain data slot with
/// its last committed value.
///
/// ```
/// use propwatch::{Handlers, PropertyObserver, Record, WriteDecision};
/// use serde_json::json;
///
/// let record = Record::new().with("x", json!(10));
/// let mut observer = PropertyObserver::new(
///     &record,
///     "x",
///     Handlers::new()
///         .on_set_before(|_, _, new, _| {
///             Ok(if new.as_i64() > Some(100) { WriteDecision::Veto } else { WriteDecision::Proceed })
///         })
///         .into(),
/// )
/// .unwrap();
///
/// record.set("x", json!(512)).unwrap();
/// assert_eq!(record.get("x").unwrap(), json!(10));
///
/// observer.unobserve();
/// record.set("x", json!(512)).unwrap();
/// assert_eq!(record.get("x").unwrap(), json!(512));
/// ```
#[must_use = "dropping the observer ends the observation immediately"]
pub struct PropertyObserver<'r> {
    record: &'r Record,
    attribute: String,
    interceptor: Interceptor,
    interception: Option<Interception>,
}

impl<'r> PropertyObserver<'r> {
    /// Start observing `attribute` on `record`.
    ///
    /// Fails with a configuration error if the attribute is missing, not
    /// configurable, not writable or already intercepted.
    pub fn new(
        record: &'r Record,
        attribute: impl Into<String>,
        options: ObserverOptions,
    ) -> Result<Self, InterceptError> {
        let attribute = attribute.into();
        let ObserverOptions { on, dispatch } = options;

        debug_event!("observer", "observe", "{attribute} with {on:?}");

        let interceptor = Interceptor::new(dispatch);
        let dispatcher: Rc<dyn Dispatch> = Rc::new(HandlerDispatch {
            attribute: attribute.clone(),
            handlers: on,
        });
        let interception = interceptor.observe(record, &[attribute.as_str()], dispatcher)?;

        Ok(Self {
            record,
            attribute,
            interceptor,
            interception: Some(interception),
        })
    }

    pub fn attribute(&self) -> &str {
        &self.attribute
    }

    pub fn record(&self) -> &'r Record {
        self.record
    }

    pub fn is_observing(&self) -> bool {
        self.interception.is_some()
    }

    pub fn session(&self) -> Option<SessionId> {
        self.interception.as_ref().map(Interception::session)
    }

    /// End the observation. Later calls do nothing.
    pub fn unobserve(&mut self) {
        let Some(interception) = self.interception.take() else {
            return;
        };
        if !self
            .interceptor
            .restore(self.record, &interception, &self.attribute)
        {
            debug_event!("observer", "already restored", "{}", self.attribute);
        }
    }
}

impl Drop for PropertyObserver<'_> {
    fn drop(&mut self) {
        self.unobserve();
    }
}

impl std::fmt::Debug for PropertyObserver<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PropertyObserver")
            .field("attribute", &self.attribute)
            .field("session", &self.session())
            .finish_non_exhaustive()
    }
}
