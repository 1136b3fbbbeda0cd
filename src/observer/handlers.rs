//! Typed handler table for the six access events.

use std::fmt;

use serde_json::Value;

use crate::intercept::AccessEvent;
use crate::record::Record;

/// Answer of a `get:before` handler.
#[derive(Debug, Clone, PartialEq)]
pub enum ReadDecision {
    /// Read from storage as usual.
    NoOverride,
    /// Return this value instead; storage is not read.
    Override(Value),
}

/// Answer of a `set:before` handler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteDecision {
    Proceed,
    /// Cancel the write; storage keeps the old value.
    Veto,
}

pub type GetBeforeHandler = dyn Fn(&Record, &str) -> anyhow::Result<ReadDecision>;
pub type GetHandler = dyn Fn(&Record, &str, &Value) -> anyhow::Result<()>;
pub type SetBeforeHandler = dyn Fn(&Record, &str, &Value, &Value) -> anyhow::Result<WriteDecision>;
pub type SetHandler = dyn Fn(&Record, &str, &Value, &Value) -> anyhow::Result<()>;

/// Zero or one callback per access event.
///
/// A missing handler skips its phase: reads go to storage and writes commit.
///
/// ```
/// use propwatch::{Handlers, WriteDecision};
///
/// let handlers = Handlers::new()
///     .on_set_before(|_, _, new, _| {
///         Ok(if new.is_null() { WriteDecision::Veto } else { WriteDecision::Proceed })
///     })
///     .on_get(|_, name, value| {
///         println!("{name} read as {value}");
///         Ok(())
///     });
/// assert_eq!(handlers.registered().len(), 2);
/// ```
#[derive(Default)]
pub struct Handlers {
    pub(crate) get_before: Option<Box<GetBeforeHandler>>,
    pub(crate) get: Option<Box<GetHandler>>,
    pub(crate) get_after: Option<Box<GetHandler>>,
    pub(crate) set_before: Option<Box<SetBeforeHandler>>,
    pub(crate) set: Option<Box<SetHandler>>,
    pub(crate) set_after: Option<Box<SetHandler>>,
}

impl Handlers {
    pub fn new() -> Self {
        Self::default()
    }

    /// `get:before(record, name)`; may override the read.
    pub fn on_get_before<F>(mut self, handler: F) -> Self
    where
        F: Fn(&Record, &str) -> anyhow::Result<ReadDecision> + 'static,
    {
        self.get_before = Some(Box::new(handler));
        self
    }

    /// `get(record, name, value)`
    pub fn on_get<F>(mut self, handler: F) -> Self
    where
        F: Fn(&Record, &str, &Value) -> anyhow::Result<()> + 'static,
    {
        self.get = Some(Box::new(handler));
        self
    }

    /// `get:after(record, name, value)`
    pub fn on_get_after<F>(mut self, handler: F) -> Self
    where
        F: Fn(&Record, &str, &Value) -> anyhow::Result<()> + 'static,
    {
        self.get_after = Some(Box::new(handler));
        self
    }

    /// `set:before(record, name, new, old)`; may veto the write.
    pub fn on_set_before<F>(mut self, handler: F) -> Self
    where
        F: Fn(&Record, &str, &Value, &Value) -> anyhow::Result<WriteDecision> + 'static,
    {
        self.set_before = Some(Box::new(handler));
        self
    }

    /// `set(record, name, new, old)`
    pub fn on_set<F>(mut self, handler: F) -> Self
    where
        F: Fn(&Record, &str, &Value, &Value) -> anyhow::Result<()> + 'static,
    {
        self.set = Some(Box::new(handler));
        self
    }

    /// `set:after(record, name, new, old)`
    pub fn on_set_after<F>(mut self, handler: F) -> Self
    where
        F: Fn(&Record, &str, &Value, &Value) -> anyhow::Result<()> + 'static,
    {
        self.set_after = Some(Box::new(handler));
        self
    }

    pub fn has(&self, event: AccessEvent) -> bool {
        match event {
            AccessEvent::GetBefore => self.get_before.is_some(),
            AccessEvent::Get => self.get.is_some(),
            AccessEvent::GetAfter => self.get_after.is_some(),
            AccessEvent::SetBefore => self.set_before.is_some(),
            AccessEvent::Set => self.set.is_some(),
            AccessEvent::SetAfter => self.set_after.is_some(),
        }
    }

    /// Events with a handler, in firing order.
    pub fn registered(&self) -> Vec<AccessEvent> {
        AccessEvent::ALL
            .into_iter()
            .filter(|event| self.has(*event))
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.registered().is_empty()
    }
}

impl fmt::Debug for Handlers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set()
            .entries(self.registered().iter().map(AccessEvent::as_str))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_table() {
        let handlers = Handlers::new();
        assert!(handlers.is_empty());
        assert_eq!(format!("{handlers:?}"), "{}");
    }

    #[test]
    fn test_registered_in_firing_order() {
        let handlers = Handlers::new()
            .on_set_after(|_, _, _, _| Ok(()))
            .on_get(|_, _, _| Ok(()))
            .on_set_before(|_, _, _, _| Ok(WriteDecision::Proceed));

        assert_eq!(
            handlers.registered(),
            vec![AccessEvent::Get, AccessEvent::SetBefore, AccessEvent::SetAfter]
        );
        assert!(!handlers.has(AccessEvent::GetBefore));
        assert_eq!(format!("{handlers:?}"), r#"{"get", "set:before", "set:after"}"#);
    }
}
