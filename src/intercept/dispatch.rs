//! Dispatch contract between the interceptor and whoever configures it.
//!
//! The interceptor owns the phase ordering; the dispatcher only answers
//! one phase at a time with a [`Reply`].

use std::fmt;
use std::str::FromStr;

use serde_json::Value;

use crate::record::Record;

/// The six phases fired around an intercepted access.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AccessEvent {
    GetBefore,
    Get,
    GetAfter,
    SetBefore,
    Set,
    SetAfter,
}

impl AccessEvent {
    /// Every event, in firing order (reads first).
    pub const ALL: [AccessEvent; 6] = [
        AccessEvent::GetBefore,
        AccessEvent::Get,
        AccessEvent::GetAfter,
        AccessEvent::SetBefore,
        AccessEvent::Set,
        AccessEvent::SetAfter,
    ];

    /// The event name as used in handler tables and log output.
    pub fn as_str(&self) -> &'static str {
        match self {
            AccessEvent::GetBefore => "get:before",
            AccessEvent::Get => "get",
            AccessEvent::GetAfter => "get:after",
            AccessEvent::SetBefore => "set:before",
            AccessEvent::Set => "set",
            AccessEvent::SetAfter => "set:after",
        }
    }

    pub fn is_read(&self) -> bool {
        matches!(
            self,
            AccessEvent::GetBefore | AccessEvent::Get | AccessEvent::GetAfter
        )
    }

    /// Before-phases are the only ones whose reply is honored.
    pub fn is_before(&self) -> bool {
        matches!(self, AccessEvent::GetBefore | AccessEvent::SetBefore)
    }
}

impl fmt::Display for AccessEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown event name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown access event '{0}'")]
pub struct UnknownEvent(pub String);

impl FromStr for AccessEvent {
    type Err = UnknownEvent;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        AccessEvent::ALL
            .into_iter()
            .find(|event| event.as_str() == s)
            .ok_or_else(|| UnknownEvent(s.to_string()))
    }
}

/// Phase-specific arguments delivered with an [`Access`].
#[derive(Debug, Clone, Copy)]
pub enum Payload<'a> {
    /// `get:before` carries nothing beyond record and name.
    Empty,
    /// `get` and `get:after` carry the value being returned.
    Value(&'a Value),
    /// Set phases carry the incoming and the pre-write value.
    Change { new: &'a Value, old: &'a Value },
}

/// One phase notification for one attribute.
#[derive(Debug, Clone, Copy)]
pub struct Access<'a> {
    pub record: &'a Record,
    pub attribute: &'a str,
    pub event: AccessEvent,
    pub payload: Payload<'a>,
}

/// What the dispatcher wants the interceptor to do next.
#[derive(Debug, Clone, PartialEq)]
pub enum Reply {
    /// Carry on with the protocol.
    Continue,
    /// Short-circuit a read with this value. Honored at `get:before` only.
    Override(Value),
    /// Cancel a pending write. Honored at `set:before` only.
    Veto,
}

/// Callback invoked by the interceptor for every phase of every access.
pub trait Dispatch {
    fn dispatch(&self, access: &Access<'_>) -> anyhow::Result<Reply>;
}

impl<F> Dispatch for F
where
    F: Fn(&Access<'_>) -> anyhow::Result<Reply>,
{
    fn dispatch(&self, access: &Access<'_>) -> anyhow::Result<Reply> {
        self(access)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_names_round_trip() {
        for event in AccessEvent::ALL {
            assert_eq!(event.as_str().parse::<AccessEvent>().unwrap(), event);
        }
        assert_eq!(AccessEvent::SetBefore.to_string(), "set:before");
    }

    #[test]
    fn test_unknown_event_name() {
        let err = "call:before".parse::<AccessEvent>().unwrap_err();
        assert_eq!(err, UnknownEvent("call:before".to_string()));
    }

    #[test]
    fn test_event_classification() {
        assert!(AccessEvent::GetAfter.is_read());
        assert!(!AccessEvent::Set.is_read());
        assert!(AccessEvent::GetBefore.is_before());
        assert!(AccessEvent::SetBefore.is_before());
        assert!(!AccessEvent::SetAfter.is_before());
    }
}
