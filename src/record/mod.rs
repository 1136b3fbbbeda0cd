//! Host records with named attribute slots.
//!
//! A [`Record`] is an insertion-ordered set of attributes. Each attribute is
//! either a plain data slot or an accessor slot installed by the
//! [`Interceptor`](crate::intercept::Interceptor). All access goes through
//! `&self`, so a record can be borrowed by an observer and still be read and
//! written by everyone else.
//!
//! # Example
//!
//! ```
//! use propwatch::Record;
//! use serde_json::json;
//!
//! let record = Record::new().with("x", json!(10));
//! record.set("x", json!(9)).unwrap();
//! assert_eq!(record.get("x").unwrap(), json!(9));
//! ```

mod error;
mod slot;

use std::cell::{Cell, RefCell};
use std::fmt;

use indexmap::IndexMap;
use serde_json::{Map, Value};

use crate::intercept::SessionId;
use crate::intercept::protocol::{self, Binding};

pub use error::{RecordError, RecordResult};
pub use slot::{Descriptor, SlotFlags, SlotKind};

pub(crate) use slot::{AccessorSlot, Slot};

/// Result of a write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SetOutcome {
    /// The value reached storage.
    Committed,
    /// A `set:before` handler cancelled the write.
    Vetoed,
}

impl SetOutcome {
    pub fn is_committed(&self) -> bool {
        matches!(self, SetOutcome::Committed)
    }
}

/// A record whose attributes can be intercepted.
#[derive(Default)]
pub struct Record {
    slots: RefCell<IndexMap<String, Slot>>,
    /// Protocol runs currently nested on this record.
    depth: Cell<usize>,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert of a plain attribute with default flags.
    pub fn with(mut self, name: impl Into<String>, value: Value) -> Self {
        self.slots
            .get_mut()
            .insert(name.into(), Slot::data(value, SlotFlags::default()));
        self
    }

    /// Build a record from a JSON object, one attribute per key.
    pub fn from_json(value: Value) -> RecordResult<Self> {
        match value {
            Value::Object(map) => Ok(map
                .into_iter()
                .fold(Self::new(), |record, (name, value)| record.with(name, value))),
            other => Err(RecordError::NotAnObject {
                found: json_kind(&other).to_string(),
            }),
        }
    }

    /// Define or redefine a plain data attribute.
    ///
    /// Redefinition requires the existing slot to be configurable and not
    /// intercepted. The attribute keeps its position.
    pub fn define(
        &self,
        name: impl Into<String>,
        value: Value,
        flags: SlotFlags,
    ) -> RecordResult<()> {
        let name = name.into();
        let mut slots = self.slots.borrow_mut();
        match slots.get(&name) {
            Some(Slot::Accessor(_)) => {
                return Err(RecordError::Intercepted { attribute: name });
            }
            Some(Slot::Data(data)) if !data.flags.contains(SlotFlags::CONFIGURABLE) => {
                return Err(RecordError::NotConfigurable { attribute: name });
            }
            _ => {}
        }
        slots.insert(name, Slot::data(value, flags));
        Ok(())
    }

    /// Read an attribute, running the read protocol if it is intercepted.
    pub fn get(&self, name: &str) -> RecordResult<Value> {
        let binding = {
            let slots = self.slots.borrow();
            match slots.get(name) {
                None => {
                    return Err(RecordError::NoSuchAttribute {
                        attribute: name.to_string(),
                    });
                }
                Some(Slot::Data(data)) => return Ok(data.value.clone()),
                Some(Slot::Accessor(accessor)) => Binding::from(accessor),
            }
        };
        protocol::read(self, name, &binding)
    }

    /// Write an attribute, running the write protocol if it is intercepted.
    ///
    /// Writing a missing attribute creates it as plain data.
    pub fn set(&self, name: &str, value: Value) -> RecordResult<SetOutcome> {
        let binding = {
            let mut slots = self.slots.borrow_mut();
            let Some(slot) = slots.get_mut(name) else {
                slots.insert(name.to_string(), Slot::data(value, SlotFlags::default()));
                return Ok(SetOutcome::Committed);
            };
            match slot {
                Slot::Data(data) => {
                    if !data.flags.contains(SlotFlags::WRITABLE) {
                        return Err(RecordError::NotWritable {
                            attribute: name.to_string(),
                        });
                    }
                    data.value = value;
                    return Ok(SetOutcome::Committed);
                }
                Slot::Accessor(accessor) => Binding::from(&*accessor),
            }
        };
        protocol::write(self, name, value, &binding)
    }

    pub fn descriptor(&self, name: &str) -> Option<Descriptor> {
        self.slots.borrow().get(name).map(Slot::descriptor)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.slots.borrow().contains_key(name)
    }

    pub fn is_intercepted(&self, name: &str) -> bool {
        matches!(self.slots.borrow().get(name), Some(Slot::Accessor(_)))
    }

    /// Enumerable attribute names in insertion order.
    pub fn keys(&self) -> Vec<String> {
        self.slots
            .borrow()
            .iter()
            .filter(|(_, slot)| slot.is_enumerable())
            .map(|(name, _)| name.clone())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.slots.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.borrow().is_empty()
    }

    /// Snapshot enumerable attributes as a JSON object.
    ///
    /// Each attribute is read through [`Record::get`], so intercepted
    /// attributes fire their read protocol.
    pub fn to_json(&self) -> RecordResult<Value> {
        let mut map = Map::new();
        for name in self.keys() {
            let value = self.get(&name)?;
            map.insert(name, value);
        }
        Ok(Value::Object(map))
    }

    /// Number of protocol runs currently nested on this record.
    pub fn dispatch_depth(&self) -> usize {
        self.depth.get()
    }

    pub(crate) fn slots(&self) -> &RefCell<IndexMap<String, Slot>> {
        &self.slots
    }

    /// Raw storage read, bypassing any accessor.
    pub(crate) fn stored(&self, name: &str) -> RecordResult<Value> {
        self.slots
            .borrow()
            .get(name)
            .map(|slot| slot.stored().clone())
            .ok_or_else(|| RecordError::NoSuchAttribute {
                attribute: name.to_string(),
            })
    }

    /// Session currently intercepting `name`, if any.
    pub(crate) fn slot_session(&self, name: &str) -> Option<SessionId> {
        match self.slots.borrow().get(name) {
            Some(Slot::Accessor(accessor)) => Some(accessor.session),
            _ => None,
        }
    }

    /// Raw storage write on behalf of `session`, bypassing any accessor.
    ///
    /// Lands in the plain slot if the attribute was restored while the run
    /// was in flight. Returns `false` without writing when another session
    /// now owns the attribute.
    pub(crate) fn commit(&self, name: &str, session: SessionId, value: Value) -> RecordResult<bool> {
        match self.slots.borrow_mut().get_mut(name) {
            Some(Slot::Accessor(accessor)) if accessor.session == session => {
                accessor.stored = value;
                Ok(true)
            }
            Some(Slot::Accessor(_)) => Ok(false),
            Some(Slot::Data(data)) => {
                data.value = value;
                Ok(true)
            }
            None => Err(RecordError::NoSuchAttribute {
                attribute: name.to_string(),
            }),
        }
    }

    /// Enter one more nested protocol run, failing past `max_depth`.
    pub(crate) fn enter(&self, attribute: &str, max_depth: usize) -> RecordResult<DepthGuard<'_>> {
        let depth = self.depth.get();
        if depth >= max_depth {
            return Err(RecordError::DispatchDepthExceeded {
                attribute: attribute.to_string(),
                depth,
            });
        }
        self.depth.set(depth + 1);
        Ok(DepthGuard { depth: &self.depth })
    }
}

/// Leaves a nested protocol run on drop.
pub(crate) struct DepthGuard<'a> {
    depth: &'a Cell<usize>,
}

impl Drop for DepthGuard<'_> {
    fn drop(&mut self) {
        self.depth.set(self.depth.get().saturating_sub(1));
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Renders plain values and `(...)` for intercepted attributes.
impl fmt::Display for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Ok(slots) = self.slots.try_borrow() else {
            return f.write_str("{<busy>}");
        };
        f.write_str("{")?;
        for (i, (name, slot)) in slots.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            match slot {
                Slot::Data(data) => write!(f, "{name}: {}", data.value)?,
                Slot::Accessor(_) => write!(f, "{name}: (...)")?,
            }
        }
        f.write_str("}")
    }
}

impl fmt::Debug for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.slots.try_borrow() {
            Ok(slots) => f
                .debug_struct("Record")
                .field("slots", &*slots)
                .field("depth", &self.depth.get())
                .finish(),
            Err(_) => f.debug_struct("Record").finish_non_exhaustive(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_plain_round_trip() {
        let record = Record::new().with("x", json!(10));
        assert_eq!(record.set("x", json!(9)).unwrap(), SetOutcome::Committed);
        assert_eq!(record.get("x").unwrap(), json!(9));
    }

    #[test]
    fn test_missing_attribute() {
        let record = Record::new();
        let err = record.get("nope").unwrap_err();
        assert!(matches!(err, RecordError::NoSuchAttribute { ref attribute } if attribute == "nope"));
    }

    #[test]
    fn test_set_creates_missing_attribute() {
        let record = Record::new();
        record.set("fresh", json!("v")).unwrap();
        assert_eq!(record.get("fresh").unwrap(), json!("v"));
        assert_eq!(
            record.descriptor("fresh"),
            Some(Descriptor::data(SlotFlags::default()))
        );
    }

    #[test]
    fn test_read_only_attribute_rejects_writes() {
        let record = Record::new();
        record
            .define("ro", json!(1), SlotFlags::ENUMERABLE | SlotFlags::CONFIGURABLE)
            .unwrap();

        let err = record.set("ro", json!(2)).unwrap_err();
        assert!(matches!(err, RecordError::NotWritable { .. }));
        assert_eq!(record.get("ro").unwrap(), json!(1));
    }

    #[test]
    fn test_non_configurable_cannot_be_redefined() {
        let record = Record::new();
        record.define("fixed", json!(1), SlotFlags::WRITABLE).unwrap();

        let err = record
            .define("fixed", json!(2), SlotFlags::default())
            .unwrap_err();
        assert!(matches!(err, RecordError::NotConfigurable { .. }));
    }

    #[test]
    fn test_keys_skip_non_enumerable() {
        let record = Record::new().with("a", json!(1)).with("b", json!(2));
        record
            .define("hidden", json!(3), SlotFlags::WRITABLE | SlotFlags::CONFIGURABLE)
            .unwrap();

        assert_eq!(record.keys(), vec!["a".to_string(), "b".to_string()]);
        assert_eq!(record.len(), 3);
        assert_eq!(record.to_json().unwrap(), json!({"a": 1, "b": 2}));
    }

    #[test]
    fn test_from_json() {
        let record = Record::from_json(json!({"x": 10, "y": "label"})).unwrap();
        assert_eq!(record.keys(), vec!["x".to_string(), "y".to_string()]);
        assert_eq!(record.to_string(), r#"{x: 10, y: "label"}"#);

        let err = Record::from_json(json!([1, 2])).unwrap_err();
        assert!(matches!(err, RecordError::NotAnObject { ref found } if found == "array"));
    }

    #[test]
    fn test_depth_guard_unwinds() {
        let record = Record::new();
        {
            let _outer = record.enter("x", 2).unwrap();
            let _inner = record.enter("x", 2).unwrap();
            assert_eq!(record.dispatch_depth(), 2);
            assert!(matches!(
                record.enter("x", 2),
                Err(RecordError::DispatchDepthExceeded { depth: 2, .. })
            ));
        }
        assert_eq!(record.dispatch_depth(), 0);
    }
}
