//! Attribute slots and their descriptor flags.

use std::fmt;
use std::rc::Rc;

use bitflags::bitflags;
use serde_json::Value;

use crate::intercept::{Dispatch, SessionId};

bitflags! {
    /// Descriptor flags of an attribute slot.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct SlotFlags: u8 {
        const WRITABLE = 0b001;
        const ENUMERABLE = 0b010;
        const CONFIGURABLE = 0b100;
    }
}

impl Default for SlotFlags {
    fn default() -> Self {
        SlotFlags::all()
    }
}

/// Whether a slot stores its value directly or routes through an accessor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SlotKind {
    Data,
    Accessor,
}

/// Public view of a slot's current shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Descriptor {
    pub kind: SlotKind,
    pub flags: SlotFlags,
}

impl Descriptor {
    pub fn data(flags: SlotFlags) -> Self {
        Self {
            kind: SlotKind::Data,
            flags,
        }
    }

    pub fn is_writable(&self) -> bool {
        self.flags.contains(SlotFlags::WRITABLE)
    }

    pub fn is_enumerable(&self) -> bool {
        self.flags.contains(SlotFlags::ENUMERABLE)
    }

    pub fn is_configurable(&self) -> bool {
        self.flags.contains(SlotFlags::CONFIGURABLE)
    }
}

/// A plain value slot.
#[derive(Debug, Clone)]
pub(crate) struct DataSlot {
    pub(crate) value: Value,
    pub(crate) flags: SlotFlags,
}

/// A slot replaced by the interceptor.
///
/// Holds the original slot state: the stored value (kept current on every
/// commit) and the flags to restore on teardown.
pub(crate) struct AccessorSlot {
    pub(crate) session: SessionId,
    pub(crate) dispatch: Rc<dyn Dispatch>,
    pub(crate) max_depth: usize,
    pub(crate) stored: Value,
    pub(crate) original: SlotFlags,
}

impl AccessorSlot {
    /// Accessors keep enumerability and are always configurable so they can
    /// be restored. They have no writable flag of their own.
    pub(crate) fn flags(&self) -> SlotFlags {
        (self.original & SlotFlags::ENUMERABLE) | SlotFlags::CONFIGURABLE
    }
}

impl fmt::Debug for AccessorSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccessorSlot")
            .field("session", &self.session)
            .field("max_depth", &self.max_depth)
            .field("stored", &self.stored)
            .field("original", &self.original)
            .finish_non_exhaustive()
    }
}

#[derive(Debug)]
pub(crate) enum Slot {
    Data(DataSlot),
    Accessor(AccessorSlot),
}

impl Slot {
    pub(crate) fn data(value: Value, flags: SlotFlags) -> Self {
        Slot::Data(DataSlot { value, flags })
    }

    pub(crate) fn descriptor(&self) -> Descriptor {
        match self {
            Slot::Data(data) => Descriptor::data(data.flags),
            Slot::Accessor(accessor) => Descriptor {
                kind: SlotKind::Accessor,
                flags: accessor.flags(),
            },
        }
    }

    /// The value held in storage, bypassing any accessor.
    pub(crate) fn stored(&self) -> &Value {
        match self {
            Slot::Data(data) => &data.value,
            Slot::Accessor(accessor) => &accessor.stored,
        }
    }

    pub(crate) fn is_enumerable(&self) -> bool {
        self.descriptor().is_enumerable()
    }
}
