//! Multi-attribute interceptor: installs and restores accessor slots.

use std::fmt;
use std::num::NonZeroU64;
use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::config::DispatchConfig;
use crate::log_event;
use crate::record::{AccessorSlot, Record, Slot, SlotFlags};

use super::dispatch::Dispatch;
use super::error::InterceptError;

static NEXT_SESSION: AtomicU64 = AtomicU64::new(1);

/// Process-unique tag of one interception.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SessionId(NonZeroU64);

impl SessionId {
    pub(crate) fn next() -> Self {
        let raw = NEXT_SESSION.fetch_add(1, Ordering::Relaxed);
        // Counter starts at 1 and would need 2^64 sessions to wrap.
        Self(NonZeroU64::new(raw).unwrap_or(NonZeroU64::MIN))
    }

    pub fn value(&self) -> u64 {
        self.0.get()
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Handle for one installed interception.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Interception {
    session: SessionId,
    attributes: Vec<String>,
}

impl Interception {
    pub fn session(&self) -> SessionId {
        self.session
    }

    /// Attributes this interception installed, in registration order.
    pub fn attributes(&self) -> &[String] {
        &self.attributes
    }
}

/// Replaces data attributes with accessor slots that route every access
/// through a [`Dispatch`] callback.
#[derive(Debug, Clone, Default)]
pub struct Interceptor {
    config: DispatchConfig,
}

impl Interceptor {
    pub fn new(config: DispatchConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &DispatchConfig {
        &self.config
    }

    /// Intercept `attributes` on `record`.
    ///
    /// Every name is validated first; on error the record is left untouched
    /// and no session exists. Duplicate names are intercepted once.
    pub fn observe(
        &self,
        record: &Record,
        attributes: &[&str],
        dispatch: Rc<dyn Dispatch>,
    ) -> Result<Interception, InterceptError> {
        if attributes.is_empty() {
            return Err(InterceptError::EmptyAttributeSet);
        }

        let mut names: Vec<String> = Vec::with_capacity(attributes.len());
        for name in attributes {
            if !names.iter().any(|seen| seen == name) {
                names.push((*name).to_string());
            }
        }

        let mut slots = record.slots().borrow_mut();

        for name in &names {
            match slots.get(name.as_str()) {
                None => {
                    return Err(InterceptError::MissingAttribute {
                        attribute: name.clone(),
                    });
                }
                Some(Slot::Accessor(_)) => {
                    return Err(InterceptError::AlreadyIntercepted {
                        attribute: name.clone(),
                    });
                }
                Some(Slot::Data(data)) => {
                    if !data.flags.contains(SlotFlags::CONFIGURABLE) {
                        return Err(InterceptError::NotConfigurable {
                            attribute: name.clone(),
                        });
                    }
                    if !data.flags.contains(SlotFlags::WRITABLE) {
                        return Err(InterceptError::NotWritable {
                            attribute: name.clone(),
                        });
                    }
                }
            }
        }

        let session = SessionId::next();
        for name in &names {
            let Some(slot) = slots.get_mut(name.as_str()) else {
                continue;
            };
            if let Slot::Data(data) = slot {
                let accessor = AccessorSlot {
                    session,
                    dispatch: Rc::clone(&dispatch),
                    max_depth: self.config.max_depth,
                    stored: std::mem::take(&mut data.value),
                    original: data.flags,
                };
                *slot = Slot::Accessor(accessor);
            }
        }

        log_event!("interceptor", "installed", "{} as session {session}", names.join(", "));

        Ok(Interception {
            session,
            attributes: names,
        })
    }

    /// Turn `attribute` back into a plain data slot.
    ///
    /// Returns `false` without touching the record when the attribute is not
    /// currently intercepted by `interception`.
    pub fn restore(&self, record: &Record, interception: &Interception, attribute: &str) -> bool {
        let mut slots = record.slots().borrow_mut();
        let Some(slot) = slots.get_mut(attribute) else {
            return false;
        };
        let Slot::Accessor(accessor) = slot else {
            return false;
        };
        if accessor.session != interception.session {
            return false;
        }

        let value = std::mem::take(&mut accessor.stored);
        let flags = accessor.original;
        *slot = Slot::data(value, flags);

        log_event!(
            "interceptor",
            "restored",
            "{attribute} from session {}",
            interception.session
        );
        true
    }

    /// Restore every attribute of `interception`, returning how many were
    /// still intercepted.
    pub fn restore_all(&self, record: &Record, interception: &Interception) -> usize {
        interception
            .attributes
            .iter()
            .filter(|name| self.restore(record, interception, name))
            .count()
    }
}
