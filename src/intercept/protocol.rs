//! Read and write protocols run by accessor slots.
//!
//! No slot borrow is held while the dispatcher runs, so a handler may access
//! the record again. Each such access is a complete nested run, bounded by
//! the accessor's `max_depth`.

use std::rc::Rc;

use serde_json::Value;

use crate::debug_event;
use crate::record::{AccessorSlot, Record, RecordError, RecordResult, SetOutcome};

use super::dispatch::{Access, AccessEvent, Dispatch, Payload, Reply};
use super::SessionId;

/// Everything a protocol run needs from an accessor slot, detached from the
/// slot borrow.
pub(crate) struct Binding {
    pub(crate) session: SessionId,
    pub(crate) dispatch: Rc<dyn Dispatch>,
    pub(crate) max_depth: usize,
}

impl From<&AccessorSlot> for Binding {
    fn from(accessor: &AccessorSlot) -> Self {
        Self {
            session: accessor.session,
            dispatch: Rc::clone(&accessor.dispatch),
            max_depth: accessor.max_depth,
        }
    }
}

pub(crate) fn read(record: &Record, attribute: &str, binding: &Binding) -> RecordResult<Value> {
    let _depth = record.enter(attribute, binding.max_depth)?;

    let reply = fire(record, attribute, binding, AccessEvent::GetBefore, Payload::Empty)?;
    if let Reply::Override(value) = reply {
        debug_event!("protocol", "override", "{attribute} -> {value}");
        return Ok(value);
    }

    let value = record.stored(attribute)?;
    for event in [AccessEvent::Get, AccessEvent::GetAfter] {
        if !owns(record, attribute, binding) {
            break;
        }
        fire(record, attribute, binding, event, Payload::Value(&value))?;
    }
    Ok(value)
}

pub(crate) fn write(
    record: &Record,
    attribute: &str,
    new: Value,
    binding: &Binding,
) -> RecordResult<SetOutcome> {
    let _depth = record.enter(attribute, binding.max_depth)?;

    let old = record.stored(attribute)?;
    let change = Payload::Change {
        new: &new,
        old: &old,
    };
    if fire(record, attribute, binding, AccessEvent::SetBefore, change)? == Reply::Veto {
        debug_event!("protocol", "veto", "{attribute} keeps {old}");
        return Ok(SetOutcome::Vetoed);
    }

    if !record.commit(attribute, binding.session, new.clone())? {
        debug_event!("protocol", "superseded", "{attribute} owned by another session");
        return Ok(SetOutcome::Vetoed);
    }

    let change = Payload::Change {
        new: &new,
        old: &old,
    };
    for event in [AccessEvent::Set, AccessEvent::SetAfter] {
        if !owns(record, attribute, binding) {
            break;
        }
        fire(record, attribute, binding, event, change)?;
    }
    Ok(SetOutcome::Committed)
}

/// Whether the attribute is still intercepted by the run's session.
///
/// A handler may restore the session mid-run; later phases are then skipped.
fn owns(record: &Record, attribute: &str, binding: &Binding) -> bool {
    record.slot_session(attribute) == Some(binding.session)
}

/// Fire one phase and normalize the reply for that phase.
fn fire(
    record: &Record,
    attribute: &str,
    binding: &Binding,
    event: AccessEvent,
    payload: Payload<'_>,
) -> RecordResult<Reply> {
    debug_event!("protocol", event, "{attribute} (session {})", binding.session);

    let access = Access {
        record,
        attribute,
        event,
        payload,
    };
    let reply = binding
        .dispatch
        .dispatch(&access)
        .map_err(|source| RecordError::Handler {
            event,
            attribute: attribute.to_string(),
            source,
        })?;

    let honored = match (&reply, event) {
        (Reply::Continue, _) => true,
        (Reply::Override(_), AccessEvent::GetBefore) => true,
        (Reply::Veto, AccessEvent::SetBefore) => true,
        _ => false,
    };
    if honored {
        Ok(reply)
    } else {
        debug_event!("protocol", "ignored reply", "{reply:?} at {event}");
        Ok(Reply::Continue)
    }
}
