//! Error types for record access.

use thiserror::Error;

use crate::intercept::AccessEvent;

/// Errors raised while reading, writing or defining record attributes.
#[derive(Error, Debug)]
pub enum RecordError {
    #[error("No such attribute: {attribute}")]
    NoSuchAttribute { attribute: String },

    #[error("Attribute '{attribute}' is not writable")]
    NotWritable { attribute: String },

    #[error("Attribute '{attribute}' is not configurable")]
    NotConfigurable { attribute: String },

    #[error("Attribute '{attribute}' is intercepted and cannot be redefined")]
    Intercepted { attribute: String },

    #[error("Expected a JSON object, got {found}")]
    NotAnObject { found: String },

    #[error("Handler for '{event}' on '{attribute}' failed: {source}")]
    Handler {
        event: AccessEvent,
        attribute: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("Dispatch depth {depth} exceeded while accessing '{attribute}'")]
    DispatchDepthExceeded { attribute: String, depth: usize },
}

pub type RecordResult<T> = Result<T, RecordError>;
