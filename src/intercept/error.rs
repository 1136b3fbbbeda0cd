//! Configuration errors raised while installing an interception.

use thiserror::Error;

/// Errors from [`Interceptor::observe`](super::Interceptor::observe).
///
/// All of them are raised before the record is touched.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InterceptError {
    #[error("No attributes given to intercept")]
    EmptyAttributeSet,

    #[error("Cannot intercept '{attribute}': attribute does not exist")]
    MissingAttribute { attribute: String },

    #[error("Cannot intercept '{attribute}': attribute is not configurable")]
    NotConfigurable { attribute: String },

    #[error("Cannot intercept '{attribute}': attribute is not writable")]
    NotWritable { attribute: String },

    #[error("Cannot intercept '{attribute}': attribute is already intercepted")]
    AlreadyIntercepted { attribute: String },
}

impl InterceptError {
    /// The attribute that failed validation, if any.
    pub fn attribute(&self) -> Option<&str> {
        match self {
            InterceptError::EmptyAttributeSet => None,
            InterceptError::MissingAttribute { attribute }
            | InterceptError::NotConfigurable { attribute }
            | InterceptError::NotWritable { attribute }
            | InterceptError::AlreadyIntercepted { attribute } => Some(attribute),
        }
    }
}
