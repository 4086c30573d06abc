//! Error types for open-g-led-core.

use crate::device::KeyboardModel;
use thiserror::Error;

/// Core library error type.
#[derive(Debug, Error)]
pub enum Error {
    /// No attached device matched the requested filter.
    #[error("device not found: {0}")]
    NotFound(String),

    /// The device handle or its interface could not be acquired.
    #[error("access denied: {0}")]
    AccessDenied(String),

    /// The current model has no protocol mapping for this operation.
    #[error("{operation} is not supported on {}", model.name())]
    Unsupported {
        operation: &'static str,
        model: KeyboardModel,
    },

    /// A mode value outside the set the current model accepts.
    #[error("value out of range: {field} = {value} (allowed {min}..={max})")]
    OutOfRange {
        field: &'static str,
        value: u32,
        min: u32,
        max: u32,
    },

    /// A write or transfer to the device failed.
    #[error("transport error: {0}")]
    Transport(String),

    /// An operation was issued while no session is open.
    #[error("no keyboard session is open")]
    NotOpen,

    /// A key batch without any assignments.
    #[error("empty key request")]
    EmptyRequest,

    /// Transport configuration could not be read.
    #[error("config error: {0}")]
    Config(String),
}

impl Error {
    /// Whether the error means "no protocol mapping", including rejected mode values.
    pub fn is_unsupported(&self) -> bool {
        matches!(self, Self::Unsupported { .. } | Self::OutOfRange { .. })
    }
}

/// Convenience Result alias.
pub type Result<T> = std::result::Result<T, Error>;
