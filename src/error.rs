use std::fmt::Display;

/// The lifecycle state of an [`Lcd`](crate::Lcd).
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum DeviceState {
    /// Between frames. Only lifecycle calls and capability queries are valid.
    Ready,
    /// Inside a frame bracket. Drawing and state calls are valid.
    Drawing,
    /// Released. Every call fails.
    Destroyed,
}

impl Display for DeviceState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            DeviceState::Ready => "ready",
            DeviceState::Drawing => "drawing",
            DeviceState::Destroyed => "destroyed",
        })
    }
}

/// An error produced by a device or its backend.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    #[error("invalid parameter: {0}")]
    InvalidParam(&'static str),
    #[error("`{op}` is not valid while the device is {state}")]
    InvalidState {
        op: &'static str,
        state: DeviceState,
    },
    #[error("device has been destroyed")]
    Destroyed,
    #[error("`{0}` is not supported by this backend")]
    NotSupported(&'static str),
    #[error("backend failure: {0}")]
    Fail(String),
    #[error("out of memory")]
    OutOfMemory,
}

/// Coarse classification of an [`Error`], matching the
/// return codes exchanged at the backend boundary.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Bad arguments, a call in the wrong state, or use after destroy.
    InvalidParam,
    /// An optional capability is absent.
    NotSupported,
    /// Generic backend failure, e.g. a lost device.
    Fail,
    /// Resource exhaustion during an allocating operation.
    OutOfMemory,
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::InvalidParam(_) | Error::InvalidState { .. } | Error::Destroyed => {
                ErrorKind::InvalidParam
            }
            Error::NotSupported(_) => ErrorKind::NotSupported,
            Error::Fail(_) => ErrorKind::Fail,
            Error::OutOfMemory => ErrorKind::OutOfMemory,
        }
    }

    /// Creates a generic backend failure.
    pub fn fail(message: impl Into<String>) -> Self {
        Error::Fail(message.into())
    }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
