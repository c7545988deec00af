use std::any::Any;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// The handle owns no state: it was created with
    /// [`ManagedHandle::empty`](crate::ManagedHandle::empty), moved out of
    /// with [`take`](crate::ManagedHandle::take) or
    /// [`reset`](crate::ManagedHandle::reset).
    #[error("invalid handle: `ManagedHandle<{type_name}>` owns no state")]
    InvalidHandle { type_name: &'static str },

    /// The deleter panicked while releasing a value.
    #[error("deleter for `{type_name}` failed: {message}")]
    DeleterFailure {
        type_name: &'static str,
        message: String,
    },
}

impl Error {
    pub(crate) fn invalid_handle<T>() -> Self {
        Error::InvalidHandle {
            type_name: std::any::type_name::<T>(),
        }
    }

    pub(crate) fn deleter_failure<T>(payload: &(dyn Any + Send)) -> Self {
        let message = if let Some(s) = payload.downcast_ref::<&'static str>() {
            (*s).to_owned()
        } else if let Some(s) = payload.downcast_ref::<String>() {
            s.clone()
        } else {
            "non-string panic payload".to_owned()
        };
        Error::DeleterFailure {
            type_name: std::any::type_name::<T>(),
            message,
        }
    }
}
