//! # Managed handle
//!
//! Reference-counted ownership for opaque resource values such as file
//! descriptors, graphics objects or library contexts. The release routine
//! runs exactly once, when the last owner is gone, and an owner may retain
//! other resources so that they are torn down only after it.
//!
//! ## Examples
//!
//! Sharing a handle
//!
//! ```
//! use std::sync::atomic::{AtomicUsize, Ordering};
//! use std::sync::Arc;
//!
//! use managed_handle::ManagedHandle;
//!
//! let closed = Arc::new(AtomicUsize::new(0));
//!
//! let a = ManagedHandle::create(42, {
//!     let closed = Arc::clone(&closed);
//!     move |_fd| {
//!         closed.fetch_add(1, Ordering::SeqCst);
//!     }
//! });
//! let b = a.clone();
//! drop(a);
//!
//! // The copy still owns the value.
//! assert_eq!(b.get(), Ok(42));
//! assert_eq!(closed.load(Ordering::SeqCst), 0);
//!
//! drop(b);
//! assert_eq!(closed.load(Ordering::SeqCst), 1);
//! ```
//!
//! Retaining a dependency
//!
//! ```
//! use std::sync::{Arc, Mutex};
//!
//! use managed_handle::ManagedHandle;
//!
//! let log = Arc::new(Mutex::new(Vec::new()));
//! let logger = |name: &'static str| {
//!     let log = Arc::clone(&log);
//!     move |_: u64| log.lock().unwrap().push(name)
//! };
//!
//! let context = ManagedHandle::create(1u64, logger("context"));
//! let buffer = ManagedHandle::create(2u64, logger("buffer"));
//!
//! // The buffer must be destroyed before the context it was allocated from.
//! buffer.depend_on(context).unwrap();
//! drop(buffer);
//!
//! assert_eq!(*log.lock().unwrap(), ["buffer", "context"]);
//! ```

mod dependency;
mod error;
mod handle;
mod policy;

pub use dependency::Dependency;
pub use error::{Error, Result};
pub use handle::{make_managed, ManagedHandle};
pub use policy::{Builder, FailurePolicy};
