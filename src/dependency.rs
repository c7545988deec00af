//! Type-erased keep-alive obligations.
//!
//! A [`ManagedHandle`](crate::ManagedHandle) can retain objects of any type
//! for as long as its own shared record lives. Those objects are stored
//! together behind the [`Dependency`] capability, so a handle to a texture
//! can keep both a `ManagedHandle<DeviceId>` and an `Arc<Allocator>` alive
//! without knowing either type.

use core::any;
use core::fmt;

/// An object whose only remaining obligation is to be released.
///
/// Implemented for every `Send + 'static` type. Releasing a dependency runs
/// its ordinary `Drop`, so a retained [`ManagedHandle`](crate::ManagedHandle)
/// gives up one owner and a retained `Arc` decrements its count.
pub trait Dependency: Send + 'static {
    /// Gives up ownership of `self`.
    fn release(self: Box<Self>) {
        drop(self)
    }
}

impl<D: Send + 'static> Dependency for D {}

/// A retained [`Dependency`] together with the name of its concrete type.
pub(crate) struct ErasedDependency {
    inner: Box<dyn Dependency>,
    type_name: &'static str,
}

impl ErasedDependency {
    pub(crate) fn new<D: Dependency>(dependency: D) -> Self {
        ErasedDependency {
            inner: Box::new(dependency),
            type_name: any::type_name::<D>(),
        }
    }

    /// Name of the type this dependency was erased from.
    pub(crate) fn type_name(&self) -> &'static str {
        self.type_name
    }

    pub(crate) fn release(self) {
        tracing::trace!(dependency = self.type_name, "releasing dependency");
        self.inner.release()
    }
}

impl fmt::Debug for ErasedDependency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ErasedDependency")
            .field(&self.type_name)
            .finish()
    }
}
