use core::any::type_name;
use core::fmt;
use core::mem::{self, ManuallyDrop};
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::thread;

use parking_lot::Mutex;

use crate::dependency::{Dependency, ErasedDependency};
use crate::error::{Error, Result};
use crate::policy::{Builder, FailurePolicy};

pub(crate) type Deleter<T> = Box<dyn FnOnce(T) + Send>;

/// Shared state behind every clone of one [`ManagedHandle`].
struct Record<T> {
    // taken exactly once, in `Drop`
    value: ManuallyDrop<T>,
    // only reached through `Mutex::get_mut` in `Drop`, never locked
    deleter: Mutex<Option<Deleter<T>>>,
    policy: FailurePolicy,
    dependencies: Mutex<Vec<ErasedDependency>>,
}

impl<T> Drop for Record<T> {
    fn drop(&mut self) {
        // SAFETY: `value` is initialized on construction and this is the
        // only place that moves it out.
        let value = unsafe { ManuallyDrop::take(&mut self.value) };
        let dependencies = mem::take(self.dependencies.get_mut());

        tracing::debug!(
            value_type = type_name::<T>(),
            dependencies = dependencies.len(),
            "releasing managed handle"
        );

        let outcome = match self.deleter.get_mut().take() {
            Some(deleter) => panic::catch_unwind(AssertUnwindSafe(move || deleter(value))),
            None => Ok(()),
        };

        let mut failure = outcome.err().map(|payload| {
            let error = Error::deleter_failure::<T>(&*payload);
            tracing::error!(%error, "deleter failed, releasing dependencies anyway");
            payload
        });

        // newest first, even if one of them panics; the first payload wins
        for dependency in dependencies.into_iter().rev() {
            let dependency_type = dependency.type_name();
            let outcome = panic::catch_unwind(AssertUnwindSafe(|| dependency.release()));
            if let Err(payload) = outcome {
                let error = Error::deleter_failure::<T>(&*payload);
                tracing::error!(
                    %error,
                    dependency = dependency_type,
                    "dependency release failed"
                );
                failure.get_or_insert(payload);
            }
        }

        if let Some(payload) = failure {
            if self.policy == FailurePolicy::Propagate && !thread::panicking() {
                panic::resume_unwind(payload);
            }
        }
    }
}

/// Reference-counted owner of an opaque resource value.
///
/// All clones of a handle share one record holding the value, its deleter
/// and a list of retained [dependencies](Dependency). When the last clone
/// goes away the deleter runs exactly once with the value, and only then
/// are the dependencies released, newest first.
///
/// The value is reachable only while a handle is borrowed, so a temporary
/// handle cannot leak a reference that outlives the resource:
///
/// ```compile_fail
/// use managed_handle::ManagedHandle;
///
/// let fd: &i32 = ManagedHandle::create(3, |_| {}).value().unwrap();
/// println!("{fd}");
/// ```
///
/// Retaining a handle from inside its own dependency graph forms a cycle
/// that is never released, exactly like an `Arc` cycle.
pub struct ManagedHandle<T> {
    record: Option<Arc<Record<T>>>,
}

impl<T: 'static> ManagedHandle<T> {
    /// Takes ownership of `value`. `deleter` is invoked with it once the last
    /// clone of the returned handle is dropped.
    pub fn create<F>(value: T, deleter: F) -> Self
    where
        F: FnOnce(T) + Send + 'static,
    {
        Builder::new(value).deleter(deleter).build()
    }

    /// Starts configuring a handle for `value`.
    pub fn builder(value: T) -> Builder<T> {
        Builder::new(value)
    }
}

impl<T> ManagedHandle<T> {
    pub(crate) fn from_parts(
        value: T,
        deleter: Deleter<T>,
        policy: FailurePolicy,
        dependencies: Vec<ErasedDependency>,
    ) -> Self {
        tracing::trace!(
            value_type = type_name::<T>(),
            dependencies = dependencies.len(),
            ?policy,
            "created managed handle"
        );
        ManagedHandle {
            record: Some(Arc::new(Record {
                value: ManuallyDrop::new(value),
                deleter: Mutex::new(Some(deleter)),
                policy,
                dependencies: Mutex::new(dependencies),
            })),
        }
    }

    /// A handle that owns nothing. Dropping it never invokes a deleter.
    pub const fn empty() -> Self {
        ManagedHandle { record: None }
    }

    pub fn is_valid(&self) -> bool {
        self.record.is_some()
    }

    fn record(&self) -> Result<&Record<T>> {
        self.record.as_deref().ok_or_else(Error::invalid_handle::<T>)
    }

    /// Borrows the owned value for as long as this handle is borrowed.
    pub fn value(&self) -> Result<&T> {
        self.record().map(|record| &*record.value)
    }

    /// Copies the owned value out.
    ///
    /// The copy is only meaningful while some owner is alive, so prefer
    /// [`value`](Self::value) or [`with`](Self::with) unless the handle is
    /// known to outlive its use. Called on a temporary, such as
    /// `ManagedHandle::create(fd, close).get()`, it returns a value whose
    /// deleter has already run by the end of the statement.
    pub fn get(&self) -> Result<T>
    where
        T: Copy,
    {
        self.value().copied()
    }

    /// Runs `f` with the owned value.
    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> Result<R> {
        self.value().map(f)
    }

    /// Keeps `dependency` alive until after this handle's deleter has run.
    ///
    /// Dependencies of one handle are released in reverse order of
    /// insertion. Calls from several threads are serialized.
    pub fn depend_on<D: Dependency>(&self, dependency: D) -> Result<()> {
        let record = self.record()?;
        let dependency = ErasedDependency::new(dependency);
        tracing::trace!(
            value_type = type_name::<T>(),
            dependency = dependency.type_name(),
            "retaining dependency"
        );
        record.dependencies.lock().push(dependency);
        Ok(())
    }

    /// Number of dependencies retained so far, zero for an empty handle.
    pub fn dependency_count(&self) -> usize {
        self.record
            .as_ref()
            .map_or(0, |record| record.dependencies.lock().len())
    }

    /// Number of live owners of the shared record, zero for an empty handle.
    pub fn use_count(&self) -> usize {
        self.record.as_ref().map_or(0, Arc::strong_count)
    }

    /// Whether both handles own the same record. Two empty handles are equal.
    pub fn ptr_eq(this: &Self, other: &Self) -> bool {
        match (&this.record, &other.record) {
            (Some(a), Some(b)) => Arc::ptr_eq(a, b),
            (None, None) => true,
            _ => false,
        }
    }

    /// Moves ownership out, leaving this handle empty.
    pub fn take(&mut self) -> Self {
        mem::take(self)
    }

    /// Gives up this owner. Runs the release if it was the last one.
    pub fn reset(&mut self) {
        self.record = None;
    }
}

impl<T> Default for ManagedHandle<T> {
    fn default() -> Self {
        ManagedHandle::empty()
    }
}

impl<T> Clone for ManagedHandle<T> {
    fn clone(&self) -> Self {
        if self.record.is_some() {
            tracing::trace!(value_type = type_name::<T>(), "sharing managed handle");
        }
        ManagedHandle {
            record: self.record.clone(),
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for ManagedHandle<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.record {
            Some(record) => f
                .debug_struct("ManagedHandle")
                .field("value", &*record.value)
                .field("use_count", &Arc::strong_count(record))
                .field("dependencies", &record.dependencies.lock().len())
                .finish(),
            None => f.write_str("ManagedHandle(Empty)"),
        }
    }
}

/// Shorthand for [`ManagedHandle::create`].
pub fn make_managed<T, F>(value: T, deleter: F) -> ManagedHandle<T>
where
    T: 'static,
    F: FnOnce(T) + Send + 'static,
{
    ManagedHandle::create(value, deleter)
}
