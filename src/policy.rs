use crate::dependency::{Dependency, ErasedDependency};
use crate::handle::{Deleter, ManagedHandle};

/// What to do after a deleter panics.
///
/// Whatever the policy, the failure is logged and the record's dependencies
/// are still released. Release is never retried.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FailurePolicy {
    /// Re-raise the deleter's panic once dependencies are released. If the
    /// thread is already unwinding, behaves like [`FailurePolicy::Log`].
    #[default]
    Propagate,
    /// Log the failure and continue.
    Log,
}

/// Configures a [`ManagedHandle`] before its shared record is allocated.
///
/// ```
/// use managed_handle::{FailurePolicy, ManagedHandle};
///
/// let device = ManagedHandle::create(1u32, |_| {});
/// let queue = ManagedHandle::builder(7u32)
///     .deleter(|id| println!("destroying queue {id}"))
///     .on_deleter_failure(FailurePolicy::Log)
///     .depend_on(device)
///     .build();
/// assert_eq!(queue.dependency_count(), 1);
/// ```
#[must_use = "a builder does nothing until `build` is called"]
pub struct Builder<T> {
    value: T,
    deleter: Option<Deleter<T>>,
    policy: FailurePolicy,
    dependencies: Vec<ErasedDependency>,
}

impl<T: 'static> Builder<T> {
    pub(crate) fn new(value: T) -> Self {
        Builder {
            value,
            deleter: None,
            policy: FailurePolicy::default(),
            dependencies: Vec::new(),
        }
    }

    /// Release routine invoked once with the value. Defaults to a no-op.
    pub fn deleter<F>(mut self, deleter: F) -> Self
    where
        F: FnOnce(T) + Send + 'static,
    {
        self.deleter = Some(Box::new(deleter));
        self
    }

    pub fn on_deleter_failure(mut self, policy: FailurePolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Retain `dependency` from the start of the handle's life.
    pub fn depend_on<D: Dependency>(mut self, dependency: D) -> Self {
        self.dependencies.push(ErasedDependency::new(dependency));
        self
    }

    pub fn build(self) -> ManagedHandle<T> {
        let deleter: Deleter<T> = match self.deleter {
            Some(deleter) => deleter,
            None => Box::new(|_: T| {}),
        };
        ManagedHandle::from_parts(self.value, deleter, self.policy, self.dependencies)
    }
}
