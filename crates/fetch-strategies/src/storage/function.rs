//! Deferred storage operations.
//!
//! A storage function binds a data-source operation together with any
//! arguments it needs, and only runs it once a strategy supplies the
//! continuation. Two shapes exist:
//!
//! - [`StorageFunction`]: `(continuation)`, used for cache and network reads
//! - [`WriteBackFunction`]: `(value, continuation)`, used to push fetched data into a cache
//!
//! Both are consumed by invocation, so a wrapper can run at most once.

use std::fmt;

use fetch_domain::SealedResponse;

/// Callback receiving the eventual result of one operation.
pub type Continuation<T> = Box<dyn FnOnce(SealedResponse<T>) + Send + 'static>;

type ReadOp<T> = Box<dyn FnOnce(Continuation<T>) + Send + 'static>;
type WriteOp<T> = Box<dyn FnOnce(T, Continuation<bool>) + Send + 'static>;

// =============================================================================
// READ SHAPE
// =============================================================================

/// A cache or network lookup waiting to be executed.
pub struct StorageFunction<T> {
    op: ReadOp<T>,
}

impl<T: 'static> StorageFunction<T> {
    /// Wrap an operation that reports through the given continuation.
    ///
    /// The operation must invoke the continuation exactly once, either
    /// before returning or later from another thread or task.
    pub fn new<F>(op: F) -> Self
    where
        F: FnOnce(Continuation<T>) + Send + 'static,
    {
        Self { op: Box::new(op) }
    }

    /// Wrap an operation whose leading arguments are fixed now.
    ///
    /// ```rust
    /// use fetch_domain::SealedResponse;
    /// use fetch_strategies::StorageFunction;
    ///
    /// let lookup = StorageFunction::with_args((7_u64, "users"), |(id, table), done| {
    ///     done(SealedResponse::Success(format!("{table}/{id}")));
    /// });
    /// lookup.execute(|response| assert_eq!(response.into_data().as_deref(), Some("users/7")));
    /// ```
    pub fn with_args<A, F>(args: A, op: F) -> Self
    where
        A: Send + 'static,
        F: FnOnce(A, Continuation<T>) + Send + 'static,
    {
        Self::new(move |continuation| op(args, continuation))
    }

    /// A lookup that completes immediately with `response`
    pub fn ready(response: SealedResponse<T>) -> Self
    where
        T: Send,
    {
        Self::new(move |continuation| continuation(response))
    }

    /// A lookup backed by a future spawned on a tokio runtime.
    ///
    /// The future is only created once the function is executed; the
    /// continuation then fires from the spawned task.
    #[cfg(feature = "tokio")]
    pub fn spawn<F, Fut>(handle: tokio::runtime::Handle, make_future: F) -> Self
    where
        T: Send,
        F: FnOnce() -> Fut + Send + 'static,
        Fut: std::future::Future<Output = SealedResponse<T>> + Send + 'static,
    {
        Self::new(move |continuation| {
            handle.spawn(async move {
                continuation(make_future().await);
            });
        })
    }

    /// Run the bound operation, handing it `continuation`.
    pub fn execute<C>(self, continuation: C)
    where
        C: FnOnce(SealedResponse<T>) + Send + 'static,
    {
        (self.op)(Box::new(continuation));
    }
}

impl<T> fmt::Debug for StorageFunction<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StorageFunction").finish_non_exhaustive()
    }
}

// =============================================================================
// WRITE SHAPE
// =============================================================================

/// A cache write waiting for the value to persist.
///
/// The operation reports `Success(true)` when the value was stored.
pub struct WriteBackFunction<T> {
    op: WriteOp<T>,
}

impl<T: 'static> WriteBackFunction<T> {
    /// Wrap a write that reports through the given continuation.
    pub fn new<F>(op: F) -> Self
    where
        F: FnOnce(T, Continuation<bool>) + Send + 'static,
    {
        Self { op: Box::new(op) }
    }

    /// Wrap a write whose leading arguments are fixed now; the value and
    /// continuation still arrive at execution time.
    pub fn with_args<A, F>(args: A, op: F) -> Self
    where
        A: Send + 'static,
        F: FnOnce(A, T, Continuation<bool>) + Send + 'static,
    {
        Self::new(move |value, continuation| op(args, value, continuation))
    }

    /// A write backed by a future spawned on a tokio runtime once the value arrives.
    #[cfg(feature = "tokio")]
    pub fn spawn<F, Fut>(handle: tokio::runtime::Handle, make_future: F) -> Self
    where
        T: Send,
        F: FnOnce(T) -> Fut + Send + 'static,
        Fut: std::future::Future<Output = SealedResponse<bool>> + Send + 'static,
    {
        Self::new(move |value, continuation| {
            handle.spawn(async move {
                continuation(make_future(value).await);
            });
        })
    }

    /// Run the bound write with `value`, handing it `continuation`.
    pub fn execute_with_value<C>(self, value: T, continuation: C)
    where
        C: FnOnce(SealedResponse<bool>) + Send + 'static,
    {
        (self.op)(value, Box::new(continuation));
    }
}

impl<T> fmt::Debug for WriteBackFunction<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WriteBackFunction").finish_non_exhaustive()
    }
}
