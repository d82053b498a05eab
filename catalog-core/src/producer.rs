//! The asynchronous operation a gate memoizes.

use std::fmt;
use std::future::Future;

/// The expensive asynchronous operation a memoized call gate wraps.
///
/// A producer is called with owned arguments and returns a `'static` future,
/// because the gate may poll it from a background refresh task or share it
/// between several attached callers.
///
/// # Examples
///
/// ```rust
/// use catalog_core::Producer;
/// use std::future::Ready;
///
/// struct Doubler;
///
/// impl Producer<u32> for Doubler {
///     type Output = u32;
///     type Error = std::convert::Infallible;
///     type Future = Ready<Result<u32, Self::Error>>;
///
///     fn call(&self, n: u32) -> Self::Future {
///         std::future::ready(Ok(n * 2))
///     }
/// }
/// ```
pub trait Producer<Args>: Send + Sync + 'static {
    /// The value produced on success
    type Output;

    /// The error produced on failure
    type Error;

    /// The future that resolves to the result
    type Future: Future<Output = Result<Self::Output, Self::Error>> + Send + 'static;

    /// Invoke the producer with the given arguments
    fn call(&self, args: Args) -> Self::Future;
}

/// Adapter that turns a closure into a [`Producer`].
///
/// Created with [`producer_fn`].
#[derive(Clone, Copy)]
pub struct ProducerFn<F> {
    f: F,
}

impl<F> fmt::Debug for ProducerFn<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProducerFn")
            .field("f", &std::any::type_name::<F>())
            .finish()
    }
}

/// Wraps an async closure as a [`Producer`].
///
/// ```rust
/// use catalog_core::{Producer, producer_fn};
///
/// let producer = producer_fn(|id: String| async move {
///     Ok::<_, std::io::Error>(format!("item {id}"))
/// });
/// # let _ = producer.call("1".to_owned());
/// ```
pub fn producer_fn<F>(f: F) -> ProducerFn<F> {
    ProducerFn { f }
}

impl<Args, F, Fut, T, E> Producer<Args> for ProducerFn<F>
where
    F: Fn(Args) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<T, E>> + Send + 'static,
{
    type Output = T;
    type Error = E;
    type Future = Fut;

    fn call(&self, args: Args) -> Self::Future {
        (self.f)(args)
    }
}
