use std::future::Future;

/// The per-item work a [`WorkerPool`](crate::WorkerPool) runs.
///
/// Implementations must eventually return for every call. A returned error is
/// logged and recorded as [`Outcome::Failed`](crate::Outcome::Failed); it
/// never stops the pipeline.
pub trait Processor<T>: Send + Sync + 'static {
    /// Value written to the output for a successful item.
    type Output: Send + 'static;

    /// Per-item failure.
    type Error: std::error::Error + Send + 'static;

    fn process(&self, payload: T) -> impl Future<Output = Result<Self::Output, Self::Error>> + Send;
}

/// A [`Processor`] backed by an async closure. Built with [`from_fn`].
#[derive(Debug, Clone)]
pub struct ProcessFn<F> {
    f: F,
}

/// Wrap an async closure as a [`Processor`].
///
/// ```
/// use digestline_pipeline::{Processor, from_fn};
///
/// # async fn demo() {
/// let len = from_fn(|line: String| async move { Ok::<_, std::io::Error>(line.len()) });
/// assert_eq!(len.process("abc".to_string()).await.unwrap(), 3);
/// # }
/// ```
pub fn from_fn<F>(f: F) -> ProcessFn<F> { ProcessFn { f } }

impl<T, F, Fut, R, E> Processor<T> for ProcessFn<F>
where
    F: Fn(T) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<R, E>> + Send,
    R: Send + 'static,
    E: std::error::Error + Send + 'static,
{
    type Output = R;
    type Error = E;

    fn process(&self, payload: T) -> impl Future<Output = Result<R, E>> + Send { (self.f)(payload) }
}
