use tokio::task::JoinHandle;

/// Run a blocking sled call off the async workers, keeping the caller's span
#[track_caller]
pub(crate) fn spawn_blocking<F, Out>(function: F) -> JoinHandle<Out>
where
    F: FnOnce() -> Out + Send + 'static,
    Out: Send + 'static,
{
    let outer_span = tracing::Span::current();

    let span = tracing::trace_span!(parent: None, "spawn blocking task");
    let guard = span.enter();

    let handle = tokio::task::spawn_blocking(move || outer_span.in_scope(function));

    drop(guard);
    handle
}
