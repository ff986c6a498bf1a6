pub mod index;
pub mod law_texts;
pub mod users;

/// Run a synchronous service call off the async executor.
///
/// The services block on SQLite, tantivy commits, and MuPDF. A panicked or
/// cancelled task is logged and answered with the type's empty value.
pub(crate) async fn run_blocking<T, F>(f: F) -> T
where
    F: FnOnce() -> T + Send + 'static,
    T: Default + Send + 'static,
{
    match tokio::task::spawn_blocking(f).await {
        Ok(value) => value,
        Err(e) => {
            tracing::error!(error = %e, "blocking task join error");
            T::default()
        }
    }
}
