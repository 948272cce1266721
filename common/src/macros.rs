/// Logs a completed step. Rendered with the success marker by the terminal formatter.
#[macro_export]
macro_rules! success {
    ($($arg:tt)*) => {
        ::tracing::info!(target: $crate::SUCCESS_TARGET, $($arg)*)
    };
}
