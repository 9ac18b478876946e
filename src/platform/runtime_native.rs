use std::future::Future;
use std::time::Duration;

/// Spawn a `!Send` task on the current `LocalSet`.
pub fn spawn_local<F>(fut: F)
where
    F: Future<Output = ()> + 'static,
{
    tokio::task::spawn_local(fut);
}

pub async fn sleep(duration: Duration) {
    tokio::time::sleep(duration).await;
}

/// `RUST_LOG` wins over `level` when set.
pub fn init_logging(level: log::Level) {
    let _ = env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(level.as_str().to_ascii_lowercase()),
    )
    .format_timestamp_millis()
    .try_init();
}

pub fn install_panic_hook() {}
