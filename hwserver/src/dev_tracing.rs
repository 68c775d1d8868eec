/// Development helper: initialize tracing subscriber when `RUST_LOG` is set.
///
/// Tests can call `hwserver::dev_tracing::init_tracing()` to see the server's
/// structured logs. This is a no-op when `RUST_LOG` is not set or when a
/// global subscriber is already installed.
pub fn init_tracing() {
    use std::env;

    if env::var("RUST_LOG").is_ok() {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    }
}

/// Install the binary's global subscriber.
///
/// `RUST_LOG` wins over `level` when it parses.
pub fn init_logging(level: &str) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}
