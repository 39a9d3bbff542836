use tracing_subscriber::{fmt, prelude::*, registry, EnvFilter};

fn build_and_set_global_subscriber(is_test: bool) {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let stderr_log = if is_test {
        fmt::layer().with_test_writer().boxed()
    } else {
        fmt::layer().with_writer(std::io::stderr).boxed()
    };
    let r = registry().with(stderr_log).with(env_filter);

    if is_test {
        r.try_init().ok();
    } else {
        r.init();
    }
}

/// Installs the global `tracing` subscriber. Filtering follows `RUST_LOG`,
/// falling back to `info`.
///
/// Panics if a global subscriber is already set.
pub fn init_logging() {
    build_and_set_global_subscriber(false);
}

/// Like [`init_logging`], but safe to call from every test.
pub fn init_test_logging() {
    build_and_set_global_subscriber(true);
}
