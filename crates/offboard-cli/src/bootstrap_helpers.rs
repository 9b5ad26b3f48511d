use tracing_subscriber::{filter::LevelFilter, EnvFilter};

/// Installs the global subscriber; `RUST_LOG` overrides the INFO default.
pub fn init_tracing() {
    let env_filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy();

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .compact()
        .init();
}
