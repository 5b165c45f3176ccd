use std::fs::File;
use std::path::Path;
use std::sync::Arc;

use anyhow::Context as _;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::layer::SubscriberExt as _;
use tracing_subscriber::util::SubscriberInitExt as _;
use tracing_subscriber::{EnvFilter, Layer as _, fmt};

/// Installs the global subscriber.
///
/// Request-level errors go to `log_file` (truncated) at `level` and above. Stderr only carries
/// events when `RUST_LOG` is set, so failing targets do not flood the terminal.
pub(crate) fn init(log_file: Option<&Path>, level: LevelFilter) -> anyhow::Result<()> {
    let stderr = EnvFilter::try_from_default_env().ok().map(|filter| {
        fmt::layer()
            .with_writer(std::io::stderr)
            .with_filter(filter)
    });

    let file = match log_file {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("failed to open log file: {}", path.display()))?;
            Some(
                fmt::layer()
                    .with_ansi(false)
                    .with_target(false)
                    .with_writer(Arc::new(file))
                    .with_filter(level),
            )
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(stderr)
        .with(file)
        .try_init()
        .context("failed to install tracing subscriber")
}
