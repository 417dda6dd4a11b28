use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Initialize a tracing subscriber.
///
/// `RUST_LOG` wins when set; otherwise `filter` is used (typically
/// [`LoggingConfig::filter`](crate::config::LoggingConfig::filter)), and
/// an unusable filter falls back to `info`. Logs go to stderr so command
/// output on stdout stays machine readable.
pub fn init(filter: &str) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let fmt_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_level(true)
        .with_file(true)
        .with_line_number(true)
        .compact();

    let filter_layer = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(filter))
        .or_else(|_| EnvFilter::try_new("info"))?;

    tracing_subscriber::registry()
        .with(filter_layer)
        .with(fmt_layer)
        .try_init()?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracing::{debug, info, warn};

    #[test]
    fn test_logging_init() {
        // Only the first init in a process succeeds
        let _ = init("debug");

        debug!("index mutation");
        info!("reindex summary");
        warn!("cross-project module");
    }

    #[test]
    fn test_second_init_fails() {
        let _ = init("info");
        assert!(init("info").is_err());
    }
}
