use std::sync::atomic::{AtomicBool, Ordering};

/// Logger configuration.
///
/// `filter` follows the `env_logger` filter syntax (e.g. "info",
/// "note60_scene=debug,note60_engine=trace").
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// Explicit filter. Takes precedence over `RUST_LOG`.
    pub filter: Option<String>,

    /// Level used when neither `filter` nor `RUST_LOG` is set.
    pub default_level: log::LevelFilter,

    pub write_style: env_logger::WriteStyle,

    /// Route output through the test harness capture instead of stderr.
    pub is_test: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: None,
            default_level: log::LevelFilter::Info,
            write_style: env_logger::WriteStyle::Auto,
            is_test: false,
        }
    }
}

impl LoggingConfig {
    /// Configuration suited to `#[test]` functions: captured output, debug level.
    pub fn for_tests() -> Self {
        Self {
            default_level: log::LevelFilter::Debug,
            is_test: true,
            ..Self::default()
        }
    }
}

static INSTALLED: AtomicBool = AtomicBool::new(false);

/// Installs the global logger.
///
/// Returns `true` if this call installed it. Later calls (or a logger installed
/// by someone else) are tolerated and return `false`, so tests may call this
/// freely.
pub fn init_logging(config: LoggingConfig) -> bool {
    if INSTALLED.swap(true, Ordering::SeqCst) {
        return false;
    }

    let mut builder = env_logger::Builder::new();

    match config.filter.or_else(|| std::env::var("RUST_LOG").ok()) {
        Some(filter) => {
            builder.parse_filters(&filter);
        }
        None => {
            builder.filter_level(config.default_level);
        }
    }

    builder.write_style(config.write_style);
    builder.is_test(config.is_test);

    match builder.try_init() {
        Ok(()) => {
            log::debug!("logging initialized");
            true
        }
        Err(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn second_init_is_ignored() {
        init_logging(LoggingConfig::for_tests());
        assert!(!init_logging(LoggingConfig::for_tests()));
    }
}
