//! Tracing subscriber setup.
//!
//! Logs go to stderr so `run` can stream result JSON on stdout. The filter
//! comes from `RUST_LOG` and defaults to `info`.

use crate::ports::config_port::ConfigPort;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

impl LogFormat {
    /// `--log-json` wins; otherwise `[logging] format`, defaulting to pretty.
    pub fn select(json_flag: bool, config: Option<&dyn ConfigPort>) -> Self {
        if json_flag {
            return LogFormat::Json;
        }
        match config
            .and_then(|c| c.get_string("logging", "format"))
            .map(|f| f.trim().to_ascii_lowercase())
            .as_deref()
        {
            Some("json") => LogFormat::Json,
            Some("pretty") | None => LogFormat::Pretty,
            Some(other) => {
                eprintln!("warning: unknown [logging] format '{other}', using pretty");
                LogFormat::Pretty
            }
        }
    }
}

/// Install the global subscriber. A second call is a no-op.
pub fn init_logging(format: LogFormat) {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(env_filter);

    let installed = match format {
        LogFormat::Json => registry
            .with(
                fmt::layer()
                    .json()
                    .with_target(true)
                    .with_writer(std::io::stderr),
            )
            .try_init(),
        LogFormat::Pretty => registry
            .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
            .try_init(),
    };
    if installed.is_err() {
        tracing::debug!("tracing subscriber already installed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::file_config_adapter::FileConfigAdapter;

    #[test]
    fn flag_overrides_config() {
        let config = FileConfigAdapter::from_string("[logging]\nformat = pretty\n").unwrap();
        assert_eq!(LogFormat::select(true, Some(&config)), LogFormat::Json);
    }

    #[test]
    fn config_selects_json() {
        let config = FileConfigAdapter::from_string("[logging]\nformat = JSON\n").unwrap();
        assert_eq!(LogFormat::select(false, Some(&config)), LogFormat::Json);
    }

    #[test]
    fn defaults_to_pretty() {
        assert_eq!(LogFormat::select(false, None), LogFormat::Pretty);
        let config = FileConfigAdapter::from_string("[logging]\nformat = xml\n").unwrap();
        assert_eq!(LogFormat::select(false, Some(&config)), LogFormat::Pretty);
    }

    #[test]
    fn init_twice_is_harmless() {
        init_logging(LogFormat::Pretty);
        init_logging(LogFormat::Json);
    }
}
