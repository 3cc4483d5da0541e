use std::{
    fs, io,
    path::{Path, PathBuf},
    time::Duration,
};

use anyhow::{Context, Result};
use huarongdao_system_gesture::{GestureConfig, DEFAULT_CELL_SIZE_PX, DEFAULT_DRAG_THRESHOLD_PX};
use huarongdao_world::DEFAULT_SETTLE;
use serde::Deserialize;

/// File consulted when no `--config` flag is given.
pub(crate) const DEFAULT_CONFIG_FILE: &str = "huarongdao.toml";

const DEFAULT_DATA_DIR: &str = ".huarongdao";
const DEFAULT_LOG_FILTER: &str = "warn";

/// Settings read from `huarongdao.toml`.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct Config {
    /// Directory holding records and custom levels.
    pub(crate) data_dir: PathBuf,
    /// Milliseconds a move stays in flight before it is applied.
    pub(crate) move_settle_ms: u64,
    /// Pointer travel in pixels before a press becomes a drag.
    pub(crate) drag_threshold_px: f32,
    /// Edge length of one board cell in pixels for pointer input.
    pub(crate) cell_size_px: f32,
    /// Tracing filter used when `RUST_LOG` is unset.
    pub(crate) log_filter: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            move_settle_ms: u64::try_from(DEFAULT_SETTLE.as_millis()).unwrap_or(150),
            drag_threshold_px: DEFAULT_DRAG_THRESHOLD_PX,
            cell_size_px: DEFAULT_CELL_SIZE_PX,
            log_filter: String::from(DEFAULT_LOG_FILTER),
        }
    }
}

impl Config {
    /// Loads configuration from `explicit` or the default file.
    ///
    /// A missing default file yields the defaults; a missing explicit file is
    /// an error.
    pub(crate) fn load(explicit: Option<&Path>) -> Result<Self> {
        let path = explicit.unwrap_or_else(|| Path::new(DEFAULT_CONFIG_FILE));
        match fs::read_to_string(path) {
            Ok(contents) => Self::parse(&contents)
                .with_context(|| format!("failed to parse config file {}", path.display())),
            Err(error) if error.kind() == io::ErrorKind::NotFound && explicit.is_none() => {
                Ok(Self::default())
            }
            Err(error) => Err(error)
                .with_context(|| format!("failed to read config file {}", path.display())),
        }
    }

    fn parse(contents: &str) -> Result<Self> {
        let config: Self = toml::from_str(contents).context("invalid configuration toml")?;
        anyhow::ensure!(
            config.cell_size_px > 0.0,
            "cell_size_px must be positive, got {}",
            config.cell_size_px
        );
        anyhow::ensure!(
            config.drag_threshold_px >= 0.0,
            "drag_threshold_px must not be negative, got {}",
            config.drag_threshold_px
        );
        Ok(config)
    }

    /// Settle window handed to the session.
    pub(crate) fn move_settle(&self) -> Duration {
        Duration::from_millis(self.move_settle_ms)
    }

    /// Pointer geometry handed to the gesture system.
    pub(crate) fn gestures(&self) -> GestureConfig {
        GestureConfig {
            cell_size_px: self.cell_size_px,
            drag_threshold_px: self.drag_threshold_px,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_uses_defaults() {
        let config = Config::parse("").expect("empty config parses");
        assert_eq!(config, Config::default());
        assert_eq!(config.move_settle(), Duration::from_millis(150));
    }

    #[test]
    fn partial_file_overrides_named_fields() {
        let config = Config::parse(
            r#"
data_dir = "/tmp/hrd"
move_settle_ms = 0
log_filter = "debug"
"#,
        )
        .expect("config parses");

        assert_eq!(config.data_dir, PathBuf::from("/tmp/hrd"));
        assert_eq!(config.move_settle(), Duration::ZERO);
        assert_eq!(config.log_filter, "debug");
        assert_eq!(config.gestures().drag_threshold_px, DEFAULT_DRAG_THRESHOLD_PX);
    }

    #[test]
    fn unknown_keys_are_rejected() {
        assert!(Config::parse("colour = 'red'").is_err());
    }

    #[test]
    fn non_positive_cell_size_is_rejected() {
        assert!(Config::parse("cell_size_px = 0.0").is_err());
    }

    #[test]
    fn missing_explicit_file_is_an_error() {
        let missing = Path::new("definitely/not/here/huarongdao.toml");
        assert!(Config::load(Some(missing)).is_err());
    }
}
