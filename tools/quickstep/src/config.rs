use crate::errors::QuickstepError;
use crate::playback::{MAX_INTERVAL_MS, MIN_INTERVAL_MS};
use crate::replay::{ElementBounds, MAX_ELEMENTS, MIN_ELEMENTS};
use crate::runtime::FileSystem;
use crate::types::PlaybackMode;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub config_path: Option<PathBuf>,
    pub elements: Option<usize>,
    pub interval_ms: Option<u64>,
    pub mode: Option<PlaybackMode>,
    pub log_path: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AppConfig {
    pub board: BoardConfig,
    pub playback: PlaybackConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct BoardConfig {
    pub elements: usize,
    pub min_elements: usize,
    pub max_elements: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PlaybackConfig {
    pub interval_ms: u64,
    pub mode: PlaybackMode,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LoggingConfig {
    pub enabled: bool,
    pub path: PathBuf,
    pub max_payload_bytes: usize,
    pub budget_bytes: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            board: BoardConfig {
                elements: 6,
                min_elements: MIN_ELEMENTS,
                max_elements: MAX_ELEMENTS,
            },
            playback: PlaybackConfig {
                interval_ms: 300,
                mode: PlaybackMode::Manual,
            },
            logging: LoggingConfig {
                enabled: false,
                path: PathBuf::from(".cache/quickstep/replay.jsonl"),
                max_payload_bytes: crate::logging::DEFAULT_MAX_PAYLOAD_BYTES,
                budget_bytes: crate::logging::DEFAULT_DISK_BUDGET_BYTES,
            },
        }
    }
}

impl AppConfig {
    pub fn bounds(&self) -> ElementBounds {
        ElementBounds {
            min: self.board.min_elements,
            max: self.board.max_elements,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
struct PartialAppConfig {
    board: Option<PartialBoardConfig>,
    playback: Option<PartialPlaybackConfig>,
    logging: Option<PartialLoggingConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
struct PartialBoardConfig {
    elements: Option<usize>,
    min_elements: Option<usize>,
    max_elements: Option<usize>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
struct PartialPlaybackConfig {
    interval_ms: Option<u64>,
    mode: Option<PlaybackMode>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
struct PartialLoggingConfig {
    enabled: Option<bool>,
    path: Option<PathBuf>,
    max_payload_bytes: Option<usize>,
    budget_bytes: Option<u64>,
}

pub fn load_config(
    overrides: &CliOverrides,
    fs: &dyn FileSystem,
) -> Result<AppConfig, QuickstepError> {
    let mut cfg = AppConfig::default();

    if let Some(path) = &overrides.config_path {
        let file_contents = fs.read_to_string(path)?;
        let partial: PartialAppConfig = toml::from_str(&file_contents)
            .map_err(|e| QuickstepError::ConfigParse(e.to_string()))?;
        merge_partial_config(&mut cfg, partial);
    }

    apply_cli_overrides(&mut cfg, overrides);
    validate_config(&cfg)?;
    Ok(cfg)
}

fn merge_partial_config(cfg: &mut AppConfig, partial: PartialAppConfig) {
    if let Some(board) = partial.board {
        if let Some(value) = board.elements {
            cfg.board.elements = value;
        }
        if let Some(value) = board.min_elements {
            cfg.board.min_elements = value;
        }
        if let Some(value) = board.max_elements {
            cfg.board.max_elements = value;
        }
    }

    if let Some(playback) = partial.playback {
        if let Some(value) = playback.interval_ms {
            cfg.playback.interval_ms = value;
        }
        if let Some(value) = playback.mode {
            cfg.playback.mode = value;
        }
    }

    if let Some(logging) = partial.logging {
        if let Some(value) = logging.enabled {
            cfg.logging.enabled = value;
        }
        if let Some(value) = logging.path {
            cfg.logging.path = value;
        }
        if let Some(value) = logging.max_payload_bytes {
            cfg.logging.max_payload_bytes = value;
        }
        if let Some(value) = logging.budget_bytes {
            cfg.logging.budget_bytes = value;
        }
    }
}

fn apply_cli_overrides(cfg: &mut AppConfig, overrides: &CliOverrides) {
    if let Some(elements) = overrides.elements {
        cfg.board.elements = elements;
    }
    if let Some(interval_ms) = overrides.interval_ms {
        cfg.playback.interval_ms = interval_ms;
    }
    if let Some(mode) = overrides.mode {
        cfg.playback.mode = mode;
    }
    if let Some(path) = &overrides.log_path {
        cfg.logging.enabled = true;
        cfg.logging.path = path.clone();
    }
}

fn validate_config(cfg: &AppConfig) -> Result<(), QuickstepError> {
    if cfg.board.min_elements < MIN_ELEMENTS {
        return Err(QuickstepError::InvalidConfig(format!(
            "board.min_elements must be at least {MIN_ELEMENTS}"
        )));
    }
    if cfg.board.max_elements > MAX_ELEMENTS {
        return Err(QuickstepError::InvalidConfig(format!(
            "board.max_elements must not exceed {MAX_ELEMENTS}"
        )));
    }
    if cfg.board.min_elements > cfg.board.max_elements {
        return Err(QuickstepError::InvalidConfig(
            "board.min_elements must not exceed board.max_elements".to_string(),
        ));
    }
    cfg.bounds().check(cfg.board.elements)?;

    if !(MIN_INTERVAL_MS..=MAX_INTERVAL_MS).contains(&cfg.playback.interval_ms) {
        return Err(QuickstepError::InvalidInterval(cfg.playback.interval_ms));
    }

    if cfg.logging.enabled && cfg.logging.path.as_os_str().is_empty() {
        return Err(QuickstepError::InvalidConfig(
            "logging.path must be set when logging is enabled".to_string(),
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::FakeFileSystem;

    #[test]
    fn defaults_are_valid_without_a_file() {
        let cfg = load_config(&CliOverrides::default(), &FakeFileSystem::default())
            .expect("defaults");
        assert_eq!(cfg, AppConfig::default());
        assert_eq!(cfg.board.elements, 6);
        assert_eq!(cfg.bounds(), ElementBounds::default());
    }

    #[test]
    fn file_values_merge_and_cli_overrides_win() {
        let fs = FakeFileSystem::with_file(
            "/q.toml",
            "[board]\nelements = 12\n\n[playback]\ninterval_ms = 800\nmode = \"automatic\"\n",
        );
        let overrides = CliOverrides {
            config_path: Some(PathBuf::from("/q.toml")),
            interval_ms: Some(50),
            log_path: Some(PathBuf::from("/tmp/q/replay.jsonl")),
            ..CliOverrides::default()
        };
        let cfg = load_config(&overrides, &fs).expect("merged");
        assert_eq!(cfg.board.elements, 12);
        assert_eq!(cfg.playback.interval_ms, 50);
        assert_eq!(cfg.playback.mode, PlaybackMode::Automatic);
        assert!(cfg.logging.enabled);
        assert_eq!(cfg.logging.path, PathBuf::from("/tmp/q/replay.jsonl"));
    }

    #[test]
    fn out_of_range_values_are_rejected() {
        let fs = FakeFileSystem::default();
        let too_many = CliOverrides {
            elements: Some(61),
            ..CliOverrides::default()
        };
        assert!(matches!(
            load_config(&too_many, &fs).expect_err("count"),
            QuickstepError::InvalidElementCount { count: 61, .. }
        ));

        let too_slow = CliOverrides {
            interval_ms: Some(5001),
            ..CliOverrides::default()
        };
        assert!(matches!(
            load_config(&too_slow, &fs).expect_err("interval"),
            QuickstepError::InvalidInterval(5001)
        ));

        let inverted = FakeFileSystem::with_file(
            "/bad.toml",
            "[board]\nmin_elements = 10\nmax_elements = 5\n",
        );
        let err = load_config(
            &CliOverrides {
                config_path: Some(PathBuf::from("/bad.toml")),
                ..CliOverrides::default()
            },
            &inverted,
        )
        .expect_err("inverted bounds");
        assert!(matches!(err, QuickstepError::InvalidConfig(_)));
    }

    #[test]
    fn max_elements_is_capped() {
        let fs = FakeFileSystem::with_file(
            "/wide.toml",
            "[board]\nelements = 65536\nmax_elements = 70000\n",
        );
        let err = load_config(
            &CliOverrides {
                config_path: Some(PathBuf::from("/wide.toml")),
                ..CliOverrides::default()
            },
            &fs,
        )
        .expect_err("oversized board");
        assert!(
            matches!(&err, QuickstepError::InvalidConfig(message) if message.contains("max_elements")),
            "{err}"
        );
    }

    #[test]
    fn malformed_toml_is_a_parse_error() {
        let fs = FakeFileSystem::with_file("/broken.toml", "[board\nelements = ");
        let err = load_config(
            &CliOverrides {
                config_path: Some(PathBuf::from("/broken.toml")),
                ..CliOverrides::default()
            },
            &fs,
        )
        .expect_err("parse");
        assert!(matches!(err, QuickstepError::ConfigParse(_)));
    }
}
