//! Session configuration from environment variables.

use std::env;
use std::path::PathBuf;

use tracing::info;

use crate::chess_errors::ConfigError;
use crate::engines::engine_trait::EngineKind;

pub const DEFAULT_ADVISOR_DEPTH: u8 = 3;
pub const MAX_ADVISOR_DEPTH: u8 = 8;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SessionConfig {
    /// Search depth handed to the advisor, 1..=8
    pub advisor_depth: u8,

    /// Which engine answers hint requests
    pub advisor_engine: EngineKind,

    /// Directory holding saved analyses
    pub store_dir: PathBuf,

    /// Owner id used for saves and loads
    pub owner_id: String,

    /// Declare threefold and fifty-move draws automatically
    pub auto_draws: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            advisor_depth: DEFAULT_ADVISOR_DEPTH,
            advisor_engine: EngineKind::default(),
            store_dir: PathBuf::from("./analyses"),
            owner_id: "local".to_owned(),
            auto_draws: false,
        }
    }
}

impl SessionConfig {
    /// Load configuration from `POWER_CHESS_*` environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        let config = Self::from_lookup(|key| env::var(key).ok())?;
        info!(
            depth = config.advisor_depth,
            engine = ?config.advisor_engine,
            store = %config.store_dir.display(),
            "session config loaded"
        );
        Ok(config)
    }

    /// Same as `from_env` with an arbitrary variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let advisor_depth = match lookup("POWER_CHESS_ADVISOR_DEPTH") {
            Some(raw) => raw
                .trim()
                .parse::<u8>()
                .map_err(|_| ConfigError::InvalidValue("POWER_CHESS_ADVISOR_DEPTH", raw.clone()))?
                .clamp(1, MAX_ADVISOR_DEPTH),
            None => defaults.advisor_depth,
        };

        let advisor_engine = match lookup("POWER_CHESS_ADVISOR_ENGINE") {
            Some(raw) => raw.parse()?,
            None => defaults.advisor_engine,
        };

        let store_dir = lookup("POWER_CHESS_STORE_DIR")
            .map(PathBuf::from)
            .unwrap_or(defaults.store_dir);

        let owner_id = lookup("POWER_CHESS_OWNER")
            .filter(|owner| !owner.trim().is_empty())
            .unwrap_or(defaults.owner_id);

        let auto_draws = match lookup("POWER_CHESS_AUTO_DRAWS") {
            Some(raw) => parse_flag(&raw)
                .ok_or(ConfigError::InvalidValue("POWER_CHESS_AUTO_DRAWS", raw))?,
            None => defaults.auto_draws,
        };

        Ok(Self {
            advisor_depth,
            advisor_engine,
            store_dir,
            owner_id,
            auto_draws,
        })
    }
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
