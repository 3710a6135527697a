//! Game configuration
//!
//! すべての調整値をまとめた設定。TOML ファイルから読み込み、
//! 書かれていないキーは既定値を使う。

use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

use crate::domain::{CanvasBounds, ScoringEngine};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub min_players: usize,
    pub max_players: usize,
    pub default_rounds: u32,
    pub max_rounds: u32,
    pub default_round_duration_ms: u64,
    pub allowed_round_durations_ms: Vec<u64>,
    pub word_choice_timeout_ms: u64,
    pub hint_offsets_ms: Vec<u64>,
    pub min_score: i64,
    pub max_score: i64,
    /// 描き手の取り分（百分率）
    pub drawer_share_pct: i64,
    pub inter_round_delay_ms: u64,
    pub room_inactivity_ttl_ms: i64,
    pub sweep_interval_ms: u64,
    pub room_code_length: usize,
    pub room_code_alphabet: String,
    pub room_code_attempts: usize,
    pub max_chat_len: usize,
    pub drawing_history_cap: usize,
    pub drawing_history_keep: usize,
    pub canvas_width: f64,
    pub canvas_height: f64,
    pub canvas_tolerance: f64,
    pub max_brush_size: u32,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            min_players: 2,
            max_players: 6,
            default_rounds: 3,
            max_rounds: 10,
            default_round_duration_ms: 80_000,
            allowed_round_durations_ms: vec![30_000, 60_000, 80_000, 120_000],
            word_choice_timeout_ms: 15_000,
            hint_offsets_ms: vec![20_000, 40_000, 60_000],
            min_score: 500,
            max_score: 1_000,
            drawer_share_pct: 50,
            inter_round_delay_ms: 5_000,
            room_inactivity_ttl_ms: 3_600_000,
            sweep_interval_ms: 600_000,
            room_code_length: 4,
            room_code_alphabet: "ABCDEFGHJKLMNPQRSTUVWXYZ23456789".to_string(),
            room_code_attempts: 100,
            max_chat_len: 100,
            drawing_history_cap: 10_000,
            drawing_history_keep: 5_000,
            canvas_width: 800.0,
            canvas_height: 600.0,
            canvas_tolerance: 10.0,
            max_brush_size: 50,
        }
    }
}

impl GameConfig {
    /// TOML 文字列から読み込む
    pub fn from_toml_str(input: &str) -> Result<Self, ConfigError> {
        let config: GameConfig = toml::from_str(input)?;
        config.validate()?;
        Ok(config)
    }

    /// TOML ファイルから読み込む
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let input = std::fs::read_to_string(path)?;
        Self::from_toml_str(&input)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.min_players < 2 || self.min_players > self.max_players {
            return Err(ConfigError::Invalid(format!(
                "player limits {}..={} are not usable",
                self.min_players, self.max_players
            )));
        }
        if self.default_rounds == 0 || self.default_rounds > self.max_rounds {
            return Err(ConfigError::Invalid(format!(
                "default_rounds must be within 1..={}",
                self.max_rounds
            )));
        }
        if !self
            .allowed_round_durations_ms
            .contains(&self.default_round_duration_ms)
        {
            return Err(ConfigError::Invalid(
                "default_round_duration_ms must be one of allowed_round_durations_ms".to_string(),
            ));
        }
        if self.min_score > self.max_score {
            return Err(ConfigError::Invalid(
                "min_score must not exceed max_score".to_string(),
            ));
        }
        if self.room_code_length == 0
            || self.room_code_alphabet.is_empty()
            || !self
                .room_code_alphabet
                .chars()
                .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit())
        {
            return Err(ConfigError::Invalid(
                "room code alphabet must be non-empty uppercase alphanumerics".to_string(),
            ));
        }
        if self.drawing_history_keep > self.drawing_history_cap {
            return Err(ConfigError::Invalid(
                "drawing_history_keep must not exceed drawing_history_cap".to_string(),
            ));
        }
        Ok(())
    }

    pub fn scoring(&self) -> ScoringEngine {
        ScoringEngine {
            min_score: self.min_score,
            max_score: self.max_score,
            drawer_share_pct: self.drawer_share_pct,
        }
    }

    pub fn canvas_bounds(&self) -> CanvasBounds {
        CanvasBounds {
            width: self.canvas_width,
            height: self.canvas_height,
            tolerance: self.canvas_tolerance,
        }
    }
}
