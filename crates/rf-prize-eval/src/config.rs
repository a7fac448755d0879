//! Evaluation configuration

use serde::{Deserialize, Serialize};

use crate::error::{EvalError, EvalResult};

/// How candidate wins are evaluated and resolved
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum EvaluationMode {
    /// Line and scatter patterns; best prize per pattern
    #[default]
    Static,
    /// Multiway patterns; best win per prize
    Multiway,
    /// Multiway patterns; each way pays once to its best win
    PayPerWay,
}

impl EvaluationMode {
    /// Uses multiway pattern population
    pub fn is_multiway(&self) -> bool {
        matches!(self, Self::Multiway | Self::PayPerWay)
    }
}

/// Per-game evaluation settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvaluationConfig {
    /// Game name
    pub name: String,
    /// Evaluation mode
    #[serde(default)]
    pub mode: EvaluationMode,
    /// Maximum payout of a round in credits (0 or less = uncapped)
    #[serde(default)]
    pub win_cap_limit: i64,
    /// Currency units per credit
    #[serde(default = "default_denomination")]
    pub denomination: u64,
    /// Prizes checked for near-wins
    #[serde(default)]
    pub anticipation_prizes: Vec<String>,
}

fn default_denomination() -> u64 {
    1
}

impl Default for EvaluationConfig {
    fn default() -> Self {
        Self::line_game()
    }
}

impl EvaluationConfig {
    /// Line game, uncapped, one currency unit per credit
    pub fn line_game() -> Self {
        Self {
            name: "Line Game".into(),
            mode: EvaluationMode::Static,
            win_cap_limit: 0,
            denomination: 1,
            anticipation_prizes: Vec::new(),
        }
    }

    /// Ways game paying each way once
    pub fn ways_game() -> Self {
        Self {
            name: "Ways Game".into(),
            mode: EvaluationMode::PayPerWay,
            ..Self::line_game()
        }
    }

    pub fn with_win_cap(mut self, limit: i64) -> Self {
        self.win_cap_limit = limit;
        self
    }

    pub fn with_denomination(mut self, denomination: u64) -> Self {
        self.denomination = denomination;
        self
    }

    pub fn validate(&self) -> EvalResult<()> {
        if self.denomination == 0 {
            return Err(EvalError::config(format!(
                "{}: denomination must be positive",
                self.name
            )));
        }
        Ok(())
    }

    /// Parse and validate a JSON config
    pub fn from_json(json: &str) -> EvalResult<Self> {
        let config: Self = serde_json::from_str(json)
            .map_err(|e| EvalError::config(format!("invalid evaluation config: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json(&self) -> EvalResult<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| EvalError::config(format!("cannot serialize evaluation config: {e}")))
    }
}
