use crate::error::{Result, SnakeError};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Board geometry and pacing.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub width: i32,
    pub height: i32,
    pub block_size: i32,
    pub initial_length: usize,
    /// Frames per second at the start of every game.
    pub start_speed: u32,
    /// Speed added per food eaten.
    pub speed_step: u32,
    /// Episode ends once the step counter exceeds `factor * snake length`.
    pub step_budget_factor: Option<usize>,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            width: 640,
            height: 480,
            block_size: 20,
            initial_length: 3,
            start_speed: 15,
            speed_step: 2,
            step_budget_factor: Some(100),
        }
    }
}

impl GameConfig {
    /// Keyboard-controlled game: slower, no step budget.
    pub fn human(start_speed: u32) -> Self {
        Self {
            start_speed,
            speed_step: 1,
            step_budget_factor: None,
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.block_size <= 0 {
            return Err(SnakeError::Config("block_size must be positive".into()));
        }
        if self.width <= 0 || self.height <= 0 {
            return Err(SnakeError::Config("board must have positive size".into()));
        }
        if self.width % self.block_size != 0 || self.height % self.block_size != 0 {
            return Err(SnakeError::Config(format!(
                "board {}x{} is not a multiple of block size {}",
                self.width, self.height, self.block_size
            )));
        }
        if self.initial_length == 0 {
            return Err(SnakeError::Config("initial_length must be at least 1".into()));
        }
        // the initial snake trails left from the centre
        let cols = (self.width / self.block_size) as usize;
        if cols / 2 + 1 < self.initial_length {
            return Err(SnakeError::Config(format!(
                "board is too narrow for a snake of length {}",
                self.initial_length
            )));
        }
        let rows = (self.height / self.block_size) as usize;
        if cols * rows <= self.initial_length {
            return Err(SnakeError::Config("board has no room left for food".into()));
        }
        if self.start_speed == 0 {
            return Err(SnakeError::Config("start_speed must be positive".into()));
        }
        Ok(())
    }
}

/// Learner hyperparameters.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentConfig {
    pub hidden_size: usize,
    pub max_memory: usize,
    pub batch_size: usize,
    pub learning_rate: f32,
    pub gamma: f32,
    /// Exploration stops after this many finished games.
    pub exploration_games: u32,
    /// Upper bound (inclusive) of the integer roll compared against epsilon.
    pub exploration_range: u32,
    pub seed: Option<u64>,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            hidden_size: 256,
            max_memory: 100_000,
            batch_size: 1000,
            learning_rate: 0.001,
            gamma: 0.9,
            exploration_games: 80,
            exploration_range: 200,
            seed: None,
        }
    }
}

impl AgentConfig {
    pub fn validate(&self) -> Result<()> {
        if self.hidden_size == 0 {
            return Err(SnakeError::Config("hidden_size must be positive".into()));
        }
        if self.max_memory == 0 || self.batch_size == 0 {
            return Err(SnakeError::Config("max_memory and batch_size must be positive".into()));
        }
        if !(0.0..=1.0).contains(&self.gamma) {
            return Err(SnakeError::Config(format!("gamma {} outside [0, 1]", self.gamma)));
        }
        if !(self.learning_rate > 0.0) {
            return Err(SnakeError::Config("learning_rate must be positive".into()));
        }
        Ok(())
    }
}

/// Everything the training command needs.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainConfig {
    pub game: GameConfig,
    pub agent: AgentConfig,
    pub model_path: PathBuf,
    pub stats_db: Option<PathBuf>,
    /// Stop after this many games; unbounded when absent.
    pub max_games: Option<u32>,
    pub headless: bool,
}

impl Default for TrainConfig {
    fn default() -> Self {
        Self {
            game: GameConfig::default(),
            agent: AgentConfig::default(),
            model_path: PathBuf::from("model/model.json"),
            stats_db: Some(PathBuf::from("training.db")),
            max_games: None,
            headless: false,
        }
    }
}

impl TrainConfig {
    /// Read a (possibly partial) JSON config; missing fields keep their defaults.
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .map_err(|e| SnakeError::Config(format!("cannot read {}: {e}", path.display())))?;
        let cfg: TrainConfig = serde_json::from_str(&content)
            .map_err(|e| SnakeError::Config(format!("cannot parse {}: {e}", path.display())))?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<()> {
        self.game.validate()?;
        self.agent.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults_are_valid() {
        let cfg = TrainConfig::default();
        cfg.validate().unwrap();
        assert_eq!(cfg.agent.hidden_size, 256);
        assert_eq!(cfg.agent.batch_size, 1000);
        assert_eq!(cfg.agent.max_memory, 100_000);
        assert_eq!(cfg.game.step_budget_factor, Some(100));
        GameConfig::human(10).validate().unwrap();
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"agent": {{"hidden_size": 32, "seed": 5}}, "max_games": 3}}"#).unwrap();
        let cfg = TrainConfig::load(file.path()).unwrap();
        assert_eq!(cfg.agent.hidden_size, 32);
        assert_eq!(cfg.agent.seed, Some(5));
        assert_eq!(cfg.agent.gamma, 0.9);
        assert_eq!(cfg.max_games, Some(3));
        assert_eq!(cfg.game, GameConfig::default());
    }

    #[test]
    fn rejects_misaligned_board() {
        let cfg = GameConfig { width: 630, ..GameConfig::default() };
        assert!(matches!(cfg.validate(), Err(SnakeError::Config(_))));
        let cfg = GameConfig { width: 60, height: 20, ..GameConfig::default() };
        assert!(cfg.validate().is_err());
        let agent = AgentConfig { gamma: 1.5, ..AgentConfig::default() };
        assert!(agent.validate().is_err());
    }
}
