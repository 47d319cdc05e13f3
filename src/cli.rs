use crate::config::TrainConfig;
use crate::error::Result;
use crate::play::DEFAULT_SPEED;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about = "Snake with a Q-learning agent", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Play with the arrow keys
    Play {
        /// Starting speed in frames per second
        #[arg(default_value_t = DEFAULT_SPEED)]
        speed: u32,
    },
    /// Train the agent (runs until interrupted unless --games is set)
    Train(TrainArgs),
}

#[derive(Args, Debug, Default)]
pub struct TrainArgs {
    /// JSON config; missing fields keep their defaults
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Continue from a saved checkpoint
    #[arg(long)]
    pub resume: Option<PathBuf>,

    /// Train without opening a window
    #[arg(long)]
    pub headless: bool,

    /// Stop after this many games
    #[arg(long)]
    pub games: Option<u32>,

    #[arg(long, help = "Random seed for reproducible runs")]
    pub seed: Option<u64>,

    /// Where the best model is written
    #[arg(long)]
    pub model: Option<PathBuf>,

    /// SQLite file for the game history
    #[arg(long, conflicts_with = "no_stats")]
    pub stats_db: Option<PathBuf>,

    /// Do not record game history
    #[arg(long)]
    pub no_stats: bool,
}

impl TrainArgs {
    /// Config file (or defaults) with command-line overrides applied.
    pub fn to_config(&self) -> Result<TrainConfig> {
        let mut cfg = match &self.config {
            Some(path) => TrainConfig::load(path)?,
            None => TrainConfig::default(),
        };
        if self.headless {
            cfg.headless = true;
        }
        if let Some(n) = self.games {
            cfg.max_games = Some(n);
        }
        if let Some(seed) = self.seed {
            cfg.agent.seed = Some(seed);
        }
        if let Some(model) = &self.model {
            cfg.model_path = model.clone();
        }
        if let Some(db) = &self.stats_db {
            cfg.stats_db = Some(db.clone());
        }
        if self.no_stats {
            cfg.stats_db = None;
        }
        cfg.validate()?;
        Ok(cfg)
    }
}
