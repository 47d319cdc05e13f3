use crate::config::TrainConfig;
use crate::db::{Checkpoint, EpisodeLog, EpisodeRecord, load_checkpoint, save_checkpoint};
use crate::dqn::Agent;
use crate::error::Result;
use crate::event_loop::{Flow, Session};
use crate::game::{Frame, Game};
use crate::log;
use crate::replay_buffer::Transition;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Summary of one finished game.
#[derive(Debug, Clone, PartialEq)]
pub struct EpisodeSummary {
    pub game: u32,
    pub score: u32,
    pub record: u32,
    pub mean_score: f64,
    pub steps: usize,
}

/// Drives the agent against the engine one step at a time.
pub struct Trainer {
    agent: Agent,
    game: Game,
    record: u32,
    total_score: u64,
    games_this_run: u32,
    max_games: Option<u32>,
    model_path: PathBuf,
    stats: Option<EpisodeLog>,
}

impl Trainer {
    /// Build a session. A `resume` checkpoint that cannot be loaded is fatal.
    pub fn new(cfg: &TrainConfig, resume: Option<&Path>) -> Result<Self> {
        cfg.validate()?;
        let (agent, record) = match resume {
            Some(path) => {
                let ckpt = load_checkpoint(path)?;
                let mut agent = Agent::with_model(cfg.agent.clone(), ckpt.model)?;
                agent.n_games = ckpt.meta.game;
                info!(path = %path.display(), game = ckpt.meta.game, record = ckpt.meta.record, "resumed from checkpoint");
                (agent, ckpt.meta.record)
            }
            None => (Agent::new(cfg.agent.clone()), 0),
        };
        // food placement gets its own stream so a fixed seed reproduces whole runs
        let game = Game::new(cfg.game.clone(), cfg.agent.seed.map(|s| s ^ 0x5EED_F00D))?;
        let stats = cfg.stats_db.as_deref().map(EpisodeLog::open).transpose()?;
        if let Some(log) = &stats {
            // the history is informational; a bad read never blocks training
            if let Err(err) = report_history(log) {
                warn!(%err, "could not read game history");
            }
        }

        Ok(Self {
            agent,
            game,
            record,
            total_score: 0,
            games_this_run: 0,
            max_games: cfg.max_games,
            model_path: cfg.model_path.clone(),
            stats,
        })
    }

    /// One environment step with its short update; returns a summary when a game ends.
    pub fn step(&mut self) -> Result<Option<EpisodeSummary>> {
        // s, a, r, s'
        let state_old = self.agent.get_state(&self.game);
        let action = self.agent.get_action(&state_old);
        let outcome = self.game.step(action)?;
        let state_new = self.agent.get_state(&self.game);

        let transition = Transition {
            state: state_old,
            action,
            reward: outcome.reward,
            next_state: state_new,
            done: outcome.done,
        };
        self.agent.train_short_memory(&transition);
        self.agent.remember(transition);

        if !outcome.done {
            return Ok(None);
        }

        // read these before reset clears them
        let steps = self.game.steps();
        let epsilon = Agent::exploration_probability(self.agent.config(), self.agent.n_games);
        self.game.reset()?;
        self.agent.n_games += 1;
        // replay pass once per game
        self.agent.train_long_memory();
        Ok(Some(self.finish_episode(outcome.score, steps, epsilon)))
    }

    fn finish_episode(&mut self, score: u32, steps: usize, epsilon: f64) -> EpisodeSummary {
        if score > self.record {
            self.record = score;
            self.save_model();
        }

        self.games_this_run += 1;
        self.total_score += u64::from(score);
        let mean_score = self.total_score as f64 / f64::from(self.games_this_run);
        let summary = EpisodeSummary {
            game: self.agent.n_games,
            score,
            record: self.record,
            mean_score,
            steps,
        };

        info!(game = summary.game, score, record = summary.record, mean_score, "game over");
        log::scalar(u64::from(summary.game), "score", score as f32);
        log::scalar(u64::from(summary.game), "mean_score", mean_score as f32);
        log::scalar(u64::from(summary.game), "epsilon", epsilon as f32);

        if let Some(stats) = &self.stats {
            let row = EpisodeRecord {
                game: summary.game,
                score,
                record: summary.record,
                mean_score,
                epsilon,
                steps: steps as u64,
            };
            if let Err(err) = stats.insert(&row) {
                warn!(%err, "could not record game history");
            }
        }
        summary
    }

    /// Non-fatal: a failed save is logged and training goes on.
    fn save_model(&self) {
        let ckpt = Checkpoint::new(self.agent.n_games, self.record, self.agent.model().clone());
        match save_checkpoint(&self.model_path, &ckpt) {
            Ok(()) => info!(path = %self.model_path.display(), record = self.record, "saved model"),
            Err(err) => warn!(%err, "checkpoint save failed, continuing"),
        }
    }

    pub fn is_finished(&self) -> bool {
        self.max_games.is_some_and(|n| self.games_this_run >= n)
    }

    /// Train without a window until `max_games` (forever when unset).
    pub fn run_headless(&mut self) -> Result<()> {
        while !self.is_finished() {
            self.step()?;
        }
        Ok(())
    }

    pub fn record(&self) -> u32 {
        self.record
    }

    pub fn agent(&self) -> &Agent {
        &self.agent
    }

    pub fn game(&self) -> &Game {
        &self.game
    }

    pub fn stats(&self) -> Option<&EpisodeLog> {
        self.stats.as_ref()
    }
}

/// Log what an existing stats database already holds. Returns the last recorded game, if any.
fn report_history(log: &EpisodeLog) -> Result<Option<EpisodeRecord>> {
    let games = log.count()?;
    if games == 0 {
        return Ok(None);
    }
    let best = log.best_score()?;
    let last = log.recent(1)?.into_iter().next();
    info!(
        games,
        best = ?best,
        last_game = ?last.as_ref().map(|r| r.game),
        "existing game history"
    );
    Ok(last)
}

impl Session for Trainer {
    fn title(&self) -> &str {
        "Snake AI"
    }

    fn tick(&mut self) -> Result<Flow> {
        self.step()?;
        Ok(if self.is_finished() { Flow::Stop } else { Flow::Continue })
    }

    fn frame(&self) -> Frame<'_> {
        self.game.frame()
    }

    fn speed(&self) -> u32 {
        self.game.speed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AgentConfig;

    fn cfg(dir: &Path) -> TrainConfig {
        TrainConfig {
            agent: AgentConfig { hidden_size: 16, batch_size: 64, seed: Some(21), ..AgentConfig::default() },
            model_path: dir.join("model").join("model.json"),
            stats_db: None,
            max_games: Some(2),
            headless: true,
            ..TrainConfig::default()
        }
    }

    #[test]
    fn new_high_score_writes_checkpoint() {
        let dir = tempfile::tempdir().unwrap();
        let mut trainer = Trainer::new(&cfg(dir.path()), None).unwrap();

        let first = trainer.finish_episode(0, 10, 0.3);
        assert_eq!(first.record, 0);
        assert!(!trainer.model_path.exists());

        let second = trainer.finish_episode(3, 50, 0.3);
        assert_eq!(second.record, 3);
        assert!((second.mean_score - 1.5).abs() < 1e-9);
        assert!(trainer.model_path.exists());

        // equal score is not a new record
        std::fs::remove_file(&trainer.model_path).unwrap();
        trainer.finish_episode(3, 50, 0.3);
        assert!(!trainer.model_path.exists());
    }

    #[test]
    fn unwritable_checkpoint_is_not_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("blocker");
        std::fs::write(&blocker, "file, not a directory").unwrap();
        let mut c = cfg(dir.path());
        c.model_path = blocker.join("model.json");
        let mut trainer = Trainer::new(&c, None).unwrap();
        let s = trainer.finish_episode(5, 10, 0.0);
        assert_eq!(s.record, 5);
    }

    #[test]
    fn resume_restores_progress() {
        let dir = tempfile::tempdir().unwrap();
        let c = cfg(dir.path());
        let mut trainer = Trainer::new(&c, None).unwrap();
        trainer.agent.n_games = 40;
        trainer.finish_episode(6, 100, 0.1);

        let resumed = Trainer::new(&c, Some(&c.model_path)).unwrap();
        assert_eq!(resumed.record(), 6);
        assert_eq!(resumed.agent().n_games, 40);
        assert_eq!(resumed.agent().model(), trainer.agent().model());
    }

    #[test]
    fn missing_resume_file_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let c = cfg(dir.path());
        assert!(Trainer::new(&c, Some(&dir.path().join("absent.json"))).is_err());
    }

    #[test]
    fn history_is_reported_on_startup() {
        let log = EpisodeLog::open_in_memory().unwrap();
        assert_eq!(report_history(&log).unwrap(), None);

        for game in 1..=3 {
            let row = EpisodeRecord { game, score: game, record: game, mean_score: 1.0, epsilon: 0.2, steps: 40 };
            log.insert(&row).unwrap();
        }
        let last = report_history(&log).unwrap().unwrap();
        assert_eq!(last.game, 3);
        assert_eq!(last.score, 3);
    }

    #[test]
    fn headless_run_stops_after_max_games() {
        let dir = tempfile::tempdir().unwrap();
        let mut c = cfg(dir.path());
        c.stats_db = Some(dir.path().join("training.db"));
        let mut trainer = Trainer::new(&c, None).unwrap();
        trainer.run_headless().unwrap();
        assert_eq!(trainer.agent().n_games, 2);
        assert_eq!(trainer.stats().unwrap().count().unwrap(), 2);
        assert!(trainer.agent().memory_len() > 0);
        assert_eq!(trainer.game().steps(), 0);
    }
}
