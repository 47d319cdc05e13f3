//! Agent: epsilon-greedy policy, replay memory, one-step TD updates.

use crate::config::AgentConfig;
use crate::error::{Result, SnakeError};
use crate::game::Game;
use crate::game_input::{GameInput, STATE_SIZE, StateVector};
use crate::log;
use crate::network::{Adam, Net};
use crate::replay_buffer::{ReplayBuffer, Transition};
use crate::snake::Move;
use crate::utils::{Stats, argmax, has_non_finite, vec_stats};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

pub const ACTION_COUNT: usize = 3;

/// Turns transitions into MSE gradient steps on a `Net`.
pub struct QTrainer {
    gamma: f32,
    optimizer: Adam,
}

impl QTrainer {
    pub fn new(model: &Net, lr: f32, gamma: f32) -> Self {
        Self { gamma, optimizer: Adam::new(model, lr) }
    }

    /// r if terminal, else r + γ·max_a Q(s', a).
    pub fn td_target(&self, model: &Net, t: &Transition) -> f32 {
        if t.done {
            return t.reward;
        }
        let next_q = model.forward(&GameInput::to_input(&t.next_state));
        if has_non_finite(&next_q) {
            tracing::warn!("non-finite Q(s', ·) while building a TD target");
        }
        let max_next = next_q.iter().copied().fold(f32::NEG_INFINITY, f32::max);
        t.reward + self.gamma * max_next
    }

    /// One optimiser step over `batch`. Targets equal the prediction except at the
    /// taken action, so only that output contributes to the loss.
    pub fn train_step(&mut self, model: &mut Net, batch: &[&Transition]) -> UpdateReport {
        if batch.is_empty() {
            return UpdateReport::default();
        }
        // d(mean over N*3 squared errors)/d(output)
        let scale = 2.0 / (batch.len() * model.output_size) as f32;
        let mut grads = model.zero_grads();
        let mut loss = 0.0f32;
        let mut taken_q = Vec::with_capacity(batch.len());

        // all targets use the pre-step weights
        for t in batch {
            let x = GameInput::to_input(&t.state);
            let cache = model.forward_cached(&x);
            let a = t.action.index();
            taken_q.push(cache.output[a]);

            // untaken actions have target == prediction, error 0
            let err = cache.output[a] - self.td_target(model, t);
            loss += err * err;

            let mut d_out = [0.0f32; ACTION_COUNT];
            d_out[a] = scale * err;
            model.backward(&x, &cache, &d_out, &mut grads);
        }

        let grad_norm = grads.l2();
        self.optimizer.step(model, &grads);
        UpdateReport {
            loss: loss / (batch.len() * model.output_size) as f32,
            grad_norm,
            q: vec_stats(&taken_q),
        }
    }
}

/// What one optimiser step saw: loss before the step, gradient L2 norm,
/// and the predicted Q of the taken actions.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct UpdateReport {
    pub loss: f32,
    pub grad_norm: f32,
    pub q: Stats,
}

impl Default for UpdateReport {
    fn default() -> Self {
        Self { loss: 0.0, grad_norm: 0.0, q: vec_stats(&[]) }
    }
}

pub struct Agent {
    cfg: AgentConfig,
    /// Finished games; drives the exploration schedule.
    pub n_games: u32,
    memory: ReplayBuffer,
    model: Net,
    trainer: QTrainer,
    rng: StdRng,
}

impl Agent {
    pub fn new(cfg: AgentConfig) -> Self {
        let mut rng = match cfg.seed {
            Some(s) => StdRng::seed_from_u64(s),
            None => StdRng::from_entropy(),
        };
        let model = Net::new(STATE_SIZE, cfg.hidden_size, ACTION_COUNT, &mut rng);
        Self::assemble(cfg, model, rng)
    }

    /// Start from existing weights; the shape must match the configured network.
    pub fn with_model(cfg: AgentConfig, model: Net) -> Result<Self> {
        let expected = (STATE_SIZE, cfg.hidden_size, ACTION_COUNT);
        if model.shape() != expected || !model.is_consistent() {
            return Err(SnakeError::ShapeMismatch { expected, found: model.shape() });
        }
        let rng = match cfg.seed {
            Some(s) => StdRng::seed_from_u64(s),
            None => StdRng::from_entropy(),
        };
        Ok(Self::assemble(cfg, model, rng))
    }

    fn assemble(cfg: AgentConfig, model: Net, rng: StdRng) -> Self {
        let trainer = QTrainer::new(&model, cfg.learning_rate, cfg.gamma);
        Self {
            memory: ReplayBuffer::new(cfg.max_memory),
            cfg,
            n_games: 0,
            model,
            trainer,
            rng,
        }
    }

    pub fn get_state(&self, game: &Game) -> StateVector {
        GameInput::from_game(game)
    }

    /// Linear schedule: `exploration_games - n_games`, compared against a roll in 0..=range.
    pub fn epsilon(&self) -> i64 {
        i64::from(self.cfg.exploration_games) - i64::from(self.n_games)
    }

    /// Chance that `get_action` explores after `n_games` finished games.
    pub fn exploration_probability(cfg: &AgentConfig, n_games: u32) -> f64 {
        let eps = (i64::from(cfg.exploration_games) - i64::from(n_games)).max(0) as f64;
        (eps / f64::from(cfg.exploration_range + 1)).min(1.0)
    }

    pub fn get_action(&mut self, state: &StateVector) -> Move {
        // epsilon goes negative after enough games; then this never explores
        let roll = i64::from(self.rng.gen_range(0..=self.cfg.exploration_range));
        if roll < self.epsilon() {
            return Move::ALL[self.rng.gen_range(0..ACTION_COUNT)];
        }
        self.best_action(state)
    }

    /// Greedy action; ties go to the lowest index.
    pub fn best_action(&self, state: &StateVector) -> Move {
        let q = self.q_values(state);
        if has_non_finite(&q) {
            tracing::warn!(?q, "non-finite Q values in action selection");
        }
        Move::from_index(argmax(&q)).unwrap_or(Move::Straight)
    }

    pub fn q_values(&self, state: &StateVector) -> Vec<f32> {
        self.model.forward(&GameInput::to_input(state))
    }

    pub fn remember(&mut self, transition: Transition) {
        self.memory.push(transition);
    }

    /// Online update on the transition just observed.
    pub fn train_short_memory(&mut self, transition: &Transition) -> UpdateReport {
        self.trainer.train_step(&mut self.model, &[transition])
    }

    /// Batched update on a uniform sample of the replay memory.
    pub fn train_long_memory(&mut self) -> Option<UpdateReport> {
        if self.memory.is_empty() {
            return None;
        }
        let batch = self.memory.sample(&mut self.rng, self.cfg.batch_size);
        let report = self.trainer.train_step(&mut self.model, &batch);

        let step = u64::from(self.n_games);
        log::scalar(step, "long_loss", report.loss);
        log::scalar(step, "grad_norm", report.grad_norm);
        log::scalar(step, "q_mean", report.q.mean);
        log::scalar(step, "q_max", report.q.max);
        log::scalar(step, "batch", batch.len() as f32);
        // how full the replay memory is, 0..1
        log::scalar(step, "memory_fill", self.memory.len() as f32 / self.memory.capacity() as f32);
        Some(report)
    }

    pub fn model(&self) -> &Net {
        &self.model
    }

    pub fn memory_len(&self) -> usize {
        self.memory.len()
    }

    pub fn config(&self) -> &AgentConfig {
        &self.cfg
    }
}
