use crate::config::GameConfig;
use crate::error::Result;
use crate::event_loop::{Flow, Palette, Session};
use crate::game::{Frame, Game};
use crate::snake::{Direction, Move};
use tracing::info;

pub const DEFAULT_SPEED: u32 = 10;

/// Keyboard-controlled game: the last key pressed sets the absolute heading.
pub struct HumanSession {
    game: Game,
    pending: Option<Direction>,
}

impl HumanSession {
    pub fn new(start_speed: u32, seed: Option<u64>) -> Result<Self> {
        let cfg = GameConfig::human(start_speed);
        cfg.validate()?;
        Ok(Self { game: Game::new(cfg, seed)?, pending: None })
    }

    pub fn game(&self) -> &Game {
        &self.game
    }
}

impl Session for HumanSession {
    fn title(&self) -> &str {
        "Snake"
    }

    fn tick(&mut self) -> Result<Flow> {
        if let Some(dir) = self.pending.take() {
            self.game.steer(dir);
        }
        let outcome = self.game.step(Move::Straight)?;
        if outcome.done {
            info!(score = outcome.score, "Final score");
            return Ok(Flow::Stop);
        }
        Ok(Flow::Continue)
    }

    fn frame(&self) -> Frame<'_> {
        self.game.frame()
    }

    fn speed(&self) -> u32 {
        self.game.speed()
    }

    fn steer(&mut self, dir: Direction) {
        self.pending = Some(dir);
    }

    fn palette(&self) -> Palette {
        Palette::BLUE
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::Point;

    #[test]
    fn last_key_wins() {
        let mut s = HumanSession::new(DEFAULT_SPEED, Some(4)).unwrap();
        assert_eq!(s.speed(), DEFAULT_SPEED);
        s.steer(Direction::Down);
        s.steer(Direction::Up);
        assert_eq!(s.tick().unwrap(), Flow::Continue);
        assert_eq!(s.game().head(), Point::new(320, 220));
    }

    #[test]
    fn runs_until_the_wall() {
        let mut s = HumanSession::new(DEFAULT_SPEED, Some(4)).unwrap();
        s.steer(Direction::Up);
        // 12 steps reach y = 0, the 13th leaves the board
        let mut ticks = 0;
        while s.tick().unwrap() == Flow::Continue {
            ticks += 1;
            assert!(ticks < 24);
        }
        assert_eq!(s.game().head().y, -20);
    }
}
