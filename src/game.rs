use crate::border::Border;
use crate::config::GameConfig;
use crate::error::Result;
use crate::food::Food;
use crate::snake::{Direction, Move, Snake};
use crate::utils::Point;
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::collections::VecDeque;

pub const COLLISION_REWARD: f32 = -10.0;
pub const FOOD_REWARD: f32 = 10.0;
pub const NEUTRAL_REWARD: f32 = 0.0;

/// What a single `step` reports back.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct StepOutcome {
    pub reward: f32,
    pub done: bool,
    pub score: u32,
}

/// Read-only view handed to the display after each step.
#[derive(Copy, Clone, Debug)]
pub struct Frame<'a> {
    pub snake: &'a VecDeque<Point>,
    pub food: Point,
    pub score: u32,
    pub width: i32,
    pub height: i32,
    pub block: i32,
}

/// Deterministic snake simulation. Randomness only enters through food placement.
pub struct Game {
    config: GameConfig,
    border: Border,
    snake: Snake,
    direction: Direction,
    food: Food,
    score: u32,
    frame_iteration: usize,
    speed: u32,
    rng: StdRng,
}

impl Game {
    /// A freshly reset game. `seed` fixes food placement for reproducible runs.
    pub fn new(config: GameConfig, seed: Option<u64>) -> Result<Game> {
        let mut game = Game::with_state(
            config,
            Snake::from_segments([Point::new(0, 0)]),
            Direction::Right,
            Point::new(0, 0),
            seed,
        );
        game.reset()?;
        Ok(game)
    }

    /// A game in an arbitrary position. The caller keeps snake and food on the grid.
    pub fn with_state(
        config: GameConfig,
        snake: Snake,
        direction: Direction,
        food: Point,
        seed: Option<u64>,
    ) -> Game {
        let rng = match seed {
            Some(s) => StdRng::seed_from_u64(s),
            None => StdRng::from_entropy(),
        };
        Game {
            border: Border::new(config.width, config.height),
            speed: config.start_speed,
            config,
            snake,
            direction,
            food: Food::at(food),
            score: 0,
            frame_iteration: 0,
            rng,
        }
    }

    /// 3-segment snake in the centre heading right, fresh counters, new food.
    pub fn reset(&mut self) -> Result<()> {
        let block = self.config.block_size;
        // centre snapped down to the grid
        let head = Point::new(
            self.config.width / 2 / block * block,
            self.config.height / 2 / block * block,
        );
        self.direction = Direction::Right;
        self.snake = Snake::new(head, self.config.initial_length, self.direction, block);
        self.score = 0;
        self.frame_iteration = 0;
        self.speed = self.config.start_speed;
        // food last, so it avoids the new body
        self.food = Food::spawn(&mut self.rng, &self.border, block, &self.snake)?;
        Ok(())
    }

    /// Advance one grid-step after turning relative to the current heading.
    pub fn step(&mut self, mv: Move) -> Result<StepOutcome> {
        self.frame_iteration += 1;

        // turn relative to the heading, then advance one cell
        self.direction = self.direction.rotate(mv);
        let head = self.snake.head().step(self.direction, self.config.block_size);
        // head goes in before the checks; the tail is still there
        self.snake.push_head(head);

        // wall, body or out of steps: episode over, snake left as is
        if self.is_collision(None) || self.budget_exceeded() {
            return Ok(StepOutcome { reward: COLLISION_REWARD, done: true, score: self.score });
        }

        let reward = if head == self.food.position {
            // grow: keep the tail this step
            self.score += 1;
            self.speed += self.config.speed_step;
            self.food = Food::spawn(&mut self.rng, &self.border, self.config.block_size, &self.snake)?;
            FOOD_REWARD
        } else {
            // plain move: length unchanged
            self.snake.drop_tail();
            NEUTRAL_REWARD
        };

        Ok(StepOutcome { reward, done: false, score: self.score })
    }

    /// Set the absolute heading for the next step (keyboard control).
    pub fn steer(&mut self, dir: Direction) {
        self.direction = dir;
    }

    /// Off the board or on a non-head segment. Defaults to the current head.
    pub fn is_collision(&self, pt: Option<Point>) -> bool {
        let pt = pt.unwrap_or_else(|| self.snake.head());
        !self.border.is_inside(pt) || self.snake.hits_tail(&pt)
    }

    /// Steps allowed before the episode is cut, scaled by snake length.
    pub fn step_budget(&self) -> Option<usize> {
        self.config.step_budget_factor.map(|f| f * self.snake.len())
    }

    fn budget_exceeded(&self) -> bool {
        self.step_budget().is_some_and(|b| self.frame_iteration > b)
    }

    pub fn frame(&self) -> Frame<'_> {
        Frame {
            snake: self.snake.body(),
            food: self.food.position,
            score: self.score,
            width: self.config.width,
            height: self.config.height,
            block: self.config.block_size,
        }
    }

    pub fn snake(&self) -> &Snake {
        &self.snake
    }

    pub fn head(&self) -> Point {
        self.snake.head()
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn food(&self) -> Point {
        self.food.position
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn steps(&self) -> usize {
        self.frame_iteration
    }

    pub fn speed(&self) -> u32 {
        self.speed
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fresh() -> Game {
        Game::new(GameConfig::default(), Some(42)).unwrap()
    }

    fn segments(game: &Game) -> Vec<Point> {
        game.snake().body().iter().copied().collect()
    }

    #[test]
    fn reset_centres_snake() {
        let game = fresh();
        assert_eq!(game.head(), Point::new(320, 240));
        assert_eq!(game.direction(), Direction::Right);
        assert_eq!(
            segments(&game),
            vec![Point::new(320, 240), Point::new(300, 240), Point::new(280, 240)]
        );
        assert_eq!(game.score(), 0);
        assert_eq!(game.steps(), 0);
        assert_eq!(game.speed(), 15);
        assert!(!game.snake().contains(&game.food()));
    }

    #[test]
    fn straight_step_moves_head() {
        let snake = Snake::new(Point::new(320, 240), 3, Direction::Right, 20);
        let mut game =
            Game::with_state(GameConfig::default(), snake, Direction::Right, Point::new(0, 0), Some(1));

        let out = game.step(Move::Straight).unwrap();

        assert_eq!(out, StepOutcome { reward: 0.0, done: false, score: 0 });
        assert_eq!(game.steps(), 1);
        assert_eq!(game.snake().len(), 3);
        assert_eq!(game.head(), Point::new(340, 240));
    }

    #[test]
    fn relative_turns() {
        let snake = Snake::new(Point::new(320, 240), 3, Direction::Right, 20);
        let mut game =
            Game::with_state(GameConfig::default(), snake, Direction::Right, Point::new(0, 0), Some(1));

        game.step(Move::Right).unwrap();
        assert_eq!(game.direction(), Direction::Down);
        assert_eq!(game.head(), Point::new(320, 260));

        game.step(Move::Left).unwrap();
        assert_eq!(game.direction(), Direction::Right);
        assert_eq!(game.head(), Point::new(340, 260));
    }

    #[test]
    fn eating_grows_and_scores() {
        let snake = Snake::new(Point::new(320, 240), 3, Direction::Right, 20);
        let mut game =
            Game::with_state(GameConfig::default(), snake, Direction::Right, Point::new(340, 240), Some(3));

        let out = game.step(Move::Straight).unwrap();

        assert_eq!(out, StepOutcome { reward: 10.0, done: false, score: 1 });
        assert_eq!(game.snake().len(), 4);
        assert_eq!(game.speed(), 17);
        assert!(!game.snake().contains(&game.food()));
    }

    #[test]
    fn wall_is_terminal() {
        let snake = Snake::new(Point::new(0, 240), 3, Direction::Left, 20);
        let mut game =
            Game::with_state(GameConfig::default(), snake, Direction::Left, Point::new(300, 300), Some(3));

        let out = game.step(Move::Straight).unwrap();

        assert!(out.done);
        assert_eq!(out.reward, -10.0);
        assert_eq!(game.head(), Point::new(-20, 240));
        // no tail adjustment after a collision
        assert_eq!(game.snake().len(), 4);
    }

    #[test]
    fn biting_own_body_is_terminal() {
        // head at (40,0) heading down, body wraps around to the cell below-left
        let snake = Snake::from_segments([
            Point::new(40, 20),
            Point::new(40, 0),
            Point::new(20, 0),
            Point::new(20, 20),
            Point::new(20, 40),
        ]);
        let mut game =
            Game::with_state(GameConfig::default(), snake, Direction::Down, Point::new(300, 300), Some(3));

        let out = game.step(Move::Right).unwrap();

        assert_eq!(game.head(), Point::new(20, 20));
        assert!(out.done);
        assert_eq!(out.reward, COLLISION_REWARD);
    }

    #[test]
    fn step_budget_ends_episode() {
        let cfg = GameConfig { step_budget_factor: Some(2), ..GameConfig::default() };
        let snake = Snake::new(Point::new(320, 240), 3, Direction::Right, 20);
        let mut game = Game::with_state(cfg, snake, Direction::Right, Point::new(0, 0), Some(9));
        // circling a 2x2 square never bites a 3-segment snake
        let mut last = None;
        for _ in 0..20 {
            let out = game.step(Move::Right).unwrap();
            if out.done {
                last = Some(out);
                break;
            }
        }
        let out = last.expect("budget must end the game");
        assert_eq!(out.reward, -10.0);
        // the check runs with the new head in place: 4 segments, cut once steps > 2 * 4
        assert_eq!(game.steps(), 2 * 4 + 1);
        assert!(!game.is_collision(None));
    }

    #[test]
    fn step_budget_grows_with_length() {
        let cfg = GameConfig { step_budget_factor: Some(2), ..GameConfig::default() };
        let snake = Snake::new(Point::new(60, 240), 3, Direction::Right, 20);
        let mut game = Game::with_state(cfg, snake, Direction::Right, Point::new(80, 240), Some(9));

        let first = game.step(Move::Straight).unwrap();
        assert_eq!(first.reward, FOOD_REWARD);
        assert_eq!(game.snake().len(), 4);

        let mut done = false;
        for _ in 0..30 {
            let out = game.step(Move::Straight).unwrap();
            if out.done {
                done = true;
                break;
            }
        }

        assert!(done);
        // a snake that never ate is cut at step 9; this one outlived that
        assert!(game.steps() > 2 * 4 + 1);
        // the terminal step keeps its new head, which counts toward the budget
        assert_eq!(game.steps(), game.step_budget().unwrap() + 1);
        assert!(game.snake().len() >= 5);
        assert!(!game.is_collision(None));
    }

    #[test]
    fn collision_predicate() {
        let game = fresh();
        assert!(!game.is_collision(None));
        assert!(game.is_collision(Some(Point::new(-20, 240))));
        assert!(game.is_collision(Some(Point::new(640, 240))));
        assert!(game.is_collision(Some(Point::new(0, 480))));
        assert!(game.is_collision(Some(Point::new(300, 240))));
        assert!(!game.is_collision(Some(Point::new(320, 240))));
        assert!(!game.is_collision(Some(Point::new(340, 240))));
    }

    #[test]
    fn steer_sets_absolute_heading() {
        let mut game = fresh();
        game.steer(Direction::Up);
        game.step(Move::Straight).unwrap();
        assert_eq!(game.head(), Point::new(320, 220));
    }
}
