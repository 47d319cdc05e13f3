use crate::game::Game;
use crate::snake::{Direction, Move};

pub const STATE_SIZE: usize = 11;

/// 0/1 features, fixed order:
/// danger [straight, right, left], heading [left, right, up, down],
/// food [left of head, right of head, above head, below head].
pub type StateVector = [u8; STATE_SIZE];

pub struct GameInput;

impl GameInput {
    pub fn from_game(game: &Game) -> StateVector {
        let head = game.head();
        let food = game.food();
        let dir = game.direction();
        let block = game.config().block_size;

        // one step ahead for each relative move
        let danger = Move::ALL.map(|mv| game.is_collision(Some(head.step(dir.rotate(mv), block))));

        let state = [
            // danger
            danger[0],
            danger[1],
            danger[2],
            // heading, exactly one set
            dir == Direction::Left,
            dir == Direction::Right,
            dir == Direction::Up,
            dir == Direction::Down,
            // food relative to head; both axis bits clear when aligned
            food.x < head.x,
            food.x > head.x,
            food.y < head.y,
            food.y > head.y,
        ];
        state.map(u8::from)
    }

    /// Network input.
    pub fn to_input(state: &StateVector) -> [f32; STATE_SIZE] {
        state.map(f32::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GameConfig;
    use crate::snake::Snake;
    use crate::utils::Point;

    fn game_at(head: Point, dir: Direction, food: Point) -> Game {
        let snake = Snake::new(head, 3, dir, 20);
        Game::with_state(GameConfig::default(), snake, dir, food, Some(0))
    }

    #[test]
    fn centre_of_board() {
        let game = game_at(Point::new(320, 240), Direction::Right, Point::new(100, 400));
        assert_eq!(
            GameInput::from_game(&game),
            [0, 0, 0, 0, 1, 0, 0, 1, 0, 0, 1]
        );
    }

    #[test]
    fn wall_ahead_and_to_the_right() {
        // heading right in the bottom-right corner: straight and clockwise (down) are walls
        let game = game_at(Point::new(620, 460), Direction::Right, Point::new(620, 0));
        assert_eq!(
            GameInput::from_game(&game),
            [1, 1, 0, 0, 1, 0, 0, 0, 0, 1, 0]
        );
    }

    #[test]
    fn body_counts_as_danger() {
        // heading up with the body curling to the left of the head
        let snake = Snake::from_segments([
            Point::new(100, 100),
            Point::new(100, 120),
            Point::new(80, 120),
            Point::new(80, 100),
        ]);
        let game = Game::with_state(GameConfig::default(), snake, Direction::Up, Point::new(100, 100), Some(0));
        let state = GameInput::from_game(&game);
        assert_eq!(&state[..3], &[0, 0, 1]);
        assert_eq!(&state[3..7], &[0, 0, 1, 0]);
        assert_eq!(&state[7..], &[0, 0, 0, 0]);
    }

    #[test]
    fn input_is_float_copy() {
        let game = game_at(Point::new(320, 240), Direction::Down, Point::new(320, 400));
        let state = GameInput::from_game(&game);
        let input = GameInput::to_input(&state);
        for (a, b) in state.iter().zip(input.iter()) {
            assert_eq!(*a as f32, *b);
        }
        assert_eq!(state[6], 1);
        assert_eq!(state[10], 1);
    }
}
