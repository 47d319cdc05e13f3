use crate::border::Border;
use crate::error::{Result, SnakeError};
use crate::snake::Snake;
use crate::utils::Point;
use rand::Rng;
use rand::seq::SliceRandom;

/// Random draws tried before falling back to scanning every free cell.
const RANDOM_TRIES: usize = 64;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Food {
    pub position: Point,
}

impl Food {
    pub fn at(position: Point) -> Self {
        Self { position }
    }

    /// Place food on a random grid cell the snake does not occupy.
    pub fn spawn<R: Rng>(rng: &mut R, border: &Border, block: i32, snake: &Snake) -> Result<Food> {
        let cols = border.width / block;
        let rows = border.height / block;

        for _ in 0..RANDOM_TRIES {
            let pos = Point::new(rng.gen_range(0..cols) * block, rng.gen_range(0..rows) * block);
            if !snake.contains(&pos) {
                return Ok(Food::at(pos));
            }
        }

        // crowded board: pick uniformly among what is left
        let free: Vec<Point> = (0..rows)
            .flat_map(|r| (0..cols).map(move |c| Point::new(c * block, r * block)))
            .filter(|p| !snake.contains(p))
            .collect();
        match free.choose(rng) {
            Some(&pos) => Ok(Food::at(pos)),
            None => Err(SnakeError::BoardSaturated {
                cells: border.cells(block),
                snake_len: snake.len(),
            }),
        }
    }
}
