use crate::error::{Result, SnakeError};
use crate::utils::Point;
use std::collections::VecDeque;

/// Absolute heading. Clockwise order is Right -> Down -> Left -> Up -> Right.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
pub enum Direction {
    Right,
    Down,
    Left,
    Up,
}

impl Direction {
    pub const CLOCKWISE: [Direction; 4] =
        [Direction::Right, Direction::Down, Direction::Left, Direction::Up];

    /// 90° clockwise.
    pub fn clockwise(self) -> Direction {
        match self {
            Direction::Right => Direction::Down,
            Direction::Down => Direction::Left,
            Direction::Left => Direction::Up,
            Direction::Up => Direction::Right,
        }
    }

    /// 90° counter-clockwise.
    pub fn counter_clockwise(self) -> Direction {
        match self {
            Direction::Right => Direction::Up,
            Direction::Up => Direction::Left,
            Direction::Left => Direction::Down,
            Direction::Down => Direction::Right,
        }
    }

    /// Heading after applying a relative move.
    pub fn rotate(self, mv: Move) -> Direction {
        match mv {
            Move::Straight => self,
            Move::Right => self.clockwise(),
            Move::Left => self.counter_clockwise(),
        }
    }

    pub fn opposite(self) -> Direction {
        self.clockwise().clockwise()
    }

    /// Unit offset (dx, dy); y grows downwards.
    pub fn delta(self) -> (i32, i32) {
        match self {
            Direction::Up => (0, -1),
            Direction::Down => (0, 1),
            Direction::Left => (-1, 0),
            Direction::Right => (1, 0),
        }
    }
}

/// Relative action. Index order matches the network's output layer.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
pub enum Move {
    Straight,
    Right,
    Left,
}

impl Move {
    pub const ALL: [Move; 3] = [Move::Straight, Move::Right, Move::Left];

    pub fn index(self) -> usize {
        match self {
            Move::Straight => 0,
            Move::Right => 1,
            Move::Left => 2,
        }
    }

    pub fn from_index(i: usize) -> Option<Move> {
        Move::ALL.get(i).copied()
    }

    pub fn one_hot(self) -> [u8; 3] {
        let mut v = [0u8; 3];
        v[self.index()] = 1;
        v
    }

    /// Strict decoding of a `[straight, right, left]` one-hot vector.
    pub fn from_one_hot(v: &[u8]) -> Result<Move> {
        match v {
            [1, 0, 0] => Ok(Move::Straight),
            [0, 1, 0] => Ok(Move::Right),
            [0, 0, 1] => Ok(Move::Left),
            _ => Err(SnakeError::InvalidAction(v.to_vec())),
        }
    }

    /// Like `from_one_hot`, but anything malformed keeps the current heading.
    pub fn from_one_hot_or_straight(v: &[u8]) -> Move {
        Move::from_one_hot(v).unwrap_or_else(|err| {
            tracing::warn!(%err, "falling back to Straight");
            Move::Straight
        })
    }
}

/// Snake body, head first.
#[derive(Clone, Debug)]
pub struct Snake {
    body: VecDeque<Point>,
}

impl Snake {
    /// Head at `head_position`, remaining segments trailing behind it opposite to `direction`.
    pub fn new(head_position: Point, init_length: usize, direction: Direction, block: i32) -> Snake {
        let tail_dir = direction.opposite();
        let mut body = VecDeque::with_capacity(init_length);
        let mut p = head_position;
        body.push_back(p);
        for _ in 1..init_length {
            p = p.step(tail_dir, block);
            body.push_back(p);
        }
        Snake { body }
    }

    pub fn from_segments(segments: impl IntoIterator<Item = Point>) -> Snake {
        Snake { body: segments.into_iter().collect() }
    }

    pub fn head(&self) -> Point {
        self.body[0]
    }

    pub fn body(&self) -> &VecDeque<Point> {
        &self.body
    }

    pub fn len(&self) -> usize {
        self.body.len()
    }

    pub fn is_empty(&self) -> bool {
        self.body.is_empty()
    }

    pub fn contains(&self, p: &Point) -> bool {
        self.body.contains(p)
    }

    /// True if `p` is on any segment except the head.
    pub fn hits_tail(&self, p: &Point) -> bool {
        self.body.iter().skip(1).any(|s| s == p)
    }

    pub fn push_head(&mut self, p: Point) {
        self.body.push_front(p);
    }

    pub fn drop_tail(&mut self) {
        self.body.pop_back();
    }
}
