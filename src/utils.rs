use crate::snake::Direction;
use serde::{Deserialize, Serialize};

/// A cell corner on the board, in pixels. Always a multiple of the block size
/// for committed snake/food positions; lookahead points may lie off the board.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// The point one grid-step away in `dir`.
    pub fn step(self, dir: Direction, block: i32) -> Point {
        let (dx, dy) = dir.delta();
        Point { x: self.x + dx * block, y: self.y + dy * block }
    }
}

/// Argmax over a slice. Ties resolve to the first index.
pub fn argmax(v: &[f32]) -> usize {
    let mut best_i = 0;
    let mut best_v = v[0];
    for (i, &x) in v.iter().enumerate().skip(1) {
        if x > best_v {
            best_v = x;
            best_i = i;
        }
    }
    best_i
}

pub fn has_non_finite(xs: &[f32]) -> bool {
    xs.iter().any(|&v| !v.is_finite())
}

/// min / max / mean over a vector.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Stats {
    pub min: f32,
    pub max: f32,
    pub mean: f32,
}

pub fn vec_stats(xs: &[f32]) -> Stats {
    if xs.is_empty() {
        return Stats { min: 0.0, max: 0.0, mean: 0.0 };
    }
    let mut mn = xs[0];
    let mut mx = xs[0];
    let mut sum = 0.0f32;
    for &v in xs {
        mn = mn.min(v);
        mx = mx.max(v);
        sum += v;
    }
    Stats { min: mn, max: mx, mean: sum / xs.len() as f32 }
}
