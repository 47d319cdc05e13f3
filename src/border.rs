use crate::utils::Point;

/// Board bounds in pixels: [0, width) x [0, height).
#[derive(Copy, Clone, Debug)]
pub struct Border {
    pub width: i32,
    pub height: i32,
}

impl Border {
    pub fn new(width: i32, height: i32) -> Self {
        Self { width, height }
    }

    pub fn is_inside(&self, p: Point) -> bool {
        p.x >= 0 && p.y >= 0 && p.x < self.width && p.y < self.height
    }

    /// Number of grid cells for a given block size.
    pub fn cells(&self, block: i32) -> usize {
        ((self.width / block) * (self.height / block)) as usize
    }
}
