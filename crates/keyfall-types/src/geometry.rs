use std::ops::{Add, Sub};

use serde::{Deserialize, Serialize};

/// A point or offset on the playfield. `y` grows upward; notes fall toward -y.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

impl Add for Vec2 {
    type Output = Vec2;

    fn add(self, rhs: Vec2) -> Vec2 {
        Vec2::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Vec2 {
    type Output = Vec2;

    fn sub(self, rhs: Vec2) -> Vec2 {
        Vec2::new(self.x - rhs.x, self.y - rhs.y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_sub() {
        let lane = Vec2::new(3.0, 0.0);
        let offset = Vec2::new(0.0, 5.0);
        assert_eq!(lane + offset, Vec2::new(3.0, 5.0));
        assert_eq!((lane + offset) - offset, lane);
    }
}
