use serde::{Deserialize, Serialize};

/// A planar point in projected units (e.g. UTM meters).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    pub fn new(x: f64, y: f64) -> Self {
        Position { x, y }
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

/// Euclidean distance between two points.
pub fn distance(a: &Position, b: &Position) -> f64 {
    (a.x - b.x).hypot(a.y - b.y)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_distance_given_pythagorean_triple_should_be_exact() {
        let a = Position::new(0.0, 0.0);
        let b = Position::new(3.0, 4.0);
        assert_eq!(distance(&a, &b), 5.0);
        assert_eq!(distance(&a, &b), distance(&b, &a));
    }

    #[test]
    fn test_is_finite_given_nan_should_return_false() {
        assert!(Position::new(1.0, 2.0).is_finite());
        assert!(!Position::new(f64::NAN, 2.0).is_finite());
        assert!(!Position::new(1.0, f64::INFINITY).is_finite());
    }
}
