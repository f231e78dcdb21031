use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self { Self { x, y } }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    pub fn new(width: f64, height: f64) -> Self { Self { width, height } }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub origin: Point,
    pub size: Size,
}

impl Rect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            origin: Point::new(x, y),
            size: Size::new(width, height),
        }
    }

    pub fn top_left_corner(&self) -> Point { self.origin }

    /// Wide (or square) rects prefer a horizontal root container.
    pub fn is_landscape(&self) -> bool { self.size.width >= self.size.height }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn square_counts_as_landscape() {
        assert!(Rect::new(0., 0., 1000., 1000.).is_landscape());
        assert!(Rect::new(0., 0., 1920., 1080.).is_landscape());
        assert!(!Rect::new(0., 0., 1080., 1920.).is_landscape());
    }
}
