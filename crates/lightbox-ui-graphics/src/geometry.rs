//! Geometric primitives: Offset, Size, Rect, Velocity

use std::ops::{Add, AddAssign, Div, Mul, Neg, Sub, SubAssign};

/// A 2D displacement or position in pixels.
#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub struct Offset {
    pub x: f32,
    pub y: f32,
}

impl Offset {
    pub const ZERO: Offset = Offset { x: 0.0, y: 0.0 };

    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Euclidean length of the offset.
    pub fn distance(&self) -> f32 {
        (self.x * self.x + self.y * self.y).sqrt()
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }

    pub fn with_x(self, x: f32) -> Self {
        Self { x, ..self }
    }

    pub fn with_y(self, y: f32) -> Self {
        Self { y, ..self }
    }
}

impl Add for Offset {
    type Output = Offset;

    fn add(self, rhs: Offset) -> Offset {
        Offset::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl AddAssign for Offset {
    fn add_assign(&mut self, rhs: Offset) {
        self.x += rhs.x;
        self.y += rhs.y;
    }
}

impl Sub for Offset {
    type Output = Offset;

    fn sub(self, rhs: Offset) -> Offset {
        Offset::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl SubAssign for Offset {
    fn sub_assign(&mut self, rhs: Offset) {
        self.x -= rhs.x;
        self.y -= rhs.y;
    }
}

impl Mul<f32> for Offset {
    type Output = Offset;

    fn mul(self, rhs: f32) -> Offset {
        Offset::new(self.x * rhs, self.y * rhs)
    }
}

impl Div<f32> for Offset {
    type Output = Offset;

    fn div(self, rhs: f32) -> Offset {
        Offset::new(self.x / rhs, self.y / rhs)
    }
}

impl Neg for Offset {
    type Output = Offset;

    fn neg(self) -> Offset {
        Offset::new(-self.x, -self.y)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub struct Size {
    pub width: f32,
    pub height: f32,
}

impl Size {
    pub const ZERO: Size = Size {
        width: 0.0,
        height: 0.0,
    };

    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    pub fn center(&self) -> Offset {
        Offset::new(self.width / 2.0, self.height / 2.0)
    }

    /// True when either dimension is zero, negative or not a number.
    pub fn is_empty(&self) -> bool {
        !(self.width > 0.0 && self.height > 0.0)
    }

    /// Width divided by height. Not a number for an empty size.
    pub fn aspect_ratio(&self) -> f32 {
        if self.is_empty() {
            f32::NAN
        } else {
            self.width / self.height
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn from_origin_size(origin: Offset, size: Size) -> Self {
        Self {
            x: origin.x,
            y: origin.y,
            width: size.width,
            height: size.height,
        }
    }

    pub fn from_ltrb(left: f32, top: f32, right: f32, bottom: f32) -> Self {
        Self {
            x: left,
            y: top,
            width: right - left,
            height: bottom - top,
        }
    }

    pub fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }

    pub fn center(&self) -> Offset {
        Offset::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    pub fn translate(&self, dx: f32, dy: f32) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
            width: self.width,
            height: self.height,
        }
    }

    pub fn contains(&self, x: f32, y: f32) -> bool {
        x >= self.x && y >= self.y && x <= self.x + self.width && y <= self.y + self.height
    }
}

/// Pointer or content velocity in pixels per second.
#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub struct Velocity {
    pub x: f32,
    pub y: f32,
}

impl Velocity {
    pub const ZERO: Velocity = Velocity { x: 0.0, y: 0.0 };

    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn to_offset(self) -> Offset {
        Offset::new(self.x, self.y)
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

impl From<Offset> for Velocity {
    fn from(value: Offset) -> Self {
        Velocity::new(value.x, value.y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn offset_arithmetic() {
        let a = Offset::new(3.0, 4.0);
        assert_eq!(a.distance(), 5.0);
        assert_eq!(a + Offset::new(1.0, 1.0), Offset::new(4.0, 5.0));
        assert_eq!(a - a, Offset::ZERO);
        assert_eq!(a * 2.0, Offset::new(6.0, 8.0));
        assert_eq!(a / 2.0, Offset::new(1.5, 2.0));
        assert_eq!(-a, Offset::new(-3.0, -4.0));
    }

    #[test]
    fn empty_size_has_nan_aspect_ratio() {
        assert!(Size::ZERO.is_empty());
        assert!(Size::new(0.0, 100.0).aspect_ratio().is_nan());
        assert_eq!(Size::new(1000.0, 2000.0).aspect_ratio(), 0.5);
    }

    #[test]
    fn rect_center_and_contains() {
        let rect = Rect::from_ltrb(10.0, 20.0, 110.0, 220.0);
        assert_eq!(rect.center(), Offset::new(60.0, 120.0));
        assert!(rect.contains(10.0, 20.0));
        assert!(!rect.contains(111.0, 20.0));
        assert_eq!(rect.translate(5.0, 5.0).x, 15.0);
    }
}
