//! Geometric data types for overlay placement
//!
//! Unlike PDF user space, every type here uses a top-left origin with y
//! growing downwards, matching container and canvas pixels.

/// A point in some 2D coordinate space
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// Width and height in some 2D coordinate space
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Size {
    pub width: f32,
    pub height: f32,
}

impl Size {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    pub fn scaled(self, factor: f32) -> Self {
        Self::new(self.width * factor, self.height * factor)
    }

    /// True when either side is zero, negative or not a number
    pub fn is_degenerate(self) -> bool {
        !(self.width > 0.0 && self.height > 0.0)
    }
}

/// An axis-aligned rectangle
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Rect {
    /// X position (left edge)
    pub x: f32,
    /// Y position (top edge)
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn from_origin_size(origin: Point, size: Size) -> Self {
        Self::new(origin.x, origin.y, size.width, size.height)
    }

    pub fn origin(&self) -> Point {
        Point::new(self.x, self.y)
    }

    pub fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }

    /// Right edge x coordinate
    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    /// Bottom edge y coordinate
    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    pub fn is_degenerate(&self) -> bool {
        self.size().is_degenerate()
    }

    /// Shrink by `amount` on every side
    pub fn inset(&self, amount: f32) -> Self {
        Self::new(
            self.x + amount,
            self.y + amount,
            self.width - 2.0 * amount,
            self.height - 2.0 * amount,
        )
    }

    pub fn translated(&self, dx: f32, dy: f32) -> Self {
        Self::new(self.x + dx, self.y + dy, self.width, self.height)
    }

    /// Whether `other` lies inside this rectangle, allowing `epsilon` of slack
    pub fn contains_rect(&self, other: &Rect, epsilon: f32) -> bool {
        other.x >= self.x - epsilon
            && other.y >= self.y - epsilon
            && other.right() <= self.right() + epsilon
            && other.bottom() <= self.bottom() + epsilon
    }
}

/// Rectangle at which the background page is displayed inside its container,
/// in container pixels
pub type PageLayoutBox = Rect;

/// Geometric relationship between the preview container and the page shown in it
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ViewGeometry {
    /// Container size in pixels
    pub container: Size,
    /// Where the background page is drawn within the container
    pub layout: PageLayoutBox,
}

impl ViewGeometry {
    pub fn new(container: Size, layout: PageLayoutBox) -> Self {
        Self { container, layout }
    }

    /// Fit a page of `page_size` into `container`, preserving aspect ratio and
    /// centering it (letterboxing on the short axis)
    pub fn fitted(container: Size, page_size: Size) -> Self {
        if container.is_degenerate() || page_size.is_degenerate() {
            return Self::new(container, Rect::default());
        }
        let scale = (container.width / page_size.width).min(container.height / page_size.height);
        let size = page_size.scaled(scale);
        let layout = Rect::new(
            (container.width - size.width) / 2.0,
            (container.height - size.height) / 2.0,
            size.width,
            size.height,
        );
        Self::new(container, layout)
    }

    /// False while the layout has not been measured yet
    pub fn is_settled(&self) -> bool {
        !self.layout.is_degenerate() && !self.container.is_degenerate()
    }
}
