use std::f64::consts::PI;

pub const STROKE_MARGIN: f64 = 12.0; // inset of the arc square from the widget edge
pub const INDICATOR_RADIUS: f64 = 0.38; // orbit of the indicator, relative to size
pub const INDICATOR_SIZE: f64 = 0.12; // indicator diameter when the host gives none
pub const TEXT_SIZE: f64 = 0.20;
pub const TEXT_PADDING: f64 = 0.31;
pub const LABEL_SIZE: f64 = 0.08;
pub const LABEL_PADDING: f64 = 0.02;
pub const LABEL_WIDTH: f64 = 0.45;

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance(&self, other: Point) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn center(&self) -> Point {
        Point::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }
}

/// Font sizes and paddings of the two text lines, all in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Typography {
    pub value_size: f64,
    pub value_padding: f64,
    pub label_size: f64,
    pub label_padding: f64,
    pub label_width: f64,
}

/// Layout cache of a knob, rebuilt on every size change.
///
/// The arc is always drawn into a square of side `size - 2 * STROKE_MARGIN`,
/// centered along the longer dimension of the widget.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct KnobGeometry {
    pub width: f64,
    pub height: f64,
    pub size: f64,
    pub center: Point,
    pub indicator_size: f64,
    pub arc_rect: Rect,
    pub typography: Typography,
}

impl KnobGeometry {
    pub fn new(width: f64, height: f64, indicator_size: Option<f64>) -> Self {
        let (width, height) = (width.max(0.0), height.max(0.0));
        let size = width.min(height);
        let side = (size - 2.0 * STROKE_MARGIN).max(0.0);

        // the square sits at the stroke margin on the short axis and is
        // centered on the long one
        let arc_rect = Rect::new(
            (width - side) / 2.0,
            (height - side) / 2.0,
            side,
            side,
        );

        Self {
            width,
            height,
            size,
            center: Point::new(width / 2.0, height / 2.0),
            indicator_size: indicator_size.unwrap_or(size * INDICATOR_SIZE),
            arc_rect,
            typography: Typography {
                value_size: size * TEXT_SIZE,
                value_padding: size * TEXT_PADDING,
                label_size: size * LABEL_SIZE,
                label_padding: size * LABEL_PADDING,
                label_width: width * LABEL_WIDTH,
            },
        }
    }

    pub fn radius(&self) -> f64 {
        self.size / 2.0
    }

    /// Touches closer to the center than half the radius never start a drag.
    pub fn in_deadzone(&self, point: Point) -> bool {
        self.center.distance(point) <= self.radius() / 2.0
    }

    pub fn indicator_center(&self, progress: f64) -> Point {
        let r = self.size * INDICATOR_RADIUS;
        let theta = progress * 2.0 * PI;
        Point::new(
            self.center.x + r * theta.sin(),
            self.center.y - r * theta.cos(),
        )
    }

    pub fn indicator_origin(&self, progress: f64) -> Point {
        let c = self.indicator_center(progress);
        let half = self.indicator_size / 2.0;
        Point::new(c.x - half, c.y - half)
    }

    pub fn indicator_rect(&self, progress: f64) -> Rect {
        let origin = self.indicator_origin(progress);
        Rect::new(
            origin.x,
            origin.y,
            self.indicator_size,
            self.indicator_size,
        )
    }
}
