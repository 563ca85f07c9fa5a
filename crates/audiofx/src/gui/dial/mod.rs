pub mod view;
pub mod widget;

pub use view::draw;
pub use widget::KnobWidget;

pub const ARC_WIDTH: f64 = 18.0;
pub const SHADOW_OFFSET: (f64, f64) = (1.0, -2.0);
pub const BODY_INSET: f64 = 0.14; // knob body radius shrink, relative to the arc radius
pub const FOREGROUND_SIZE: i32 = 256;
pub const FONT_FACE: &str = "Sans";
