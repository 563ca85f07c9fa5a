pub mod app;
pub mod bridge;
pub mod dial;
pub mod theme;
