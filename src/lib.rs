#![warn(clippy::pedantic, clippy::nursery)]
pub mod animation;
pub mod app;
pub mod frames;
pub mod render;

use std::time::Duration;

/// Edge length in pixels of the square every frame is resized to.
pub const FRAME_SIZE: u32 = 50;

/// Delay between frames when the source image carries no timing metadata.
pub const DEFAULT_FRAME_DELAY: Duration = Duration::from_millis(100);
