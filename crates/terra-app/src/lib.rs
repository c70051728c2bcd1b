//! Application shell: window, event loop and frame loop for the Terra scene.

pub mod error;
pub mod frame_loop;
pub mod input;
pub mod platform;
pub mod window;

pub use error::AppError;
pub use frame_loop::FrameLoop;
pub use input::PointerState;
pub use platform::{PlatformDirs, PlatformError};
pub use window::{AppState, run, window_attributes_from_config};
