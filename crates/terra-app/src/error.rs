use terra_render::RenderContextError;

/// Fatal errors that end the application.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("event loop error: {0}")]
    EventLoop(#[from] winit::error::EventLoopError),
    #[error("failed to create window: {0}")]
    Window(#[from] winit::error::OsError),
    #[error("GPU initialization failed: {0}")]
    Gpu(#[from] RenderContextError),
    #[error(transparent)]
    Platform(#[from] crate::platform::PlatformError),
}
