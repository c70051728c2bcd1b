//! Keeping the camera and drawing buffer in step with the viewport.

use terra_render::{DrawingBuffer, PerspectiveCamera, Viewport};

/// Anything with a resizable backing store in physical pixels.
pub trait RenderTarget {
    fn set_buffer_size(&mut self, width: u32, height: u32);
    fn buffer_size(&self) -> (u32, u32);
}

impl RenderTarget for DrawingBuffer {
    fn set_buffer_size(&mut self, width: u32, height: u32) {
        self.set_size(width, height);
    }

    fn buffer_size(&self) -> (u32, u32) {
        self.size()
    }
}

/// Match camera aspect and drawing buffer to `viewport`.
///
/// The buffer is `logical size · min(device_pixel_ratio, max_pixel_ratio)`.
/// A collapsed (zero-area) viewport is ignored, leaving the previous state.
/// Returns `true` if anything was applied.
pub fn handle_resize(
    viewport: &Viewport,
    camera: &mut PerspectiveCamera,
    target: &mut impl RenderTarget,
    max_pixel_ratio: f64,
) -> bool {
    if !viewport.is_visible() {
        tracing::debug!(
            "Ignoring resize to {}x{}",
            viewport.width,
            viewport.height
        );
        return false;
    }

    camera.aspect = viewport.aspect();
    camera.update_projection_matrix();

    let (width, height) = viewport.buffer_size(max_pixel_ratio);
    if target.buffer_size() != (width, height) {
        tracing::debug!(
            "Drawing buffer {}x{} (ratio {})",
            width,
            height,
            viewport.effective_pixel_ratio(max_pixel_ratio)
        );
        target.set_buffer_size(width, height);
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use terra_render::DEFAULT_MAX_PIXEL_RATIO;

    fn setup(width: f64, height: f64, dpr: f64) -> (PerspectiveCamera, DrawingBuffer) {
        let mut camera = PerspectiveCamera::new(45.0, 1.0, 0.1, 1000.0);
        let mut buffer = DrawingBuffer::new(1, 1);
        handle_resize(
            &Viewport::new(width, height, dpr),
            &mut camera,
            &mut buffer,
            DEFAULT_MAX_PIXEL_RATIO,
        );
        (camera, buffer)
    }

    #[test]
    fn test_initial_aspect() {
        let (camera, buffer) = setup(800.0, 600.0, 1.0);
        assert!((camera.aspect - 1.333).abs() < 1e-3);
        assert_eq!(buffer.buffer_size(), (800, 600));
    }

    #[test]
    fn test_resize_updates_projection() {
        let (mut camera, mut buffer) = setup(800.0, 600.0, 1.0);
        let before = camera.projection_matrix();
        handle_resize(
            &Viewport::new(1600.0, 600.0, 1.0),
            &mut camera,
            &mut buffer,
            DEFAULT_MAX_PIXEL_RATIO,
        );
        let expected = PerspectiveCamera::new(45.0, 1600.0 / 600.0, 0.1, 1000.0);
        assert_ne!(camera.projection_matrix(), before);
        assert!(
            camera
                .projection_matrix()
                .abs_diff_eq(expected.projection_matrix(), 1e-6)
        );
    }

    #[test]
    fn test_resize_buffer_scales_with_capped_ratio() {
        for (dpr, expected) in [(1.0, (1024, 768)), (2.0, (2048, 1536)), (3.0, (2048, 1536))] {
            let (mut camera, mut buffer) = setup(800.0, 600.0, dpr);
            handle_resize(
                &Viewport::new(1024.0, 768.0, dpr),
                &mut camera,
                &mut buffer,
                DEFAULT_MAX_PIXEL_RATIO,
            );
            assert!((camera.aspect - 1024.0 / 768.0).abs() < 1e-6);
            assert_eq!(buffer.buffer_size(), expected, "dpr {dpr}");
        }
    }

    #[test]
    fn test_resize_idempotent() {
        let (mut camera, mut buffer) = setup(1024.0, 768.0, 2.0);
        let viewport = Viewport::new(1024.0, 768.0, 2.0);
        handle_resize(&viewport, &mut camera, &mut buffer, DEFAULT_MAX_PIXEL_RATIO);
        let (aspect, projection, size) =
            (camera.aspect, camera.projection_matrix(), buffer.buffer_size());
        handle_resize(&viewport, &mut camera, &mut buffer, DEFAULT_MAX_PIXEL_RATIO);
        assert_eq!(camera.aspect, aspect);
        assert_eq!(camera.projection_matrix(), projection);
        assert_eq!(buffer.buffer_size(), size);
    }

    #[test]
    fn test_collapsed_viewport_ignored() {
        let (mut camera, mut buffer) = setup(800.0, 600.0, 1.0);
        let applied = handle_resize(
            &Viewport::new(0.0, 600.0, 1.0),
            &mut camera,
            &mut buffer,
            DEFAULT_MAX_PIXEL_RATIO,
        );
        assert!(!applied);
        assert!((camera.aspect - 800.0 / 600.0).abs() < 1e-6);
        assert_eq!(buffer.buffer_size(), (800, 600));
    }

    #[derive(Default)]
    struct CountingTarget {
        size: (u32, u32),
        writes: usize,
    }

    impl RenderTarget for CountingTarget {
        fn set_buffer_size(&mut self, width: u32, height: u32) {
            self.size = (width, height);
            self.writes += 1;
        }

        fn buffer_size(&self) -> (u32, u32) {
            self.size
        }
    }

    #[test]
    fn test_unchanged_size_skips_target_write() {
        let mut camera = PerspectiveCamera::default();
        let mut target = CountingTarget::default();
        let viewport = Viewport::new(640.0, 480.0, 1.5);
        handle_resize(&viewport, &mut camera, &mut target, DEFAULT_MAX_PIXEL_RATIO);
        handle_resize(&viewport, &mut camera, &mut target, DEFAULT_MAX_PIXEL_RATIO);
        assert_eq!(target.size, (960, 720));
        assert_eq!(target.writes, 1);
    }
}
