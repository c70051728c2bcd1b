//! Variable-timestep frame loop.
//!
//! Every tick reads the clock once, hands the absolute elapsed time to the
//! update callback, then renders. Animation is a closed-form function of
//! elapsed time, so there is no accumulator, no fixed step and no clamp on
//! long frames: a stalled frame simply jumps forward.

use terra_scene::Clock;

/// Weight of the newest sample in the smoothed fps estimate.
const FPS_SMOOTHING: f64 = 0.1;

#[derive(Debug, Default)]
pub struct FrameLoop {
    previous_time: Option<f64>,
    elapsed: f64,
    frame_time: f64,
    fps: f64,
    frame_count: u64,
}

impl FrameLoop {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run one frame: `update(elapsed_secs)` then `render()`, each exactly once.
    pub fn tick<C: Clock + ?Sized>(
        &mut self,
        clock: &C,
        mut update: impl FnMut(f64),
        mut render: impl FnMut(),
    ) {
        let now = clock.elapsed_secs();
        let frame_time = self.previous_time.map_or(0.0, |prev| (now - prev).max(0.0));
        self.previous_time = Some(now);
        self.elapsed = now;
        self.frame_time = frame_time;

        if frame_time > 0.0 {
            let instant_fps = 1.0 / frame_time;
            self.fps = if self.fps == 0.0 {
                instant_fps
            } else {
                self.fps + (instant_fps - self.fps) * FPS_SMOOTHING
            };
        }

        update(now);
        render();
        self.frame_count += 1;
    }

    /// Clock reading of the last tick, in seconds.
    pub fn elapsed(&self) -> f64 {
        self.elapsed
    }

    /// Seconds between the last two ticks (0 on the first).
    pub fn frame_time(&self) -> f64 {
        self.frame_time
    }

    pub fn fps(&self) -> f64 {
        self.fps
    }

    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use terra_scene::ManualClock;

    #[test]
    fn test_update_receives_absolute_elapsed_time() {
        let mut clock = ManualClock::new(0.0);
        let mut frame_loop = FrameLoop::new();
        let mut seen = Vec::new();

        for t in [0.5, 1.0, 4.25] {
            clock.set(t);
            frame_loop.tick(&clock, |elapsed| seen.push(elapsed), || {});
        }

        assert_eq!(seen, vec![0.5, 1.0, 4.25]);
        assert_eq!(frame_loop.frame_count(), 3);
    }

    #[test]
    fn test_update_then_render_once_per_tick() {
        let clock = ManualClock::new(1.0);
        let mut frame_loop = FrameLoop::new();
        let order = std::cell::RefCell::new(Vec::new());

        frame_loop.tick(
            &clock,
            |_| order.borrow_mut().push("update"),
            || order.borrow_mut().push("render"),
        );

        assert_eq!(*order.borrow(), vec!["update", "render"]);
    }

    #[test]
    fn test_long_frame_is_not_clamped() {
        let mut clock = ManualClock::new(0.0);
        let mut frame_loop = FrameLoop::new();
        frame_loop.tick(&clock, |_| {}, || {});

        clock.advance(10.0);
        let mut last = 0.0;
        frame_loop.tick(&clock, |elapsed| last = elapsed, || {});

        assert_eq!(last, 10.0);
        assert!((frame_loop.frame_time() - 10.0).abs() < 1e-12);
    }

    #[test]
    fn test_first_frame_has_zero_frame_time() {
        let clock = ManualClock::new(3.0);
        let mut frame_loop = FrameLoop::new();
        frame_loop.tick(&clock, |_| {}, || {});
        assert_eq!(frame_loop.frame_time(), 0.0);
        assert_eq!(frame_loop.fps(), 0.0);
        assert_eq!(frame_loop.elapsed(), 3.0);
    }

    #[test]
    fn test_fps_tracks_steady_frame_rate() {
        let mut clock = ManualClock::new(0.0);
        let mut frame_loop = FrameLoop::new();
        for _ in 0..120 {
            clock.advance(1.0 / 60.0);
            frame_loop.tick(&clock, |_| {}, || {});
        }
        assert!((frame_loop.fps() - 60.0).abs() < 0.5, "fps = {}", frame_loop.fps());
    }
}
