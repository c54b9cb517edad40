//! Timed view animations and redraw rate limiting.
//!
//! Time is always passed in by the caller, so every frame is reproducible.

use std::time::{Duration, Instant};

use crate::model::Point;
use crate::viewport::ViewState;

/// Cubic ease-in-out on `[0, 1]`.
pub fn ease_in_out_cubic(t: f64) -> f64 {
    let t = t.clamp(0.0, 1.0);
    if t < 0.5 {
        4.0 * t * t * t
    } else {
        1.0 - (-2.0 * t + 2.0).powi(3) / 2.0
    }
}

/// One eased transition between two view states.
#[derive(Debug, Clone, PartialEq)]
pub struct ViewAnimation {
    from: ViewState,
    to: ViewState,
    started: Instant,
    duration: Duration,
}

impl ViewAnimation {
    pub fn new(from: ViewState, to: ViewState, started: Instant, duration: Duration) -> Self {
        Self {
            from,
            to,
            started,
            duration,
        }
    }

    pub fn target(&self) -> &ViewState {
        &self.to
    }

    /// Linear progress in `[0, 1]`.
    pub fn progress(&self, now: Instant) -> f64 {
        if self.duration.is_zero() {
            return 1.0;
        }
        let elapsed = now.saturating_duration_since(self.started);
        (elapsed.as_secs_f64() / self.duration.as_secs_f64()).min(1.0)
    }

    pub fn sample(&self, now: Instant) -> ViewState {
        let t = self.progress(now);
        if t >= 1.0 {
            return self.to;
        }
        self.from.interpolate(&self.to, ease_in_out_cubic(t))
    }

    pub fn is_finished(&self, now: Instant) -> bool {
        self.progress(now) >= 1.0
    }

    /// Moves both ends of the animation by a pan applied while it runs.
    pub fn shift_pan(&mut self, delta: Point) {
        self.from.pan_by(delta);
        self.to.pan_by(delta);
    }
}

/// Holds at most one running view animation.
#[derive(Debug, Clone, Default)]
pub struct Animator {
    active: Option<ViewAnimation>,
}

impl Animator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_running(&self) -> bool {
        self.active.is_some()
    }

    /// Target of the running animation, if any.
    pub fn target(&self) -> Option<&ViewState> {
        self.active.as_ref().map(ViewAnimation::target)
    }

    /// Starts animating from `from` to `to`, replacing any running
    /// animation.
    pub fn start(&mut self, from: ViewState, to: ViewState, now: Instant, duration: Duration) {
        if self.active.is_some() {
            tracing::debug!("Replacing running view animation");
        }
        self.active = Some(ViewAnimation::new(from, to, now, duration));
    }

    /// Current view of the running animation. Finishing clears it.
    pub fn tick(&mut self, now: Instant) -> Option<ViewState> {
        let animation = self.active.as_ref()?;
        let view = animation.sample(now);
        if animation.is_finished(now) {
            self.active = None;
        }
        Some(view)
    }

    /// Carries a pan dragged mid-animation into every later frame.
    pub fn shift_pan(&mut self, delta: Point) {
        if let Some(animation) = &mut self.active {
            animation.shift_pan(delta);
        }
    }

    /// Stops the running animation, returning the view to freeze at.
    pub fn cancel(&mut self, now: Instant) -> Option<ViewState> {
        self.active.take().map(|animation| animation.sample(now))
    }
}

/// Coalesces redraw requests to at most one frame per interval.
///
/// A request made between frames stays pending until the next allowed
/// frame; it is never dropped.
#[derive(Debug, Clone)]
pub struct FrameScheduler {
    interval: Duration,
    last_frame: Option<Instant>,
    dirty: bool,
}

impl FrameScheduler {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            last_frame: None,
            dirty: true,
        }
    }

    pub fn request_redraw(&mut self) {
        self.dirty = true;
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Whether a frame should be drawn now. Claims the pending request.
    pub fn should_render(&mut self, now: Instant) -> bool {
        if !self.dirty {
            return false;
        }
        let due = self
            .last_frame
            .is_none_or(|last| now.saturating_duration_since(last) >= self.interval);
        if due {
            self.dirty = false;
            self.last_frame = Some(now);
        }
        due
    }

    /// Time until a pending request may be drawn.
    pub fn time_until_due(&self, now: Instant) -> Option<Duration> {
        if !self.dirty {
            return None;
        }
        Some(match self.last_frame {
            Some(last) => self
                .interval
                .saturating_sub(now.saturating_duration_since(last)),
            None => Duration::ZERO,
        })
    }
}
