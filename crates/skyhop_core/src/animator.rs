//! Frame-driven animations for the aerial route.
//!
//! The host calls [`RouteAnimator::on_frame`] once per rendered frame with a
//! monotonic timestamp in milliseconds. Each animation holds at most one pending
//! [`FrameHandle`]; a tick either re-requests a frame ([`Tick::Continue`]) or
//! stops ([`Tick::Done`]). Starting a new arc or cancelling drops every pending
//! handle first, so two generations never drive the marker or the line at once.

use tracing::debug;

use crate::{
    constants::{MARKER_PERIOD_MS, REVEAL_DURATION_MS},
    geo::AerialArc,
    location::LngLat,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tick {
    Continue,
    Done,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AnimationKind {
    Marker,
    Reveal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FrameHandle {
    id: u64,
    kind: AnimationKind,
}

impl FrameHandle {
    pub fn kind(&self) -> AnimationKind {
        self.kind
    }
}

/// Pending frame requests. Handles that are cancelled before the next frame never run.
#[derive(Debug, Default)]
pub struct FrameQueue {
    next_id: u64,
    pending: Vec<FrameHandle>,
}

impl FrameQueue {
    pub fn request(&mut self, kind: AnimationKind) -> FrameHandle {
        let handle = FrameHandle {
            id: self.next_id,
            kind,
        };
        self.next_id += 1;
        self.pending.push(handle);
        handle
    }

    pub fn cancel(&mut self, handle: FrameHandle) -> bool {
        let before = self.pending.len();
        self.pending.retain(|pending| *pending != handle);
        self.pending.len() != before
    }

    pub fn cancel_all(&mut self) -> usize {
        let cancelled = self.pending.len();
        self.pending.clear();
        cancelled
    }

    pub fn is_pending(&self, handle: FrameHandle) -> bool {
        self.pending.contains(&handle)
    }

    pub fn pending_for(&self, kind: AnimationKind) -> usize {
        self.pending.iter().filter(|handle| handle.kind == kind).count()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    fn take_due(&mut self) -> Vec<FrameHandle> {
        std::mem::take(&mut self.pending)
    }
}

/// Start time and progress of one animation. The start is latched on the first
/// frame after a reset.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct AnimationState {
    start_timestamp: Option<f64>,
    progress: f64,
}

impl AnimationState {
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn start_timestamp(&self) -> Option<f64> {
        self.start_timestamp
    }

    pub fn progress(&self) -> f64 {
        self.progress
    }

    fn elapsed(&mut self, timestamp_ms: f64) -> f64 {
        let start = *self.start_timestamp.get_or_insert(timestamp_ms);
        (timestamp_ms - start).max(0.0)
    }
}

/// Position in [0, 1) of a looping animation.
pub fn periodic_progress(elapsed_ms: f64, period_ms: f64) -> f64 {
    (elapsed_ms / period_ms) % 1.0
}

/// Position in [0, 1] of a one-shot animation.
pub fn one_shot_progress(elapsed_ms: f64, duration_ms: f64) -> f64 {
    (elapsed_ms / duration_ms).clamp(0.0, 1.0)
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnimationTiming {
    pub marker_period_ms: f64,
    pub reveal_duration_ms: f64,
}

impl Default for AnimationTiming {
    fn default() -> Self {
        Self {
            marker_period_ms: MARKER_PERIOD_MS,
            reveal_duration_ms: REVEAL_DURATION_MS,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkerState {
    Idle,
    Running,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RevealState {
    Idle,
    Revealing,
    Complete,
}

/// What a frame asks the renderer to draw.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FrameUpdate {
    Vehicle { position: LngLat, bearing: f64 },
    Reveal { progress: f64 },
    RevealComplete,
}

pub struct RouteAnimator {
    timing: AnimationTiming,
    arc: Option<AerialArc>,
    frames: FrameQueue,
    marker_state: MarkerState,
    marker: AnimationState,
    reveal_state: RevealState,
    reveal: AnimationState,
}

impl Default for RouteAnimator {
    fn default() -> Self {
        Self::new(AnimationTiming::default())
    }
}

impl RouteAnimator {
    pub fn new(timing: AnimationTiming) -> Self {
        Self {
            timing,
            arc: None,
            frames: FrameQueue::default(),
            marker_state: MarkerState::Idle,
            marker: AnimationState::default(),
            reveal_state: RevealState::Idle,
            reveal: AnimationState::default(),
        }
    }

    /// Starts both animations along `arc`, replacing whatever was running.
    pub fn start(&mut self, arc: AerialArc) {
        self.cancel();

        self.arc = Some(arc);
        self.marker_state = MarkerState::Running;
        self.reveal_state = RevealState::Revealing;
        self.frames.request(AnimationKind::Marker);
        self.frames.request(AnimationKind::Reveal);
    }

    /// Drops all pending frames and returns both animations to idle.
    pub fn cancel(&mut self) {
        let cancelled = self.frames.cancel_all();
        if cancelled > 0 {
            debug!("Cancelled {cancelled} pending animation frames");
        }

        self.arc = None;
        self.marker_state = MarkerState::Idle;
        self.marker.reset();
        self.reveal_state = RevealState::Idle;
        self.reveal.reset();
    }

    pub fn on_frame(&mut self, timestamp_ms: f64) -> Vec<FrameUpdate> {
        let mut updates = Vec::with_capacity(2);

        for handle in self.frames.take_due() {
            let (tick, update) = match handle.kind {
                AnimationKind::Marker => self.tick_marker(timestamp_ms),
                AnimationKind::Reveal => self.tick_reveal(timestamp_ms),
            };

            updates.extend(update);
            if tick == Tick::Continue {
                self.frames.request(handle.kind);
            }
        }

        updates
    }

    pub fn tick_marker(&mut self, timestamp_ms: f64) -> (Tick, Option<FrameUpdate>) {
        let (MarkerState::Running, Some(arc)) = (self.marker_state, self.arc) else {
            return (Tick::Done, None);
        };

        let elapsed = self.marker.elapsed(timestamp_ms);
        let progress = periodic_progress(elapsed, self.timing.marker_period_ms);
        self.marker.progress = progress;

        let update = FrameUpdate::Vehicle {
            position: arc.point_at(progress),
            bearing: arc.heading_at(progress),
        };

        (Tick::Continue, Some(update))
    }

    pub fn tick_reveal(&mut self, timestamp_ms: f64) -> (Tick, Option<FrameUpdate>) {
        if self.reveal_state != RevealState::Revealing {
            return (Tick::Done, None);
        }

        let elapsed = self.reveal.elapsed(timestamp_ms);
        let progress = one_shot_progress(elapsed, self.timing.reveal_duration_ms)
            .max(self.reveal.progress);
        self.reveal.progress = progress;

        if progress >= 1.0 {
            self.reveal_state = RevealState::Complete;
            return (Tick::Done, Some(FrameUpdate::RevealComplete));
        }

        (Tick::Continue, Some(FrameUpdate::Reveal { progress }))
    }

    pub fn is_idle(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn frames(&self) -> &FrameQueue {
        &self.frames
    }

    pub fn marker_state(&self) -> MarkerState {
        self.marker_state
    }

    pub fn reveal_state(&self) -> RevealState {
        self.reveal_state
    }

    pub fn marker(&self) -> &AnimationState {
        &self.marker
    }

    pub fn reveal(&self) -> &AnimationState {
        &self.reveal
    }
}
