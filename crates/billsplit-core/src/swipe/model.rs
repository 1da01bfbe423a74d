//! Swipe gesture state types and tuning constants.

use std::time::Duration;

/// Resting offset of a fully open row, in display units.
pub const OPEN_THRESHOLD: f32 = 80.0;

/// How far past the open threshold a live drag may overshoot.
pub const OVERDRAG: f32 = 20.0;

/// Releases at or above this offset snap open.
pub const SNAP_OPEN_FLOOR: f32 = OPEN_THRESHOLD - 20.0;

/// Releases below this offset snap closed.
pub const SNAP_CLOSE_CEILING: f32 = 40.0;

/// Delay before the `moved` flag is cleared after a snap-close, so a
/// genuine tap right after a cancelled drag is not misread as part of the
/// gesture.
pub const MOVED_CLEAR_GRACE: Duration = Duration::from_millis(50);

/// Per-row gesture state.
///
/// One record per session row; every field of the gesture lifecycle is
/// explicit so transitions stay keyed by row id alone.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RowSwipeState {
    /// Current horizontal offset, `0.0` (closed) to
    /// `OPEN_THRESHOLD + OVERDRAG` while dragging
    pub offset: f32,
    /// Offset the row rested at when the current drag began
    pub start_offset: f32,
    /// Set once the pointer moved during the current gesture; suppresses
    /// the trailing click
    pub moved: bool,
    /// Pointer x where the drag began; `None` when no drag is in progress
    pub drag_origin_x: Option<f32>,
    /// Incremented on every drag start; lets a later gesture's lifecycle
    /// take precedence over a pending grace-delay clear
    pub gesture_seq: u64,
}

/// How a released drag resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwipeOutcome {
    /// Row snapped closed. The caller should clear the `moved` flag after
    /// [`MOVED_CLEAR_GRACE`], passing this gesture sequence back so a newer
    /// gesture on the same row wins over the pending clear.
    Closed { grace_seq: u64 },
    /// Row snapped open, exposing the delete affordance. `moved` stays set
    /// until a subsequent tap consumes it.
    Open,
}

/// What a tap on a row means, given the gesture state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TapAction {
    /// The tap was the tail end of a drag (or hit a half-open row); do
    /// nothing
    Ignore,
    /// Row at rest and closed: activate it (load the session)
    Activate,
    /// Row at rest and open: collapse it without activating
    Collapse,
}
