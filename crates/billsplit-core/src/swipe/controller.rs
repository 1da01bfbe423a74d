//! Swipe-to-delete gesture state machine.

use super::model::{
    OPEN_THRESHOLD, OVERDRAG, RowSwipeState, SNAP_CLOSE_CEILING, SNAP_OPEN_FLOOR, SwipeOutcome,
    TapAction,
};
use std::collections::HashMap;

/// Per-row gesture state machine for the stored-session list.
///
/// Each row's state is keyed by its session id and is fully independent of
/// every other row. Touch and mouse input feed the same three operations
/// (`start`, `drag`, `end`); the caller maps input events, and only
/// left-button presses should initiate a mouse drag.
///
/// Dragging leftward increases the offset; releasing snaps the row fully
/// closed or fully open by threshold. The `moved` flag marks a gesture
/// that actually moved, so the click that ends a drag is not treated as a
/// tap on the row.
#[derive(Debug, Default)]
pub struct SwipeDeleteController {
    rows: HashMap<String, RowSwipeState>,
}

impl SwipeDeleteController {
    /// Creates a controller with every row closed.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a row's current offset, `0.0` when untouched.
    pub fn offset(&self, id: &str) -> f32 {
        self.rows.get(id).map_or(0.0, |row| row.offset)
    }

    /// Returns true when the row rests fully open.
    pub fn is_open(&self, id: &str) -> bool {
        self.offset(id) == OPEN_THRESHOLD
    }

    /// Returns true when a drag is in progress on the row.
    pub fn is_dragging(&self, id: &str) -> bool {
        self.rows
            .get(id)
            .is_some_and(|row| row.drag_origin_x.is_some())
    }

    /// Begins a drag at `pointer_x`.
    ///
    /// Records the drag origin and the offset the row already rested at
    /// (0 when closed, the open threshold when open), and clears `moved`.
    pub fn start(&mut self, id: &str, pointer_x: f32) {
        let row = self.rows.entry(id.to_string()).or_default();
        row.drag_origin_x = Some(pointer_x);
        row.start_offset = row.offset;
        row.moved = false;
        row.gesture_seq += 1;
    }

    /// Tracks pointer movement during a drag.
    ///
    /// No-op when no drag is in progress for the row. Otherwise the offset
    /// follows the pointer leftward from the resting offset, clamped to
    /// `[0, OPEN_THRESHOLD + OVERDRAG]`, and `moved` is set.
    pub fn drag(&mut self, id: &str, pointer_x: f32) {
        let Some(row) = self.rows.get_mut(id) else {
            return;
        };
        let Some(origin_x) = row.drag_origin_x else {
            return;
        };

        let delta = origin_x - pointer_x;
        row.offset = (row.start_offset + delta).clamp(0.0, OPEN_THRESHOLD + OVERDRAG);
        row.moved = true;
    }

    /// Ends a drag, snapping the row to its final resting offset.
    ///
    /// - Released between zero and the close ceiling: snap fully closed.
    ///   `moved` stays set for now; the caller clears it after the grace
    ///   delay via [`SwipeDeleteController::clear_moved`].
    /// - Released at or past the open floor: snap fully open. `moved`
    ///   stays set until a subsequent tap consumes it.
    /// - Released between the close ceiling and the open floor: snap open.
    /// - Never moved off zero: snap closed, same grace-delay clearing.
    pub fn end(&mut self, id: &str) -> SwipeOutcome {
        let row = self.rows.entry(id.to_string()).or_default();
        row.drag_origin_x = None;

        if row.offset > 0.0 && row.offset < SNAP_CLOSE_CEILING {
            row.offset = 0.0;
            SwipeOutcome::Closed {
                grace_seq: row.gesture_seq,
            }
        } else if row.offset >= SNAP_OPEN_FLOOR {
            row.offset = OPEN_THRESHOLD;
            SwipeOutcome::Open
        } else if row.offset >= SNAP_CLOSE_CEILING {
            row.offset = OPEN_THRESHOLD;
            SwipeOutcome::Open
        } else {
            row.offset = 0.0;
            SwipeOutcome::Closed {
                grace_seq: row.gesture_seq,
            }
        }
    }

    /// Clears the `moved` flag after the grace delay.
    ///
    /// Applies only when `grace_seq` still matches the row's gesture
    /// sequence and no new drag is in progress: a gesture that started
    /// after the snap-close owns the flag, and its lifecycle wins over the
    /// stale timer.
    pub fn clear_moved(&mut self, id: &str, grace_seq: u64) {
        if let Some(row) = self.rows.get_mut(id) {
            if row.gesture_seq == grace_seq && row.drag_origin_x.is_none() {
                row.moved = false;
            }
        }
    }

    /// Interprets a tap on the row.
    ///
    /// A tap that trails a drag (`moved` set) is consumed and ignored. At
    /// rest, a closed row activates and an open row collapses.
    pub fn tap(&mut self, id: &str) -> TapAction {
        let Some(row) = self.rows.get_mut(id) else {
            return TapAction::Activate;
        };

        if row.moved {
            row.moved = false;
            return TapAction::Ignore;
        }

        if row.offset == 0.0 {
            TapAction::Activate
        } else if row.offset == OPEN_THRESHOLD {
            TapAction::Collapse
        } else {
            TapAction::Ignore
        }
    }

    /// Resets every row to closed. Triggered by any interaction outside
    /// the row list.
    pub fn clear_all(&mut self) {
        self.rows.clear();
    }

    /// Drops a deleted row's state.
    pub fn remove(&mut self, id: &str) {
        self.rows.remove(id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_drag_left_90_snaps_open() {
        let mut swipes = SwipeDeleteController::new();
        swipes.start("row", 200.0);
        swipes.drag("row", 110.0);

        let outcome = swipes.end("row");

        assert_eq!(outcome, SwipeOutcome::Open);
        assert_eq!(swipes.offset("row"), OPEN_THRESHOLD);
        assert!(swipes.rows["row"].moved);
    }

    #[test]
    fn test_drag_left_20_snaps_closed_and_grace_clears_moved() {
        let mut swipes = SwipeDeleteController::new();
        swipes.start("row", 200.0);
        swipes.drag("row", 180.0);

        let outcome = swipes.end("row");
        let SwipeOutcome::Closed { grace_seq } = outcome else {
            panic!("expected snap close, got {outcome:?}");
        };

        assert_eq!(swipes.offset("row"), 0.0);
        assert!(swipes.rows["row"].moved);

        swipes.clear_moved("row", grace_seq);
        assert!(!swipes.rows["row"].moved);
    }

    #[test]
    fn test_drag_left_50_snaps_open() {
        let mut swipes = SwipeDeleteController::new();
        swipes.start("row", 200.0);
        swipes.drag("row", 150.0);

        assert_eq!(swipes.end("row"), SwipeOutcome::Open);
        assert_eq!(swipes.offset("row"), OPEN_THRESHOLD);
    }

    #[test]
    fn test_stationary_release_snaps_closed() {
        let mut swipes = SwipeDeleteController::new();
        swipes.start("row", 200.0);

        let outcome = swipes.end("row");

        assert!(matches!(outcome, SwipeOutcome::Closed { .. }));
        assert_eq!(swipes.offset("row"), 0.0);
        assert!(!swipes.rows["row"].moved);
    }

    #[test]
    fn test_offset_clamps_to_overdrag_ceiling() {
        let mut swipes = SwipeDeleteController::new();
        swipes.start("row", 500.0);
        swipes.drag("row", 0.0);

        assert_eq!(swipes.offset("row"), OPEN_THRESHOLD + OVERDRAG);
    }

    #[test]
    fn test_offset_clamps_to_zero_on_rightward_drag() {
        let mut swipes = SwipeDeleteController::new();
        swipes.start("row", 100.0);
        swipes.drag("row", 300.0);

        assert_eq!(swipes.offset("row"), 0.0);
    }

    #[test]
    fn test_drag_without_start_is_noop() {
        let mut swipes = SwipeDeleteController::new();
        swipes.drag("row", 50.0);
        assert_eq!(swipes.offset("row"), 0.0);
    }

    #[test]
    fn test_swipe_back_from_open_closes() {
        let mut swipes = SwipeDeleteController::new();
        swipes.start("row", 200.0);
        swipes.drag("row", 110.0);
        swipes.end("row");
        assert!(swipes.is_open("row"));

        // Drag rightward from the open resting offset down to 20.
        swipes.start("row", 100.0);
        swipes.drag("row", 160.0);
        let outcome = swipes.end("row");

        assert!(matches!(outcome, SwipeOutcome::Closed { .. }));
        assert_eq!(swipes.offset("row"), 0.0);
    }

    #[test]
    fn test_later_gesture_wins_over_pending_grace_clear() {
        let mut swipes = SwipeDeleteController::new();
        swipes.start("row", 200.0);
        swipes.drag("row", 180.0);
        let SwipeOutcome::Closed { grace_seq } = swipes.end("row") else {
            panic!("expected snap close");
        };

        // A second gesture starts before the grace timer fires.
        swipes.start("row", 200.0);
        swipes.drag("row", 170.0);

        swipes.clear_moved("row", grace_seq);

        // The stale clear must not touch the live gesture's flag.
        assert!(swipes.rows["row"].moved);
    }

    #[test]
    fn test_tap_after_drag_is_ignored_once() {
        let mut swipes = SwipeDeleteController::new();
        swipes.start("row", 200.0);
        swipes.drag("row", 110.0);
        swipes.end("row");

        assert_eq!(swipes.tap("row"), TapAction::Ignore);
        // moved was consumed; the open row now collapses on tap.
        assert_eq!(swipes.tap("row"), TapAction::Collapse);
    }

    #[test]
    fn test_tap_on_untouched_row_activates() {
        let mut swipes = SwipeDeleteController::new();
        assert_eq!(swipes.tap("row"), TapAction::Activate);
    }

    #[test]
    fn test_tap_on_closed_row_after_grace_activates() {
        let mut swipes = SwipeDeleteController::new();
        swipes.start("row", 200.0);
        swipes.drag("row", 180.0);
        let SwipeOutcome::Closed { grace_seq } = swipes.end("row") else {
            panic!("expected snap close");
        };
        swipes.clear_moved("row", grace_seq);

        assert_eq!(swipes.tap("row"), TapAction::Activate);
    }

    #[test]
    fn test_rows_are_independent() {
        let mut swipes = SwipeDeleteController::new();
        swipes.start("a", 200.0);
        swipes.drag("a", 110.0);
        swipes.end("a");

        assert!(swipes.is_open("a"));
        assert_eq!(swipes.offset("b"), 0.0);
        assert_eq!(swipes.tap("b"), TapAction::Activate);
    }

    #[test]
    fn test_clear_all_closes_every_row() {
        let mut swipes = SwipeDeleteController::new();
        swipes.start("a", 200.0);
        swipes.drag("a", 110.0);
        swipes.end("a");

        swipes.clear_all();

        assert_eq!(swipes.offset("a"), 0.0);
        assert!(!swipes.is_open("a"));
    }
}
