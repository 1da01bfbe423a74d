//! Swipe-to-delete gesture module.
//!
//! Converts a continuous horizontal drag on a stored-session row into a
//! discrete closed/open affordance that gates the row's delete action.
//! State is kept per row id, so gestures on different rows never interact.

mod controller;
mod model;

pub use controller::SwipeDeleteController;
pub use model::{
    MOVED_CLEAR_GRACE, OPEN_THRESHOLD, OVERDRAG, RowSwipeState, SNAP_CLOSE_CEILING,
    SNAP_OPEN_FLOOR, SwipeOutcome, TapAction,
};
