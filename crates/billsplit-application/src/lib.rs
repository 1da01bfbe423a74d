//! Application layer for billsplit.
//!
//! `SplitUseCase` wires the core session state, the allocation engine, the
//! persistence repository, the extraction client, the reference-sync
//! protocol, and the swipe-delete controller into the operations a
//! presentation layer calls.

mod split_usecase;
mod telemetry;

pub use split_usecase::{SplitUseCase, UploadOutcome};
pub use telemetry::init_tracing;
