//! Core domain for the billsplit engine.
//!
//! Pure domain logic with no I/O: the receipt model, the cost-allocation
//! engine, the active-session state, the session persistence contract, the
//! external-reference sync protocol, and the swipe-to-delete gesture state
//! machine. Storage and network concerns live in the infrastructure and
//! extraction crates.

pub mod error;
pub mod receipt;
pub mod session;
pub mod split;
pub mod swipe;
pub mod sync;

// Re-export common error type
pub use error::BillsplitError;
