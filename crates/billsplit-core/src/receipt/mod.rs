//! Receipt domain module.
//!
//! Contains the parsed-bill model shared by the allocation engine,
//! session persistence, and the extraction client.

mod demo;
mod model;

pub use demo::demo_receipt;
pub use model::{Item, Receipt};
