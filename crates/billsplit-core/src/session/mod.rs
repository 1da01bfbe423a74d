//! Session domain module.
//!
//! A session pairs one receipt with its people list and assignment map,
//! persisted under an opaque id so a bill can be shared and resumed.

mod manager;
mod model;
mod repository;

pub use manager::SessionManager;
pub use model::StoredSession;
pub use repository::SessionRepository;
