//! Receipt extraction client.
//!
//! Talks to the external service that turns a photographed receipt into a
//! structured [`billsplit_core::receipt::Receipt`]. The service is opaque
//! to the rest of the system: base64 JPEG bytes go in, a parsed receipt or
//! a descriptive error comes out.

mod client;

pub use client::{API_KEY_ENV, ExtractionClient, ReceiptExtractor, URL_ENV};
