//! Mailgun `messages` API adapter.
//!
//! `payload` maps an `Email` to Mailgun form fields, `encode` turns those
//! into a request body, and `client` sends it and reads the answer.
pub mod api;
mod client;
pub mod encode;
pub mod payload;

pub use api::SendResult;
pub use client::Mailgun;
