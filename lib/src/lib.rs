//! Send provider-agnostic emails through the Mailgun HTTP API.
//!
//! ```ignore
//! use mailshot::{Config, Email, Mailgun};
//!
//! let mailgun = Mailgun::new(Config::new("key-xxx", "mg.example.com"))?;
//! let email = Email::new()
//!     .from(("Tony Stark", "tony@example.com"))
//!     .to("steve@example.com")
//!     .subject("Hello")
//!     .text_body("Hi Steve");
//!
//! let result = mailgun.deliver(&email).await?;
//! log::info!("queued as {}", result.id);
//! ```
pub mod address;
pub mod config;
pub mod email;
pub mod error;
pub mod mailgun;
pub mod transport;

pub use address::Address;
pub use crate::config::Config;
pub use email::{Attachment, AttachmentSource, AttachmentType, Email, ProviderOptions, ReplyTo};
pub use error::{Error, ErrorBody};
pub use mailgun::{Mailgun, SendResult};
pub use transport::{ReqwestTransport, Response, Transport, TransportError, TransportFuture};
