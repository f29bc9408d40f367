// Enforce at crate level
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::missing_errors_doc, clippy::missing_panics_doc)]
#![allow(clippy::significant_drop_tightening)]

//! First-name inference from email addresses
//!
//! Guesses a person's first name from the local part of their email address
//! using a registry of known Italian first names and a fixed sequence of
//! positional heuristics, then optionally writes it back to a CRM contact.
//!
//! # Features
//!
//! - Deterministic, pure extraction against an injected [`NameRegistry`]
//! - Corpus loading with a built-in fallback set
//! - Contact store abstraction with a Brevo REST implementation
//! - Webhook handler and resumable bulk job for CRM write-back
//!
//! # Example
//!
//! ```rust
//! use email_firstname::{Extractor, NameRegistry};
//!
//! let extractor = Extractor::new(NameRegistry::bundled());
//!
//! assert_eq!(
//!     extractor.extract_first_name("federicamullo@gmail.com").as_deref(),
//!     Some("Federica")
//! );
//! assert_eq!(
//!     extractor.extract_first_name("rosannapa55@example.com").as_deref(),
//!     Some("Rosanna")
//! );
//! ```

mod brevo;
mod capitalize;
mod error;
mod extractor;
mod job;
mod registry;
mod store;
mod types;
mod webhook;

pub use brevo::{BrevoClient, DEFAULT_BASE_URL};
pub use capitalize::capitalize;
pub use error::{Error, Result};
pub use extractor::{DIRECT_OVERRIDES, Extractor, MAX_NAME_LEN, MIN_NAME_LEN, Match, Strategy};
pub use job::{
    Checkpoint, JobConfig, JobDriver, JobSummary, Pause, ResultLog, ResultRecord, ThreadSleep,
};
pub use registry::{DIMINUTIVES, FALLBACK_NAMES, NameRegistry, RegistryLoad};
pub use store::{ContactStore, MemoryStore, fill_first_name};
pub use types::*;
pub use webhook::{LIST_ADDITION, WebhookEvent, WebhookHandler, WebhookResponse};
