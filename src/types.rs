//! Core types for contacts and processing outcomes

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// Attribute holding a contact's first name in the CRM
pub const FIRST_NAME_ATTRIBUTE: &str = "FIRSTNAME";

/// Email address split into its parts
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct EmailAddress {
    /// Display name, when given in mailbox form (`"Anna Rossi" <anna@x.it>`)
    pub display_name: Option<String>,

    /// Bare address (e.g., "anna@example.com")
    pub address: String,

    /// Local part (before the first @)
    pub local_part: String,

    /// Domain extracted from address
    pub domain: String,
}

impl EmailAddress {
    /// Parse a bare address or a single RFC 5322 mailbox.
    ///
    /// Returns `None` when there is no `@` or the local part is empty.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        let s = s.trim();
        if s.is_empty() {
            return None;
        }

        let (display_name, address) = if s.contains('<') {
            let list = mailparse::addrparse(s).ok()?;
            match list.first()? {
                mailparse::MailAddr::Single(info) => (info.display_name.clone(), info.addr.clone()),
                mailparse::MailAddr::Group(_) => return None,
            }
        } else {
            (None, s.to_string())
        };

        let (local, domain) = address.split_once('@')?;
        if local.is_empty() {
            return None;
        }

        Some(Self {
            display_name: display_name.filter(|n| !n.trim().is_empty()),
            local_part: local.to_string(),
            domain: domain.to_string(),
            address,
        })
    }

    /// Whether a raw string is usable as a contact address.
    ///
    /// Blank strings, the literal `undefined` and strings without a local
    /// part are rejected.
    #[must_use]
    pub fn is_valid(s: &str) -> bool {
        let s = s.trim();
        s != "undefined" && Self::parse(s).is_some()
    }
}

impl fmt::Display for EmailAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.display_name {
            Some(name) => write!(f, "{} <{}>", name, self.address),
            None => write!(f, "{}", self.address),
        }
    }
}

/// A CRM contact as returned by the contact store
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Contact {
    #[serde(default)]
    pub email: String,

    /// Free-form CRM attributes (FIRSTNAME, LASTNAME, ...)
    #[serde(default)]
    pub attributes: Map<String, Value>,
}

impl Contact {
    pub fn new(email: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            attributes: Map::new(),
        }
    }

    #[must_use]
    pub fn with_first_name(mut self, name: impl Into<String>) -> Self {
        self.attributes
            .insert(FIRST_NAME_ATTRIBUTE.to_string(), Value::String(name.into()));
        self
    }

    /// Populated first name, ignoring blank values
    #[must_use]
    pub fn first_name(&self) -> Option<&str> {
        self.attributes
            .get(FIRST_NAME_ATTRIBUTE)
            .and_then(Value::as_str)
            .filter(|name| !name.trim().is_empty())
    }

    #[must_use]
    pub fn has_first_name(&self) -> bool {
        self.first_name().is_some()
    }
}

/// Status column of the result log
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Updated,
    Skipped,
    Error,
}

impl Status {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Updated => "updated",
            Self::Skipped => "skipped",
            Self::Error => "error",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What happened to a single contact
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// First name written back to the store
    Updated { name: String },

    /// Contact already has a first name
    AlreadySet { existing: String },

    /// Left untouched on purpose
    Skipped { reason: String },

    /// No such contact in the store
    NotFound,

    /// Processing failed
    Failed { message: String, rate_limited: bool },
}

impl Outcome {
    #[must_use]
    pub const fn status(&self) -> Status {
        match self {
            Self::Updated { .. } => Status::Updated,
            Self::AlreadySet { .. } | Self::Skipped { .. } | Self::NotFound => Status::Skipped,
            Self::Failed { .. } => Status::Error,
        }
    }

    /// Human-readable message for logs
    #[must_use]
    pub fn message(&self) -> String {
        match self {
            Self::Updated { .. } => "first name updated".to_string(),
            Self::AlreadySet { existing } => format!("first name already set ({existing})"),
            Self::Skipped { reason } => reason.clone(),
            Self::NotFound => "contact not found".to_string(),
            Self::Failed { message, .. } => message.clone(),
        }
    }

    /// Name written back, if any
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        match self {
            Self::Updated { name } => Some(name),
            _ => None,
        }
    }

    #[must_use]
    pub const fn is_rate_limited(&self) -> bool {
        matches!(
            self,
            Self::Failed {
                rate_limited: true,
                ..
            }
        )
    }
}
