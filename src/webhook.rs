//! Webhook entry point for contact events

use crate::error::Result;
use crate::extractor::Extractor;
use crate::store::{ContactStore, fill_first_name};
use crate::types::{EmailAddress, Outcome};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use std::collections::BTreeMap;
use tracing::{error, info, warn};

/// Event type sent when a contact joins a list
pub const LIST_ADDITION: &str = "list_addition";

/// Fields of a webhook event we care about
#[derive(Debug, Clone, Default, Deserialize)]
pub struct WebhookEvent {
    #[serde(default)]
    pub email: Option<String>,

    #[serde(default)]
    pub event: Option<String>,
}

impl WebhookEvent {
    /// Parse an event body.
    ///
    /// Accepts both a bare event object and a gateway envelope whose `body`
    /// field holds the event, either as a JSON string or inline.
    pub fn parse(raw: &str) -> Result<Self> {
        let outer: Value = serde_json::from_str(raw)?;

        let payload = match outer {
            Value::Object(mut map) if map.contains_key("body") => match map.remove("body") {
                Some(Value::String(inner)) => serde_json::from_str(&inner)?,
                Some(inner) => inner,
                None => Value::Null,
            },
            other => other,
        };

        Ok(serde_json::from_value(payload)?)
    }
}

/// HTTP-style response returned to the webhook caller
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct WebhookResponse {
    pub status_code: u16,
    pub headers: BTreeMap<String, String>,
    pub body: Value,
}

impl WebhookResponse {
    fn json(status_code: u16, body: Value) -> Self {
        let headers = BTreeMap::from([
            ("Content-Type".to_string(), "application/json".to_string()),
            ("Access-Control-Allow-Origin".to_string(), "*".to_string()),
        ]);
        Self {
            status_code,
            headers,
            body,
        }
    }

    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.status_code >= 200 && self.status_code < 300
    }

    /// `status` field of the body, when present
    #[must_use]
    pub fn status(&self) -> Option<&str> {
        self.body.get("status").and_then(Value::as_str)
    }
}

/// Handles contact webhook events against a store.
pub struct WebhookHandler<'a, S> {
    store: &'a S,
    extractor: &'a Extractor,
    force_update: bool,
}

impl<'a, S: ContactStore> WebhookHandler<'a, S> {
    pub const fn new(store: &'a S, extractor: &'a Extractor) -> Self {
        Self {
            store,
            extractor,
            force_update: false,
        }
    }

    /// Overwrite first names that are already set
    #[must_use]
    pub const fn force_update(mut self, force: bool) -> Self {
        self.force_update = force;
        self
    }

    /// Process a raw event body. Never fails; errors become 4xx/5xx responses.
    pub fn handle(&self, raw_body: &str) -> WebhookResponse {
        let event = match WebhookEvent::parse(raw_body) {
            Ok(event) => event,
            Err(err) => {
                warn!(error = %err, "invalid webhook payload");
                return WebhookResponse::json(
                    400,
                    json!({ "error": "invalid payload", "message": err.to_string() }),
                );
            }
        };

        let Some(email) = event.email.as_deref().map(str::trim).filter(|e| !e.is_empty()) else {
            warn!("webhook payload without email");
            return WebhookResponse::json(400, json!({ "error": "missing email in payload" }));
        };

        let Some(address) = EmailAddress::parse(email) else {
            warn!(email, "webhook payload with malformed email");
            return WebhookResponse::json(400, json!({ "error": "invalid email", "email": email }));
        };
        // Mailbox form ("Name <addr>") is reduced to the bare address.
        let email = address.address.as_str();

        match event.event.as_deref() {
            None | Some(LIST_ADDITION) => {}
            Some(other) => info!(event = other, "event is not a list addition, processing anyway"),
        }

        match fill_first_name(self.store, self.extractor, email, self.force_update) {
            Ok(outcome) => respond(email, &outcome),
            Err(err) => {
                error!(email, error = %err, "webhook processing failed");
                WebhookResponse::json(
                    500,
                    json!({ "error": "internal server error", "message": err.to_string() }),
                )
            }
        }
    }
}

fn respond(email: &str, outcome: &Outcome) -> WebhookResponse {
    info!(email, status = %outcome.status(), message = %outcome.message(), "webhook processed");

    match outcome {
        Outcome::NotFound => WebhookResponse::json(
            404,
            json!({ "success": false, "message": outcome.message() }),
        ),
        Outcome::AlreadySet { existing } => WebhookResponse::json(
            200,
            json!({
                "success": true,
                "status": outcome.status(),
                "message": outcome.message(),
                "email": email,
                "existingName": existing,
            }),
        ),
        Outcome::Updated { name } => WebhookResponse::json(
            200,
            json!({
                "success": true,
                "status": outcome.status(),
                "message": outcome.message(),
                "email": email,
                "extractedInfo": { "firstName": name },
            }),
        ),
        Outcome::Skipped { .. } => WebhookResponse::json(
            200,
            json!({
                "success": true,
                "status": outcome.status(),
                "message": outcome.message(),
                "email": email,
                "extractedInfo": { "firstName": null },
            }),
        ),
        Outcome::Failed { .. } => WebhookResponse::json(
            500,
            json!({ "error": "internal server error", "message": outcome.message() }),
        ),
    }
}
