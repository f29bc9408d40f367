//! Contact store backed by the Brevo v3 REST API

use crate::error::{Error, Result};
use crate::store::ContactStore;
use crate::types::{Contact, FIRST_NAME_ATTRIBUTE};
use reqwest::StatusCode;
use reqwest::blocking::{Client, RequestBuilder, Response};
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;
use tracing::{debug, info, warn};
use url::Url;

pub const DEFAULT_BASE_URL: &str = "https://api.brevo.com/v3";

/// Contacts requested per listing page
pub const PAGE_SIZE: usize = 500;

/// Attempts per listing page before a rate limit becomes fatal
const LIST_ATTEMPTS: u32 = 5;

pub const API_KEY_ENV: &str = "BREVO_API_KEY";
pub const BASE_URL_ENV: &str = "BREVO_BASE_URL";

#[derive(Debug, Deserialize)]
struct ContactPage {
    #[serde(default)]
    contacts: Vec<Contact>,

    /// Total number of contacts in the account
    count: Option<usize>,
}

/// Blocking Brevo client
#[derive(Debug, Clone)]
pub struct BrevoClient {
    base_url: Url,
    api_key: String,
    client: Client,
    page_pause: Duration,
    rate_limit_pause: Duration,
}

impl BrevoClient {
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        Self::with_base_url(api_key, DEFAULT_BASE_URL)
    }

    pub fn with_base_url(api_key: impl Into<String>, base_url: &str) -> Result<Self> {
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(Error::Config(format!("{API_KEY_ENV} is not set")));
        }

        let base_url = Url::parse(base_url)?;
        if base_url.cannot_be_a_base() {
            return Err(Error::Config(format!("{base_url} cannot be used as a base url")));
        }

        let client = Client::builder()
            .user_agent(concat!("email-firstname/", env!("CARGO_PKG_VERSION")))
            .timeout(Duration::from_secs(30))
            .connect_timeout(Duration::from_secs(10))
            .build()?;

        Ok(Self {
            base_url,
            api_key,
            client,
            page_pause: Duration::from_secs(1),
            rate_limit_pause: Duration::from_secs(60),
        })
    }

    /// Configure from `BREVO_API_KEY` and optional `BREVO_BASE_URL`
    pub fn from_env() -> Result<Self> {
        let api_key = std::env::var(API_KEY_ENV).unwrap_or_default();
        let base_url = std::env::var(BASE_URL_ENV).unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());
        Self::with_base_url(api_key, &base_url)
    }

    /// Pauses between listing pages and after a rate-limited listing request
    #[must_use]
    pub fn with_pauses(mut self, page: Duration, rate_limit: Duration) -> Self {
        self.page_pause = page;
        self.rate_limit_pause = rate_limit;
        self
    }

    fn contacts_url(&self, email: Option<&str>) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().push("contacts");
            if let Some(email) = email {
                segments.push(email);
            }
        }
        url
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        request
            .header("api-key", self.api_key.as_str())
            .header("Accept", "application/json")
    }

    fn list_page(&self, offset: usize) -> Result<ContactPage> {
        let mut url = self.contacts_url(None);
        url.query_pairs_mut()
            .append_pair("limit", &PAGE_SIZE.to_string())
            .append_pair("offset", &offset.to_string());

        let mut attempt = 0;
        loop {
            let response = self.authorized(self.client.get(url.clone())).send()?;
            match check_status(response) {
                Ok(response) => return Ok(response.json()?),
                Err(Error::RateLimited) if attempt + 1 < LIST_ATTEMPTS => {
                    attempt += 1;
                    warn!(
                        offset,
                        attempt,
                        pause_secs = self.rate_limit_pause.as_secs(),
                        "rate limited while listing contacts, waiting"
                    );
                    std::thread::sleep(self.rate_limit_pause);
                }
                Err(err) => return Err(err),
            }
        }
    }
}

/// Map a response to our error model
fn check_status(response: Response) -> Result<Response> {
    let status = response.status();
    if status == StatusCode::TOO_MANY_REQUESTS {
        return Err(Error::RateLimited);
    }
    if status.is_success() {
        return Ok(response);
    }
    let message = response.text().unwrap_or_default();
    Err(Error::Api {
        status: status.as_u16(),
        message,
    })
}

impl ContactStore for BrevoClient {
    fn get_contact(&self, email: &str) -> Result<Option<Contact>> {
        debug!(email, "fetching contact");
        let response = self
            .authorized(self.client.get(self.contacts_url(Some(email))))
            .send()?;

        if response.status() == StatusCode::NOT_FOUND {
            debug!(email, "contact not found");
            return Ok(None);
        }

        let mut contact: Contact = check_status(response)?.json()?;
        if contact.email.is_empty() {
            contact.email = email.to_string();
        }
        Ok(Some(contact))
    }

    fn update_first_name(&self, email: &str, first_name: &str) -> Result<()> {
        let body = json!({ "attributes": { FIRST_NAME_ATTRIBUTE: first_name } });
        let response = self
            .authorized(self.client.put(self.contacts_url(Some(email))))
            .json(&body)
            .send()?;
        check_status(response)?;
        info!(email, first_name, "contact first name updated");
        Ok(())
    }

    fn list_emails(&self) -> Result<Vec<String>> {
        let mut emails = Vec::new();
        let mut offset = 0;

        loop {
            let page = self.list_page(offset)?;
            let fetched = page.contacts.len();

            for contact in page.contacts {
                if contact.email.trim().is_empty() || contact.email == "undefined" {
                    warn!("ignoring contact without a valid email");
                    continue;
                }
                emails.push(contact.email);
            }

            offset += fetched;
            debug!(fetched, total = ?page.count, so_far = emails.len(), "contacts page fetched");

            if fetched == 0 || page.count.is_none_or(|total| offset >= total) {
                break;
            }
            std::thread::sleep(self.page_pause);
        }

        info!(count = emails.len(), "contacts listed");
        Ok(emails)
    }
}
