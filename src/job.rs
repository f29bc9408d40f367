//! Bulk back-fill of first names across every contact in a store

use crate::error::Result;
use crate::extractor::Extractor;
use crate::store::{ContactStore, fill_first_name};
use crate::types::{EmailAddress, Outcome, Status};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info, warn};

/// Tunables for a bulk run
#[derive(Debug, Clone)]
pub struct JobConfig {
    /// Contacts per batch; the log is appended once per batch
    pub batch_size: usize,

    /// Pause between batches at the start of the run
    pub initial_pause: Duration,

    /// Retries per contact on a rate-limit signal
    pub max_retries: u32,

    /// Base delay for exponential backoff (`retry_delay * 2^attempt`)
    pub retry_delay: Duration,

    /// Factor applied to the inter-batch pause per rate-limited failure
    pub pause_growth: f64,

    /// Upper bound for the inter-batch pause
    pub max_pause: Duration,

    /// Overwrite first names that are already set
    pub force_update: bool,

    /// Only process the first N contacts
    pub limit: Option<usize>,

    pub results_dir: PathBuf,

    /// Save a checkpoint after at least this many contacts
    pub checkpoint_interval: usize,

    pub checkpoint_file: String,
    pub results_file: String,

    /// Skip contacts already handled by a previous, interrupted run
    pub resume: bool,
}

impl Default for JobConfig {
    fn default() -> Self {
        Self {
            batch_size: 25,
            initial_pause: Duration::from_secs(3),
            max_retries: 3,
            retry_delay: Duration::from_secs(5),
            pause_growth: 1.5,
            max_pause: Duration::from_secs(60),
            force_update: false,
            limit: None,
            results_dir: PathBuf::from("results"),
            checkpoint_interval: 100,
            checkpoint_file: "checkpoint.json".to_string(),
            results_file: "results.csv".to_string(),
            resume: true,
        }
    }
}

impl JobConfig {
    #[must_use]
    pub fn checkpoint_path(&self) -> PathBuf {
        self.results_dir.join(&self.checkpoint_file)
    }

    #[must_use]
    pub fn results_path(&self) -> PathBuf {
        self.results_dir.join(&self.results_file)
    }
}

/// Waits between batches and before retries
pub trait Pause {
    fn pause(&self, duration: Duration);
}

/// Blocks the current thread
#[derive(Debug, Clone, Copy, Default)]
pub struct ThreadSleep;

impl Pause for ThreadSleep {
    fn pause(&self, duration: Duration) {
        std::thread::sleep(duration);
    }
}

/// Progress snapshot allowing an interrupted run to resume
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Checkpoint {
    pub timestamp: DateTime<Utc>,

    /// Contacts processed so far
    pub processed: usize,

    /// Emails not yet processed
    pub remaining: Vec<String>,
}

impl Checkpoint {
    #[must_use]
    pub fn new(processed: usize, remaining: Vec<String>) -> Self {
        Self {
            timestamp: Utc::now(),
            processed,
            remaining,
        }
    }

    /// Read a checkpoint; a missing or unreadable file means "start over"
    #[must_use]
    pub fn load(path: &Path) -> Option<Self> {
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(err) => {
                debug!(path = %path.display(), error = %err, "no checkpoint found");
                return None;
            }
        };

        match serde_json::from_str(&content) {
            Ok(checkpoint) => Some(checkpoint),
            Err(err) => {
                warn!(path = %path.display(), error = %err, "ignoring corrupt checkpoint");
                None
            }
        }
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        fs::write(path, serde_json::to_string_pretty(self)?)?;
        info!(
            path = %path.display(),
            processed = self.processed,
            remaining = self.remaining.len(),
            "checkpoint saved"
        );
        Ok(())
    }
}

/// One row of the result log
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ResultRecord {
    pub email: String,
    pub status: Status,
    pub message: String,
    pub extracted_name: String,
    pub timestamp: DateTime<Utc>,
}

impl ResultRecord {
    #[must_use]
    pub fn new(email: &str, outcome: &Outcome) -> Self {
        Self {
            email: email.to_string(),
            status: outcome.status(),
            message: outcome.message(),
            extracted_name: outcome.name().unwrap_or_default().to_string(),
            timestamp: Utc::now(),
        }
    }
}

/// Append-only CSV log of per-contact results
#[derive(Debug, Clone)]
pub struct ResultLog {
    path: PathBuf,
}

impl ResultLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append rows, writing the header when the file is new
    pub fn append(&self, records: &[ResultRecord]) -> Result<()> {
        if records.is_empty() {
            return Ok(());
        }

        let is_new = fs::metadata(&self.path).map_or(true, |meta| meta.len() == 0);
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;

        let mut writer = csv::WriterBuilder::new()
            .has_headers(is_new)
            .from_writer(file);
        for record in records {
            writer.serialize(record)?;
        }
        writer.flush()?;
        Ok(())
    }

    pub fn read(&self) -> Result<Vec<ResultRecord>> {
        let mut reader = csv::Reader::from_path(&self.path)?;
        let records = reader.deserialize().collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(records)
    }
}

/// Counts per outcome for a run
#[derive(Debug, Clone, Copy, Default, Serialize, PartialEq, Eq)]
pub struct JobSummary {
    pub updated: usize,
    pub skipped: usize,
    pub not_found: usize,
    pub errors: usize,
}

impl JobSummary {
    fn record(&mut self, outcome: &Outcome) {
        match outcome {
            Outcome::Updated { .. } => self.updated += 1,
            Outcome::AlreadySet { .. } | Outcome::Skipped { .. } => self.skipped += 1,
            Outcome::NotFound => self.not_found += 1,
            Outcome::Failed { .. } => self.errors += 1,
        }
    }

    #[must_use]
    pub const fn total(&self) -> usize {
        self.updated + self.skipped + self.not_found + self.errors
    }
}

impl fmt::Display for JobSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} updated, {} skipped, {} not found, {} errors",
            self.updated, self.skipped, self.not_found, self.errors
        )
    }
}

/// Walks every contact of a store in batches, filling in missing first names.
pub struct JobDriver<'a, S, P = ThreadSleep> {
    store: &'a S,
    extractor: &'a Extractor,
    config: JobConfig,
    pause: P,
}

impl<'a, S: ContactStore> JobDriver<'a, S> {
    pub const fn new(store: &'a S, extractor: &'a Extractor, config: JobConfig) -> Self {
        Self {
            store,
            extractor,
            config,
            pause: ThreadSleep,
        }
    }
}

impl<'a, S: ContactStore, P: Pause> JobDriver<'a, S, P> {
    /// Replace how the driver waits
    pub fn with_pause<Q: Pause>(self, pause: Q) -> JobDriver<'a, S, Q> {
        JobDriver {
            store: self.store,
            extractor: self.extractor,
            config: self.config,
            pause,
        }
    }

    #[must_use]
    pub const fn config(&self) -> &JobConfig {
        &self.config
    }

    pub fn run(&self) -> Result<JobSummary> {
        fs::create_dir_all(&self.config.results_dir)?;

        let mut emails = self.store.list_emails()?;
        info!(count = emails.len(), "contacts to consider");

        if let Some(limit) = self.config.limit {
            emails.truncate(limit);
            info!(limit, "contact limit applied");
        }

        let checkpoint_path = self.config.checkpoint_path();
        let mut already_processed = 0;
        if self.config.resume
            && let Some(checkpoint) = Checkpoint::load(&checkpoint_path)
            && !checkpoint.remaining.is_empty()
        {
            let remaining: HashSet<&str> = checkpoint.remaining.iter().map(String::as_str).collect();
            emails.retain(|email| remaining.contains(email.as_str()));
            already_processed = checkpoint.processed;
            info!(remaining = emails.len(), "resuming from checkpoint");
        }

        let batch_size = self.config.batch_size.max(1);
        let batch_count = emails.len().div_ceil(batch_size);
        let log = ResultLog::new(self.config.results_path());

        let mut summary = JobSummary::default();
        let mut pause = self.config.initial_pause;
        let mut offset = 0;
        let mut since_checkpoint = 0;

        for (index, batch) in emails.chunks(batch_size).enumerate() {
            info!(batch = index + 1, of = batch_count, size = batch.len(), "processing batch");

            let mut records = Vec::with_capacity(batch.len());
            for email in batch {
                let outcome = self.process_contact(email);
                log_outcome(email, &outcome);

                if outcome.is_rate_limited() {
                    pause = self.grown_pause(pause);
                    warn!(pause_secs = pause.as_secs_f64(), "inter-batch pause increased");
                }

                summary.record(&outcome);
                records.push(ResultRecord::new(email, &outcome));
            }
            log.append(&records)?;

            offset += batch.len();
            since_checkpoint += batch.len();
            let is_last = index + 1 == batch_count;

            info!(progress = %summary, "batch done");

            if since_checkpoint >= self.config.checkpoint_interval || is_last {
                Checkpoint::new(already_processed + offset, emails[offset..].to_vec())
                    .save(&checkpoint_path)?;
                since_checkpoint = 0;
            }

            if !is_last {
                debug!(pause_secs = pause.as_secs_f64(), "pausing before next batch");
                self.pause.pause(pause);
            }
        }

        info!(summary = %summary, results = %log.path().display(), "job complete");
        Ok(summary)
    }

    /// Next inter-batch pause after a rate-limited failure, capped at `max_pause`
    fn grown_pause(&self, pause: Duration) -> Duration {
        let max_pause = self.config.max_pause;
        Duration::try_from_secs_f64(pause.as_secs_f64() * self.config.pause_growth)
            .map_or(max_pause, |grown| grown.min(max_pause))
    }

    /// Handle one contact, retrying on rate limits with exponential backoff
    pub fn process_contact(&self, email: &str) -> Outcome {
        if !EmailAddress::is_valid(email) {
            return Outcome::Failed {
                message: "invalid or undefined email".to_string(),
                rate_limited: false,
            };
        }

        let mut attempt = 0;
        loop {
            match fill_first_name(self.store, self.extractor, email, self.config.force_update) {
                Ok(outcome) => return outcome,
                Err(err) if err.is_rate_limited() && attempt < self.config.max_retries => {
                    let delay = self
                        .config
                        .retry_delay
                        .saturating_mul(2u32.saturating_pow(attempt));
                    attempt += 1;
                    warn!(
                        email,
                        attempt,
                        max_retries = self.config.max_retries,
                        delay_secs = delay.as_secs_f64(),
                        "rate limited, retrying"
                    );
                    self.pause.pause(delay);
                }
                Err(err) => {
                    return Outcome::Failed {
                        message: format!("{err} (after {attempt} retries)"),
                        rate_limited: err.is_rate_limited(),
                    };
                }
            }
        }
    }
}

fn log_outcome(email: &str, outcome: &Outcome) {
    match outcome {
        Outcome::Updated { name } => info!(email, name = %name, "updated"),
        Outcome::Failed { message, .. } => warn!(email, message = %message, "failed"),
        _ => info!(email, reason = %outcome.message(), "skipped"),
    }
}
