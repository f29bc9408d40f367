use anyhow::{Context as _, Result, bail};
use clap::{Args, Parser, Subcommand};
use email_firstname::{
    BrevoClient, DEFAULT_BASE_URL, EmailAddress, Extractor, JobConfig, JobDriver, NameRegistry,
    WebhookHandler,
};
use serde_json::json;
use std::io::{BufRead as _, Read as _};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{debug, warn};

#[derive(Debug, Parser)]
#[command(
    name = "email-firstname",
    version,
    about = "Infer first names from email addresses"
)]
struct Cli {
    /// Name corpus, one name per line (defaults to the bundled corpus)
    #[arg(long, global = true)]
    names: Option<PathBuf>,
    #[arg(long, short, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Print the first name inferred for each address
    Extract(ExtractArgs),
    /// Handle one webhook event body and print the response
    Webhook(WebhookArgs),
    /// Fill in missing first names for every contact
    Bulk(BulkArgs),
}

#[derive(Debug, Args)]
struct ExtractArgs {
    /// Addresses to process; read from stdin, one per line, when omitted
    emails: Vec<String>,
    #[arg(long)]
    json: bool,
}

#[derive(Debug, Args)]
struct BrevoArgs {
    #[arg(long, env = "BREVO_API_KEY", hide_env_values = true)]
    api_key: Option<String>,
    #[arg(long, env = "BREVO_BASE_URL", default_value = DEFAULT_BASE_URL)]
    base_url: String,
}

impl BrevoArgs {
    fn client(&self) -> Result<BrevoClient> {
        let Some(api_key) = self.api_key.as_deref() else {
            bail!("BREVO_API_KEY is not set");
        };
        BrevoClient::with_base_url(api_key, &self.base_url).context("create Brevo client")
    }
}

#[derive(Debug, Args)]
struct WebhookArgs {
    /// File holding the event body; stdin when omitted
    #[arg(long)]
    payload: Option<PathBuf>,
    /// Overwrite first names that are already set
    #[arg(long)]
    force: bool,
    #[command(flatten)]
    brevo: BrevoArgs,
}

#[derive(Debug, Args)]
struct BulkArgs {
    #[arg(long, default_value = "results")]
    results_dir: PathBuf,
    #[arg(long, default_value_t = 25)]
    batch_size: usize,
    /// Only process the first N contacts
    #[arg(long)]
    limit: Option<usize>,
    /// Overwrite first names that are already set
    #[arg(long)]
    force: bool,
    /// Ignore any checkpoint from a previous run
    #[arg(long)]
    no_resume: bool,
    #[command(flatten)]
    brevo: BrevoArgs,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    match run(cli) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<ExitCode> {
    let extractor = Extractor::new(load_registry(cli.names.as_deref()));

    match cli.command {
        Command::Extract(args) => extract(&extractor, args),
        Command::Webhook(args) => webhook(&extractor, args),
        Command::Bulk(args) => bulk(&extractor, args),
    }
}

fn load_registry(path: Option<&std::path::Path>) -> NameRegistry {
    let Some(path) = path else {
        return NameRegistry::bundled();
    };
    let load = NameRegistry::load(path);
    if load.used_fallback {
        warn!(path = %path.display(), "using fallback name list");
    }
    debug!(names = load.registry.len(), "name registry ready");
    load.registry
}

fn extract(extractor: &Extractor, args: ExtractArgs) -> Result<ExitCode> {
    let inputs = if args.emails.is_empty() {
        std::io::stdin()
            .lock()
            .lines()
            .collect::<std::io::Result<Vec<_>>>()
            .context("read addresses from stdin")?
            .into_iter()
            .filter(|line| !line.trim().is_empty())
            .collect()
    } else {
        args.emails
    };

    let mut rows = Vec::with_capacity(inputs.len());
    for input in &inputs {
        let address = EmailAddress::parse(input).map_or_else(|| input.trim().to_string(), |a| a.address);
        let found = extractor.extract(&address);
        rows.push((address, found));
    }

    if args.json {
        let out: Vec<_> = rows
            .iter()
            .map(|(email, found)| {
                json!({
                    "email": email,
                    "firstName": found.as_ref().map(|m| m.name.as_str()),
                    "strategy": found.as_ref().map(|m| m.strategy),
                })
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&out)?);
    } else {
        for (email, found) in &rows {
            println!("{email}\t{}", found.as_ref().map_or("", |m| m.name.as_str()));
        }
    }

    Ok(ExitCode::SUCCESS)
}

fn webhook(extractor: &Extractor, args: WebhookArgs) -> Result<ExitCode> {
    let body = match &args.payload {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("read payload {}", path.display()))?,
        None => {
            let mut body = String::new();
            std::io::stdin()
                .read_to_string(&mut body)
                .context("read payload from stdin")?;
            body
        }
    };

    let client = args.brevo.client()?;
    let response = WebhookHandler::new(&client, extractor)
        .force_update(args.force)
        .handle(&body);

    println!("{}", serde_json::to_string_pretty(&response)?);
    Ok(if response.is_success() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

fn bulk(extractor: &Extractor, args: BulkArgs) -> Result<ExitCode> {
    let client = args.brevo.client()?;
    let config = JobConfig {
        batch_size: args.batch_size,
        limit: args.limit,
        force_update: args.force,
        resume: !args.no_resume,
        results_dir: args.results_dir,
        ..JobConfig::default()
    };
    let results = config.results_path();

    let summary = JobDriver::new(&client, extractor, config)
        .run()
        .context("bulk update")?;

    println!("{summary}");
    println!("results written to {}", results.display());
    Ok(ExitCode::SUCCESS)
}

fn init_logging(verbose: bool) {
    use tracing_subscriber::{EnvFilter, fmt};
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let _ = fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}
