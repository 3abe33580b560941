use anyhow::{Context, Result, bail};
use cardsmith_common::observability::init_logging;
use cardsmith_config::{CardsmithConfig, CardsmithConfigLoader};
use cardsmith_drivers::browser::BrowserLauncher;
use cardsmith_drivers::browser::guard::drain_teardowns;
use cardsmith_pipeline::persist::save_deck;
use cardsmith_pipeline::{Format, Topic};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::time::Duration;
use tracing::{info, warn};
use wiring::build_from_config;
mod wiring;

const TEARDOWN_GRACE: Duration = Duration::from_secs(10);

#[derive(Parser)]
#[command(
    name = "cardsmith",
    about = "Turn an encyclopedia.com article into an importable flashcard deck",
    version
)]
struct Cli {
    /// YAML config file. Without it, the default locations are probed.
    #[arg(short, long, global = true, env = "CARDSMITH_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Look up a topic and print a deck to stdout.
    Generate {
        #[arg(short, long)]
        topic: String,

        /// Format id (1, 2, 3) or name (quizlet, kahoot, gimkit).
        #[arg(short, long)]
        format: Option<String>,

        /// Also write the deck to a timestamped .csv file.
        #[arg(long)]
        save: bool,

        /// Directory for --save; defaults to output.directory.
        #[arg(long)]
        out_dir: Option<PathBuf>,
    },
    /// List the supported formats.
    Formats,
    /// Verify the browser endpoint and model credentials.
    Check,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let loader = match &cli.config {
        Some(path) => CardsmithConfigLoader::new().with_file(path),
        None => CardsmithConfigLoader::new().with_default_locations(),
    };
    let cfg: CardsmithConfig = loader.load().context("loading configuration")?;

    let log_path = init_logging(wiring::log_config(&cfg.logging))?;
    info!(log = %log_path.display(), "cardsmith starting");

    match cli.command {
        Command::Formats => {
            for format in Format::ALL {
                match format.header_line() {
                    Some(header) => println!("{}  {:<8} {}", format.id(), format.name(), header),
                    None => println!("{}  {}", format.id(), format.name()),
                }
            }
            Ok(())
        }
        Command::Check => check(&cfg).await,
        Command::Generate {
            topic,
            format,
            save,
            out_dir,
        } => {
            let format = Format::resolve(format.as_deref().unwrap_or(&cfg.output.default_format));
            let out_dir = save.then(|| out_dir.unwrap_or_else(|| cfg.output.directory.clone()));
            generate(&cfg, &topic, format, out_dir).await
        }
    }
}

async fn generate(
    cfg: &CardsmithConfig,
    topic: &str,
    format: Format,
    out_dir: Option<PathBuf>,
) -> Result<()> {
    let subject = Topic::new(topic)?;
    let wiring = build_from_config(cfg)?;

    eprintln!("Searching {} for {subject}...", cfg.site.root_url);
    let outcome = tokio::select! {
        outcome = wiring.pipeline.run(subject, format) => outcome,
        _ = tokio::signal::ctrl_c() => {
            warn!("interrupted; releasing browser");
            if !drain_teardowns(TEARDOWN_GRACE).await {
                warn!("browser teardown did not finish in time");
            }
            bail!("interrupted");
        }
    };
    let deck = outcome?;

    eprintln!(
        "{} deck for {} ({} lines, source {})",
        deck.format,
        deck.subject,
        deck.item_count(),
        deck.source_url
    );
    print!("{}", deck.text);

    if let Some(dir) = out_dir {
        let path = save_deck(&dir, &deck)?;
        eprintln!("Saved to {}", path.display());
    }

    drain_teardowns(TEARDOWN_GRACE).await;
    Ok(())
}

async fn check(cfg: &CardsmithConfig) -> Result<()> {
    let wiring = build_from_config(cfg)?;
    let mut healthy = true;

    match wiring.launcher.launch().await {
        Ok(session) => {
            if let Err(err) = session.close().await {
                warn!(error = %err, "browser close failed during check");
            }
            eprintln!("browser: ok ({})", cfg.browser.webdriver_url);
        }
        Err(err) => {
            healthy = false;
            eprintln!("browser: FAILED ({err:#})");
        }
    }

    if std::env::var_os(&cfg.llm.api_key_env).is_none() {
        eprintln!("model: {} is not set", cfg.llm.api_key_env);
    }
    match wiring.llm.health_check().await {
        Ok(true) => eprintln!("model: ok ({})", wiring.llm.model_name()),
        Ok(false) => {
            healthy = false;
            eprintln!("model: FAILED ({} rejected the request)", wiring.llm.model_name());
        }
        Err(err) => {
            healthy = false;
            eprintln!("model: FAILED ({err})");
        }
    }

    if !healthy {
        bail!("check failed");
    }
    Ok(())
}
