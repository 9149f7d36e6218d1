mod display;
mod keys;

use std::io::Read;
use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};

use clauseguard_ai::{Credentials, GenerationClient};
use clauseguard_analysis::Analyzer;
use clauseguard_core::Analysis;
use clauseguard_fetch::{DEFAULT_PROXY_BASE, PageFetcher};

#[derive(Parser)]
#[command(name = "clauseguard", version, about = "Detect risky clauses in terms-of-service text")]
struct Cli {
    /// Page-to-text proxy base URL for `url` analysis.
    #[arg(long, global = true, default_value = DEFAULT_PROXY_BASE)]
    proxy_base: String,

    /// Generation-service model name.
    #[arg(long, global = true, default_value = clauseguard_ai::DEFAULT_MODEL)]
    model: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Analyze contract text from a file, an argument, or stdin.
    Analyze {
        /// Read contract text from this file.
        #[arg(long, conflicts_with = "text")]
        file: Option<PathBuf>,
        /// Contract text given inline.
        #[arg(long)]
        text: Option<String>,
        /// Emit the full result as JSON instead of a card.
        #[arg(long)]
        json: bool,
    },
    /// Fetch a terms page and analyze its text.
    Url {
        url: String,
        #[arg(long)]
        json: bool,
    },
    /// Manage the locally stored API key.
    Key {
        #[command(subcommand)]
        action: keys::KeyAction,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();
    tracing::debug!("clauseguard v{}", env!("CARGO_PKG_VERSION"));
    let cli = Cli::parse();

    match cli.command {
        Command::Analyze { file, text, json } => {
            let contract_text = read_contract_text(file, text)?;
            let analyzer = build_analyzer(&cli.proxy_base, &cli.model);
            let analysis = analyzer.analyze_text(&contract_text).await?;
            emit(&analysis, json)?;
        }
        Command::Url { url, json } => {
            let analyzer = build_analyzer(&cli.proxy_base, &cli.model);
            let analysis = analyzer.analyze_url(&url).await?;
            emit(&analysis, json)?;
        }
        Command::Key { action } => keys::run(action)?,
    }

    Ok(())
}

fn build_analyzer(proxy_base: &str, model: &str) -> Analyzer {
    let credentials = Credentials::from_env_or_file(keys::default_key_file());
    let client = GenerationClient::new(credentials).with_model(model);
    Analyzer::new(client, PageFetcher::new(proxy_base.to_string()))
}

fn read_contract_text(file: Option<PathBuf>, text: Option<String>) -> anyhow::Result<String> {
    let text = if let Some(path) = file {
        std::fs::read_to_string(&path).with_context(|| format!("reading {}", path.display()))?
    } else if let Some(text) = text {
        text
    } else {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("reading contract text from stdin")?;
        buf
    };

    anyhow::ensure!(
        !text.trim().is_empty(),
        "please provide contract text to analyze"
    );
    Ok(text)
}

fn emit(analysis: &Analysis, json: bool) -> anyhow::Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(analysis)?);
    } else {
        display::print_analysis_card(analysis);
    }
    Ok(())
}
