//! mailsense — personal email assistant over a local LLM

mod config;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

use mailsense_core::{Assistant, ModelGateway, OllamaProvider, ReplyTone};
use mailsense_gateway::AppState;
use mailsense_mail::{DemoMailbox, EmailMessage, Mailbox, OutgoingReply};
use mailsense_store::AnalysisDb;

use config::Config;

#[derive(Parser)]
#[command(name = "mailsense")]
#[command(about = "Personal email assistant: inbox analysis and reply drafting via a local LLM")]
#[command(version)]
struct Cli {
    /// Path to the config file (default: ~/.mailsense/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the JSON HTTP API
    Serve,
    /// List recent messages
    Inbox {
        /// Maximum number of messages to list
        #[arg(long, default_value_t = 25)]
        limit: usize,
    },
    /// Analyze one message and print the full record
    Analyze {
        /// Message id
        id: String,
    },
    /// Draft a reply to a message
    Reply {
        /// Message id
        id: String,
        /// Tone of the draft: professional, friendly, formal, casual
        #[arg(long, default_value = "professional")]
        tone: String,
        /// Free-text instructions for the draft
        #[arg(long)]
        instructions: Option<String>,
    },
    /// Send a reply to a message
    Send {
        /// Message id
        id: String,
        /// Reply text to send
        #[arg(long)]
        body: String,
    },
    /// Print aggregate analysis statistics
    Stats,
    /// Clear the analysis cache
    Reset,
    /// Check configuration and model endpoint availability
    Check,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let config = Config::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Serve => {
            let state = AppState {
                assistant: Arc::new(build_assistant(&config)?),
                mailbox: Arc::new(DemoMailbox::new()?),
            };
            mailsense_gateway::serve(state, &config.server.host, config.server.port).await
        }
        Commands::Inbox { limit } => {
            let mailbox = DemoMailbox::new()?;
            for summary in mailbox.list_recent(limit).await? {
                println!(
                    "{}  {:30}  {}",
                    summary.id,
                    truncate(&summary.sender, 30),
                    summary.subject
                );
            }
            Ok(())
        }
        Commands::Analyze { id } => {
            let assistant = build_assistant(&config)?;
            let message = fetch(&DemoMailbox::new()?, &id).await?;
            let record = assistant.analyze(&message).await?;
            println!("{}", serde_json::to_string_pretty(&record)?);
            Ok(())
        }
        Commands::Reply { id, tone, instructions } => {
            let Some(tone) = ReplyTone::from_label(&tone) else {
                bail!("Unknown tone '{tone}'; expected professional, friendly, formal, or casual");
            };
            let assistant = build_assistant(&config)?;
            let message = fetch(&DemoMailbox::new()?, &id).await?;
            let draft = assistant
                .compose_reply(&message, tone, instructions.as_deref())
                .await;
            println!("{draft}");
            Ok(())
        }
        Commands::Send { id, body } => {
            let mailbox = DemoMailbox::new()?;
            let message = fetch(&mailbox, &id).await?;
            let receipt = mailbox
                .send(OutgoingReply::for_message(&message, body))
                .await
                .context("Failed to send reply; the draft was not delivered")?;
            println!("Sent to {} (receipt {})", receipt.to, receipt.receipt_id);
            Ok(())
        }
        Commands::Stats => {
            let assistant = build_assistant(&config)?;
            println!("{}", serde_json::to_string_pretty(&assistant.stats().await?)?);
            Ok(())
        }
        Commands::Reset => {
            let assistant = build_assistant(&config)?;
            assistant.reset_cache().await?;
            println!("Analysis cache cleared");
            Ok(())
        }
        Commands::Check => check(&config).await,
    }
}

fn build_assistant(config: &Config) -> Result<Assistant> {
    let db_path = config.db_path();
    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    let db = Arc::new(AnalysisDb::new(&db_path)?);

    let primary = Arc::new(OllamaProvider::new(
        &config.model.base_url,
        &config.model.model,
    ));
    let fallback = Arc::new(OllamaProvider::new(
        &config.model.base_url,
        &config.model.fallback_model,
    ));

    Ok(Assistant::new(ModelGateway::new(primary, fallback), db))
}

async fn fetch(mailbox: &DemoMailbox, id: &str) -> Result<EmailMessage> {
    match mailbox.get(id).await? {
        Some(message) => Ok(message),
        None => bail!("No message with id {id}"),
    }
}

async fn check(config: &Config) -> Result<()> {
    println!("endpoint:        {}", config.model.base_url);
    println!("model:           {}", config.model.model);
    println!("fallback model:  {}", config.model.fallback_model);
    println!("database:        {}", config.db_path().display());
    println!("server:          {}:{}", config.server.host, config.server.port);
    println!();

    let probe = OllamaProvider::new(&config.model.base_url, &config.model.model);
    match probe.list_models().await {
        Ok(installed) => {
            println!("Endpoint reachable; {} model(s) installed", installed.len());
            for wanted in [&config.model.model, &config.model.fallback_model] {
                let present = installed.iter().any(|name| name.starts_with(wanted.as_str()));
                let status = if present { "installed" } else { "MISSING" };
                println!("  {wanted}: {status}");
            }
        }
        Err(e) => {
            println!("Endpoint unreachable: {e:#}");
            println!("Start Ollama and pull a model, e.g.: ollama pull llama3.1:8b");
        }
    }
    Ok(())
}

fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        text.to_string()
    } else {
        let cut: String = text.chars().take(max_chars.saturating_sub(1)).collect();
        format!("{cut}…")
    }
}
