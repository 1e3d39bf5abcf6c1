//! mailpilot - AI-assisted email over Gemini and Zapier MCP
//!
//! Subcommands:
//! - `mailpilot serve` - Run the HTTP API
//! - `mailpilot generate <prompt>` - Draft a body and print it
//! - `mailpilot send` - Send a message as written
//! - `mailpilot compose` - Draft a body from a prompt and send it
//! - `mailpilot check-env` - Validate the effective configuration

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use mailconf::{check_config, MailConfig, Verdict};
use mailpilot::{generate_with, telemetry, web, GeminiGenerator, MailService};
use serde::Serialize;
use tracing::info;

#[derive(Parser)]
#[command(name = "mailpilot")]
#[command(about = "Draft emails with Gemini and send them through Zapier MCP")]
#[command(version)]
struct Cli {
    /// Config file to use instead of ./mailpilot.toml
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP API
    Serve {
        /// HTTP port to bind (overrides config)
        #[arg(short, long)]
        port: Option<u16>,

        /// Host to bind (overrides config)
        #[arg(long)]
        host: Option<String>,
    },

    /// Generate an email body and print it
    Generate {
        /// What the email should say
        prompt: String,
    },

    /// Send an email as written
    Send {
        #[arg(long)]
        to: String,

        #[arg(long)]
        subject: String,

        #[arg(long)]
        body: String,
    },

    /// Generate an email body from a prompt, then send it
    Compose {
        #[arg(long)]
        to: String,

        #[arg(long)]
        subject: String,

        #[arg(long)]
        prompt: String,
    },

    /// Check that required settings are present and well-formed
    CheckEnv,
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    let config = MailConfig::load_from(cli.config.as_deref()).context("Failed to load configuration")?;
    let guard = telemetry::init(&config.telemetry)?;

    let result = run(cli.command, config).await;

    if let Some(guard) = guard {
        guard.shutdown();
    }
    result
}

async fn run(command: Commands, mut config: MailConfig) -> Result<ExitCode> {
    match command {
        Commands::Serve { port, host } => {
            if let Some(port) = port {
                config.bind.http_port = port;
            }
            if let Some(host) = host {
                config.bind.host = host;
            }
            serve(config).await?;
            Ok(ExitCode::SUCCESS)
        }
        Commands::Generate { prompt } => {
            let generator = GeminiGenerator::new(&config.gemini);
            let outcome = generate_with(&generator, &prompt).await;
            if outcome.success {
                println!("{}", outcome.generated_body);
                Ok(ExitCode::SUCCESS)
            } else {
                eprintln!("{}", outcome.message);
                Ok(ExitCode::FAILURE)
            }
        }
        Commands::Send { to, subject, body } => {
            let service = MailService::from_config(&config)?;
            let outcome = service.send_email(&to, &subject, &body).await;
            print_outcome(outcome.success, &outcome)
        }
        Commands::Compose {
            to,
            subject,
            prompt,
        } => {
            let service = MailService::from_config(&config)?;
            let outcome = service.generate_and_send_email(&to, &subject, &prompt).await;
            print_outcome(outcome.success, &outcome)
        }
        Commands::CheckEnv => {
            let report = check_config(&config);
            println!("{report}");
            match report.verdict() {
                Verdict::Failed => Ok(ExitCode::FAILURE),
                Verdict::Passed | Verdict::PassedWithWarnings => Ok(ExitCode::SUCCESS),
            }
        }
    }
}

fn print_outcome<T: Serialize>(success: bool, outcome: &T) -> Result<ExitCode> {
    println!("{}", serde_json::to_string_pretty(outcome)?);
    Ok(if success {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

async fn serve(config: MailConfig) -> Result<()> {
    info!("📬 MailPilot starting");

    let service = MailService::from_config(&config).context("Cannot start without Zapier MCP")?;
    let app = web::router(web::AppState::new(Arc::new(service)));

    let addr = format!("{}:{}", config.bind.host, config.bind.http_port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    info!("📬 MailPilot ready!");
    info!("   API: POST http://{}/api/generate-ai-email", addr);
    info!("   API: POST http://{}/api/send-email", addr);
    info!("   API: POST http://{}/api/send-ai-email", addr);
    info!("   Health: GET http://{}/health", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    tokio::select! {
        _ = tokio::signal::ctrl_c() => {
            info!("Received SIGINT, shutting down...");
        }
        _ = sigterm() => {
            info!("Received SIGTERM, shutting down...");
        }
    }
}

#[cfg(unix)]
async fn sigterm() {
    use tokio::signal::unix::{signal, SignalKind};
    match signal(SignalKind::terminate()) {
        Ok(mut sigterm) => {
            sigterm.recv().await;
        }
        Err(e) => {
            tracing::warn!("Failed to install SIGTERM handler: {}", e);
            std::future::pending::<()>().await;
        }
    }
}

#[cfg(not(unix))]
async fn sigterm() {
    std::future::pending::<()>().await;
}
