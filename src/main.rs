// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Content Guard CLI
//!
//! Command-line front end for the entries backend. Every create and edit
//! goes through the guard: length validation, attack detection, markup
//! stripping and cooldown enforcement.
//!
//! ## Configuration
//!
//! - `GUARD_API_URL`: Entries API base URL (default: http://localhost:5000/api/v1)
//! - `GUARD_TIMEOUT_SECS`: Request timeout (default: transport default)
//! - `GUARD_MIN_CHARS` / `GUARD_MAX_CHARS`: Length window (default: 10 / 50)
//! - `GUARD_COOLDOWN_DEFAULT_SECS`: Fallback cooldown (default: 30)
//! - `RUST_LOG`: Log filter (default: info), logs go to stderr as JSON

use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing::{info, Level};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use content_guard::{
    detector::AttackDetector,
    guard::{Action, Alert, Severity},
    sanitizer::sanitize,
    validator::LengthValidator,
    Config, GuardSession,
};

#[derive(Parser)]
#[command(name = "content-guard", about = "Guarded client for the entries API")]
struct Args {
    /// Entries API base URL (overrides GUARD_API_URL)
    #[arg(long)]
    api_url: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List entries
    List,
    /// Create an entry
    Create { text: String },
    /// Replace the content of an entry
    Edit { id: String, text: String },
    /// Delete an entry
    Delete { id: String },
    /// Show the cooldown status reported by the server
    Status,
    /// Run the local checks on a text without contacting the server
    Check { text: String },
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    tracing_subscriber::registry()
        .with(fmt::layer().json().with_writer(std::io::stderr))
        .with(
            EnvFilter::builder()
                .with_default_directive(Level::INFO.into())
                .from_env_lossy(),
        )
        .init();

    let args = Args::parse();

    let mut config = Config::from_env();
    if let Some(url) = args.api_url {
        config.api.base_url = url;
    }
    config.validate()?;

    if let Command::Check { text } = &args.command {
        return Ok(check(&config, text));
    }

    info!(api = %config.api.base_url, "Starting content guard session");
    let session = GuardSession::connect(config).await?;

    let alert = match args.command {
        Command::List => {
            for entry in session.entries().await {
                println!("{}\t{}\t{}", entry.id, entry.updated_at.to_rfc3339(), entry.content);
            }
            None
        }
        Command::Create { mut text } => Some(session.create(&mut text).await.alert(Action::Create)),
        Command::Edit { id, mut text } => {
            Some(session.update(&id, &mut text).await.alert(Action::Update))
        }
        Command::Delete { id } => Some(session.delete(&id).await.alert(Action::Delete)),
        Command::Status => {
            println!("{}", serde_json::to_string_pretty(&session.cooldown_state())?);
            None
        }
        Command::Check { .. } => None,
    };

    session.end().await;

    Ok(match alert {
        Some(alert) => report(&alert),
        None => ExitCode::SUCCESS,
    })
}

/// Local dry run of the pipeline.
fn check(config: &Config, text: &str) -> ExitCode {
    let verdict = LengthValidator::new(config.validation.clone()).validate(text);
    if let Some(err) = verdict.error() {
        println!("length: {} ({err})", err.code());
        return ExitCode::FAILURE;
    }
    println!("length: ok");

    if AttackDetector::builtin().is_attack(text) {
        println!("attack: flagged");
        return ExitCode::FAILURE;
    }
    println!("attack: clear");
    println!("sanitized: {}", sanitize(text));
    ExitCode::SUCCESS
}

fn report(alert: &Alert) -> ExitCode {
    let label = match alert.severity {
        Severity::Success => "ok",
        Severity::Warning => "warning",
        Severity::Error => "error",
    };
    println!("{label}: {}", alert.message);
    if alert.severity == Severity::Error {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}
