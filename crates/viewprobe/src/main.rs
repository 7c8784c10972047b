//! viewprobe - list and smoke-test the views of a PostgreSQL schema.

mod cli;
mod credentials;
mod report;

use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;

use cli::{Cli, Commands, OutputFormat};
use viewprobe_core::logging::{init_logging, log_dir, LogConfig};
use viewprobe_core::{build_config, connect, DatabaseConnection, ViewService};

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    let mut log_config = LogConfig::new(log_dir());
    if let Some(filter) = &cli.log_filter {
        log_config = log_config.with_filter(filter);
    }
    let logging_guard = init_logging(log_config);

    let params = build_config(&cli.database);
    let creds = credentials::resolve(&cli.service, cli.service_file.as_deref())
        .with_context(|| format!("Failed to resolve credentials for service `{}`", cli.service))?;

    tracing::info!(
        url = %params.display_url(),
        service = %cli.service,
        log_file = logging_guard.has_file_output(),
        "Starting viewprobe"
    );

    let conn = connect(&params, &creds)
        .await
        .with_context(|| format!("Failed to connect to {}", params.display_url()))?;

    let outcome = run(&cli, &conn).await;
    conn.close().await;
    outcome
}

/// Execute the selected subcommand over `conn`.
async fn run(cli: &Cli, conn: &DatabaseConnection) -> Result<ExitCode> {
    let schema = match cli.command.schema() {
        Some(schema) => schema.to_string(),
        None => ViewService::current_schema(conn)
            .await
            .context("Failed to resolve the current schema")?,
    };
    let schema = schema.as_str();

    match &cli.command {
        Commands::Views { .. } => {
            let views = ViewService::list_views(conn, schema)
                .await
                .with_context(|| format!("Failed to list views in schema `{schema}`"))?;
            match cli.format {
                OutputFormat::Text => print!("{}", report::render_views(&views)),
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&views)?),
            }
            Ok(ExitCode::SUCCESS)
        }
        Commands::Probe { view, .. } => {
            let result = ViewService::probe_view(conn, schema, view).await;
            match cli.format {
                OutputFormat::Text => println!("{}", report::render_result(view, &result)),
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&result)?),
            }
            Ok(exit_code(result.is_success()))
        }
        Commands::Check { .. } => {
            let probe_report = ViewService::probe_schema(conn, schema)
                .await
                .with_context(|| format!("Failed to list views in schema `{schema}`"))?;
            match cli.format {
                OutputFormat::Text => print!("{}", report::render_report(&probe_report)),
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&probe_report)?),
            }
            Ok(exit_code(probe_report.is_success()))
        }
    }
}

fn exit_code(success: bool) -> ExitCode {
    if success {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}
