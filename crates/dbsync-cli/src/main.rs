mod cli;
mod orchestrate;

use anyhow::Result;
use clap::Parser;
use cli::{Cli, Command};
use dbsync_config::Config;
use dbsync_notify::{NoopNotifier, Notifier, RunReport, WebhookNotifier};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let config = Config::load(&cli.config)?;

    let source_pool = dbsync_db::connect(&config.source_dsn).await?;
    let dest_pool = dbsync_db::connect(&config.dest_dsn).await?;

    let mut report = orchestrate::sync_schema(&config, &source_pool, &dest_pool).await?;

    if matches!(cli.command, Command::SyncData) {
        orchestrate::sync_data(&config, &source_pool, &dest_pool, &mut report).await?;
    }

    print_summary(&report);
    notify(&config, &report)?;

    if report.succeeded {
        Ok(())
    } else {
        std::process::exit(1);
    }
}

fn print_summary(report: &RunReport) {
    for table in &report.tables {
        match &table.error {
            Some(err) => println!("{}: FAILED ({err})", table.table),
            None => println!("{}: ok ({} ms)", table.table, table.elapsed_ms),
        }
    }
    println!("rows copied: {}", report.rows_copied);
}

fn notify(config: &Config, report: &RunReport) -> Result<()> {
    match &config.webhook_url {
        Some(url) => WebhookNotifier::new(url.clone()).notify(report),
        None => NoopNotifier.notify(report),
    }
}
