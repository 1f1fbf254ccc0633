use clap::Parser;
use finfocus_indices::utils::{logger, validation::Validate};
use finfocus_indices::{
    CliConfig, GitHubPublisher, HttpDocumentSource, IndexUpdater, IndicesError, LocalStorage,
    RunConfig, RunReport,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = CliConfig::parse();

    if cli.json_logs {
        logger::init_json_logger(cli.verbose);
    } else {
        logger::init_cli_logger(cli.verbose);
    }

    tracing::info!("Starting update-indices");
    if cli.verbose {
        tracing::debug!("CLI config: {:?}", cli);
    }

    match run(&cli).await {
        Ok(reports) => {
            for report in &reports {
                print_report(report);
            }
            Ok(())
        }
        Err(e) => {
            tracing::error!(
                "❌ Update failed: {} (Category: {:?}, Severity: {:?})",
                e,
                e.category(),
                e.severity()
            );
            tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 {}", e.recovery_suggestion());

            std::process::exit(e.exit_code());
        }
    }
}

async fn run(cli: &CliConfig) -> Result<Vec<RunReport>, IndicesError> {
    let config = RunConfig::resolve(cli)?;
    config.validate()?;

    let today = config
        .today
        .unwrap_or_else(|| chrono::Local::now().date_naive());
    tracing::info!("📅 Backfilling up to {}", today);

    let source = HttpDocumentSource::new(config.timeout, config.accept_invalid_certs)?;
    let storage = LocalStorage::new(config.data_dir.clone());
    let mut updater = IndexUpdater::new(source, storage);

    if let Some(target) = config.publish.clone() {
        let publisher =
            GitHubPublisher::new(&target.api_base, GitHubPublisher::token_from_env(), config.timeout)?;
        updater = updater.with_publisher(publisher, target);
    }

    updater.run(&config.indices, today).await
}

fn print_report(report: &RunReport) {
    let inserted = report.outcome.inserted();
    match (inserted.first(), inserted.last()) {
        (Some(first), Some(last)) => {
            println!(
                "✅ {}: added {} entries ({} .. {}), {} total",
                report.index,
                inserted.len(),
                first,
                last,
                report.entries
            );
            if let Some(receipt) = &report.receipt {
                println!(
                    "📤 {}: published (sha {})",
                    report.index,
                    receipt.new_sha.as_deref().unwrap_or("unknown")
                );
            }
        }
        _ => println!(
            "⏸️ {}: no new data (source effective {})",
            report.index, report.observation.effective_date
        ),
    }
}
