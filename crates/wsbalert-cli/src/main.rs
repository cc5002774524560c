mod history;
mod pipeline;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;
use wsbalert_apewisdom::ApeWisdomClient;
use wsbalert_core::AppConfig;
use wsbalert_history::HistoryStore;
use wsbalert_notify::SmtpNotifier;
use wsbalert_signals::SignalClassifier;

use crate::pipeline::{Pipeline, RunOptions, RunOutcome};

#[derive(Debug, Parser)]
#[command(name = "wsbalert")]
#[command(about = "WallStreetBets mention-spike alerter")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Fetch today's counts, update history, classify, and email the report
    Run {
        /// Classify and print the report without writing history or sending mail
        #[arg(long)]
        dry_run: bool,
    },
    /// Show the stored daily counts for one ticker
    History {
        ticker: String,
        /// Number of most recent rows to show
        #[arg(long, default_value_t = 14)]
        days: u32,
    },
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = wsbalert_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    match cli.command {
        None => run_once(&config, false).await,
        Some(Commands::Run { dry_run }) => run_once(&config, dry_run).await,
        Some(Commands::History { ticker, days }) => {
            let store = HistoryStore::new(config.history_path.clone());
            history::run_history(&store, &ticker, days)
        }
    }
}

async fn run_once(config: &AppConfig, dry_run: bool) -> anyhow::Result<()> {
    let source = ApeWisdomClient::from_config(config)?;
    let store = HistoryStore::new(config.history_path.clone());
    let notifier = SmtpNotifier::from_config_or_unavailable(&config.mail);

    tracing::info!(
        url = %source.url(),
        history = %store.path().display(),
        mode = %config.history_mode,
        policy = %config.signal_policy,
        mail_enabled = notifier.is_enabled(),
        dry_run,
        "starting mention check"
    );

    let pipeline = Pipeline {
        source: &source,
        history: &store,
        notifier: &notifier,
        classifier: SignalClassifier::new(config.signal_policy, config.thresholds),
        options: RunOptions {
            today: chrono::Local::now().date_naive(),
            history_mode: config.history_mode,
            dry_run,
        },
    };

    match pipeline.run().await? {
        RunOutcome::NoData => println!("no mention data available; nothing to report"),
        RunOutcome::Completed(summary) => {
            if dry_run {
                println!("{}", summary.report.html);
            }
            println!(
                "{} tickers, {} spikes (buy: [{}], sell: [{}]), {} rows persisted, report {}",
                summary.tickers,
                summary.spikes,
                summary.buys.join(", "),
                summary.sells.join(", "),
                summary.persisted,
                summary.delivery
            );
        }
    }
    Ok(())
}
