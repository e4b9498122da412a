use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use review_wizard::config::WizardConfig;
use review_wizard::handoff::Handoff;
use review_wizard::server::{ProxyState, review_routes};
use review_wizard::synth::{Entropy, SynthesisStrategy, create_synthesizer};
use review_wizard::wizard::WizardSession;

#[derive(Parser)]
#[command(name = "review-wizard", version, about = "Guided review collection")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the wizard in this terminal
    Run {
        /// Synthesis strategy: template, remote or proxy
        #[arg(long)]
        strategy: Option<SynthesisStrategy>,
        /// Seed for reproducible drafts
        #[arg(long)]
        seed: Option<u64>,
    },
    /// Serve the generation proxy
    Serve {
        /// Listen address, e.g. 0.0.0.0:8787
        #[arg(long)]
        bind: Option<String>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let mut config = WizardConfig::from_env().context("Failed to load configuration")?;

    // The REPL prints to stderr, so keep console logs quiet there by default
    let default_filter = match cli.command {
        Command::Run { .. } => "warn",
        Command::Serve { .. } => "info",
    };
    let _guard = init_tracing(&config, default_filter)?;

    match cli.command {
        Command::Run { strategy, seed } => {
            if let Some(strategy) = strategy {
                config.strategy = strategy;
            }
            if seed.is_some() {
                config.seed = seed;
            }
            run(config).await
        }
        Command::Serve { bind } => {
            if let Some(bind) = bind {
                config.bind_addr = bind;
            }
            serve(config).await
        }
    }
}

fn init_tracing(config: &WizardConfig, default_filter: &str) -> anyhow::Result<Option<WorkerGuard>> {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_filter));

    let (file_layer, guard) = match &config.log_dir {
        Some(dir) => {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create log directory {}", dir.display()))?;
            let appender = tracing_appender::rolling::daily(dir, "review-wizard.log");
            let (non_blocking, guard) = tracing_appender::non_blocking(appender);
            let layer = tracing_subscriber::fmt::layer()
                .with_writer(non_blocking)
                .with_ansi(false);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false),
        )
        .with(file_layer)
        .init();

    Ok(guard)
}

async fn run(config: WizardConfig) -> anyhow::Result<()> {
    let synthesizer = create_synthesizer(&config, Entropy::from_seed(config.seed))?;
    let handoff = Arc::new(Handoff::system(config.handoff.clone()));
    let session = Arc::new(
        WizardSession::new(synthesizer, handoff).with_debounce(config.synthesis_debounce),
    );

    eprintln!("⭐ {} review wizard v{}", config.business_name, env!("CARGO_PKG_VERSION"));
    eprintln!("   Drafts: {}", config.strategy);
    eprintln!("   Type 'help' for commands.\n");

    review_wizard::cli::run(session).await?;
    Ok(())
}

async fn serve(config: WizardConfig) -> anyhow::Result<()> {
    if config.strategy == SynthesisStrategy::Proxy {
        anyhow::bail!("The proxy cannot use the proxy strategy; set REVIEW_WIZARD_STRATEGY to template or remote");
    }

    let synthesizer = create_synthesizer(&config, Entropy::from_seed(config.seed))?;
    let app = review_routes(ProxyState {
        synthesizer,
        handoff: config.handoff.clone(),
    });

    let listener = tokio::net::TcpListener::bind(&config.bind_addr)
        .await
        .with_context(|| format!("Failed to bind {}", config.bind_addr))?;
    tracing::info!(addr = %config.bind_addr, strategy = %config.strategy, "Generation proxy listening");

    axum::serve(listener, app).await.context("Proxy server failed")?;
    Ok(())
}
