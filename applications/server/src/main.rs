/// Catalog - build a music library into a served tree, and serve it
use anyhow::Context;
use catalog_builder::{FfmpegTranscoder, Orchestrator, ReadmeGenerator};
use catalog_core::LibraryDescriptor;
use catalog_metadata::LoftyMetadataExtractor;
use catalog_server::{api, config::AppConfig, services::BuiltTree, state::AppState};
use clap::{Parser, Subcommand};
use std::{net::SocketAddr, path::PathBuf, sync::Arc};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "catalog")]
#[command(about = "Music library builder and server", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the library into the output tree
    Build {
        /// Configuration file path
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// Read and log everything without writing
        #[arg(long)]
        dry_run: bool,
    },
    /// Start the HTTP server
    Serve {
        /// Configuration file path
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// Port to listen on
        #[arg(short, long)]
        port: Option<u16>,
    },
    /// Generate README.md from a template
    Readme {
        /// Configuration file path
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// Template containing the {{TOC}} marker
        #[arg(short, long)]
        template: Option<PathBuf>,
        /// Output file
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "catalog_server=info,catalog_builder=info,tower_http=info".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Build { config, dry_run } => {
            build(load_config(config)?, dry_run).await?;
        }
        Commands::Serve { config, port } => {
            let mut config = load_config(config)?;
            if let Some(port) = port {
                config.server.port = port;
            }
            serve(config).await?;
        }
        Commands::Readme {
            config,
            template,
            output,
        } => {
            readme(load_config(config)?, template, output).await?;
        }
    }

    Ok(())
}

fn load_config(path: Option<PathBuf>) -> anyhow::Result<AppConfig> {
    let config = AppConfig::load(path.as_deref())?;
    config.validate()?;
    Ok(config)
}

async fn build(config: AppConfig, dry_run: bool) -> anyhow::Result<()> {
    let descriptor_path = config.descriptor_path();
    let descriptor = LibraryDescriptor::load(&descriptor_path)
        .with_context(|| format!("Failed to load {}", descriptor_path.display()))?;

    let transcoder = FfmpegTranscoder::new(&config.build.transcode.ffmpeg_path);
    if config.build.transcode.enabled && !dry_run && !transcoder.is_available().await {
        anyhow::bail!(
            "FFmpeg not found at {:?} (set build.transcode.ffmpeg_path or disable transcoding)",
            transcoder.ffmpeg_path()
        );
    }

    // Ctrl-C cancels in-flight work and discards the staged output
    let cancel = CancellationToken::new();
    let on_signal = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupted, cancelling build");
            on_signal.cancel();
        }
    });

    let orchestrator = Orchestrator::new(
        config.build_options(dry_run),
        Arc::new(LoftyMetadataExtractor::new()),
        Arc::new(transcoder),
    )
    .with_cancellation(cancel);

    let report = orchestrator.build(&descriptor).await?;
    match &report.output {
        Some(output) => tracing::info!("Built tree published at {}", output.display()),
        None => tracing::info!("Dry run complete, nothing written"),
    }

    Ok(())
}

async fn serve(config: AppConfig) -> anyhow::Result<()> {
    let tree = BuiltTree::new(config.output_path(), config.served_extension());
    if !tree.exists().await {
        anyhow::bail!(
            "Built tree not found at {}; run `catalog build` first",
            tree.root().display()
        );
    }

    tracing::info!("Starting Catalog Server");
    tracing::info!("Serving: {}", tree.root().display());
    tracing::info!("Host: {}", config.server.host);
    tracing::info!("Port: {}", config.server.port);

    let app = api::router(AppState::new(Arc::new(tree)));

    let addr = SocketAddr::from((
        config.server.host.parse::<std::net::IpAddr>()?,
        config.server.port,
    ));

    tracing::info!("Server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        tracing::info!("Shutting down");
    }
}

async fn readme(
    config: AppConfig,
    template: Option<PathBuf>,
    output: Option<PathBuf>,
) -> anyhow::Result<()> {
    let root = config.library.root.clone();
    let template = template.unwrap_or_else(|| root.join("README.sample.md"));
    let output = output.unwrap_or_else(|| root.join("README.md"));
    let descriptor = LibraryDescriptor::load(&config.descriptor_path())?;

    let generator = ReadmeGenerator::new(
        root,
        config.build.source_extension.clone(),
        Arc::new(LoftyMetadataExtractor::new()),
    );

    tokio::task::spawn_blocking(move || generator.generate(&descriptor, &template, &output))
        .await??;

    Ok(())
}
