//! CLI entry point for spacetraveling

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use spacetraveling::config::FallbackMode;
use spacetraveling::generator::Generator;
use spacetraveling::SpaceTraveling;

#[derive(Parser)]
#[command(name = "spacetraveling")]
#[command(version)]
#[command(about = "A static blog front-end rendered from a Prismic repository", long_about = None)]
struct Cli {
    /// Set the base directory (defaults to current directory)
    #[arg(short, long, global = true)]
    cwd: Option<PathBuf>,

    /// Enable debug output
    #[arg(short, long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate static files
    #[command(alias = "g")]
    Generate,

    /// Start a local server
    #[command(alias = "s")]
    Server {
        /// Port to listen on
        #[arg(short, long, default_value = "3000")]
        port: u16,

        /// IP address to bind to
        #[arg(short, long, default_value = "localhost")]
        ip: String,

        /// Open browser automatically
        #[arg(short, long)]
        open: bool,

        /// Serve the existing public folder without generating first
        #[arg(long)]
        r#static: bool,

        /// Override the configured fallback for posts not generated yet
        #[arg(long, value_enum)]
        fallback: Option<FallbackArg>,
    },

    /// Clean the public folder
    Clean,

    /// List the posts in the content repository
    List,

    /// Display version information
    Version,
}

#[derive(Clone, Copy, clap::ValueEnum)]
enum FallbackArg {
    Disabled,
    Blocking,
    Placeholder,
}

impl From<FallbackArg> for FallbackMode {
    fn from(arg: FallbackArg) -> Self {
        match arg {
            FallbackArg::Disabled => FallbackMode::Disabled,
            FallbackArg::Blocking => FallbackMode::Blocking,
            FallbackArg::Placeholder => FallbackMode::Placeholder,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.debug {
        "spacetraveling=debug,info"
    } else {
        "spacetraveling=info"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Determine base directory
    let base_dir = match cli.cwd {
        Some(dir) => dir,
        None => std::env::current_dir()?,
    };

    match cli.command {
        Commands::Generate => {
            let site = SpaceTraveling::new(&base_dir)?;
            tracing::info!("Generating static files...");
            let summary = spacetraveling::commands::generate::run(&site).await?;
            println!(
                "Generated {} listing pages and {} posts",
                summary.listing_pages, summary.posts
            );
        }

        Commands::Server {
            port,
            ip,
            open,
            r#static,
            fallback,
        } => {
            let mut site = SpaceTraveling::new(&base_dir)?;
            if let Some(fallback) = fallback {
                site.config.fallback = fallback.into();
            }

            let client = Arc::new(site.client()?);
            let generator = Generator::new(&site)?;

            if !r#static {
                tracing::info!("Generating static files...");
                generator.generate(client.as_ref()).await?;
            }

            tracing::info!("Starting server at http://{}:{}", ip, port);
            spacetraveling::server::start(generator, client, &ip, port, open).await?;
        }

        Commands::Clean => {
            let site = SpaceTraveling::new(&base_dir)?;
            tracing::info!("Cleaning public folder...");
            spacetraveling::commands::clean::run(&site)?;
            println!("Cleaned successfully!");
        }

        Commands::List => {
            let site = SpaceTraveling::new(&base_dir)?;
            spacetraveling::commands::list::run(&site).await?;
        }

        Commands::Version => {
            println!("spacetraveling version {}", env!("CARGO_PKG_VERSION"));
        }
    }

    Ok(())
}
