//! CLI entry point for miswag-blog

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use miswag_blog::commands::list::ListOptions;

#[derive(Parser)]
#[command(name = "miswag-blog")]
#[command(author = "Miswag Engineering")]
#[command(version)]
#[command(about = "Render the Miswag technical blog from JSON and Markdown content", long_about = None)]
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
    /// Initialize a new blog
    Init {
        /// Directory to initialize (defaults to current directory)
        #[arg(default_value = ".")]
        folder: PathBuf,
    },

    /// Generate static files
    #[command(alias = "g")]
    Generate {
        /// Watch for file changes
        #[arg(short, long)]
        watch: bool,
    },

    /// Start a local server
    #[command(alias = "s")]
    Server {
        /// Port to listen on
        #[arg(short, long, default_value = "4000")]
        port: u16,

        /// IP address to bind to
        #[arg(short, long, default_value = "localhost")]
        ip: String,

        /// Open browser automatically
        #[arg(short, long)]
        open: bool,

        /// Disable file watching and live reload
        #[arg(long)]
        r#static: bool,
    },

    /// Remove the output folder
    Clean,

    /// List site information
    List {
        /// Type of content to list (articles, categories, team)
        #[arg(default_value = "articles")]
        r#type: String,

        /// Only articles whose title, description or keywords contain this text
        #[arg(short, long)]
        search: Option<String>,

        /// Category id, or "all"
        #[arg(long)]
        category: Option<String>,

        /// date-desc, date-asc, title-asc or title-desc
        #[arg(long)]
        sort: Option<String>,
    },

    /// Display version information
    Version,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.debug {
        "miswag_blog=debug,info"
    } else {
        "miswag_blog=info"
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
        None => std::env::current_dir().context("Failed to read current directory")?,
    };

    match cli.command {
        Commands::Init { folder } => {
            let target_dir = if folder.is_absolute() {
                folder
            } else {
                base_dir.join(folder)
            };
            tracing::info!("Initializing blog in {:?}", target_dir);
            miswag_blog::commands::init::init_site(&target_dir)?;
            println!("Initialized blog in {:?}", target_dir);
        }

        Commands::Generate { watch } => {
            let blog = miswag_blog::Blog::new(&base_dir)?;
            tracing::info!("Generating static files...");

            blog.generate().await?;
            println!("Generated successfully!");

            if watch {
                tracing::info!("Watching for file changes...");
                miswag_blog::commands::generate::watch(&blog).await?;
            }
        }

        Commands::Server {
            port,
            ip,
            open,
            r#static,
        } => {
            let blog = miswag_blog::Blog::new(&base_dir)?;
            let watch = !r#static && !blog.is_remote();

            tracing::info!("Starting server at http://{}:{}", ip, port);
            miswag_blog::server::start(&blog, &ip, port, watch, open).await?;
        }

        Commands::Clean => {
            let blog = miswag_blog::Blog::new(&base_dir)?;
            tracing::info!("Cleaning output folder...");
            blog.clean()?;
            println!("Cleaned successfully!");
        }

        Commands::List {
            r#type,
            search,
            category,
            sort,
        } => {
            let blog = miswag_blog::Blog::new(&base_dir)?;
            let options = ListOptions {
                search,
                category,
                sort,
            };
            miswag_blog::commands::list::run(&blog, &r#type, &options).await?;
        }

        Commands::Version => {
            println!("miswag-blog version {}", env!("CARGO_PKG_VERSION"));
        }
    }

    Ok(())
}
