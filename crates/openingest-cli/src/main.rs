//! OpenIngest CLI - flatten repositories, web pages, files and query results into text

use clap::{Parser, Subcommand};
use openingest::{IngestError, Ingester};
use std::io::{self, Write};
use std::path::PathBuf;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Characters shown when no output file is given
const PREVIEW_CHARS: usize = 500;

/// OpenIngest - normalize content sources into LLM-ready text
#[derive(Parser, Debug)]
#[command(name = "openingest")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable debug logging
    #[arg(long, short, global = true)]
    verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Ingest a GitHub repository
    Github {
        /// Repository URL or owner/name
        url: String,

        /// Write the full text to this file
        #[arg(long, short)]
        output: Option<PathBuf>,

        /// Access token for private repositories and higher rate limits
        #[arg(long, env = "GITHUB_TOKEN", hide_env_values = true)]
        token: Option<String>,

        /// Only ingest files with this extension (repeatable)
        #[arg(long = "include-ext", value_name = "EXT")]
        include_ext: Vec<String>,
    },
    /// Ingest the visible text of a web page
    Web {
        /// Page URL
        url: String,

        /// Write the full text to this file
        #[arg(long, short)]
        output: Option<PathBuf>,
    },
    /// Ingest a local file (CSV, Excel, JSON, PDF, DOCX or text)
    File {
        /// Path to the file
        path: PathBuf,

        /// Write the full text to this file
        #[arg(long, short)]
        output: Option<PathBuf>,
    },
    /// Run a SQL query and ingest the result set
    Db {
        /// Connection string, e.g. sqlite://data.db or postgres://user@host/db
        connection: String,

        /// Query to run
        query: String,

        /// Write the full text to this file
        #[arg(long, short)]
        output: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let (result, output) = run(cli.command).await;
    let text = match result {
        Ok(text) => text,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };

    match output {
        Some(path) => {
            if let Err(e) = tokio::fs::write(&path, &text).await {
                eprintln!("Error: Failed to write {}: {}", path.display(), e);
                std::process::exit(1);
            }
            writeln_safe(&format!("Content saved to {}", path.display()));
        }
        None => writeln_safe(&preview(&text)),
    }
}

/// Install the process-wide subscriber; logs go to stderr
fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(filter)
        .init();
}

/// Run one subcommand, returning the text and where it should go
async fn run(command: Commands) -> (Result<String, IngestError>, Option<PathBuf>) {
    match command {
        Commands::Github {
            url,
            output,
            token,
            include_ext,
        } => {
            let mut builder = Ingester::builder().github_token(token);
            for ext in include_ext {
                builder = builder.include_extension(ext);
            }
            (builder.build().ingest_github(&url).await, output)
        }
        Commands::Web { url, output } => (Ingester::default().ingest_url(&url).await, output),
        Commands::File { path, output } => (Ingester::default().ingest_file(path).await, output),
        Commands::Db {
            connection,
            query,
            output,
        } => (
            Ingester::default()
                .ingest_database(&connection, &query)
                .await,
            output,
        ),
    }
}

/// First characters of the text followed by an ellipsis
fn preview(text: &str) -> String {
    let mut out: String = text.chars().take(PREVIEW_CHARS).collect();
    out.push_str("...");
    out
}

/// Write to stdout, exit silently on broken pipe
fn writeln_safe(s: &str) {
    let stdout = io::stdout();
    let mut handle = stdout.lock();
    if let Err(e) = writeln!(handle, "{}", s) {
        if e.kind() == io::ErrorKind::BrokenPipe {
            std::process::exit(0);
        }
        eprintln!("Error writing to stdout: {}", e);
        std::process::exit(1);
    }
}
