use clap::{Parser, Subcommand};
use std::path::PathBuf;

const HELP_EPILOG: &str = r#"Server options can also be provided via environment variables:
  CONFIG_PATH (default: ./config.yaml, optional)
  DB_PATH     (default: data/starfall.db or config.db_path)
  PORT        (default: 5252 or config.listen_port)
  RUST_LOG    (default: info)

The `render` command writes the landing page as a static HTML file.
"#;

#[derive(Debug, Parser)]
#[command(
    name = "starfall-server",
    version,
    about = "Starfall web server",
    long_about = None,
    after_long_help = HELP_EPILOG,
)]
pub struct Cli {
    /// Optional subcommand. Without one, runs the server.
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run the HTTP server (default)
    Serve,
    /// Render the landing page to stdout or a file
    Render {
        /// Copyright year (defaults to the current year)
        #[arg(long)]
        year: Option<i32>,
        /// Output file; stdout when omitted
        #[arg(long)]
        out: Option<PathBuf>,
    },
}
