use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod entry;
mod geo;
mod import;
mod publish;
mod scrape;
mod store;
mod types;

#[derive(Parser)]
#[command(name = "parking-map-data")]
#[command(about = "名古屋パーキング マップデータ管理ツール")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Add one parking lot interactively from a Google Maps share URL
    Add {
        /// Google Maps share URL (prompted for when omitted)
        url: Option<String>,
        /// JSON store holding the parking records
        #[arg(long, default_value = "parking_data.json")]
        data: PathBuf,
        /// Skip the git commit/push prompt
        #[arg(long)]
        no_push: bool,
    },
    /// Bulk-import parking lots from the CSV template
    Import {
        /// CSV template file
        #[arg(default_value = "parking_template.csv")]
        csv: PathBuf,
        /// JSON store holding the parking records
        #[arg(long, default_value = "parking_data.json")]
        data: PathBuf,
        /// Skip the git commit/push prompt
        #[arg(long)]
        no_push: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Add { url, data, no_push } => entry::run_add(url, &data, no_push),
        Commands::Import { csv, data, no_push } => import::run_import(&csv, &data, no_push),
    }
}
