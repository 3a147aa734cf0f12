//! # shirabe
//!
//! Command line front end for the dictionary registry and the index
//! container.
//!
//! ```bash
//! shirabe formats
//! shirabe detect ./kanjidic
//! shirabe search たべる --dict ./kanjidic --fields word,reading
//! shirabe kanji 日 --dict ./kanjidic
//! shirabe index list ./kanjidic.index
//! ```

use std::path::PathBuf;

use clap::{Parser, Subcommand};

pub mod commands;
pub mod index;
pub mod logging;
pub mod state;


use self::commands::SearchOptions;
use self::index::IndexAction;
use self::state::AppState;

#[derive(Debug, Parser)]
#[command(name = "shirabe", version, about = "Search Japanese dictionary files")]
pub struct Cli {
    /// JSON config file. Without it, defaults and `SHIRABE_*` variables apply.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// List the registered dictionary formats
    Formats,

    /// Print the format detected for a dictionary file, or every rejection reason
    Detect { descriptor: String },

    /// Search dictionaries for an expression
    Search {
        expression: String,

        /// Dictionary file, repeatable. Defaults to the configured dictionaries.
        #[arg(long = "dict")]
        dictionaries: Vec<PathBuf>,

        /// exact, prefix, suffix or any
        #[arg(long)]
        mode: Option<String>,

        /// Comma separated fields: word, reading, translation
        #[arg(long, value_delimiter = ',')]
        fields: Option<Vec<String>>,

        /// Maximum number of results over all dictionaries
        #[arg(long)]
        limit: Option<usize>,
    },

    /// Show everything known about one kanji
    Kanji {
        kanji: char,

        /// KANJIDIC file. Defaults to the first configured dictionary.
        #[arg(long = "dict")]
        dictionary: Option<PathBuf>,
    },

    /// Inspect and edit index containers
    Index {
        #[command(subcommand)]
        action: IndexAction,
    },
}

fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let config = state::load_config(cli.config.as_deref())?;
    logging::init(&config.logging.filter);

    let state = AppState::new(config);
    run(&state, cli.command)
}

pub fn run(state: &AppState, command: Commands) -> anyhow::Result<()> {
    match command {
        Commands::Formats => commands::formats(state),
        Commands::Detect { descriptor } => commands::detect(state, &descriptor)?,
        Commands::Search {
            expression,
            dictionaries,
            mode,
            fields,
            limit,
        } => {
            let options = SearchOptions::resolve(
                &state.config.search,
                mode.as_deref(),
                fields.as_deref(),
                limit,
            )?;
            let found = commands::search(state, &expression, &dictionaries, &options)?;
            if found == 0 {
                eprintln!("No results for {expression}");
            }
        }
        Commands::Kanji { kanji, dictionary } => {
            commands::kanji(state, kanji, dictionary.as_deref())?
        }
        Commands::Index { action } => index::run(&action)?,
    }
    Ok(())
}
