//! cardface CLI - Main entry point

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::io;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use cardface::{CollectionFile, RenderOptions};

#[derive(Parser)]
#[command(name = "cardface")]
#[command(version)]
#[command(about = "Render flashcards from a collection file", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render the question and answer of cards
    Render {
        /// YAML collection file
        file: PathBuf,

        /// Render only this card
        #[arg(long)]
        card: Option<i64>,

        /// Use the browser formats
        #[arg(long)]
        browser: bool,

        /// Print the output as JSON
        #[arg(long)]
        json: bool,

        /// Keep play references where sound and TTS directives were
        #[arg(long)]
        play_refs: bool,
    },

    /// Show the voice picked for each text-to-speech directive
    Voices {
        /// YAML collection file
        file: PathBuf,

        /// Only directives in this language, e.g. ja_JP
        #[arg(long)]
        lang: Option<String>,
    },
}

fn main() -> Result<()> {
    // Logs go to stderr so --json output stays clean
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "cardface=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    let cli = Cli::parse();
    let mut stdout = io::stdout().lock();

    match cli.command {
        Commands::Render {
            file,
            card,
            browser,
            json,
            play_refs,
        } => {
            let opts = RenderOptions {
                card,
                browser,
                json,
                play_refs,
            };
            cardface::render(CollectionFile::load(&file)?, &opts, &mut stdout)
        }
        Commands::Voices { file, lang } => {
            cardface::voices(CollectionFile::load(&file)?, lang.as_deref(), &mut stdout)
        }
    }
}
