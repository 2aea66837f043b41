mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "blockrun-cli")]
#[command(about = "Blockrun CLI - Submit code blocks to a running Blockrun server", long_about = None)]
struct Cli {
    /// Server base URL
    #[arg(short, long, default_value = "http://127.0.0.1:3000", global = true)]
    server: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Execute one code block
    Exec {
        /// Language identifier (e.g. python, cpp, html)
        #[arg(short, long)]
        language: String,

        /// Read the code from a file
        #[arg(short, long)]
        file: Option<String>,

        /// Inline code snippet (alternative to --file)
        #[arg(short, long)]
        code: Option<String>,

        /// Block identifier reported back by the server
        #[arg(short, long, default_value = "cli")]
        block_id: String,

        /// Append to the language's history and replay the whole program
        #[arg(long)]
        ordered: bool,
    },

    /// Execute several files as one batch of independent blocks
    ExecAll {
        /// Language identifier for every block
        #[arg(short, long)]
        language: String,

        /// Files, one block each (the filename becomes the block id)
        files: Vec<String>,
    },

    /// List supported languages and their execution strategies
    Langs,

    /// Check server health
    Health,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Exec {
            language,
            file,
            code,
            block_id,
            ordered,
        } => {
            commands::exec(&cli.server, &language, file.as_deref(), code, &block_id, ordered)
                .await?;
        }
        Commands::ExecAll { language, files } => {
            commands::exec_all(&cli.server, &language, &files).await?;
        }
        Commands::Langs => {
            commands::list_languages();
        }
        Commands::Health => {
            commands::health(&cli.server).await?;
        }
    }

    Ok(())
}
