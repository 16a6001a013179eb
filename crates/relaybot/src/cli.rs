use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "relaybot")]
#[command(author, version, about = "Telegram bot that downloads YouTube videos and sends them back", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Commands {
    /// Run the bot (default)
    Run,

    /// Download a single video locally, printing progress to the terminal
    Fetch {
        /// YouTube video link
        url: String,

        /// Folder to place the finished file in (defaults to DOWNLOAD_FOLDER)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Print the yt-dlp version and exit
    Check,
}

impl Cli {
    pub fn parse_args() -> Self {
        Self::parse()
    }
}
