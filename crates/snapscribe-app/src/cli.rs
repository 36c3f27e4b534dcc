use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "snapscribe")]
#[command(about = "Capture screen regions, extract their text and save them as Markdown notes")]
pub struct Cli {
    /// JSON config file. Without it everything comes from SNAPSCRIBE_* variables.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Interactive session driven from stdin
    Run {
        /// Also listen for the capture hotkey
        #[arg(long)]
        hotkey: bool,
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Capture one region, optionally extract its text, and save it
    Capture {
        #[arg(long, allow_hyphen_values = true)]
        x: i32,
        #[arg(long, allow_hyphen_values = true)]
        y: i32,
        #[arg(long)]
        width: i32,
        #[arg(long)]
        height: i32,
        #[arg(long)]
        ocr: bool,
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// List monitors and their geometry
    Monitors,
}
