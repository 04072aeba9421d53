use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::config::Format;

#[derive(Parser, Debug)]
#[command(author, about, long_about = None)]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<Command>,
    /// Show version information. Use -VV for more details.
    #[clap(short = 'V', long, action = clap::ArgAction::Count)]
    pub version: u8,
    /// Log more. -v shows debug output, -vv traces every element.
    #[clap(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,
    /// JSON file with default settings for every command.
    #[clap(long, env = "MAAT_CONFIG", global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Reduce TEI blocks to <ab> documents with supplied, alt and gap markup
    Convert(ConvertArgs),
    /// Print bracketed training text for each converted block
    Train(TrainArgs),
    /// Print masked test cases for each converted block
    Cases(CasesArgs),
}

#[derive(Parser, Debug)]
pub struct InputArgs {
    #[clap(index = 1)]
    /// Path to the TEI-XML file.
    pub path: PathBuf,

    #[clap(long)]
    /// Fail on the first conversion error instead of reporting it.
    pub strict: bool,

    #[clap(short, long)]
    /// Local name of the elements to convert. Defaults to `ab`.
    pub select: Option<String>,
}

#[derive(Parser, Debug)]
pub struct ConvertArgs {
    #[command(flatten)]
    pub input: InputArgs,
}

#[derive(Parser, Debug)]
pub struct TrainArgs {
    #[command(flatten)]
    pub input: InputArgs,
}

#[derive(Parser, Debug)]
pub struct CasesArgs {
    #[command(flatten)]
    pub input: InputArgs,

    #[clap(short, long, value_enum)]
    /// Output format. Defaults to `text`.
    pub format: Option<Format>,

    #[clap(long)]
    /// Build cases from the converted tree, masking every other restoration
    /// with dots and keeping the candidate readings.
    pub evaluation: bool,
}
