//! ydoc cli interface

use clap::{Parser, Subcommand, ValueEnum};
use std::fmt::Formatter;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Change the work directory
    ///
    /// Can be specified multiple times. Note that all
    /// paths on the way to the final path must exist.
    ///
    /// This is equivalent to running { cd <directory>; ydoc ... }
    #[clap(short = 'C', long = "directory", global(true))]
    pub directory: Vec<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// List the comments above and behind every entry
    Comments(CommentsCommand),

    /// Append a document to a stream
    ///
    /// The resulting stream is written to stdout
    Append(AppendCommand),

    /// Split a stream by document kind
    ///
    /// Documents with a configured kind are removed from the
    /// stream written to stdout
    Partition(PartitionCommand),

    /// Print debug information for development
    Dev(DevCommand),
}

#[derive(Parser, Debug)]
pub struct InputArgs {
    /// Read the stream from a file instead of stdin
    #[clap(short = 'f', long = "input-file")]
    pub file: Option<PathBuf>,
}

#[derive(Parser, Debug)]
pub struct CommentsCommand {
    #[clap(flatten)]
    pub input: InputArgs,

    #[arg(short = 'F', long = "output-format", default_value_t)]
    pub format: OutputFormat,
}

#[derive(Parser, Debug)]
pub struct AppendCommand {
    #[clap(flatten)]
    pub input: InputArgs,

    /// File containing the document to append
    #[clap(short = 'a', long = "append-file")]
    pub document: PathBuf,
}

#[derive(Parser, Debug)]
pub struct PartitionCommand {
    #[clap(flatten)]
    pub input: InputArgs,

    /// Config file
    #[clap(long = "config")]
    pub config: Option<PathBuf>,

    /// Kind to move out of the stream, replaces kinds from the config
    ///
    /// Can be specified multiple times.
    #[clap(short = 'k', long = "kind")]
    pub kinds: Vec<String>,

    /// Write the removed documents to this file
    #[clap(short = 'o', long = "secondary-output")]
    pub secondary_output: Option<PathBuf>,
}

#[derive(ValueEnum, Clone, Default, Debug)]
pub enum OutputFormat {
    Json,
    #[default]
    Yaml,
    Text,
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Json => f.write_str("json"),
            OutputFormat::Yaml => f.write_str("yaml"),
            OutputFormat::Text => f.write_str("text"),
        }
    }
}

#[derive(Parser, Debug)]
pub struct DevCommand {
    #[clap(flatten)]
    pub input: InputArgs,

    #[command(subcommand)]
    pub command: DevSubCommand,
}

#[derive(Subcommand, Debug)]
pub enum DevSubCommand {
    /// Parsed tree
    Tree,
    /// Entries in annotation order with their prefixes
    Entries,
}
