mod cli;

use std::io::Write;
use ydoc::comments::CommentRecord;
use ydoc::tree::Documents;

fn main() {
    use clap::Parser;
    let cli = cli::Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_env("YDOC_LOG"))
        .with_writer(std::io::stderr)
        .init();

    for new_path in cli.directory.iter() {
        match new_path.canonicalize() {
            Err(e) => {
                eprintln!(
                    "Failed to resolve path for -C/--directory {}\n{}",
                    new_path.display(),
                    e
                );
                std::process::exit(1);
            }
            Ok(cwd) => {
                if let Err(err) = std::env::set_current_dir(&cwd) {
                    eprintln!("Failed to set work directory to {}\n{}", cwd.display(), err,);
                    std::process::exit(1);
                }

                tracing::info!(directory=%cwd.display(), "Changed working directory");
            }
        }
    }

    let command_result = match cli.command {
        cli::Command::Comments(comments_cli) => comments(comments_cli),
        cli::Command::Append(append_cli) => append(append_cli),
        cli::Command::Partition(partition_cli) => partition(partition_cli),
        cli::Command::Dev(dev_cli) => dev(dev_cli),
    };

    if let Err(e) = command_result {
        for error in e.chain() {
            eprintln!("{error}")
        }
        std::process::exit(1);
    }
}

fn load(input: &cli::InputArgs) -> anyhow::Result<Documents> {
    match &input.file {
        Some(file_path) => Ok(ydoc::parser::load_file(file_path)?),
        None => {
            let stdin = std::io::read_to_string(std::io::stdin())?;
            Ok(stdin.parse()?)
        }
    }
}

#[derive(serde::Serialize)]
struct DocumentComments {
    document: usize,
    comments: Vec<CommentRecord>,
}

pub fn comments(cli: cli::CommentsCommand) -> anyhow::Result<()> {
    let documents = load(&cli.input)?;
    let annotated = ydoc::comments::annotate(&documents)?;

    let report: Vec<_> = annotated
        .documents()
        .iter()
        .enumerate()
        .map(|(document, annotated)| DocumentComments {
            document,
            comments: ydoc::comments::report(annotated),
        })
        .collect();

    match cli.format {
        cli::OutputFormat::Yaml => serde_yaml::to_writer(std::io::stdout(), &report)?,
        cli::OutputFormat::Json => serde_json::to_writer_pretty(std::io::stdout(), &report)?,
        cli::OutputFormat::Text => {
            let mut stdout = std::io::stdout().lock();
            for record in report.iter().flat_map(|document| &document.comments) {
                write!(stdout, "{record}")?;
            }
        }
    };

    Ok(())
}

pub fn append(cli: cli::AppendCommand) -> anyhow::Result<()> {
    let documents = load(&cli.input)?;
    let text = std::fs::read_to_string(&cli.document)?;

    let appended = ydoc::compose::append(&documents, &text)?;
    print!("{appended}");
    Ok(())
}

pub fn partition(cli: cli::PartitionCommand) -> anyhow::Result<()> {
    let mut config = match &cli.config {
        Some(path) => ydoc::config::Config::load(path)?,
        None => ydoc::config::Config::default(),
    };
    if !cli.kinds.is_empty() {
        config.partition.kinds = cli.kinds.into_iter().collect();
    }

    let documents = load(&cli.input)?;
    let partition = ydoc::compose::partition(
        &documents,
        &ydoc::compose::ResourceKind,
        |kind| config.partition.matches(kind),
    );

    tracing::info!(
        primary = partition.primary.len(),
        secondary = partition.secondary.len(),
        "stream partitioned"
    );

    print!("{}", partition.primary);

    if let Some(path) = &cli.secondary_output {
        std::fs::write(path, partition.secondary.to_string())?;
    }

    Ok(())
}

/// (ydoc-)developer utilities
///
/// A quick way to expose internal structures for debugging purposes
pub fn dev(cli: cli::DevCommand) -> anyhow::Result<()> {
    use cli::DevSubCommand::*;

    let documents = load(&cli.input)?;

    match cli.command {
        Tree => println!("{documents:#?}"),
        Entries => {
            for (index, document) in documents.documents().iter().enumerate() {
                println!("document {index}");
                for entry in ydoc::visit::flatten(document) {
                    println!("{:?}", entry.prefix());
                }
            }
        }
    }

    Ok(())
}
