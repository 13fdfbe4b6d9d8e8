//! ct-core — configuration tree editor and validator.
//!
//! Subcommands:
//! - `check`: parse a schema document and report declaration errors
//! - `edit`: run an interactive editing session and persist the values
//! - `show`: print the masked value projection
//! - `schema`: re-emit the canonical schema projection

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};
use ct_core::logging::{init_logging, LogConfig, LogFormat};
use ct_core::store::{load_schema_path, load_values_path, save_values_path};
use ct_core::{edit_node, ConsolePrompter, Error, Node, Result};

/// Process exit code for validation and document errors.
const EXIT_ERROR: u8 = 2;
/// Process exit code for an interrupted editing session.
const EXIT_INTERRUPT: u8 = 130;

/// Conftree - hierarchical configuration editing
#[derive(Parser)]
#[command(name = "ct-core")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[command(flatten)]
    global: GlobalOpts,
}

/// Global options available to all commands
#[derive(Args, Debug)]
struct GlobalOpts {
    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Decrease verbosity (quiet mode)
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Log output format
    #[arg(long, global = true, env = "CT_LOG_FORMAT")]
    log_format: Option<LogFormat>,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate a schema document
    Check(SchemaArgs),

    /// Interactively edit values for a schema
    Edit(EditArgs),

    /// Print the current values (passwords masked)
    Show(ShowArgs),

    /// Print the canonical schema projection
    Schema(SchemaArgs),
}

#[derive(Args, Debug)]
struct SchemaArgs {
    /// Path to the schema document
    #[arg(long)]
    schema: PathBuf,
}

#[derive(Args, Debug)]
struct EditArgs {
    /// Path to the schema document
    #[arg(long)]
    schema: PathBuf,

    /// Existing value document to pre-load
    #[arg(long)]
    values: Option<PathBuf>,

    /// Where to write the edited values (stdout when omitted)
    #[arg(long)]
    out: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct ShowArgs {
    /// Path to the schema document
    #[arg(long)]
    schema: PathBuf,

    /// Value document to load
    #[arg(long)]
    values: PathBuf,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let config = LogConfig::from_env(cli.global.verbose, cli.global.quiet, cli.global.log_format);
    init_logging(&config);

    match run(cli.command) {
        Ok(()) => ExitCode::SUCCESS,
        Err(Error::Interrupted) => {
            eprintln!("interrupted");
            ExitCode::from(EXIT_INTERRUPT)
        }
        Err(err) => {
            eprintln!("error[{}:{}]: {err}", err.category(), err.code());
            ExitCode::from(EXIT_ERROR)
        }
    }
}

fn build_tree(path: &PathBuf) -> Result<Node> {
    let schema = load_schema_path(path)?;
    Node::from_schema(schema)
}

fn count_leaves(node: &Node) -> usize {
    match node {
        Node::Field(_) => 1,
        Node::Group(g) => g.children().iter().map(count_leaves).sum(),
        Node::Multi(m) => m.prototype().children().iter().map(count_leaves).sum(),
    }
}

fn run(command: Commands) -> Result<()> {
    match command {
        Commands::Check(args) => {
            let tree = build_tree(&args.schema)?;
            println!("ok: {} ({} fields)", tree.id(), count_leaves(&tree));
            Ok(())
        }
        Commands::Edit(args) => {
            let mut tree = build_tree(&args.schema)?;
            if let Some(values) = &args.values {
                load_values_path(&mut tree, values)?;
            }
            let mut prompter = ConsolePrompter::new();
            edit_node(&mut tree, &mut prompter)?;
            match &args.out {
                Some(out) => save_values_path(&tree, out)?,
                None => println!("{}", serde_json::to_string_pretty(&tree.values(false))?),
            }
            Ok(())
        }
        Commands::Show(args) => {
            let mut tree = build_tree(&args.schema)?;
            load_values_path(&mut tree, &args.values)?;
            println!("{}", serde_json::to_string_pretty(&tree.values(true))?);
            Ok(())
        }
        Commands::Schema(args) => {
            let tree = build_tree(&args.schema)?;
            println!("{}", serde_json::to_string_pretty(&tree.to_schema())?);
            Ok(())
        }
    }
}
