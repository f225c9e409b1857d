use axis_query::cli::{self, CheckOptions, CheckResult, CliError};
use axis_query::{OperationRegistry, to_json, to_json_pretty};
use clap::{Parser as ClapParser, Subcommand};
use std::fs;
use std::io::{self, Read};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(ClapParser)]
#[command(name = "axq")]
#[command(about = "axq - query scalars, axis vectors and axis-pair matrices of a data store")]
#[command(version)]
struct Cli {
    /// Log evaluation details to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Log filter directives (overridden by --verbose)
    #[arg(long, env = "AXQ_LOG", default_value = "warn", global = true)]
    log: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate and evaluate a query
    Check {
        /// The query to evaluate
        query: String,

        /// JSON data store file (reads from stdin if not provided)
        #[arg(short, long)]
        store: Option<PathBuf>,

        /// Pretty-print the output
        #[arg(short, long)]
        pretty: bool,

        /// Only validate syntax, don't evaluate
        #[arg(long)]
        syntax_only: bool,
    },

    /// Print the canonical form of a query
    Canonical {
        /// The query to normalize
        query: String,
    },

    /// List the available operations and their parameters
    Operations,

    /// List documentation categories
    Docs,

    /// Show documentation for a specific category
    Doc {
        /// Category name (use 'axq docs' to list categories)
        category: String,
    },
}

fn init_logging(verbose: bool, directives: &str) {
    let filter = if verbose {
        EnvFilter::new("axis_query=debug,axq=debug")
    } else {
        EnvFilter::try_new(directives).unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .without_time()
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose, &cli.log);

    let registry = OperationRegistry::default();
    let result = match cli.command {
        Commands::Check {
            query,
            store,
            pretty,
            syntax_only,
        } => run_check(&registry, query, store, pretty, syntax_only),
        Commands::Canonical { query } => {
            cli::execute_canonical(&query, &registry).map(|canonical| println!("{}", canonical))
        }
        Commands::Operations => {
            print!("{}", cli::operations_listing(&registry));
            Ok(())
        }
        Commands::Docs => {
            print!("{}", cli::get_docs_overview());
            Ok(())
        }
        Commands::Doc { category } => {
            cli::get_doc_category(&category).map(|content| print!("{}", content))
        }
    };

    if let Err(e) = result {
        eprintln!("{}", e);
        std::process::exit(1);
    }
}

fn run_check(
    registry: &OperationRegistry,
    query: String,
    store: Option<PathBuf>,
    pretty: bool,
    syntax_only: bool,
) -> Result<(), CliError> {
    let store = match store {
        Some(path) => Some(fs::read_to_string(path)?),
        None if !syntax_only && !atty::is(atty::Stream::Stdin) => {
            let mut buffer = String::new();
            io::stdin().read_to_string(&mut buffer)?;
            Some(buffer)
        }
        None => None,
    };

    let options = CheckOptions {
        query,
        store,
        syntax_only,
    };

    match cli::execute_check(&options, registry)? {
        CheckResult::SyntaxValid(canonical) => println!("Syntax is valid: {}", canonical),
        CheckResult::Success(result) => {
            let json = if pretty {
                to_json_pretty(result.as_ref())
            } else {
                to_json(result.as_ref())
            };
            println!("{}", json);
        }
    }
    Ok(())
}
