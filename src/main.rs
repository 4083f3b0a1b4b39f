use std::{
    io::{self, Read},
    path::PathBuf,
};

use anyhow::Context as _;
use clap::{Parser as ClapParser, Subcommand};
use dataview::cli::{self, EvalOptions, QueryOptions};
use log::LevelFilter;

#[derive(ClapParser)]
#[command(name = "dataview")]
#[command(about = "Dataview - render tables and lists from Markdown front matter")]
#[command(version)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render every .mdtmpl template in the docs directory to .md
    Render {
        /// Docs directory to scan
        #[arg(env = "DATAVIEW_DOCS_DIR", default_value = "docs")]
        docs_dir: PathBuf,
    },

    /// Render a single query against the docs directory
    Query {
        /// The dataview query, e.g. 'TABLE file.link FROM #howto'
        query: String,

        /// Docs directory to scan
        #[arg(short, long = "docs", env = "DATAVIEW_DOCS_DIR", default_value = "docs")]
        docs_dir: PathBuf,

        /// Docs-relative path of the page bound to `this`
        #[arg(short, long)]
        page: Option<String>,
    },

    /// Parse a query and describe it
    Check {
        /// The dataview query to check
        query: String,
    },

    /// Solve an expression against a JSON context
    Eval {
        /// The expression to solve
        expression: String,

        /// JSON object of root names (reads from stdin if not provided)
        #[arg(short, long)]
        input: Option<String>,

        /// Pretty-print the output
        #[arg(short, long)]
        pretty: bool,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level.as_str())).init();

    match cli.command {
        Commands::Render { docs_dir } => {
            let written = cli::execute_render(&docs_dir)
                .with_context(|| format!("rendering templates under {}", docs_dir.display()))?;
            for path in written {
                println!("{}", path.display());
            }
        }
        Commands::Query { query, docs_dir, page } => {
            let options = QueryOptions { query, docs_dir, page };
            print!("{}", cli::execute_query(&options)?);
        }
        Commands::Check { query } => {
            println!("{}", cli::execute_check(&query)?);
        }
        Commands::Eval {
            expression,
            input,
            pretty,
        } => run_eval(expression, input, pretty)?,
    }
    Ok(())
}

fn run_eval(expression: String, input: Option<String>, pretty: bool) -> anyhow::Result<()> {
    let input = match input {
        Some(s) => Some(s),
        None if !atty::is(atty::Stream::Stdin) => {
            let mut buffer = String::new();
            io::stdin().read_to_string(&mut buffer).context("reading context from stdin")?;
            Some(buffer)
        }
        None => None,
    };

    let output = cli::execute_eval(&EvalOptions { expression, input })?;
    let json = if pretty {
        serde_json::to_string_pretty(&output)
    } else {
        serde_json::to_string(&output)
    }?;
    println!("{}", json);
    Ok(())
}
