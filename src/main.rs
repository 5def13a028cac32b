mod index;
mod output;
mod query;
mod utils;

use anyhow::{bail, Result};
use clap::{Parser, Subcommand};
use query::QueryExecutor;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "sidx")]
#[command(about = "Terminal-first query tool for Sphinx documentation search indexes")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Search query (when no subcommand is given)
    #[arg(trailing_var_arg = true)]
    query: Vec<String>,

    /// Path to the searchindex.js artifact
    #[arg(short, long, default_value = "searchindex.js")]
    index: PathBuf,

    /// Emit results as JSON
    #[arg(long)]
    json: bool,

    /// Show which terms matched each result
    #[arg(short, long)]
    verbose: bool,

    /// Print page links only, one per line
    #[arg(short, long)]
    links: bool,

    /// Disable colored output
    #[arg(long)]
    no_color: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Search the index
    Search {
        /// Query string
        query: String,

        /// Path to the searchindex.js artifact
        #[arg(short, long, default_value = "searchindex.js")]
        index: PathBuf,

        /// Emit results as JSON
        #[arg(long)]
        json: bool,

        /// Show which terms matched each result
        #[arg(short, long)]
        verbose: bool,
    },
    /// Validate index invariants
    Check {
        /// Path to the searchindex.js artifact
        #[arg(default_value = "searchindex.js")]
        index: PathBuf,

        /// Emit the report as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show index statistics
    Stats {
        /// Path to the searchindex.js artifact
        #[arg(default_value = "searchindex.js")]
        index: PathBuf,
    },
    /// List all documents
    Docs {
        /// Path to the searchindex.js artifact
        #[arg(default_value = "searchindex.js")]
        index: PathBuf,
    },
    /// List the object inventory
    Objects {
        /// Path to the searchindex.js artifact
        #[arg(default_value = "searchindex.js")]
        index: PathBuf,

        /// Restrict to one object type (py:class, or just class)
        #[arg(short, long)]
        r#type: Option<String>,

        /// Only show objects whose name contains this substring
        #[arg(short, long)]
        filter: Option<String>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Search {
            query,
            index,
            json,
            verbose,
        }) => {
            run_search(&index, &query, json, verbose, false, true)?;
        }
        Some(Commands::Check { index, json }) => {
            run_check(&index, json)?;
        }
        Some(Commands::Stats { index }) => {
            index::stats::show_stats(&index)?;
        }
        Some(Commands::Docs { index }) => {
            index::stats::list_docs(&index)?;
        }
        Some(Commands::Objects {
            index,
            r#type,
            filter,
        }) => {
            index::stats::list_objects(&index, r#type.as_deref(), filter.as_deref())?;
        }
        None => {
            if cli.query.is_empty() {
                bail!("No query given. Try: sidx <query>, or sidx --help");
            }
            let query_str = cli.query.join(" ");
            run_search(
                &cli.index,
                &query_str,
                cli.json,
                cli.verbose,
                cli.links,
                !cli.no_color,
            )?;
        }
    }

    Ok(())
}

fn run_search(
    index_path: &std::path::Path,
    query_str: &str,
    json: bool,
    verbose: bool,
    links: bool,
    color: bool,
) -> Result<()> {
    let index = index::load_index(index_path)?;
    let query = query::parse_query(query_str);
    let executor = QueryExecutor::new(&index);
    let hits = executor.execute(&query)?;

    if json {
        output::print_hits_json(&hits)?;
    } else if links {
        output::print_links_only(&hits)?;
    } else {
        output::print_hits(&hits, color, verbose)?;
    }

    Ok(())
}

fn run_check(index_path: &std::path::Path, json: bool) -> Result<()> {
    let index = index::load_index(index_path)?;
    let report = index::validate::validate(&index);

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else if report.is_clean() {
        println!(
            "OK: {} documents, {} terms, {} objects",
            index.doc_count(),
            index.terms.len(),
            index.objects.len()
        );
    } else {
        for issue in &report.issues {
            println!("error: {}", issue);
        }
    }

    if !report.is_clean() {
        std::process::exit(1);
    }
    Ok(())
}
