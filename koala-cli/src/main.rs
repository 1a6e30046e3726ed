//! Koala selector query CLI
//!
//! Runs CSS selectors against a document described as JSON and prints the
//! matching elements in document order.

mod tree_json;

use std::fmt::Write as _;
use std::fs;
use std::io::{self, Read};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use koala_dom::{DomTree, NodeId};
use koala_selectors::{EngineConfig, QueryEngine, TreeAdapter};
use owo_colors::OwoColorize;

#[derive(Parser, Debug)]
#[command(name = "koala-query")]
#[command(author, version, about, long_about = None)]
#[command(after_help = r#"EXAMPLES:
    # Every list item that is an odd child
    koala-query 'ul > li:nth-child(odd)' -i page.json

    # Read the tree from stdin, first match only
    cat page.json | koala-query --first 'a[href^="http"]'

    # Show how a selector compiles
    koala-query --explain 'nav a:not(.active), footer a' -i page.json
"#)]
struct Cli {
    /// Selectors to run, in order
    #[arg(value_name = "SELECTOR", required = true)]
    selectors: Vec<String>,

    /// JSON tree to query (reads stdin when omitted)
    #[arg(short, long, value_name = "FILE")]
    input: Option<PathBuf>,

    /// Print only the first match (querySelector)
    #[arg(long)]
    first: bool,

    /// Print the compiled form of each selector before its matches
    #[arg(long)]
    explain: bool,

    /// Bound on cached compiled selectors (0 disables the cache)
    #[arg(long, value_name = "N")]
    cache_capacity: Option<usize>,

    /// Raise the log level (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => log::LevelFilter::Warn,
        1 => log::LevelFilter::Info,
        2 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .init();

    let source = match &cli.input {
        Some(path) => fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?,
        None => {
            let mut buffer = String::new();
            let _ = io::stdin()
                .read_to_string(&mut buffer)
                .context("failed to read stdin")?;
            buffer
        }
    };
    let document = tree_json::parse(&source).context("input is not a JSON tree")?;
    let tree = tree_json::build(&document);
    log::info!("loaded {} nodes", tree.len());

    let config = cli
        .cache_capacity
        .map_or_else(EngineConfig::default, |capacity| EngineConfig {
            cache_capacity: Some(capacity),
        });
    let engine = QueryEngine::with_config(&config);

    for selector in &cli.selectors {
        if cli.selectors.len() > 1 {
            println!("{}", format!("== {selector}").bold());
        }

        if cli.explain {
            let compiled = engine
                .compile(selector)
                .with_context(|| format!("invalid selector {selector:?}"))?;
            println!("{} {compiled}", "canonical:".dimmed());
            println!("{compiled:#?}");
        }

        let matched = if cli.first {
            engine
                .query_selector(&tree, tree.root(), selector)
                .map(|found| found.into_iter().collect::<Vec<_>>())
        } else {
            engine.query_selector_all(&tree, tree.root(), selector)
        }
        .with_context(|| format!("selector {selector:?} failed"))?;

        if matched.is_empty() {
            eprintln!("{}", "no matches".dimmed());
        }
        for node in matched {
            println!("{}  {}", describe(&tree, node), tree_path(&tree, node).dimmed());
        }
    }

    log::debug!("cache: {:?}", engine.cache().stats());
    Ok(())
}

/// `<tag#id.class>`, coloured.
fn describe(tree: &DomTree, node: NodeId) -> String {
    let mut out = format!("<{}", tree.local_name(node).unwrap_or("?").green());
    if let Some(id) = tree.id(node) {
        let _ = write!(out, "{}", format!("#{id}").yellow());
    }
    if let Some(classes) = tree.class_name(node) {
        for class in classes.split_ascii_whitespace() {
            let _ = write!(out, "{}", format!(".{class}").cyan());
        }
    }
    out.push('>');
    out
}

/// `/html[1]/body[1]/div[2]`: each step is the element's 1-based position
/// among same-named element siblings.
fn tree_path(tree: &DomTree, node: NodeId) -> String {
    let mut steps = Vec::new();
    for ancestor in tree.inclusive_ancestors(node) {
        let Some(name) = tree.local_name(ancestor) else {
            break;
        };
        let position = tree
            .preceding_siblings(ancestor)
            .filter(|&sibling| {
                tree.local_name(sibling)
                    .is_some_and(|other| other.eq_ignore_ascii_case(name))
            })
            .count()
            + 1;
        steps.push(format!("/{name}[{position}]"));
    }
    steps.reverse();
    steps.concat()
}
