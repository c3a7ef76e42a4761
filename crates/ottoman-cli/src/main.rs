use std::path::{Path, PathBuf};
use std::process;

use clap::Parser;
use ottoman_view::{DesignDocument, Evaluator, LuaRuntime, Query, RuntimeConfig, ViewResult};
use serde_json::{Value, json};

/// Evaluate one view of a design document over a set of JSON documents
#[derive(Parser, Debug)]
#[command(name = "ottoman")]
#[command(about = "ottoman - Evaluate map/reduce views over JSON documents", long_about = None)]
struct Cli {
    /// Design document holding the view
    design_doc: PathBuf,

    /// Name of the view inside the design document
    view: String,

    /// JSON array of documents to evaluate
    documents: PathBuf,

    /// Keep only rows whose key equals this JSON value
    #[arg(long, value_parser = parse_key, allow_hyphen_values = true)]
    key: Option<Value>,

    /// Reduce per distinct key instead of over all rows
    #[arg(long)]
    group: bool,
}

impl Cli {
    fn query(&self) -> Query {
        Query {
            key: self.key.clone(),
            group: self.group,
        }
    }
}

fn parse_key(raw: &str) -> Result<Value, String> {
    serde_json::from_str(raw).map_err(|e| format!("not JSON: {e}"))
}

fn read_json(path: &Path) -> Result<Value, String> {
    let text = std::fs::read_to_string(path).map_err(|e| format!("{}: {e}", path.display()))?;
    serde_json::from_str(&text).map_err(|e| format!("{}: {e}", path.display()))
}

fn run(cli: &Cli) -> Result<ViewResult, String> {
    let ddoc: DesignDocument = serde_json::from_value(read_json(&cli.design_doc)?)
        .map_err(|e| format!("{}: not a design document: {e}", cli.design_doc.display()))?;
    let view = ddoc
        .view(&cli.view)
        .ok_or_else(|| format!("view {} not found in {}", cli.view, ddoc.id))?;

    let documents = match read_json(&cli.documents)? {
        Value::Array(docs) => docs,
        _ => {
            return Err(format!(
                "{}: expected an array of documents",
                cli.documents.display()
            ));
        }
    };

    let config = RuntimeConfig::from_env();
    tracing::info!(
        view = %cli.view,
        documents = documents.len(),
        libs = ?config.libs,
        "evaluating view"
    );
    Evaluator::<LuaRuntime>::new(config)
        .evaluate(view, &cli.query(), documents)
        .map_err(|e| e.to_string())
}

fn main() {
    let level = std::env::var("OTTOMAN_LOG")
        .ok()
        .and_then(|s| s.parse::<tracing::Level>().ok())
        .unwrap_or(tracing::Level::WARN);
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match run(&cli) {
        Ok(result) => println!("{}", json!({ "rows": result })),
        Err(e) => {
            eprintln!("ottoman: {e}");
            process::exit(1);
        }
    }
}
