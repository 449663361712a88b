// SPDX-License-Identifier: MIT OR Apache-2.0
//! Animation controller graph asset transform.
//!
//! Usage:
//! - `ordoplay_animgraph compile <document.ron> [--output FILE] [--config FILE] [--dump-json]`
//! - `ordoplay_animgraph inspect <artifact>`

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use ordoplay_animgraph::{compile_graph, create_animation_registry, CompileSettings, CompiledGraph, Document, PinKind};
use std::fs;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

/// Extension of compiled controller graphs
const ARTIFACT_EXTENSION: &str = "animgraph";

#[derive(Parser, Debug)]
#[command(name = "ordoplay_animgraph")]
#[command(about = "Compile OrdoPlay animation controller graphs", version)]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Compile an authored document into a runtime graph
    Compile {
        /// Path to the document (.ron)
        document: PathBuf,

        /// Output file, defaults to the document path with the artifact extension
        #[arg(long)]
        output: Option<PathBuf>,

        /// Compiler settings (.ron)
        #[arg(long)]
        config: Option<PathBuf>,

        /// Also write a JSON dump of the compiled graph next to the output
        #[arg(long)]
        dump_json: bool,
    },
    /// Print a summary of a compiled graph
    Inspect {
        /// Path to the compiled artifact
        artifact: PathBuf,
    },
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,ordoplay_animgraph=debug"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

fn main() {
    init_logging();

    let args = Args::parse();
    let result = match args.command {
        Command::Compile {
            document,
            output,
            config,
            dump_json,
        } => compile(&document, output, config.as_deref(), dump_json),
        Command::Inspect { artifact } => inspect(&artifact),
    };

    if let Err(e) = result {
        tracing::error!("{e:#}");
        std::process::exit(1);
    }
}

fn load_settings(path: Option<&Path>) -> Result<CompileSettings> {
    let Some(path) = path else {
        return Ok(CompileSettings::default());
    };
    let text = fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?;
    CompileSettings::from_ron(&text).with_context(|| format!("Invalid settings in {}", path.display()))
}

fn compile(document_path: &Path, output: Option<PathBuf>, config: Option<&Path>, dump_json: bool) -> Result<()> {
    let settings = load_settings(config)?;

    let text = fs::read_to_string(document_path)
        .with_context(|| format!("Failed to read {}", document_path.display()))?;
    let document = Document::from_ron(&text)
        .with_context(|| format!("Failed to parse {}", document_path.display()))?;

    tracing::info!(
        "Compiling '{}' ({} nodes, {} connections, hash {})",
        document.name,
        document.node_count(),
        document.connection_count(),
        document.connection_hash()
    );

    let registry = create_animation_registry();
    let graph = compile_graph(&document, &registry, &settings)
        .with_context(|| format!("Failed to compile {}", document_path.display()))?;

    let output_path = output.unwrap_or_else(|| document_path.with_extension(ARTIFACT_EXTENSION));
    if let Some(parent) = output_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).with_context(|| format!("Failed to create {}", parent.display()))?;
    }

    let file = fs::File::create(&output_path)
        .with_context(|| format!("Failed to create {}", output_path.display()))?;
    let mut writer = BufWriter::new(file);
    let written = graph
        .write_to(&mut writer)
        .with_context(|| format!("Failed to write {}", output_path.display()))?;
    writer.flush()?;
    tracing::info!("Wrote {} bytes to {}", written, output_path.display());

    if dump_json {
        let json_path = output_path.with_extension("json");
        fs::write(&json_path, graph.to_json()?)
            .with_context(|| format!("Failed to write {}", json_path.display()))?;
        tracing::info!("Wrote JSON dump to {}", json_path.display());
    }

    Ok(())
}

fn inspect(artifact: &Path) -> Result<()> {
    let bytes = fs::read(artifact).with_context(|| format!("Failed to read {}", artifact.display()))?;
    let graph = CompiledGraph::read_from(&mut bytes.as_slice())
        .with_context(|| format!("Invalid artifact {}", artifact.display()))?;

    let slots: serde_json::Map<String, serde_json::Value> = PinKind::ALL
        .iter()
        .map(|&kind| {
            let entry = serde_json::json!({
                "inputs": graph.input_slot_count(kind),
                "outputs": graph.output_slot_count(kind),
            });
            (format!("{kind:?}"), entry)
        })
        .collect();

    let summary = serde_json::json!({
        "bytes": bytes.len(),
        "nodes": graph.nodes.iter().map(|n| n.type_name()).collect::<Vec<_>>(),
        "slots": slots,
    });
    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(())
}
