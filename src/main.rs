use clap::{Parser, Subcommand};
use serde::Serialize;
use std::path::PathBuf;

use data_class_core::diff::ItemDiff;
use data_class_core::generators;
use data_class_core::model::ClassModel;
use data_class_core::{
    extract_model, ArtifactKind, DiffEngine, EditOp, GeneratedArtifact, Settings,
};

#[derive(Parser)]
#[command(name = "data-class-core")]
#[command(about = "Core engine for data-class boilerplate generation")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract a structured class model from a declaration source file
    ExtractModel {
        /// Source file containing the class/enum declaration
        #[arg(short, long)]
        file: PathBuf,

        /// Settings JSON file (defaults apply when omitted)
        #[arg(short, long)]
        settings: Option<PathBuf>,

        /// Output JSON file path
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Generate canonical artifact text for a declaration
    Generate {
        /// Source file containing the class/enum declaration
        #[arg(short, long)]
        file: PathBuf,

        /// Artifact kinds to generate (comma-separated). All applicable kinds when omitted.
        #[arg(short, long, value_delimiter = ',')]
        kinds: Option<Vec<ArtifactKind>>,

        /// Settings JSON file (defaults apply when omitted)
        #[arg(short, long)]
        settings: Option<PathBuf>,

        /// Output JSON file path
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Diff generated artifacts against the document and propose edits
    Diff {
        /// Source file holding the full document
        #[arg(short, long)]
        file: PathBuf,

        /// Settings JSON file (defaults apply when omitted)
        #[arg(short, long)]
        settings: Option<PathBuf>,

        /// Output JSON file path
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[derive(Serialize)]
struct GeneratedText {
    kind: ArtifactKind,
    text: String,
}

#[derive(Serialize)]
struct GenerateResult {
    class_name: String,
    artifacts: Vec<GeneratedText>,
}

#[derive(Serialize)]
struct DiffResult {
    class_name: String,
    artifacts: Vec<GeneratedArtifact>,
    edits: Vec<EditOp>,
    /// Per-member checker classification, present for dispatch-bearing types.
    #[serde(skip_serializing_if = "Option::is_none")]
    checkers: Option<ItemDiff>,
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    let result = match &cli.command {
        Commands::ExtractModel { file, settings, output } => {
            run_extract_model(file, settings.as_ref(), output.as_ref())
        }
        Commands::Generate { file, kinds, settings, output } => {
            run_generate(file, kinds.as_deref(), settings.as_ref(), output.as_ref())
        }
        Commands::Diff { file, settings, output } => {
            run_diff(file, settings.as_ref(), output.as_ref())
        }
    };

    if let Err(e) = result {
        let command_name = match &cli.command {
            Commands::ExtractModel { .. } => "extract-model",
            Commands::Generate { .. } => "generate",
            Commands::Diff { .. } => "diff",
        };
        eprintln!("Error in '{}' command: {}", command_name, e);
        eprintln!("Hint: Use --help for usage information");
        std::process::exit(1);
    }
}

fn run_extract_model(
    file: &PathBuf,
    settings_path: Option<&PathBuf>,
    output: Option<&PathBuf>,
) -> Result<(), Box<dyn std::error::Error>> {
    let settings = load_settings(settings_path)?;
    let model = extract(file, &settings)?;
    output_result(&model, output, "extract-model")
}

fn run_generate(
    file: &PathBuf,
    kinds: Option<&[ArtifactKind]>,
    settings_path: Option<&PathBuf>,
    output: Option<&PathBuf>,
) -> Result<(), Box<dyn std::error::Error>> {
    let settings = load_settings(settings_path)?;
    let model = extract(file, &settings)?;

    let requested: Vec<ArtifactKind> = match kinds {
        Some(kinds) => kinds.to_vec(),
        None => generators::applicable_kinds(&model),
    };
    let artifacts: Vec<GeneratedText> = requested
        .into_iter()
        .filter_map(|kind| {
            generators::generate(kind, &model, &settings)
                .map(|text| GeneratedText { kind, text })
        })
        .collect();

    let result = GenerateResult {
        class_name: model.name.clone(),
        artifacts,
    };
    output_result(&result, output, "generate")
}

fn run_diff(
    file: &PathBuf,
    settings_path: Option<&PathBuf>,
    output: Option<&PathBuf>,
) -> Result<(), Box<dyn std::error::Error>> {
    let settings = load_settings(settings_path)?;
    let source = std::fs::read_to_string(file)
        .map_err(|e| format!("Failed to read '{}': {}", file.display(), e))?;
    let model = extract_model(&source, &settings)
        .ok_or_else(|| no_declaration_error(file))?;
    let lines: Vec<&str> = source.lines().collect();

    let engine = DiffEngine::new();
    let artifacts = engine.analyze(&lines, &model, &settings);
    let edits = engine.edits(&artifacts);
    let checkers = if model.is_enum() || !model.factory_variants().is_empty() {
        Some(engine.classify_checkers(&lines, &model, &settings))
    } else {
        None
    };

    let result = DiffResult {
        class_name: model.name.clone(),
        artifacts,
        edits,
        checkers,
    };
    output_result(&result, output, "diff")
}

fn load_settings(path: Option<&PathBuf>) -> Result<Settings, Box<dyn std::error::Error>> {
    match path {
        Some(path) => {
            let json = std::fs::read_to_string(path)
                .map_err(|e| format!("Failed to read settings '{}': {}", path.display(), e))?;
            Ok(Settings::from_json(&json)?)
        }
        None => Ok(Settings::default()),
    }
}

fn extract(file: &PathBuf, settings: &Settings) -> Result<ClassModel, Box<dyn std::error::Error>> {
    let source = std::fs::read_to_string(file)
        .map_err(|e| format!("Failed to read '{}': {}", file.display(), e))?;
    extract_model(&source, settings).ok_or_else(|| no_declaration_error(file))
}

fn no_declaration_error(file: &PathBuf) -> Box<dyn std::error::Error> {
    format!(
        "No class or enum declaration recognized in '{}'",
        file.display()
    )
    .into()
}

fn output_result<T: serde::Serialize>(
    result: &T,
    output_path: Option<&PathBuf>,
    command_name: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let json = serde_json::to_string_pretty(result)
        .map_err(|e| format!("Failed to serialize {} result to JSON: {}", command_name, e))?;

    match output_path {
        Some(path) => {
            std::fs::write(path, &json)
                .map_err(|e| format!(
                    "Failed to write output to '{}': {} (check directory exists and permissions)",
                    path.display(),
                    e
                ))?;
            println!("Output written to: {}", path.display());
        }
        None => {
            println!("{}", json);
        }
    }

    Ok(())
}
