pub mod normalizer;
pub mod param_parser;
pub mod model;
pub mod model_builder;
pub mod bracket_utils;
pub mod settings;
pub mod artifact;
pub mod generators;
pub mod diff;

pub use normalizer::Normalizer;
pub use param_parser::ParamParser;
pub use model::ClassModel;
pub use model_builder::{extract_model, ModelBuilder};
pub use bracket_utils::split_respecting_brackets;
pub use settings::Settings;
pub use artifact::{ArtifactKind, ArtifactStatus, EditOp, GeneratedArtifact, Position, Range};
pub use diff::DiffEngine;
