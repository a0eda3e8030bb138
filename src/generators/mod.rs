//! Code generators: pure transforms from (Class Model, Settings) to
//! canonical source text. No side effects; fully deterministic given the
//! same model and settings.

pub mod codecs;
pub mod constructor;
pub mod copy_with;
pub mod enum_ext;
pub mod equality;
pub mod to_string;

use crate::artifact::ArtifactKind;
use crate::model::ClassModel;
use crate::settings::Settings;

/// Member indentation inside a class body.
pub(crate) const INDENT: &str = "  ";

/// Generate the canonical text for one artifact kind. None when the kind
/// does not apply to this model (e.g. a constructor for a simple enum).
pub fn generate(kind: ArtifactKind, model: &ClassModel, settings: &Settings) -> Option<String> {
    if !applicable_kinds(model).contains(&kind) {
        return None;
    }
    let text = match kind {
        ArtifactKind::Constructor => constructor::generate(model, settings),
        ArtifactKind::ToString => to_string::generate(model, settings),
        ArtifactKind::Equality => equality::generate(model, settings),
        ArtifactKind::CopyWith => copy_with::generate(model, settings),
        ArtifactKind::FromMap => codecs::generate_from_map(model, settings),
        ArtifactKind::ToMap => codecs::generate_to_map(model, settings),
        ArtifactKind::FromJson => codecs::generate_from_json(model),
        ArtifactKind::ToJson => codecs::generate_to_json(model),
        ArtifactKind::EnumExtension => enum_ext::generate(model, settings),
    };
    Some(text)
}

/// The artifact kinds that make sense for a given model.
pub fn applicable_kinds(model: &ClassModel) -> Vec<ArtifactKind> {
    if model.is_enum() {
        return vec![ArtifactKind::EnumExtension];
    }
    let mut kinds = vec![
        ArtifactKind::Constructor,
        ArtifactKind::ToString,
        ArtifactKind::Equality,
        ArtifactKind::CopyWith,
        ArtifactKind::FromMap,
        ArtifactKind::ToMap,
        ArtifactKind::FromJson,
        ArtifactKind::ToJson,
    ];
    // Sealed-hierarchy-style classes also get the dispatch extension.
    if !model.factory_variants().is_empty() {
        kinds.push(ArtifactKind::EnumExtension);
    }
    kinds
}

/// First-letter capitalization for checker names (`red` -> `Red`).
pub(crate) fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model_builder::extract_model;

    #[test]
    fn test_applicable_kinds_for_enum() {
        let model = extract_model("enum Color { red, green }", &Settings::default()).unwrap();
        assert_eq!(applicable_kinds(&model), vec![ArtifactKind::EnumExtension]);
    }

    #[test]
    fn test_applicable_kinds_for_class() {
        let model = extract_model(
            "class A {\n  final int n;\n  A(this.n);\n}",
            &Settings::default(),
        )
        .unwrap();
        let kinds = applicable_kinds(&model);
        assert!(kinds.contains(&ArtifactKind::Constructor));
        assert!(!kinds.contains(&ArtifactKind::EnumExtension));
    }

    #[test]
    fn test_sealed_class_gets_dispatch_extension() {
        let model = extract_model(
            "abstract class R {\n  const R();\n  factory R.a(int x) = A;\n}",
            &Settings::default(),
        )
        .unwrap();
        assert!(applicable_kinds(&model).contains(&ArtifactKind::EnumExtension));
    }

    #[test]
    fn test_capitalize() {
        assert_eq!(capitalize("red"), "Red");
        assert_eq!(capitalize(""), "");
    }
}
