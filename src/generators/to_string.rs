//! toString generation: `name: $name` per parameter in declaration order,
//! arrow form under the width threshold, block-bodied form above it.

use crate::generators::INDENT;
use crate::model::ClassModel;
use crate::settings::Settings;

pub fn generate(model: &ClassModel, settings: &Settings) -> String {
    let params = model.merged_params();
    let body: Vec<String> = params.iter().map(|p| format!("{}: ${}", p.name, p.name)).collect();
    let literal = format!("'{}({})'", model.name, body.join(", "));

    let arrow = format!("{INDENT}@override\n{INDENT}String toString() => {literal};");
    let last_line_len = arrow.lines().last().map(|l| l.len()).unwrap_or(0);
    if last_line_len <= settings.line_width {
        return arrow;
    }

    format!(
        "{INDENT}@override\n{INDENT}String toString() {{\n{INDENT}{INDENT}return {literal};\n{INDENT}}}"
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model_builder::extract_model;

    fn gen(raw: &str) -> String {
        let settings = Settings::default();
        let model = extract_model(raw, &settings).unwrap();
        generate(&model, &settings)
    }

    #[test]
    fn test_arrow_form() {
        let text = gen("class P {\n  final String name;\n  final int age;\n  P(this.name, this.age);\n}");
        assert_eq!(
            text,
            "  @override\n  String toString() => 'P(name: $name, age: $age)';"
        );
    }

    #[test]
    fn test_block_form_when_long() {
        let text = gen(
            "class Configuration {\n  final String veryLongFieldNameNumberOne;\n  final String veryLongFieldNameNumberTwo;\n  Configuration(this.veryLongFieldNameNumberOne, this.veryLongFieldNameNumberTwo);\n}",
        );
        assert!(text.contains("String toString() {"));
        assert!(text.contains("    return 'Configuration("));
        assert!(text.ends_with("  }"));
    }
}
