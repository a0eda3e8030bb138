//! Generative-constructor generation.
//!
//! Parameters render grouped required/named/positional in that order. The
//! one-line form switches to a block (one parameter per line, trailing
//! commas) once it would exceed the configured width threshold.

use crate::generators::INDENT;
use crate::model::{ClassModel, ParamCategory, Parameter};
use crate::settings::Settings;

pub fn generate(model: &ClassModel, settings: &Settings) -> String {
    let params = model.merged_params();
    let name = &model.name;

    let is_const = model
        .generative_constructor()
        .map(|c| c.is_const)
        .unwrap_or(false)
        || model.all_params_final();
    let prefix = if is_const { "const " } else { "" };

    let required: Vec<&Parameter> = params
        .iter()
        .filter(|p| p.category == ParamCategory::Required)
        .collect();
    let named: Vec<&Parameter> = params
        .iter()
        .filter(|p| p.category == ParamCategory::Named)
        .collect();
    let positional: Vec<&Parameter> = params
        .iter()
        .filter(|p| p.category == ParamCategory::Positional)
        .collect();

    let one_line = render_one_line(prefix, name, &required, &named, &positional);
    if one_line.len() <= settings.line_width {
        return one_line;
    }
    render_block(prefix, name, &required, &named, &positional)
}

fn render_param(p: &Parameter) -> String {
    let target = if p.from_super {
        format!("super.{}", p.name)
    } else {
        format!("this.{}", p.name)
    };
    let mut out = String::new();
    if p.required && p.category == ParamCategory::Named {
        out.push_str("required ");
    }
    out.push_str(&target);
    if let Some(default) = &p.default_value {
        out.push_str(" = ");
        out.push_str(default);
    }
    out
}

fn render_one_line(
    prefix: &str,
    name: &str,
    required: &[&Parameter],
    named: &[&Parameter],
    positional: &[&Parameter],
) -> String {
    let mut groups: Vec<String> = Vec::new();
    if !required.is_empty() {
        groups.push(
            required
                .iter()
                .map(|p| render_param(p))
                .collect::<Vec<_>>()
                .join(", "),
        );
    }
    if !named.is_empty() {
        groups.push(format!(
            "{{{}}}",
            named.iter().map(|p| render_param(p)).collect::<Vec<_>>().join(", ")
        ));
    }
    if !positional.is_empty() {
        groups.push(format!(
            "[{}]",
            positional
                .iter()
                .map(|p| render_param(p))
                .collect::<Vec<_>>()
                .join(", ")
        ));
    }
    format!("{INDENT}{prefix}{name}({});", groups.join(", "))
}

fn render_block(
    prefix: &str,
    name: &str,
    required: &[&Parameter],
    named: &[&Parameter],
    positional: &[&Parameter],
) -> String {
    let inner = format!("{INDENT}{INDENT}");
    let mut lines: Vec<String> = Vec::new();

    let mut head = format!("{INDENT}{prefix}{name}(");
    if required.is_empty() {
        if !named.is_empty() {
            head.push('{');
        } else if !positional.is_empty() {
            head.push('[');
        }
    }
    lines.push(head);

    for p in required {
        lines.push(format!("{inner}{},", render_param(p)));
    }
    if !required.is_empty() && !named.is_empty() {
        let last = lines.pop().unwrap();
        lines.push(format!("{} {{", last));
    }
    if !required.is_empty() && !positional.is_empty() && named.is_empty() {
        let last = lines.pop().unwrap();
        lines.push(format!("{} [", last));
    }

    for p in named {
        lines.push(format!("{inner}{},", render_param(p)));
    }
    for p in positional {
        lines.push(format!("{inner}{},", render_param(p)));
    }

    let mut tail = String::from(INDENT);
    if !named.is_empty() {
        tail.push('}');
    } else if !positional.is_empty() {
        tail.push(']');
    }
    tail.push_str(");");
    lines.push(tail);

    lines.join("\n")
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
    fn test_one_line_form_below_threshold() {
        let text = gen("class P {\n  final String name;\n  final int age;\n  P(this.name, this.age);\n}");
        assert_eq!(text, "  const P(this.name, this.age);");
    }

    #[test]
    fn test_block_form_above_threshold() {
        let text = gen(
            "class Configuration {\n  final String veryLongFieldNameNumberOne;\n  final String veryLongFieldNameNumberTwo;\n  final String veryLongFieldNameNumberThree;\n  Configuration(this.veryLongFieldNameNumberOne, this.veryLongFieldNameNumberTwo, this.veryLongFieldNameNumberThree);\n}",
        );
        assert_eq!(
            text,
            "  const Configuration(\n    this.veryLongFieldNameNumberOne,\n    this.veryLongFieldNameNumberTwo,\n    this.veryLongFieldNameNumberThree,\n  );"
        );
    }

    #[test]
    fn test_named_group_with_required_and_default() {
        let text = gen("class U {\n  final String id;\n  final int age;\n  U({required this.id, this.age = 0});\n}");
        assert_eq!(text, "  const U({required this.id, this.age = 0});");
    }

    #[test]
    fn test_mixed_groups_block() {
        let text = gen(
            "class M {\n  final String alpha;\n  final String beta;\n  final String gamma;\n  M(this.alpha, {required this.beta, required this.gamma});\n}",
        );
        // Short enough for one line.
        assert_eq!(
            text,
            "  const M(this.alpha, {required this.beta, required this.gamma});"
        );
    }

    #[test]
    fn test_not_const_when_mutable_field() {
        let text = gen("class V {\n  int count;\n  V(this.count);\n}");
        assert_eq!(text, "  V(this.count);");
    }

    #[test]
    fn test_super_parameter_rendered() {
        let text = gen("class C {\n  final int own;\n  C(super.id, this.own);\n}");
        assert!(text.contains("super.id"));
    }

    #[test]
    fn test_extracting_regenerated_declaration_is_equivalent() {
        // Splicing the generated constructor back into the declaration and
        // re-extracting yields the same merged parameters.
        let settings = Settings::default();
        let source = "class Person {\n  final String name;\n  final int? age;\n\n  Person({required this.name, this.age});\n}";
        let model = extract_model(source, &settings).unwrap();
        let ctor = generate(&model, &settings);

        let rebuilt = format!(
            "class Person {{\n  final String name;\n  final int? age;\n\n{ctor}\n}}"
        );
        let remodel = extract_model(&rebuilt, &settings).unwrap();

        let before = model.merged_params();
        let after = remodel.merged_params();
        assert_eq!(before.len(), after.len());
        for (a, b) in before.iter().zip(&after) {
            assert_eq!(a.name, b.name);
            assert_eq!(a.type_text, b.type_text);
            assert_eq!(a.category, b.category);
            assert_eq!(a.required, b.required);
            assert_eq!(a.nullable, b.nullable);
        }
    }
}
