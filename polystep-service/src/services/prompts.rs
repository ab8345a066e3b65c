//! Prompt templates sent to the provider.

use serde_json::{json, Value};

pub const TRANSLATE: &str = "You are an expert linguist. Translate the following {{source_lang}} text to {{target_lang}}. Text: \"{{text}}\"";

pub const TRANSLATE_WITH_ANALYSIS: &str = "You are an expert linguist. Translate the following {{source_lang}} text to {{target_lang}}. Provide the translation and a brief grammatical note. Text: \"{{text}}\"";

pub const GRAMMAR_RESEARCH: &str = "Find 3 real-world examples of how \"{{topic}}\" is used in {{language}}. Provide the examples and briefly explain the context.";

pub const VISUALIZE: &str = "A vibrant, photorealistic cultural scene for a language learner: {{prompt}}";

pub const READING_PASSAGE: &str = "Generate an interesting 150-word reading passage in {{language}} at {{level}} level. Include 3 multiple-choice comprehension questions with a \"correctIndex\". Format as JSON.";

/// Fill `{{key}}` placeholders in one pass over the template. Values are
/// copied verbatim, so placeholder-like text inside a value is left alone.
/// Unknown placeholders are kept as written.
pub fn render(template: &str, vars: &[(&str, &str)]) -> String {
    let mut result = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(start) = rest.find("{{") {
        result.push_str(&rest[..start]);
        let after_open = &rest[start + 2..];

        let Some(end) = after_open.find("}}") else {
            rest = &rest[start..];
            break;
        };

        let key = &after_open[..end];
        match vars.iter().find(|(name, _)| *name == key) {
            Some((_, value)) => result.push_str(value),
            None => {
                result.push_str("{{");
                result.push_str(key);
                result.push_str("}}");
            }
        }
        rest = &after_open[end + 2..];
    }

    result.push_str(rest);
    result
}

/// Structured-output schema for reading passages, in the provider's
/// OpenAPI subset.
pub fn reading_passage_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "title": { "type": "STRING" },
            "passage": { "type": "STRING" },
            "questions": {
                "type": "ARRAY",
                "items": {
                    "type": "OBJECT",
                    "properties": {
                        "question": { "type": "STRING" },
                        "options": { "type": "ARRAY", "items": { "type": "STRING" } },
                        "correctIndex": { "type": "INTEGER" }
                    }
                }
            }
        },
        "required": ["title", "passage", "questions"]
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn render_replaces_every_placeholder() {
        let prompt = render(
            TRANSLATE,
            &[
                ("source_lang", "Spanish"),
                ("target_lang", "English"),
                ("text", "buenos días"),
            ],
        );
        assert_eq!(
            prompt,
            "You are an expert linguist. Translate the following Spanish text to English. Text: \"buenos días\""
        );
        assert!(!prompt.contains("{{"));
    }

    #[test]
    fn placeholder_text_inside_values_is_not_expanded() {
        let prompt = render(
            GRAMMAR_RESEARCH,
            &[("topic", "{{language}} endings"), ("language", "Spanish")],
        );
        assert!(prompt.contains("how \"{{language}} endings\" is used in Spanish"));

        let prompt = render(READING_PASSAGE, &[("language", "{{level}}"), ("level", "C2")]);
        assert!(prompt.contains("passage in {{level}} at C2 level"));
    }

    #[test]
    fn unknown_and_unclosed_placeholders_are_kept() {
        assert_eq!(render("a {{x}} b {{y", &[("z", "1")]), "a {{x}} b {{y");
    }

    #[test]
    fn only_analysis_template_asks_for_grammar_note() {
        assert!(TRANSLATE_WITH_ANALYSIS.contains("grammatical note"));
        assert!(!TRANSLATE.contains("grammatical note"));
    }

    #[test]
    fn templates_carry_their_placeholders() {
        assert!(GRAMMAR_RESEARCH.contains("{{topic}}"));
        assert!(GRAMMAR_RESEARCH.contains("{{language}}"));
        assert!(VISUALIZE.contains("{{prompt}}"));
        assert!(READING_PASSAGE.contains("{{language}}"));
        assert!(READING_PASSAGE.contains("{{level}}"));
    }

    #[test]
    fn reading_schema_requires_core_fields() {
        let schema = reading_passage_schema();
        assert_eq!(schema["required"], json!(["title", "passage", "questions"]));
        assert_eq!(
            schema["properties"]["questions"]["items"]["properties"]["correctIndex"]["type"],
            "INTEGER"
        );
    }
}
