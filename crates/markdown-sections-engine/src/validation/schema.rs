use serde_json::Value;

use super::{JsonType, Stage, ValidationError, ValidationStrategy, expect_object, expect_type};

/// Field name, expected type and the label used in messages.
const REQUIRED_FIELDS: [(&str, JsonType, &str); 4] = [
    ("title", JsonType::String, "Title"),
    ("content", JsonType::String, "Content"),
    ("level", JsonType::Integer, "Level"),
    ("children", JsonType::Array, "Children"),
];

/// Checks that every section carries the four required fields with the
/// right JSON types, recursing through children.
pub struct SchemaValidator;

impl ValidationStrategy for SchemaValidator {
    fn stage(&self) -> Stage {
        Stage::Schema
    }

    fn validate(&self, data: &Value) -> Result<(), ValidationError> {
        let documents = expect_object(data, || "Document data".to_string())?;
        if documents.is_empty() {
            return Err(ValidationError::Empty {
                context: "Document data".to_string(),
            });
        }

        for (filename, sections) in documents {
            expect_type(sections, JsonType::Array, || {
                format!("Sections for {filename}")
            })?;
            for section in sections.as_array().into_iter().flatten() {
                validate_section(section, filename)?;
            }
        }
        Ok(())
    }
}

fn validate_section(section: &Value, context: &str) -> Result<(), ValidationError> {
    let fields = expect_object(section, || format!("Section in {context}"))?;

    let missing: Vec<&str> = REQUIRED_FIELDS
        .iter()
        .map(|(name, _, _)| *name)
        .filter(|name| !fields.contains_key(*name))
        .collect();
    if !missing.is_empty() {
        return Err(ValidationError::MissingField {
            field: missing.join(", "),
            context: format!("Section in {context}"),
        });
    }

    for (name, expected, label) in REQUIRED_FIELDS {
        expect_type(&fields[name], expected, || format!("{label} in {context}"))?;
    }

    let title = fields["title"].as_str().unwrap_or_default();
    let child_context = format!("{context} -> {title}");
    for child in fields["children"].as_array().into_iter().flatten() {
        validate_section(child, &child_context)?;
    }
    Ok(())
}
