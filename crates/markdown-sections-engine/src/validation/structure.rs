use serde_json::Value;

use super::{Stage, ValidationError, ValidationStrategy, expect_object};

/// Checks heading level relationships.
///
/// Two rules:
/// - along each document's top-level section list, a level may rise by at
///   most one over the previous section, starting from zero
/// - every child's level is strictly greater than its parent's
///
/// Level jumps are only checked across the top-level list. A child that skips
/// levels below its parent (e.g. `#` then `###`) passes, matching how the tree
/// builder attaches such headings.
pub struct StructureValidator;

impl ValidationStrategy for StructureValidator {
    fn stage(&self) -> Stage {
        Stage::Structure
    }

    fn validate(&self, data: &Value) -> Result<(), ValidationError> {
        let documents = expect_object(data, || "Document data".to_string())?;
        for (filename, sections) in documents {
            let Some(sections) = sections.as_array() else {
                continue;
            };

            let mut current_level = 0;
            for section in sections {
                let level = level_of(section);
                if level > current_level + 1 {
                    return Err(ValidationError::Structure {
                        context: filename.clone(),
                        details: format!("Invalid section level jump in {}", title_of(section)),
                    });
                }
                validate_children(section, filename, level)?;
                current_level = level;
            }
        }
        Ok(())
    }
}

fn validate_children(
    section: &Value,
    context: &str,
    parent_level: i64,
) -> Result<(), ValidationError> {
    let Some(children) = section.get("children").and_then(Value::as_array) else {
        return Ok(());
    };

    for child in children {
        expect_object(child, || format!("Child section in {context}"))?;
        let child_level = level_of(child);
        if child_level <= parent_level {
            return Err(ValidationError::Structure {
                context: context.to_string(),
                details: "Child level must be greater than parent level".to_string(),
            });
        }
        validate_children(child, context, child_level)?;
    }
    Ok(())
}

fn level_of(section: &Value) -> i64 {
    section.get("level").and_then(Value::as_i64).unwrap_or(0)
}

fn title_of(section: &Value) -> &str {
    section
        .get("title")
        .and_then(Value::as_str)
        .unwrap_or_default()
}
