use serde_json::Value;

use super::{JsonType, Stage, ValidationError, ValidationStrategy, expect_object, expect_type};

/// Checks section values: titles must not be blank, content must be text and
/// children must be a list.
///
/// Missing fields are treated as empty here; reporting them is the schema
/// stage's job.
pub struct ContentValidator;

impl ValidationStrategy for ContentValidator {
    fn stage(&self) -> Stage {
        Stage::Content
    }

    fn validate(&self, data: &Value) -> Result<(), ValidationError> {
        let documents = expect_object(data, || "Document data".to_string())?;
        for (filename, sections) in documents {
            let Some(sections) = sections.as_array() else {
                continue;
            };
            for section in sections {
                validate_section(
                    section,
                    &format!("Section in {filename}"),
                    &format!("Title in {filename}"),
                )?;
            }
        }
        Ok(())
    }
}

fn validate_section(
    section: &Value,
    section_context: &str,
    title_context: &str,
) -> Result<(), ValidationError> {
    let fields = expect_object(section, || section_context.to_string())?;

    let title = match fields.get("title") {
        None => "",
        Some(value) => expect_type(value, JsonType::String, || title_context.to_string())?
            .as_str()
            .unwrap_or_default(),
    }
    .trim();
    if title.is_empty() {
        return Err(ValidationError::Empty {
            context: title_context.to_string(),
        });
    }

    if let Some(content) = fields.get("content") {
        expect_type(content, JsonType::String, || {
            format!("Content in section '{title}'")
        })?;
    }

    let Some(children) = fields.get("children") else {
        return Ok(());
    };
    expect_type(children, JsonType::Array, || {
        format!("Children in section '{title}'")
    })?;
    for child in children.as_array().into_iter().flatten() {
        validate_section(
            child,
            &format!("Child section of '{title}'"),
            &format!("Title in child section of '{title}'"),
        )?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_accepts_non_empty_titles() {
        let data = json!({"doc.md": [{
            "title": "A", "content": "", "level": 1,
            "children": [{"title": "B", "content": "x", "level": 2, "children": []}]
        }]});
        assert_eq!(ContentValidator.validate(&data), Ok(()));
    }

    #[test]
    fn test_rejects_blank_top_level_title() {
        let data = json!({"doc.md": [{"title": " \t", "content": "", "level": 1, "children": []}]});
        let err = ContentValidator.validate(&data).unwrap_err();
        assert_eq!(err.to_string(), "Title in doc.md cannot be empty");
    }

    #[test]
    fn test_rejects_blank_title_at_any_depth() {
        let data = json!({"doc.md": [{
            "title": "A", "content": "", "level": 1,
            "children": [{
                "title": "B", "content": "", "level": 2,
                "children": [{"title": "", "content": "", "level": 3, "children": []}]
            }]
        }]});
        let err = ContentValidator.validate(&data).unwrap_err();
        assert_eq!(
            err,
            ValidationError::Empty {
                context: "Title in child section of 'B'".to_string()
            }
        );
    }

    #[test]
    fn test_missing_title_counts_as_empty() {
        let data = json!({"doc.md": [{"content": "", "level": 1, "children": []}]});
        assert!(matches!(
            ContentValidator.validate(&data),
            Err(ValidationError::Empty { .. })
        ));
    }

    #[test]
    fn test_rejects_non_string_content() {
        let data = json!({"doc.md": [{"title": "A", "content": 42, "level": 1, "children": []}]});
        let err = ContentValidator.validate(&data).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Content in section 'A' must be of type string, got integer instead"
        );
    }

    #[test]
    fn test_rejects_non_list_children() {
        let data = json!({"doc.md": [{"title": "A", "content": "", "level": 1, "children": "none"}]});
        let err = ContentValidator.validate(&data).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Children in section 'A' must be of type array, got string instead"
        );
    }

    #[test]
    fn test_skips_documents_without_section_lists() {
        let data = json!({"doc.md": "not a list"});
        assert_eq!(ContentValidator.validate(&data), Ok(()));
    }
}
