//! Placeholder substitution for remote text files
//!
//! Remote non-binary files are rendered against the collected answers before
//! being written. Syntax:
//!
//! - `{{name}}` - substitutes the answer for `name`
//! - `{{slugify name}}` - substitutes the slugified answer for `name`
//!
//! The renderer is fail-safe: an undefined variable is an error rather than a
//! silent empty substitution, so a typo in a template fails the run instead
//! of producing a subtly broken project.

use std::collections::HashMap;
use thiserror::Error;

/// Error type for rendering failures
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TemplateError {
    /// A placeholder referenced a variable with no collected answer
    #[error("undefined variable '{name}' at byte {position} in template")]
    UndefinedVariable { name: String, position: usize },

    /// A `{{` was found without a closing `}}`
    #[error("unmatched '{{{{' at byte {position} in template")]
    UnmatchedBraces { position: usize },

    /// A placeholder with no variable name (`{{}}`)
    #[error("empty placeholder at byte {position} in template")]
    EmptyPlaceholder { position: usize },
}

/// Lowercase a string and collapse each whitespace run into a single hyphen
pub fn slugify(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut in_whitespace = false;
    for c in input.to_lowercase().chars() {
        if c.is_whitespace() {
            if !in_whitespace {
                out.push('-');
            }
            in_whitespace = true;
        } else {
            out.push(c);
            in_whitespace = false;
        }
    }
    out
}

/// Render a template by substituting `{{name}}` placeholders with variables
pub fn render(
    template: &str,
    variables: &HashMap<String, String>,
) -> Result<String, TemplateError> {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    let mut offset = 0;

    while let Some(open) = rest.find("{{") {
        out.push_str(&rest[..open]);
        let position = offset + open;
        let after = &rest[open + 2..];
        let close = after
            .find("}}")
            .ok_or(TemplateError::UnmatchedBraces { position })?;

        let inner = after[..close].trim();
        if inner.is_empty() {
            return Err(TemplateError::EmptyPlaceholder { position });
        }

        let value = match inner.strip_prefix("slugify ") {
            Some(arg) => {
                let name = arg.trim();
                let raw = variables
                    .get(name)
                    .ok_or_else(|| TemplateError::UndefinedVariable {
                        name: name.to_string(),
                        position,
                    })?;
                slugify(raw)
            }
            None => variables
                .get(inner)
                .cloned()
                .ok_or_else(|| TemplateError::UndefinedVariable {
                    name: inner.to_string(),
                    position,
                })?,
        };

        out.push_str(&value);
        rest = &after[close + 2..];
        offset = position + 2 + close + 2;
    }

    out.push_str(rest);
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vars(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_simple_substitution() {
        let vars = vars(&[("name", "World")]);
        let result = render("Hello {{name}}", &vars).unwrap();
        assert_eq!(result, "Hello World");
    }

    #[test]
    fn test_no_placeholders() {
        let result = render("Just plain text", &HashMap::new()).unwrap();
        assert_eq!(result, "Just plain text");
    }

    #[test]
    fn test_multiple_occurrences() {
        let vars = vars(&[("x", "X")]);
        let result = render("{{x}}-{{x}}-{{x}}", &vars).unwrap();
        assert_eq!(result, "X-X-X");
    }

    #[test]
    fn test_whitespace_inside_placeholder() {
        let vars = vars(&[("name", "Alice")]);
        let result = render("Hello {{ name }}!", &vars).unwrap();
        assert_eq!(result, "Hello Alice!");
    }

    #[test]
    fn test_slugify_helper() {
        let vars = vars(&[("projectName", "My Cool App")]);
        let result = render("dir: {{slugify projectName}}", &vars).unwrap();
        assert_eq!(result, "dir: my-cool-app");
    }

    #[test]
    fn test_slugify_collapses_whitespace_runs() {
        assert_eq!(slugify("My   Cool\tApp"), "my-cool-app");
        assert_eq!(slugify("Already-Joined"), "already-joined");
        assert_eq!(slugify(" edges "), "-edges-");
    }

    #[test]
    fn test_undefined_variable_error() {
        let err = render("Hello {{name}}", &HashMap::new()).unwrap_err();
        assert_eq!(
            err,
            TemplateError::UndefinedVariable {
                name: "name".to_string(),
                position: 6,
            }
        );
    }

    #[test]
    fn test_undefined_slugify_argument_error() {
        let err = render("{{slugify missing}}", &HashMap::new()).unwrap_err();
        assert!(matches!(
            err,
            TemplateError::UndefinedVariable { ref name, .. } if name == "missing"
        ));
    }

    #[test]
    fn test_unmatched_braces_error() {
        let err = render("Hello {{name", &HashMap::new()).unwrap_err();
        assert_eq!(err, TemplateError::UnmatchedBraces { position: 6 });
    }

    #[test]
    fn test_empty_placeholder_error() {
        let err = render("Hello {{}}", &HashMap::new()).unwrap_err();
        assert_eq!(err, TemplateError::EmptyPlaceholder { position: 6 });
    }

    #[test]
    fn test_multiline_template() {
        let vars = vars(&[("title", "My App"), ("name", "World")]);
        let template = "# {{title}}\n\nHello {{name}}\n";
        let result = render(template, &vars).unwrap();
        assert_eq!(result, "# My App\n\nHello World\n");
    }

    #[test]
    fn test_lone_braces_pass_through() {
        let result = render("if (x) { return y; }", &HashMap::new()).unwrap();
        assert_eq!(result, "if (x) { return y; }");
    }

    #[test]
    fn test_error_display() {
        let err = TemplateError::UndefinedVariable {
            name: "foo".to_string(),
            position: 10,
        };
        assert_eq!(
            err.to_string(),
            "undefined variable 'foo' at byte 10 in template"
        );

        let err = TemplateError::UnmatchedBraces { position: 5 };
        assert_eq!(err.to_string(), "unmatched '{{' at byte 5 in template");
    }
}
