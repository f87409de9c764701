//! Help template rendering.
//!
//! A template is Markdown with `{{...}}` actions. `{{.Command}}` (or
//! `{{Command}}`) expands to the invocation path; `{{"text"}}` expands to
//! the quoted text, which lets a template mention the placeholder itself.

use std::sync::LazyLock;

use regex::Regex;

use crate::error::SchemaError;

static ACTION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"\{\{\s*(?:"((?:[^"\\]|\\.)*)"|(\.?Command))\s*\}\}"#)
        .expect("static regex must compile")
});

/// Renders `template` for the command invoked as `command`.
///
/// # Errors
///
/// Returns [`SchemaError::Template`] if the template contains any other
/// action.
///
/// # Examples
///
/// ```
/// use optree_core::render_template;
///
/// let text = render_template("Usage: {{.Command}} [options]", "demo cat").unwrap();
/// assert_eq!(text, "Usage: demo cat [options]");
///
/// let text = render_template(r#"{{"{{.Command}}"}} is replaced"#, "demo").unwrap();
/// assert_eq!(text, "{{.Command}} is replaced");
///
/// assert!(render_template("{{.Name}}", "demo").is_err());
/// ```
pub fn render_template(template: &str, command: &str) -> Result<String, SchemaError> {
    let mut out = String::with_capacity(template.len());
    let mut last = 0;
    for caps in ACTION_RE.captures_iter(template) {
        let Some(whole) = caps.get(0) else {
            continue;
        };
        check_plain(&template[last..whole.start()], command)?;
        out.push_str(&template[last..whole.start()]);
        match caps.get(1) {
            Some(literal) => out.push_str(&unescape(literal.as_str())),
            None => out.push_str(command),
        }
        last = whole.end();
    }
    check_plain(&template[last..], command)?;
    out.push_str(&template[last..]);
    Ok(out)
}

fn check_plain(text: &str, command: &str) -> Result<(), SchemaError> {
    match text.find("{{") {
        Some(offset) => {
            let rest = &text[offset..];
            let action: String = rest.chars().take_while(|&ch| ch != '\n').take(40).collect();
            Err(SchemaError::Template {
                command: command.to_string(),
                reason: format!("unsupported action {action:?}"),
            })
        }
        None => Ok(()),
    }
}

fn unescape(literal: &str) -> String {
    let mut out = String::with_capacity(literal.len());
    let mut chars = literal.chars();
    while let Some(ch) = chars.next() {
        if ch != '\\' {
            out.push(ch);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some(other) => out.push(other),
            None => out.push('\\'),
        }
    }
    out
}
