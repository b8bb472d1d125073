//! Concrete warnings, template warnings and emitted warning records.

use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::fmt;

use crate::category::WarningCategory;
use crate::error::TemplateError;

/// A warning ready to be emitted: a category plus its message.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Warning {
    pub category: WarningCategory,
    pub message: Cow<'static, str>,
}

impl Warning {
    /// Const constructor used by the registry in [`crate::deprecated`].
    pub const fn from_static(category: WarningCategory, message: &'static str) -> Self {
        Self {
            category,
            message: Cow::Borrowed(message),
        }
    }

    pub fn new(category: WarningCategory, message: impl Into<String>) -> Self {
        Self {
            category,
            message: Cow::Owned(message.into()),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// True when this warning belongs to `category` or one of its subclasses.
    pub fn is_instance_of(&self, category: WarningCategory) -> bool {
        self.category.is_subclass_of(category)
    }
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

/// A warning whose message needs arguments before it can be emitted.
///
/// Placeholders are written `{name}`; `{name!r}` inserts the value quoted.
/// `{{` and `}}` produce literal braces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnformattedWarning {
    pub category: WarningCategory,
    pub template: &'static str,
}

impl UnformattedWarning {
    pub const fn new(category: WarningCategory, template: &'static str) -> Self {
        Self { category, template }
    }

    /// Substitute `args` into the template and build the warning.
    pub fn format(&self, args: &[(&str, &str)]) -> Result<Warning, TemplateError> {
        let mut out = String::with_capacity(self.template.len());
        let mut chars = self.template.chars().peekable();
        while let Some(c) = chars.next() {
            match c {
                '{' if chars.peek() == Some(&'{') => {
                    chars.next();
                    out.push('{');
                }
                '{' => {
                    let mut field = String::new();
                    let mut closed = false;
                    for c in chars.by_ref() {
                        if c == '}' {
                            closed = true;
                            break;
                        }
                        field.push(c);
                    }
                    if !closed {
                        return Err(TemplateError::Unclosed {
                            template: self.template.to_string(),
                        });
                    }
                    let (name, quoted) = match field.strip_suffix("!r") {
                        Some(name) => (name, true),
                        None => (field.as_str(), false),
                    };
                    let value = args
                        .iter()
                        .find(|(key, _)| *key == name)
                        .map(|(_, value)| *value)
                        .ok_or_else(|| TemplateError::MissingField {
                            field: name.to_string(),
                            template: self.template.to_string(),
                        })?;
                    if quoted {
                        push_quoted(&mut out, value);
                    } else {
                        out.push_str(value);
                    }
                }
                '}' if chars.peek() == Some(&'}') => {
                    chars.next();
                    out.push('}');
                }
                '}' => {
                    return Err(TemplateError::UnmatchedBrace {
                        template: self.template.to_string(),
                    })
                }
                c => out.push(c),
            }
        }
        Ok(Warning::new(self.category, out))
    }
}

/// Appends `value` quoted the way Python's `repr` quotes a `str`.
fn push_quoted(out: &mut String, value: &str) {
    let quote = if value.contains('\'') && !value.contains('"') {
        '"'
    } else {
        '\''
    };
    out.push(quote);
    for c in value.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if c == quote => {
                out.push('\\');
                out.push(c);
            }
            c if (c as u32) < 0x20 || c == '\u{7f}' => {
                out.push_str(&format!("\\x{:02x}", c as u32));
            }
            c => out.push(c),
        }
    }
    out.push(quote);
}

/// One emitted warning together with where it was attributed to.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WarningRecord {
    pub warning: Warning,
    /// File path or node id the warning is attributed to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
}

impl WarningRecord {
    pub fn new(warning: Warning) -> Self {
        Self {
            warning,
            location: None,
        }
    }

    pub fn at(warning: Warning, location: impl Into<String>) -> Self {
        Self {
            warning,
            location: Some(location.into()),
        }
    }

    pub fn category(&self) -> WarningCategory {
        self.warning.category
    }

    pub fn message(&self) -> &str {
        self.warning.message()
    }
}

impl From<Warning> for WarningRecord {
    fn from(warning: Warning) -> Self {
        WarningRecord::new(warning)
    }
}

impl fmt::Display for WarningRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(location) = &self.location {
            write!(f, "{location}: ")?;
        }
        write!(f, "{}: {}", self.warning.category, self.warning.message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TEMPLATE: UnformattedWarning = UnformattedWarning::new(
        WarningCategory::PytestWarning,
        "`type` is the string {typ!r} (options: {names})",
    );

    #[test]
    fn format_substitutes_plain_and_quoted_fields() {
        let w = TEMPLATE
            .format(&[("typ", "int"), ("names", "['-x']")])
            .unwrap();
        assert_eq!(w.message(), "`type` is the string 'int' (options: ['-x'])");
        assert_eq!(w.category, WarningCategory::PytestWarning);
    }

    #[test]
    fn format_reports_missing_field() {
        let err = TEMPLATE.format(&[("typ", "int")]).unwrap_err();
        assert_eq!(
            err,
            TemplateError::MissingField {
                field: "names".into(),
                template: TEMPLATE.template.into(),
            }
        );
    }

    #[test]
    fn doubled_braces_are_literal() {
        let t = UnformattedWarning::new(WarningCategory::Warning, "{{x}} = {x}");
        assert_eq!(t.format(&[("x", "1")]).unwrap().message(), "{x} = 1");
    }

    #[test]
    fn malformed_templates_are_rejected() {
        let open = UnformattedWarning::new(WarningCategory::Warning, "oops {x");
        assert!(matches!(
            open.format(&[("x", "1")]),
            Err(TemplateError::Unclosed { .. })
        ));
        let close = UnformattedWarning::new(WarningCategory::Warning, "oops }");
        assert!(matches!(
            close.format(&[]),
            Err(TemplateError::UnmatchedBrace { .. })
        ));
    }

    #[test]
    fn quoted_values_follow_python_repr() {
        let t = UnformattedWarning::new(WarningCategory::Warning, "{v!r}");
        let quote = |v: &str| t.format(&[("v", v)]).unwrap().message().to_string();
        assert_eq!(quote("plain"), "'plain'");
        assert_eq!(quote("it's"), r#""it's""#);
        assert_eq!(quote(r#"say "hi""#), r#"'say "hi"'"#);
        assert_eq!(quote(r#"it's "x""#), r#"'it\'s "x"'"#);
        assert_eq!(quote("a\\b\nc"), r"'a\\b\nc'");
        assert_eq!(quote("\u{1}"), r"'\x01'");
    }

    #[test]
    fn record_display_includes_location_and_category() {
        let rec = WarningRecord::at(
            Warning::new(WarningCategory::UserWarning, "boom"),
            "a/b.py::test",
        );
        assert_eq!(rec.to_string(), "a/b.py::test: UserWarning: boom");
    }
}
