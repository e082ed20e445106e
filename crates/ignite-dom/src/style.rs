#![forbid(unsafe_code)]

//! Inline style declaration (`element.style`).

use indexmap::IndexMap;

/// Ordered set of inline CSS declarations.
///
/// `css_text()` serializes as `name: value; name: value;`, matching what a
/// browser reports for inline styles.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StyleDeclaration {
    declarations: IndexMap<String, String>,
}

impl StyleDeclaration {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse `css` into a fresh declaration, discarding malformed entries.
    #[must_use]
    pub fn parse(css: &str) -> Self {
        let mut declarations = IndexMap::new();
        for entry in css.split(';') {
            let Some((name, value)) = entry.split_once(':') else {
                continue;
            };
            let name = name.trim();
            let value = value.trim();
            if name.is_empty() || value.is_empty() {
                continue;
            }
            declarations.insert(name.to_ascii_lowercase_unless_custom(), value.to_string());
        }
        Self { declarations }
    }

    /// Serialized declarations.
    #[must_use]
    pub fn css_text(&self) -> String {
        let mut out = String::new();
        for (name, value) in &self.declarations {
            if !out.is_empty() {
                out.push(' ');
            }
            out.push_str(name);
            out.push_str(": ");
            out.push_str(value);
            out.push(';');
        }
        out
    }

    /// Value of one declaration, or empty string when absent.
    #[must_use]
    pub fn get_property_value(&self, name: &str) -> &str {
        self.declarations.get(name).map_or("", String::as_str)
    }

    pub(crate) fn set_property(&mut self, name: &str, value: &str) -> bool {
        let value = value.trim();
        if value.is_empty() {
            return self.remove_property(name);
        }
        match self.declarations.get(name) {
            Some(existing) if existing == value => false,
            _ => {
                self.declarations.insert(name.to_string(), value.to_string());
                true
            }
        }
    }

    pub(crate) fn remove_property(&mut self, name: &str) -> bool {
        self.declarations.shift_remove(name).is_some()
    }

    /// Number of declarations.
    #[must_use]
    pub fn len(&self) -> usize {
        self.declarations.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.declarations.is_empty()
    }
}

trait CssName {
    fn to_ascii_lowercase_unless_custom(&self) -> String;
}

impl CssName for str {
    // Custom properties (`--x`) are case-sensitive.
    fn to_ascii_lowercase_unless_custom(&self) -> String {
        if self.starts_with("--") {
            self.to_string()
        } else {
            self.to_ascii_lowercase()
        }
    }
}
