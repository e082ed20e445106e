#![forbid(unsafe_code)]

//! Prop values carried by virtual elements.

use std::fmt;

use ignite_dom::element::format_number;
use ignite_dom::{DomValue, Event, EventListener};
use indexmap::IndexMap;

/// Ordered prop map. Order is preserved so attribute writes happen in the
/// order the view declared them.
pub type Props = IndexMap<String, PropValue>;

/// Inline style, either verbatim CSS text or a declaration map.
#[derive(Debug, Clone, PartialEq)]
pub enum StyleValue {
    Text(String),
    /// Keys may be camelCase (`backgroundColor`) or kebab-case; custom
    /// properties (`--accent`) pass through untouched.
    Map(IndexMap<String, String>),
}

impl StyleValue {
    /// Build a map-form style from `(name, value)` pairs.
    pub fn map<K, V>(entries: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        Self::Map(
            entries
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

/// A single prop value.
///
/// Equality is structural except for handlers, which compare by identity.
#[derive(Debug, Clone, PartialEq)]
pub enum PropValue {
    Null,
    Bool(bool),
    Number(f64),
    Text(String),
    Style(StyleValue),
    Handler(EventListener),
}

impl PropValue {
    /// Wrap a closure as an event handler with a fresh identity.
    pub fn handler(callback: impl Fn(&Event) + 'static) -> Self {
        Self::Handler(EventListener::new(callback))
    }

    #[must_use]
    pub fn is_nullish(&self) -> bool {
        matches!(self, Self::Null | Self::Bool(false))
    }

    #[must_use]
    pub fn as_handler(&self) -> Option<&EventListener> {
        match self {
            Self::Handler(listener) => Some(listener),
            _ => None,
        }
    }

    /// String form used for attributes. `None` means "no attribute".
    #[must_use]
    pub fn attribute_value(&self) -> Option<String> {
        match self {
            Self::Null | Self::Bool(false) | Self::Handler(_) => None,
            Self::Bool(true) => Some(String::new()),
            Self::Number(n) => Some(format_number(*n)),
            Self::Text(s) => Some(s.clone()),
            Self::Style(StyleValue::Text(css)) => Some(css.clone()),
            Self::Style(StyleValue::Map(map)) => Some(
                map.iter()
                    .map(|(k, v)| format!("{k}: {v};"))
                    .collect::<Vec<_>>()
                    .join(" "),
            ),
        }
    }

    /// Value written through a DOM property.
    #[must_use]
    pub fn to_dom_value(&self) -> DomValue {
        match self {
            Self::Null => DomValue::Null,
            Self::Bool(b) => DomValue::Bool(*b),
            Self::Number(n) => DomValue::Number(*n),
            Self::Text(s) => DomValue::Text(s.clone()),
            Self::Style(_) | Self::Handler(_) => {
                DomValue::Text(self.attribute_value().unwrap_or_default())
            }
        }
    }
}

impl fmt::Display for PropValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => f.write_str("null"),
            Self::Handler(listener) => write!(f, "{listener:?}"),
            other => f.write_str(&other.attribute_value().unwrap_or_default()),
        }
    }
}

impl From<&str> for PropValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for PropValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<bool> for PropValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<f64> for PropValue {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<i32> for PropValue {
    fn from(value: i32) -> Self {
        Self::Number(f64::from(value))
    }
}

impl From<u32> for PropValue {
    fn from(value: u32) -> Self {
        Self::Number(f64::from(value))
    }
}

impl From<EventListener> for PropValue {
    fn from(value: EventListener) -> Self {
        Self::Handler(value)
    }
}

impl From<StyleValue> for PropValue {
    fn from(value: StyleValue) -> Self {
        Self::Style(value)
    }
}

impl<T: Into<PropValue>> From<Option<T>> for PropValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Null, Into::into)
    }
}
