#![forbid(unsafe_code)]

//! Element state and operations.
//!
//! `value` and `checked` are first-class slots with their own setter counters,
//! and follow the browser's dirty-value rule: until written through the
//! property, they fall back to the `value` / `checked` attributes.

use std::fmt;

use ahash::{AHashMap, AHashSet};
use indexmap::IndexMap;
use smallvec::SmallVec;

use crate::event::{Event, EventListener};
use crate::node::{Namespace, Node, NodeKind};
use crate::properties;
use crate::style::StyleDeclaration;

/// A value stored in a DOM property.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum DomValue {
    #[default]
    Undefined,
    Null,
    Bool(bool),
    Number(f64),
    Text(String),
}

impl DomValue {
    /// JavaScript-like truthiness.
    #[must_use]
    pub fn is_truthy(&self) -> bool {
        match self {
            Self::Undefined | Self::Null => false,
            Self::Bool(b) => *b,
            Self::Number(n) => *n != 0.0 && !n.is_nan(),
            Self::Text(s) => !s.is_empty(),
        }
    }

    /// String conversion used when a property reflects to an attribute or a
    /// string-typed slot. `Undefined` and `Null` become empty.
    #[must_use]
    pub fn to_dom_string(&self) -> String {
        match self {
            Self::Undefined | Self::Null => String::new(),
            Self::Bool(b) => b.to_string(),
            Self::Number(n) => format_number(*n),
            Self::Text(s) => s.clone(),
        }
    }
}

impl fmt::Display for DomValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Undefined => f.write_str("undefined"),
            Self::Null => f.write_str("null"),
            other => f.write_str(&other.to_dom_string()),
        }
    }
}

/// Format a number the way JavaScript's `String(n)` does.
///
/// Magnitudes in `[1e-6, 1e21)` print in positional notation with the
/// shortest round-trip digits; everything else uses exponent form with an
/// explicit sign (`1e+21`, `1.5e-7`).
#[must_use]
pub fn format_number(n: f64) -> String {
    if n.is_nan() {
        return "NaN".to_string();
    }
    if n.is_infinite() {
        return if n > 0.0 { "Infinity" } else { "-Infinity" }.to_string();
    }
    if n == 0.0 {
        return "0".to_string();
    }
    let magnitude = n.abs();
    if (1e-6..1e21).contains(&magnitude) {
        return format!("{n}");
    }
    let exponent_form = format!("{n:e}");
    match exponent_form.split_once('e') {
        Some((mantissa, exp)) if !exp.starts_with('-') => format!("{mantissa}e+{exp}"),
        _ => exponent_form,
    }
}

pub(crate) struct ElementData {
    pub(crate) tag: String,
    pub(crate) namespace: Namespace,
    pub(crate) attributes: IndexMap<String, String>,
    properties: AHashMap<String, DomValue>,
    defined_properties: AHashSet<String>,
    value: Option<String>,
    checked: Option<bool>,
    composing: bool,
    pub(crate) style: StyleDeclaration,
    listeners: SmallVec<[(String, EventListener); 2]>,
    shadow_root: Option<Node>,
}

impl ElementData {
    pub(crate) fn new(tag: &str, namespace: Namespace) -> Self {
        Self {
            tag: tag.to_string(),
            namespace,
            attributes: IndexMap::new(),
            properties: AHashMap::new(),
            defined_properties: AHashSet::new(),
            value: None,
            checked: None,
            composing: false,
            style: StyleDeclaration::new(),
            listeners: SmallVec::new(),
            shadow_root: None,
        }
    }
}

impl Node {
    fn with_element<R>(&self, f: impl FnOnce(&ElementData) -> R) -> Option<R> {
        match &self.inner.borrow().kind {
            NodeKind::Element(el) => Some(f(el)),
            _ => None,
        }
    }

    fn with_element_mut<R>(&self, f: impl FnOnce(&mut ElementData) -> R) -> Option<R> {
        match &mut self.inner.borrow_mut().kind {
            NodeKind::Element(el) => Some(f(el)),
            _ => None,
        }
    }

    /// Tag name as created (`None` for non-elements).
    #[must_use]
    pub fn tag_name(&self) -> Option<String> {
        self.with_element(|el| el.tag.clone())
    }

    /// Element namespace (`None` for non-elements).
    #[must_use]
    pub fn namespace(&self) -> Option<Namespace> {
        self.with_element(|el| el.namespace)
    }

    // ── Attributes ───────────────────────────────────────────────────

    #[must_use]
    pub fn get_attribute(&self, name: &str) -> Option<String> {
        self.with_element(|el| {
            if name == "style" {
                return (!el.style.is_empty()).then(|| el.style.css_text());
            }
            el.attributes.get(name).cloned()
        })
        .flatten()
    }

    #[must_use]
    pub fn has_attribute(&self, name: &str) -> bool {
        self.get_attribute(name).is_some()
    }

    /// Attribute names in insertion order (`style` last when present).
    #[must_use]
    pub fn attribute_names(&self) -> Vec<String> {
        self.with_element(|el| {
            let mut names: Vec<String> = el.attributes.keys().cloned().collect();
            if !el.style.is_empty() {
                names.push("style".to_string());
            }
            names
        })
        .unwrap_or_default()
    }

    pub fn set_attribute(&self, name: &str, value: &str) {
        let written = self.with_element_mut(|el| {
            if name == "style" {
                el.style = StyleDeclaration::parse(value);
            } else {
                el.attributes.insert(name.to_string(), value.to_string());
            }
        });
        if written.is_some() {
            self.with_counters(|c| c.attribute_written());
        }
    }

    pub fn remove_attribute(&self, name: &str) {
        let removed = self
            .with_element_mut(|el| {
                if name == "style" {
                    let had = !el.style.is_empty();
                    el.style = StyleDeclaration::new();
                    had
                } else {
                    el.attributes.shift_remove(name).is_some()
                }
            })
            .unwrap_or(false);
        if removed {
            self.with_counters(|c| c.attribute_removed());
        }
    }

    // ── Properties ───────────────────────────────────────────────────

    /// Whether this element exposes a writable DOM property `name`.
    #[must_use]
    pub fn has_property(&self, name: &str) -> bool {
        self.with_element(|el| {
            el.defined_properties.contains(name)
                || properties::has_writable_property(&el.tag, el.namespace, name)
        })
        .unwrap_or(false)
    }

    /// Declare an instance property (custom elements).
    pub fn define_property(&self, name: &str) {
        self.with_element_mut(|el| {
            el.defined_properties.insert(name.to_string());
        });
    }

    /// Current value of a property.
    #[must_use]
    pub fn property(&self, name: &str) -> DomValue {
        match name {
            "value" => DomValue::Text(self.value()),
            "checked" => DomValue::Bool(self.checked()),
            _ => self
                .with_element(|el| el.properties.get(name).cloned())
                .flatten()
                .unwrap_or_default(),
        }
    }

    /// Write a property. Reflecting properties update their attribute.
    pub fn set_property(&self, name: &str, value: DomValue) {
        match name {
            "value" => return self.set_value(&value.to_dom_string()),
            "checked" => return self.set_checked(value.is_truthy()),
            _ => {}
        }
        let written = self.with_element_mut(|el| {
            if let Some((attr, boolean)) = properties::reflected_attribute(name) {
                reflect(el, attr, boolean, &value);
            }
            el.properties.insert(name.to_string(), value);
        });
        if written.is_some() {
            self.with_counters(|c| c.property_written());
        }
    }

    /// Reset a property to `undefined`.
    pub fn clear_property(&self, name: &str) {
        match name {
            "value" => return self.set_value(""),
            "checked" => return self.set_checked(false),
            _ => {}
        }
        let written = self.with_element_mut(|el| {
            if let Some((attr, _)) = properties::reflected_attribute(name) {
                el.attributes.shift_remove(attr);
            }
            el.properties.insert(name.to_string(), DomValue::Undefined);
        });
        if written.is_some() {
            self.with_counters(|c| c.property_written());
        }
    }

    /// Live `value`: the dirty value if written, else the `value` attribute.
    #[must_use]
    pub fn value(&self) -> String {
        self.with_element(|el| {
            el.value
                .clone()
                .or_else(|| el.attributes.get("value").cloned())
                .unwrap_or_default()
        })
        .unwrap_or_default()
    }

    /// The `value` setter.
    pub fn set_value(&self, value: &str) {
        if self
            .with_element_mut(|el| el.value = Some(value.to_string()))
            .is_some()
        {
            self.with_counters(|c| c.value_written());
        }
    }

    /// Live `checked`: the dirty state if written, else the `checked`
    /// attribute's presence.
    #[must_use]
    pub fn checked(&self) -> bool {
        self.with_element(|el| el.checked.unwrap_or_else(|| el.attributes.contains_key("checked")))
            .unwrap_or(false)
    }

    /// The `checked` setter.
    pub fn set_checked(&self, checked: bool) {
        if self
            .with_element_mut(|el| el.checked = Some(checked))
            .is_some()
        {
            self.with_counters(|c| c.checked_written());
        }
    }

    // ── User input simulation ────────────────────────────────────────

    /// Whether an IME composition session is active.
    #[must_use]
    pub fn is_composing(&self) -> bool {
        self.with_element(|el| el.composing).unwrap_or(false)
    }

    /// Start or end an IME composition session, dispatching
    /// `compositionstart` / `compositionend`.
    pub fn set_composing(&self, composing: bool) {
        self.with_element_mut(|el| el.composing = composing);
        let event = if composing {
            "compositionstart"
        } else {
            "compositionend"
        };
        self.dispatch_event(event);
    }

    /// Simulate the user typing: the value changes without invoking the
    /// setter, then `input` is dispatched.
    pub fn simulate_input(&self, value: &str) {
        self.with_element_mut(|el| el.value = Some(value.to_string()));
        self.dispatch_event("input");
    }

    /// Focus this element in its document.
    pub fn focus(&self) {
        if let Some(doc) = self.owner_document() {
            doc.focus(self);
        }
    }

    // ── Style ────────────────────────────────────────────────────────

    /// Copy of the inline style declaration.
    #[must_use]
    pub fn style(&self) -> StyleDeclaration {
        self.with_element(|el| el.style.clone()).unwrap_or_default()
    }

    /// `style.cssText` getter.
    #[must_use]
    pub fn style_css_text(&self) -> String {
        self.with_element(|el| el.style.css_text()).unwrap_or_default()
    }

    /// `style.cssText` setter: replaces every declaration.
    pub fn set_style_css_text(&self, css: &str) {
        if self
            .with_element_mut(|el| el.style = StyleDeclaration::parse(css))
            .is_some()
        {
            self.with_counters(|c| c.style_written());
        }
    }

    /// `style.setProperty`.
    pub fn style_set_property(&self, name: &str, value: &str) {
        if self
            .with_element_mut(|el| el.style.set_property(name, value))
            .unwrap_or(false)
        {
            self.with_counters(|c| c.style_written());
        }
    }

    /// `style.removeProperty`.
    pub fn style_remove_property(&self, name: &str) {
        if self
            .with_element_mut(|el| el.style.remove_property(name))
            .unwrap_or(false)
        {
            self.with_counters(|c| c.style_written());
        }
    }

    // ── Listeners ────────────────────────────────────────────────────

    /// Register `listener` for `event_type`. Registering the same listener
    /// twice for the same type is a no-op.
    pub fn add_event_listener(&self, event_type: &str, listener: EventListener) {
        let added = self
            .with_element_mut(|el| {
                let exists = el
                    .listeners
                    .iter()
                    .any(|(ty, l)| ty == event_type && l.same_as(&listener));
                if !exists {
                    el.listeners.push((event_type.to_string(), listener));
                }
                !exists
            })
            .unwrap_or(false);
        if added {
            self.with_counters(|c| c.listener_added());
        }
    }

    /// Unregister `listener` for `event_type`.
    pub fn remove_event_listener(&self, event_type: &str, listener: &EventListener) -> bool {
        let removed = self
            .with_element_mut(|el| {
                let before = el.listeners.len();
                el.listeners
                    .retain(|(ty, l)| !(ty == event_type && l.same_as(listener)));
                el.listeners.len() != before
            })
            .unwrap_or(false);
        if removed {
            self.with_counters(|c| c.listener_removed());
        }
        removed
    }

    /// Number of listeners registered for `event_type`.
    #[must_use]
    pub fn listener_count(&self, event_type: &str) -> usize {
        self.with_element(|el| el.listeners.iter().filter(|(ty, _)| ty == event_type).count())
            .unwrap_or(0)
    }

    fn listeners_for(&self, event_type: &str) -> Vec<EventListener> {
        self.with_element(|el| {
            el.listeners
                .iter()
                .filter(|(ty, _)| ty == event_type)
                .map(|(_, l)| l.clone())
                .collect()
        })
        .unwrap_or_default()
    }

    /// Dispatch a bubbling event of `event_type` at this node.
    pub fn dispatch_event(&self, event_type: &str) -> Event {
        self.dispatch(Event::new(event_type, self.clone(), true, None))
    }

    /// Dispatch a bubbling custom event carrying `detail`.
    pub fn dispatch_custom_event(&self, event_type: &str, detail: impl Into<String>) -> Event {
        self.dispatch(Event::new(event_type, self.clone(), true, Some(detail.into())))
    }

    /// Shorthand for `dispatch_event("click")`.
    pub fn click(&self) -> Event {
        self.dispatch_event("click")
    }

    fn dispatch(&self, event: Event) -> Event {
        let mut current = Some(self.clone());
        while let Some(node) = current {
            event.set_current_target(Some(node.clone()));
            // Snapshot so listeners may add/remove listeners while running.
            for listener in node.listeners_for(event.event_type()) {
                listener.call(&event);
            }
            if !event.bubbles() || event.is_propagation_stopped() {
                break;
            }
            current = node.parent().and_then(|parent| {
                if parent.node_type() == crate::NodeType::ShadowRoot {
                    parent.shadow_host()
                } else {
                    Some(parent)
                }
            });
        }
        event.set_current_target(None);
        event
    }

    // ── Shadow DOM ───────────────────────────────────────────────────

    /// Attach (or return the existing) open shadow root.
    pub fn attach_shadow(&self) -> Node {
        if let Some(existing) = self.shadow_root() {
            return existing;
        }
        let doc = self.owner_document().unwrap_or_default();
        let shadow = doc.create_shadow_root(self);
        self.with_element_mut(|el| el.shadow_root = Some(shadow.clone()));
        shadow
    }

    #[must_use]
    pub fn shadow_root(&self) -> Option<Node> {
        self.with_element(|el| el.shadow_root.clone()).flatten()
    }

    /// Host of a shadow root.
    #[must_use]
    pub fn shadow_host(&self) -> Option<Node> {
        match &self.inner.borrow().kind {
            NodeKind::ShadowRoot { host } => host.upgrade().map(Node::from_rc),
            _ => None,
        }
    }
}

fn reflect(el: &mut ElementData, attr: &str, boolean: bool, value: &DomValue) {
    if boolean {
        if value.is_truthy() {
            el.attributes.insert(attr.to_string(), String::new());
        } else {
            el.attributes.shift_remove(attr);
        }
        return;
    }
    match value {
        DomValue::Undefined | DomValue::Null => {
            el.attributes.shift_remove(attr);
        }
        other => {
            el.attributes.insert(attr.to_string(), other.to_dom_string());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Document;
    use std::cell::Cell;
    use std::rc::Rc;

    #[test]
    fn value_falls_back_to_attribute_until_dirty() {
        let doc = Document::new();
        let input = doc.create_element("input");
        input.set_attribute("value", "seed");
        assert_eq!(input.value(), "seed");
        input.set_value("typed");
        input.set_attribute("value", "ignored");
        assert_eq!(input.value(), "typed");
        assert_eq!(doc.mutations().value_writes, 1);
    }

    #[test]
    fn reflecting_property_updates_attribute() {
        let doc = Document::new();
        let button = doc.create_element("button");
        button.set_property("disabled", DomValue::Bool(true));
        assert_eq!(button.get_attribute("disabled").as_deref(), Some(""));
        button.set_property("disabled", DomValue::Bool(false));
        assert!(!button.has_attribute("disabled"));
        button.set_property("id", DomValue::Text("go".into()));
        assert_eq!(button.get_attribute("id").as_deref(), Some("go"));
        button.clear_property("id");
        assert!(!button.has_attribute("id"));
        assert_eq!(button.property("id"), DomValue::Undefined);
    }

    #[test]
    fn style_attribute_mirrors_declaration() {
        let doc = Document::new();
        let div = doc.create_element("div");
        div.set_attribute("style", "color: red");
        assert_eq!(div.style().get_property_value("color"), "red");
        div.style_set_property("margin", "0");
        assert_eq!(
            div.get_attribute("style").as_deref(),
            Some("color: red; margin: 0;")
        );
        div.remove_attribute("style");
        assert_eq!(div.style_css_text(), "");
    }

    #[test]
    fn listeners_dedupe_and_bubble() {
        let doc = Document::new();
        let outer = doc.create_element("div");
        let inner = doc.create_element("button");
        outer.append_child(&inner);

        let hits = Rc::new(Cell::new(0));
        let h = Rc::clone(&hits);
        let listener = EventListener::new(move |_| h.set(h.get() + 1));
        inner.add_event_listener("click", listener.clone());
        inner.add_event_listener("click", listener.clone());
        assert_eq!(inner.listener_count("click"), 1);

        let bubbled = Rc::new(Cell::new(false));
        let b = Rc::clone(&bubbled);
        outer.add_event_listener("click", EventListener::new(move |_| b.set(true)));

        inner.click();
        assert_eq!(hits.get(), 1);
        assert!(bubbled.get());

        assert!(inner.remove_event_listener("click", &listener));
        inner.click();
        assert_eq!(hits.get(), 1);
    }

    #[test]
    fn events_cross_shadow_boundary() {
        let doc = Document::new();
        let host = doc.create_element("x-counter");
        let shadow = host.attach_shadow();
        let button = doc.create_element("button");
        shadow.append_child(&button);

        let seen = Rc::new(Cell::new(false));
        let s = Rc::clone(&seen);
        host.add_event_listener("ping", EventListener::new(move |e| {
            s.set(e.detail() == Some("1"));
        }));
        button.dispatch_custom_event("ping", "1");
        assert!(seen.get());
    }

    #[test]
    fn simulated_input_does_not_count_as_setter() {
        let doc = Document::new();
        let input = doc.create_element("input");
        input.simulate_input("hello");
        assert_eq!(input.value(), "hello");
        assert_eq!(doc.mutations().value_writes, 0);
    }

    #[test]
    fn number_formatting() {
        assert_eq!(format_number(3.0), "3");
        assert_eq!(format_number(-0.5), "-0.5");
        assert_eq!(format_number(f64::NAN), "NaN");
        assert_eq!(format_number(-0.0), "0");
    }

    #[test]
    fn large_integral_numbers_keep_every_digit() {
        assert_eq!(format_number(1e20), "100000000000000000000");
        assert_eq!(format_number(-1e20), "-100000000000000000000");
        assert_eq!(format_number(1e19), "10000000000000000000");
    }

    #[test]
    fn numbers_outside_positional_range_use_exponent_form() {
        assert_eq!(format_number(1e21), "1e+21");
        assert_eq!(format_number(-2.5e30), "-2.5e+30");
        assert_eq!(format_number(1.5e-7), "1.5e-7");
        assert_eq!(format_number(0.000001), "0.000001");
    }
}
