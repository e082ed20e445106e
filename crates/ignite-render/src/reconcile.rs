#![forbid(unsafe_code)]

//! Property reconciler: applies one element's prop delta to the live DOM.
//!
//! Every write is guarded by a comparison against the live element, so
//! patching an element toward the props it already has performs no
//! mutation.

use ignite_dom::{Namespace, Node, StyleDeclaration};
use indexmap::IndexMap;

use crate::props::{PropValue, Props, StyleValue};

/// SVG attributes that keep their camelCase spelling.
const SVG_CAMEL_CASE: &[&str] = &[
    "allowReorder",
    "attributeName",
    "attributeType",
    "baseFrequency",
    "baseProfile",
    "calcMode",
    "clipPathUnits",
    "diffuseConstant",
    "edgeMode",
    "filterUnits",
    "glyphRef",
    "gradientTransform",
    "gradientUnits",
    "kernelMatrix",
    "kernelUnitLength",
    "keyPoints",
    "keySplines",
    "keyTimes",
    "lengthAdjust",
    "limitingConeAngle",
    "markerHeight",
    "markerUnits",
    "markerWidth",
    "maskContentUnits",
    "maskUnits",
    "numOctaves",
    "pathLength",
    "patternContentUnits",
    "patternTransform",
    "patternUnits",
    "pointsAtX",
    "pointsAtY",
    "pointsAtZ",
    "preserveAlpha",
    "preserveAspectRatio",
    "primitiveUnits",
    "refX",
    "refY",
    "repeatCount",
    "repeatDur",
    "requiredExtensions",
    "requiredFeatures",
    "specularConstant",
    "specularExponent",
    "spreadMethod",
    "startOffset",
    "stdDeviation",
    "stitchTiles",
    "surfaceScale",
    "systemLanguage",
    "tableValues",
    "targetX",
    "targetY",
    "textLength",
    "viewBox",
    "viewTarget",
    "xChannelSelector",
    "yChannelSelector",
    "zoomAndPan",
];

/// Apply the delta between `old` and `new` props to `element`.
pub fn patch_props(element: &Node, old: &Props, new: &Props) {
    let svg = element.namespace() == Some(Namespace::Svg);
    for (name, previous) in old {
        if !new.contains_key(name) {
            remove_prop(element, name, previous, svg);
        }
    }
    for (name, value) in new {
        set_prop(element, name, old.get(name), value, svg);
    }
}

fn set_prop(element: &Node, name: &str, previous: Option<&PropValue>, value: &PropValue, svg: bool) {
    match name {
        "class" | "className" => patch_class(element, value),
        "style" => patch_style(element, previous, value),
        _ if is_event_prop(name, previous, value) => {
            patch_listener(element, &event_name(name), previous, value);
        }
        _ if uses_property(element, name, svg) => patch_property(element, name, value),
        _ => patch_attribute(element, &attribute_name(name, svg), value),
    }
}

fn remove_prop(element: &Node, name: &str, previous: &PropValue, svg: bool) {
    match name {
        "class" | "className" => element.remove_attribute("class"),
        "style" => {
            if !element.style().is_empty() {
                element.set_style_css_text("");
            }
        }
        _ if is_event_prop(name, Some(previous), &PropValue::Null) => {
            if let Some(listener) = previous.as_handler() {
                element.remove_event_listener(&event_name(name), listener);
            }
        }
        _ if uses_property(element, name, svg) => element.clear_property(name),
        _ => element.remove_attribute(&attribute_name(name, svg)),
    }
}

// ── Class ────────────────────────────────────────────────────────────────

fn patch_class(element: &Node, value: &PropValue) {
    let class = value.attribute_value().unwrap_or_default();
    if class.is_empty() {
        element.remove_attribute("class");
    } else if element.get_attribute("class").as_deref() != Some(class.as_str()) {
        element.set_attribute("class", &class);
    }
}

// ── Style ────────────────────────────────────────────────────────────────

fn patch_style(element: &Node, previous: Option<&PropValue>, value: &PropValue) {
    let previous_map = match previous {
        Some(PropValue::Style(StyleValue::Map(map))) => Some(map),
        _ => None,
    };
    match value {
        PropValue::Style(StyleValue::Map(next)) => {
            if let Some(prev) = previous_map {
                for key in prev.keys() {
                    if !next.contains_key(key) {
                        element.style_remove_property(&css_property_name(key));
                    }
                }
            } else if !element.style().is_empty() {
                // string → map, or first write over a hydrated inline style
                element.set_style_css_text("");
            }
            write_style_map(element, next);
        }
        PropValue::Style(StyleValue::Text(css)) | PropValue::Text(css) => {
            if previous_map.is_some() {
                element.set_style_css_text("");
            }
            if element.style() != StyleDeclaration::parse(css) {
                element.set_style_css_text(css);
            }
        }
        _ => {
            if !element.style().is_empty() {
                element.set_style_css_text("");
            }
        }
    }
}

fn write_style_map(element: &Node, map: &IndexMap<String, String>) {
    let live = element.style();
    for (key, value) in map {
        let property = css_property_name(key);
        if live.get_property_value(&property) != value.trim() {
            element.style_set_property(&property, value);
        }
    }
}

/// `backgroundColor` → `background-color`; custom properties untouched.
#[must_use]
pub fn css_property_name(key: &str) -> String {
    if key.starts_with("--") {
        key.to_string()
    } else {
        camel_to_kebab(key)
    }
}

// ── Listeners ────────────────────────────────────────────────────────────

fn is_event_prop(name: &str, previous: Option<&PropValue>, value: &PropValue) -> bool {
    let Some(rest) = name.strip_prefix("on") else {
        return false;
    };
    if rest.is_empty() {
        return false;
    }
    rest.starts_with(|c: char| c.is_ascii_uppercase())
        || matches!(value, PropValue::Handler(_))
        || matches!(previous, Some(PropValue::Handler(_)))
}

/// `onClick` → `click`, `onValueChange` → `value-change`.
#[must_use]
pub fn event_name(prop: &str) -> String {
    let rest = prop.strip_prefix("on").unwrap_or(prop);
    camel_to_kebab(rest).trim_start_matches('-').to_string()
}

fn patch_listener(element: &Node, event: &str, previous: Option<&PropValue>, value: &PropValue) {
    let old = previous.and_then(PropValue::as_handler);
    let new = value.as_handler();
    match (old, new) {
        (Some(old), Some(new)) if old.same_as(new) => {}
        (old, new) => {
            if let Some(old) = old {
                element.remove_event_listener(event, old);
            }
            if let Some(new) = new {
                element.add_event_listener(event, new.clone());
            } else if !value.is_nullish() {
                tracing::warn!(event, "non-handler value for event prop ignored");
            }
        }
    }
}

// ── Properties ───────────────────────────────────────────────────────────

fn uses_property(element: &Node, name: &str, svg: bool) -> bool {
    !svg && name != "list" && element.has_property(name)
}

fn patch_property(element: &Node, name: &str, value: &PropValue) {
    match name {
        "value" => {
            if element.is_composing() {
                return;
            }
            let next = value.to_dom_value().to_dom_string();
            if element.value() != next {
                element.set_value(&next);
            }
        }
        "checked" => {
            let next = value.to_dom_value().is_truthy();
            if element.checked() != next {
                element.set_checked(next);
            }
        }
        _ => {
            let next = value.to_dom_value();
            if element.property(name) != next {
                element.set_property(name, next);
            }
        }
    }
}

// ── Attributes ───────────────────────────────────────────────────────────

fn patch_attribute(element: &Node, name: &str, value: &PropValue) {
    match value.attribute_value() {
        Some(next) => {
            if element.get_attribute(name).as_deref() != Some(next.as_str()) {
                element.set_attribute(name, &next);
            }
        }
        None => {
            if matches!(value, PropValue::Handler(_)) {
                tracing::warn!(attribute = name, "handler passed to a non-event prop ignored");
            }
            element.remove_attribute(name);
        }
    }
}

/// Attribute name for a prop key.
#[must_use]
pub fn attribute_name(key: &str, svg: bool) -> String {
    if let Some(prefixed) = prefixed_attribute(key) {
        return prefixed;
    }
    if !svg || SVG_CAMEL_CASE.contains(&key) {
        return key.to_string();
    }
    for (prefix, ns) in [("xlink", "xlink"), ("xmlns", "xmlns"), ("xml", "xml")] {
        if let Some(rest) = key.strip_prefix(prefix)
            && rest.starts_with(|c: char| c.is_ascii_uppercase())
        {
            return format!("{ns}:{}", camel_to_kebab(rest).trim_start_matches('-'));
        }
    }
    camel_to_kebab(key)
}

// `dataFooBar` → `data-foo-bar`, `ariaLabel` → `aria-label`.
fn prefixed_attribute(key: &str) -> Option<String> {
    for prefix in ["data", "aria"] {
        if let Some(rest) = key.strip_prefix(prefix)
            && rest.starts_with(|c: char| c.is_ascii_uppercase())
        {
            return Some(format!("{prefix}{}", camel_to_kebab(rest)));
        }
    }
    None
}

fn camel_to_kebab(input: &str) -> String {
    let mut out = String::with_capacity(input.len() + 4);
    for ch in input.chars() {
        if ch.is_ascii_uppercase() {
            out.push('-');
            out.push(ch.to_ascii_lowercase());
        } else {
            out.push(ch);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::rc::Rc;

    use ignite_dom::{Document, DomValue, EventListener};

    use super::*;

    fn props(entries: Vec<(&str, PropValue)>) -> Props {
        entries.into_iter().map(|(k, v)| (k.to_string(), v)).collect()
    }

    #[test]
    fn event_names() {
        assert_eq!(event_name("onClick"), "click");
        assert_eq!(event_name("onValueChange"), "value-change");
        assert_eq!(event_name("onclick"), "click");
    }

    #[test]
    fn attribute_names() {
        assert_eq!(attribute_name("viewBox", true), "viewBox");
        assert_eq!(attribute_name("strokeWidth", true), "stroke-width");
        assert_eq!(attribute_name("xlinkHref", true), "xlink:href");
        assert_eq!(attribute_name("dataTestId", false), "data-test-id");
        assert_eq!(attribute_name("ariaLabel", true), "aria-label");
        assert_eq!(attribute_name("data-raw", false), "data-raw");
        assert_eq!(attribute_name("tabindex", false), "tabindex");
    }

    #[test]
    fn class_goes_to_attribute_and_empty_removes() {
        let doc = Document::new();
        let div = doc.create_element("div");
        patch_props(&div, &Props::new(), &props(vec![("className", "a b".into())]));
        assert_eq!(div.get_attribute("class").as_deref(), Some("a b"));
        let before = doc.mutations();
        patch_props(
            &div,
            &props(vec![("className", "a b".into())]),
            &props(vec![("className", "a b".into())]),
        );
        assert_eq!(doc.mutations(), before);
        patch_props(
            &div,
            &props(vec![("className", "a b".into())]),
            &props(vec![("className", "".into())]),
        );
        assert!(!div.has_attribute("class"));
    }

    #[test]
    fn style_map_diffs_by_key() {
        let doc = Document::new();
        let div = doc.create_element("div");
        let first = props(vec![(
            "style",
            StyleValue::map([("backgroundColor", "red"), ("--gap", "4px")]).into(),
        )]);
        patch_props(&div, &Props::new(), &first);
        assert_eq!(div.style_css_text(), "background-color: red; --gap: 4px;");

        let second = props(vec![("style", StyleValue::map([("backgroundColor", "blue")]).into())]);
        patch_props(&div, &first, &second);
        assert_eq!(div.style_css_text(), "background-color: blue;");
    }

    #[test]
    fn style_string_to_map_clears_first() {
        let doc = Document::new();
        let div = doc.create_element("div");
        let text = props(vec![("style", StyleValue::Text("color: red; margin: 0".into()).into())]);
        patch_props(&div, &Props::new(), &text);
        assert_eq!(div.style_css_text(), "color: red; margin: 0;");
        let map = props(vec![("style", StyleValue::map([("padding", "1px")]).into())]);
        patch_props(&div, &text, &map);
        assert_eq!(div.style_css_text(), "padding: 1px;");
        patch_props(&div, &map, &props(vec![("style", PropValue::Null)]));
        assert_eq!(div.style_css_text(), "");
    }

    #[test]
    fn stable_handler_is_not_re_registered() {
        let doc = Document::new();
        let button = doc.create_element("button");
        let handler = PropValue::handler(|_| {});
        let p = props(vec![("onClick", handler)]);
        patch_props(&button, &Props::new(), &p);
        let before = doc.mutations();
        patch_props(&button, &p, &p.clone());
        assert_eq!(doc.mutations(), before);
        assert_eq!(button.listener_count("click"), 1);
    }

    #[test]
    fn handler_swap_removes_old() {
        let doc = Document::new();
        let button = doc.create_element("button");
        let a_hits = Rc::new(Cell::new(0));
        let b_hits = Rc::new(Cell::new(0));
        let (a, b) = (Rc::clone(&a_hits), Rc::clone(&b_hits));
        let old = props(vec![("onClick", EventListener::new(move |_| a.set(a.get() + 1)).into())]);
        let new = props(vec![("onClick", EventListener::new(move |_| b.set(b.get() + 1)).into())]);
        patch_props(&button, &Props::new(), &old);
        patch_props(&button, &old, &new);
        button.click();
        assert_eq!((a_hits.get(), b_hits.get()), (0, 1));
        patch_props(&button, &new, &Props::new());
        assert_eq!(button.listener_count("click"), 0);
    }

    #[test]
    fn value_respects_composition() {
        let doc = Document::new();
        let input = doc.create_element("input");
        input.set_value("a");
        input.set_composing(true);
        let before = doc.mutations();
        patch_props(
            &input,
            &props(vec![("value", "a".into())]),
            &props(vec![("value", "b".into())]),
        );
        assert_eq!(input.value(), "a");
        assert_eq!(doc.mutations().value_writes, before.value_writes);
        input.set_composing(false);
        patch_props(
            &input,
            &props(vec![("value", "a".into())]),
            &props(vec![("value", "b".into())]),
        );
        assert_eq!(input.value(), "b");
    }

    #[test]
    fn checked_compares_live_state() {
        let doc = Document::new();
        let input = doc.create_element("input");
        let on = props(vec![("checked", true.into())]);
        patch_props(&input, &Props::new(), &on);
        assert!(input.checked());
        let writes = doc.mutations().checked_writes;
        patch_props(&input, &on, &on);
        assert_eq!(doc.mutations().checked_writes, writes);
    }

    #[test]
    fn list_stays_an_attribute() {
        let doc = Document::new();
        let input = doc.create_element("input");
        patch_props(&input, &Props::new(), &props(vec![("list", "suggestions".into())]));
        assert_eq!(input.get_attribute("list").as_deref(), Some("suggestions"));
    }

    #[test]
    fn removed_property_is_cleared() {
        let doc = Document::new();
        let input = doc.create_element("input");
        let with_title = props(vec![("title", "hint".into()), ("data-x", "1".into())]);
        patch_props(&input, &Props::new(), &with_title);
        assert_eq!(input.get_attribute("title").as_deref(), Some("hint"));
        patch_props(&input, &with_title, &Props::new());
        assert_eq!(input.property("title"), DomValue::Undefined);
        assert!(!input.has_attribute("title"));
        assert!(!input.has_attribute("data-x"));
    }

    #[test]
    fn svg_props_are_attributes() {
        let doc = Document::new();
        let rect = doc.create_element_ns("rect", Namespace::Svg);
        patch_props(
            &rect,
            &Props::new(),
            &props(vec![("strokeWidth", 2.into()), ("id", "r".into()), ("hidden", true.into())]),
        );
        assert_eq!(rect.get_attribute("stroke-width").as_deref(), Some("2"));
        assert_eq!(rect.get_attribute("id").as_deref(), Some("r"));
        assert_eq!(rect.get_attribute("hidden").as_deref(), Some(""));
        assert_eq!(doc.mutations().property_writes, 0);
    }
}
