#![forbid(unsafe_code)]

//! Property/attribute classification.
//!
//! Browsers answer "does this element expose a writable property named X" by
//! reflection. Here the answer comes from a precomputed table: global HTML
//! properties, per-tag form-control and media properties, and whatever an
//! element instance defines for itself (see
//! [`Node::define_property`](crate::Node::define_property)).
//!
//! SVG elements expose no writable properties through this table; their
//! props always go through attributes.

use crate::node::Namespace;

/// Properties every HTML element exposes.
const GLOBAL: &[&str] = &[
    "id",
    "title",
    "lang",
    "dir",
    "hidden",
    "tabIndex",
    "accessKey",
    "draggable",
    "spellcheck",
    "contentEditable",
    "inert",
    "translate",
    "autofocus",
    "slot",
];

const INPUT: &[&str] = &[
    "value",
    "checked",
    "disabled",
    "type",
    "name",
    "placeholder",
    "readOnly",
    "required",
    "min",
    "max",
    "step",
    "multiple",
    "indeterminate",
    "defaultValue",
    "defaultChecked",
    "accept",
    "autocomplete",
    "pattern",
    "size",
    "maxLength",
    "minLength",
    "src",
    "alt",
];

const TEXTAREA: &[&str] = &[
    "value",
    "disabled",
    "name",
    "placeholder",
    "readOnly",
    "required",
    "rows",
    "cols",
    "wrap",
    "maxLength",
    "minLength",
    "defaultValue",
];

const SELECT: &[&str] = &[
    "value",
    "disabled",
    "multiple",
    "name",
    "required",
    "size",
    "selectedIndex",
];

const OPTION: &[&str] = &["value", "selected", "disabled", "label", "defaultSelected", "text"];
const BUTTON: &[&str] = &["disabled", "type", "name", "value"];
const ANCHOR: &[&str] = &["href", "target", "rel", "download", "hreflang", "type"];
const IMG: &[&str] = &[
    "src",
    "alt",
    "width",
    "height",
    "srcset",
    "sizes",
    "loading",
    "decoding",
    "crossOrigin",
];
const FORM: &[&str] = &["action", "method", "enctype", "target", "noValidate", "name"];
const LABEL: &[&str] = &["htmlFor"];
const IFRAME: &[&str] = &["src", "name", "width", "height", "allow"];
const MEDIA: &[&str] = &["src", "controls", "autoplay", "loop", "muted", "volume", "currentTime"];
const VIDEO_EXTRA: &[&str] = &["poster", "width", "height"];
const OPENABLE: &[&str] = &["open"];
const TABLE_CELL: &[&str] = &["colSpan", "rowSpan"];
const PROGRESS: &[&str] = &["value", "max"];
const METER: &[&str] = &["value", "min", "max", "low", "high", "optimum"];
const VALUE_ONLY: &[&str] = &["value"];
const FIELDSET: &[&str] = &["disabled", "name"];
const OPTGROUP: &[&str] = &["disabled", "label"];
const LINK: &[&str] = &["href", "rel", "media", "type"];

/// Names that exist on the element but are read-only; writes must go through
/// attributes.
const READ_ONLY: &[&str] = &["list", "form", "validity", "labels"];

fn per_tag(tag: &str) -> &'static [&'static str] {
    match tag {
        "input" => INPUT,
        "textarea" => TEXTAREA,
        "select" => SELECT,
        "option" => OPTION,
        "button" => BUTTON,
        "a" | "area" => ANCHOR,
        "img" => IMG,
        "form" => FORM,
        "label" | "output" => LABEL,
        "iframe" => IFRAME,
        "audio" => MEDIA,
        "details" | "dialog" => OPENABLE,
        "td" | "th" => TABLE_CELL,
        "progress" => PROGRESS,
        "meter" => METER,
        "li" | "data" => VALUE_ONLY,
        "fieldset" => FIELDSET,
        "optgroup" => OPTGROUP,
        "link" => LINK,
        _ => &[],
    }
}

/// Whether `tag` in `namespace` exposes a writable DOM property `name`.
#[must_use]
pub fn has_writable_property(tag: &str, namespace: Namespace, name: &str) -> bool {
    if namespace != Namespace::Html || READ_ONLY.contains(&name) {
        return false;
    }
    if GLOBAL.contains(&name) || per_tag(tag).contains(&name) {
        return true;
    }
    if tag == "video" {
        return MEDIA.contains(&name) || VIDEO_EXTRA.contains(&name);
    }
    tag == "output" && name == "value"
}

/// Attribute a property reflects to, if any, and whether it is boolean.
#[must_use]
pub fn reflected_attribute(name: &str) -> Option<(&'static str, bool)> {
    let reflected = match name {
        "id" => ("id", false),
        "title" => ("title", false),
        "lang" => ("lang", false),
        "dir" => ("dir", false),
        "hidden" => ("hidden", true),
        "tabIndex" => ("tabindex", false),
        "accessKey" => ("accesskey", false),
        "slot" => ("slot", false),
        "name" => ("name", false),
        "type" => ("type", false),
        "placeholder" => ("placeholder", false),
        "readOnly" => ("readonly", true),
        "required" => ("required", true),
        "disabled" => ("disabled", true),
        "multiple" => ("multiple", true),
        "min" => ("min", false),
        "max" => ("max", false),
        "step" => ("step", false),
        "href" => ("href", false),
        "target" => ("target", false),
        "rel" => ("rel", false),
        "src" => ("src", false),
        "alt" => ("alt", false),
        "width" => ("width", false),
        "height" => ("height", false),
        "htmlFor" => ("for", false),
        "action" => ("action", false),
        "method" => ("method", false),
        "rows" => ("rows", false),
        "cols" => ("cols", false),
        "open" => ("open", true),
        "colSpan" => ("colspan", false),
        "rowSpan" => ("rowspan", false),
        "label" => ("label", false),
        "controls" => ("controls", true),
        "autoplay" => ("autoplay", true),
        "loop" => ("loop", true),
        "poster" => ("poster", false),
        "autofocus" => ("autofocus", true),
        "maxLength" => ("maxlength", false),
        "minLength" => ("minlength", false),
        "pattern" => ("pattern", false),
        "accept" => ("accept", false),
        "download" => ("download", false),
        "noValidate" => ("novalidate", true),
        "inert" => ("inert", true),
        _ => return None,
    };
    Some(reflected)
}
