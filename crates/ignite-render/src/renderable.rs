#![forbid(unsafe_code)]

//! Raw renderable input returned by views.

use std::fmt;
use std::rc::Rc;

use crate::props::{PropValue, Props};

/// What a view returns before normalization.
#[derive(Clone, Debug, Default)]
pub enum Renderable {
    #[default]
    Null,
    Undefined,
    Bool(bool),
    Text(String),
    Number(f64),
    Element(Descriptor),
    List(Vec<Renderable>),
    /// A value the normalizer does not understand, tagged with its type name.
    Opaque(String),
}

impl Renderable {
    /// Fragment: children are spliced into the parent's position.
    pub fn fragment(children: impl IntoIterator<Item = Renderable>) -> Self {
        Self::Element(Descriptor {
            element_type: ElementType::Fragment,
            props: Props::new(),
            children: children.into_iter().collect(),
            key: None,
        })
    }

    /// An opaque value of type `T`, rendered as a diagnostic comment.
    #[must_use]
    pub fn opaque<T: ?Sized>() -> Self {
        Self::Opaque(std::any::type_name::<T>().to_string())
    }
}

/// Element descriptor (`{type, props, children, key}`).
#[derive(Clone, Debug)]
pub struct Descriptor {
    pub element_type: ElementType,
    pub props: Props,
    pub children: Vec<Renderable>,
    pub key: Option<String>,
}

impl Descriptor {
    /// Descriptor for a function component.
    #[must_use]
    pub fn component(component: Component) -> Self {
        Self {
            element_type: ElementType::Component(component),
            props: Props::new(),
            children: Vec::new(),
            key: None,
        }
    }

    #[must_use]
    pub fn prop(mut self, name: impl Into<String>, value: impl Into<PropValue>) -> Self {
        self.props.insert(name.into(), value.into());
        self
    }

    #[must_use]
    pub fn child(mut self, child: impl Into<Renderable>) -> Self {
        self.children.push(child.into());
        self
    }

    #[must_use]
    pub fn children<R: Into<Renderable>>(mut self, children: impl IntoIterator<Item = R>) -> Self {
        self.children.extend(children.into_iter().map(Into::into));
        self
    }

    #[must_use]
    pub fn key(mut self, key: impl Into<String>) -> Self {
        self.key = Some(key.into());
        self
    }
}

/// Start a tag descriptor: `h("span").prop("class", "x").child("y")`.
#[must_use]
pub fn h(tag: impl Into<String>) -> Descriptor {
    Descriptor {
        element_type: ElementType::Tag(tag.into()),
        props: Props::new(),
        children: Vec::new(),
        key: None,
    }
}

/// The `type` of a descriptor.
#[derive(Clone, Debug)]
pub enum ElementType {
    Tag(String),
    Fragment,
    Component(Component),
}

type RenderFn = dyn Fn(&Props, &[Renderable]) -> Renderable;

/// A function component. Invoked on every normalization pass.
#[derive(Clone)]
pub struct Component {
    name: &'static str,
    render: Rc<RenderFn>,
}

impl Component {
    pub fn new(
        name: &'static str,
        render: impl Fn(&Props, &[Renderable]) -> Renderable + 'static,
    ) -> Self {
        Self {
            name,
            render: Rc::new(render),
        }
    }

    #[must_use]
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Invoke the component with its props and children.
    #[must_use]
    pub fn call(&self, props: &Props, children: &[Renderable]) -> Renderable {
        (self.render)(props, children)
    }
}

impl fmt::Debug for Component {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Component({})", self.name)
    }
}

impl From<Descriptor> for Renderable {
    fn from(value: Descriptor) -> Self {
        Self::Element(value)
    }
}

impl From<&str> for Renderable {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for Renderable {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<&String> for Renderable {
    fn from(value: &String) -> Self {
        Self::Text(value.clone())
    }
}

impl From<bool> for Renderable {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<f64> for Renderable {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<i32> for Renderable {
    fn from(value: i32) -> Self {
        Self::Number(f64::from(value))
    }
}

impl From<i64> for Renderable {
    fn from(value: i64) -> Self {
        // Precision loss above 2^53 matches JavaScript numbers.
        #[allow(clippy::cast_precision_loss)]
        Self::Number(value as f64)
    }
}

impl From<u32> for Renderable {
    fn from(value: u32) -> Self {
        Self::Number(f64::from(value))
    }
}

impl From<usize> for Renderable {
    fn from(value: usize) -> Self {
        #[allow(clippy::cast_precision_loss)]
        Self::Number(value as f64)
    }
}

impl From<()> for Renderable {
    fn from((): ()) -> Self {
        Self::Undefined
    }
}

impl<T: Into<Renderable>> From<Option<T>> for Renderable {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Null, Into::into)
    }
}

impl<T: Into<Renderable>> From<Vec<T>> for Renderable {
    fn from(value: Vec<T>) -> Self {
        Self::List(value.into_iter().map(Into::into).collect())
    }
}

impl From<serde_json::Value> for Renderable {
    fn from(value: serde_json::Value) -> Self {
        use serde_json::Value;
        match value {
            Value::Null => Self::Null,
            Value::Bool(b) => Self::Bool(b),
            Value::Number(n) => n
                .as_f64()
                .map_or_else(|| Self::Text(n.to_string()), Self::Number),
            Value::String(s) => Self::Text(s),
            Value::Array(items) => Self::List(items.into_iter().map(Self::from).collect()),
            Value::Object(_) => Self::Opaque("object".to_string()),
        }
    }
}

impl FromIterator<Renderable> for Renderable {
    fn from_iter<I: IntoIterator<Item = Renderable>>(iter: I) -> Self {
        Self::List(iter.into_iter().collect())
    }
}
