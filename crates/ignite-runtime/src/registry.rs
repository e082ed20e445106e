#![forbid(unsafe_code)]

//! Custom element registry.
//!
//! Definitions of different state types live side by side behind the
//! [`ElementHandle`] object interface.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use ignite_dom::{Document, Node};
use indexmap::IndexMap;

use crate::component::{Component, Lifecycle};
use crate::definition::ComponentDefinition;
use crate::error::Result;

/// Names the platform reserves even though they contain a hyphen.
const RESERVED_NAMES: &[&str] = &[
    "annotation-xml",
    "color-profile",
    "font-face",
    "font-face-src",
    "font-face-uri",
    "font-face-format",
    "font-face-name",
    "missing-glyph",
];

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistryError {
    #[error("custom element {tag:?} is already defined")]
    DuplicateTag { tag: String },

    #[error("invalid custom element name {tag:?}: {reason}")]
    InvalidTagName { tag: String, reason: &'static str },

    #[error("no custom element named {tag:?}")]
    UnknownTag { tag: String },
}

/// Check `tag` against the custom element naming rules.
///
/// # Errors
/// [`RegistryError::InvalidTagName`] describing the first rule broken.
pub fn validate_tag_name(tag: &str) -> std::result::Result<(), RegistryError> {
    let invalid = |reason| {
        Err(RegistryError::InvalidTagName {
            tag: tag.to_string(),
            reason,
        })
    };
    if !tag.starts_with(|c: char| c.is_ascii_lowercase()) {
        return invalid("must start with a lowercase ASCII letter");
    }
    if !tag.contains('-') {
        return invalid("must contain a hyphen");
    }
    if tag.chars().any(|c| c.is_ascii_uppercase()) {
        return invalid("must not contain uppercase letters");
    }
    if tag
        .chars()
        .any(|c| !(c.is_alphanumeric() || matches!(c, '-' | '.' | '_')))
    {
        return invalid("contains a character outside the name grammar");
    }
    if RESERVED_NAMES.contains(&tag) {
        return invalid("name is reserved");
    }
    Ok(())
}

/// A created element with a component bound to it.
pub trait ElementHandle {
    fn host(&self) -> &Node;

    /// # Errors
    /// Whatever the component's connect reports.
    fn connect(&self) -> Result<()>;

    fn disconnect(&self);

    fn lifecycle(&self) -> Lifecycle;
}

impl<S: Clone + 'static, E: 'static> ElementHandle for Component<S, E> {
    fn host(&self) -> &Node {
        Component::host(self)
    }

    fn connect(&self) -> Result<()> {
        Component::connect(self)
    }

    fn disconnect(&self) {
        Component::disconnect(self);
    }

    fn lifecycle(&self) -> Lifecycle {
        Component::lifecycle(self)
    }
}

trait ErasedDefinition {
    fn instantiate(&self, host: Node) -> Box<dyn ElementHandle>;
}

impl<S: Clone + 'static, E: 'static> ErasedDefinition for ComponentDefinition<S, E> {
    fn instantiate(&self, host: Node) -> Box<dyn ElementHandle> {
        Box::new(Component::new(self.clone(), host))
    }
}

/// Tag name to definition table.
#[derive(Default)]
pub struct ElementRegistry {
    definitions: RefCell<IndexMap<String, Rc<dyn ErasedDefinition>>>,
}

impl fmt::Debug for ElementRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ElementRegistry")
            .field("tags", &self.tags())
            .finish()
    }
}

impl ElementRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `definition` under `tag`.
    ///
    /// # Errors
    /// [`RegistryError::InvalidTagName`] or [`RegistryError::DuplicateTag`].
    pub fn define<S: Clone + 'static, E: 'static>(
        &self,
        tag: &str,
        definition: ComponentDefinition<S, E>,
    ) -> std::result::Result<(), RegistryError> {
        validate_tag_name(tag)?;
        let mut definitions = self.definitions.borrow_mut();
        if definitions.contains_key(tag) {
            return Err(RegistryError::DuplicateTag {
                tag: tag.to_string(),
            });
        }
        definitions.insert(tag.to_string(), Rc::new(definition));
        tracing::debug!(tag, "custom element defined");
        Ok(())
    }

    pub fn is_defined(&self, tag: &str) -> bool {
        self.definitions.borrow().contains_key(tag)
    }

    /// Defined tags, in definition order.
    pub fn tags(&self) -> Vec<String> {
        self.definitions.borrow().keys().cloned().collect()
    }

    /// Create a `tag` element in `document` with its component bound.
    ///
    /// # Errors
    /// [`RegistryError::UnknownTag`] when `tag` was never defined.
    pub fn create(
        &self,
        tag: &str,
        document: &Document,
    ) -> std::result::Result<Box<dyn ElementHandle>, RegistryError> {
        let definition = self
            .definitions
            .borrow()
            .get(tag)
            .cloned()
            .ok_or_else(|| RegistryError::UnknownTag {
                tag: tag.to_string(),
            })?;
        Ok(definition.instantiate(document.create_element(tag)))
    }
}
