//! Element tree types.

use std::fmt;
use std::sync::Arc;

/// An XML name split into optional prefix and local part.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QualifiedName {
    prefix: Option<String>,
    local_name: String,
}

impl QualifiedName {
    /// Splits `prefix:local` (or a bare `local`) into its parts.
    #[must_use]
    pub fn parse(name: &str) -> Self {
        match name.split_once(':') {
            Some((prefix, local)) => Self {
                prefix: Some(prefix.to_string()),
                local_name: local.to_string(),
            },
            None => Self {
                prefix: None,
                local_name: name.to_string(),
            },
        }
    }

    /// Returns the prefix, if any.
    #[must_use]
    pub fn prefix(&self) -> Option<&str> {
        self.prefix.as_deref()
    }

    /// Returns the local part.
    #[must_use]
    pub fn local_name(&self) -> &str {
        &self.local_name
    }
}

impl fmt::Display for QualifiedName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.prefix {
            Some(prefix) => write!(f, "{prefix}:{}", self.local_name),
            None => f.write_str(&self.local_name),
        }
    }
}

/// A namespace declaration (`xmlns` or `xmlns:prefix`) carried by an element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamespaceDecl {
    /// Declared prefix; `None` for the default namespace.
    pub prefix: Option<String>,
    /// Namespace URI; empty undeclares the default namespace.
    pub uri: String,
}

/// An attribute with its resolved namespace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XmlAttribute {
    /// Name as written in the document.
    pub name: QualifiedName,
    /// Namespace URI; `None` for unqualified attributes.
    pub namespace: Option<String>,
    /// Unescaped value.
    pub value: String,
}

impl XmlAttribute {
    /// Returns the attribute's local name.
    #[must_use]
    pub fn local_name(&self) -> &str {
        self.name.local_name()
    }
}

/// A child node of an element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum XmlNode {
    /// Nested element.
    Element(XmlElement),
    /// Character data (unescaped).
    Text(String),
    /// Comment body.
    Comment(String),
}

/// An owned XML element with resolved namespaces.
///
/// Elements read from a document also remember the bindings their ancestors
/// had in scope, so a subtree lifted out of its document can still
/// serialize prefixes that only appear inside attribute values or text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XmlElement {
    name: QualifiedName,
    namespace: Option<String>,
    namespace_decls: Vec<NamespaceDecl>,
    inherited: Option<Arc<[NamespaceDecl]>>,
    attributes: Vec<XmlAttribute>,
    children: Vec<XmlNode>,
}

impl XmlElement {
    /// Creates an element with no namespace.
    #[must_use]
    pub fn new(local_name: &str) -> Self {
        Self {
            name: QualifiedName::parse(local_name),
            namespace: None,
            namespace_decls: Vec::new(),
            inherited: None,
            attributes: Vec::new(),
            children: Vec::new(),
        }
    }

    /// Creates an element in `namespace` named `qualified_name` (`prefix:local`).
    ///
    /// The namespace is declared automatically on serialization if no
    /// ancestor binds the prefix to it.
    #[must_use]
    pub fn new_ns(namespace: &str, qualified_name: &str) -> Self {
        Self {
            name: QualifiedName::parse(qualified_name),
            namespace: Some(namespace.to_string()),
            namespace_decls: Vec::new(),
            inherited: None,
            attributes: Vec::new(),
            children: Vec::new(),
        }
    }

    pub(crate) fn from_parts(
        name: QualifiedName,
        namespace: Option<String>,
        namespace_decls: Vec<NamespaceDecl>,
        inherited: Option<Arc<[NamespaceDecl]>>,
        attributes: Vec<XmlAttribute>,
    ) -> Self {
        Self {
            name,
            namespace,
            namespace_decls,
            inherited,
            attributes,
            children: Vec::new(),
        }
    }

    /// Returns the element name as written.
    #[must_use]
    pub fn name(&self) -> &QualifiedName {
        &self.name
    }

    /// Returns the local name.
    #[must_use]
    pub fn local_name(&self) -> &str {
        self.name.local_name()
    }

    /// Returns the prefix, if any.
    #[must_use]
    pub fn prefix(&self) -> Option<&str> {
        self.name.prefix()
    }

    /// Returns the namespace URI, if the element is namespace-qualified.
    #[must_use]
    pub fn namespace_uri(&self) -> Option<&str> {
        self.namespace.as_deref()
    }

    /// Returns the `prefix:local` name.
    #[must_use]
    pub fn qualified_name(&self) -> String {
        self.name.to_string()
    }

    /// Returns true if the element has the given namespace and local name.
    #[must_use]
    pub fn is(&self, namespace: &str, local_name: &str) -> bool {
        self.namespace.as_deref() == Some(namespace) && self.local_name() == local_name
    }

    /// Returns namespace declarations written on this element.
    #[must_use]
    pub fn namespace_declarations(&self) -> &[NamespaceDecl] {
        &self.namespace_decls
    }

    /// Returns the bindings in scope from ancestors when this element was parsed.
    #[must_use]
    pub fn inherited_namespaces(&self) -> &[NamespaceDecl] {
        self.inherited.as_deref().unwrap_or(&[])
    }

    /// Declares a namespace on this element, replacing an earlier binding of the same prefix.
    pub fn declare_namespace(&mut self, prefix: Option<&str>, uri: &str) {
        let prefix = prefix.map(str::to_string);
        if let Some(decl) = self.namespace_decls.iter_mut().find(|d| d.prefix == prefix) {
            decl.uri = uri.to_string();
        } else {
            self.namespace_decls.push(NamespaceDecl {
                prefix,
                uri: uri.to_string(),
            });
        }
    }

    /// Returns all attributes in document order.
    #[must_use]
    pub fn attributes(&self) -> &[XmlAttribute] {
        &self.attributes
    }

    /// Returns the value of the unqualified attribute `name`.
    #[must_use]
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|a| a.namespace.is_none() && a.local_name() == name)
            .map(|a| a.value.as_str())
    }

    /// Returns the value of the attribute `{namespace}local_name`.
    #[must_use]
    pub fn attribute_ns(&self, namespace: &str, local_name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|a| a.namespace.as_deref() == Some(namespace) && a.local_name() == local_name)
            .map(|a| a.value.as_str())
    }

    /// Returns true if the unqualified attribute `name` is present.
    #[must_use]
    pub fn has_attribute(&self, name: &str) -> bool {
        self.attribute(name).is_some()
    }

    /// Sets an unqualified attribute, replacing any existing value in place.
    pub fn set_attribute(&mut self, name: &str, value: impl Into<String>) {
        let value = value.into();
        if let Some(existing) = self
            .attributes
            .iter_mut()
            .find(|a| a.namespace.is_none() && a.local_name() == name)
        {
            existing.value = value;
            return;
        }
        self.attributes.push(XmlAttribute {
            name: QualifiedName::parse(name),
            namespace: None,
            value,
        });
    }

    /// Sets a namespace-qualified attribute named `qualified_name` (`prefix:local`).
    pub fn set_attribute_ns(
        &mut self,
        namespace: &str,
        qualified_name: &str,
        value: impl Into<String>,
    ) {
        let value = value.into();
        let name = QualifiedName::parse(qualified_name);
        if let Some(existing) = self.attributes.iter_mut().find(|a| {
            a.namespace.as_deref() == Some(namespace) && a.local_name() == name.local_name()
        }) {
            existing.name = name;
            existing.value = value;
            return;
        }
        self.attributes.push(XmlAttribute {
            name,
            namespace: Some(namespace.to_string()),
            value,
        });
    }

    /// Removes the unqualified attribute `name`, returning its value.
    pub fn remove_attribute(&mut self, name: &str) -> Option<String> {
        let position = self
            .attributes
            .iter()
            .position(|a| a.namespace.is_none() && a.local_name() == name)?;
        Some(self.attributes.remove(position).value)
    }

    /// Returns all child nodes.
    #[must_use]
    pub fn children(&self) -> &[XmlNode] {
        &self.children
    }

    /// Iterates over child elements.
    pub fn child_elements(&self) -> impl Iterator<Item = &XmlElement> {
        self.children.iter().filter_map(|node| match node {
            XmlNode::Element(e) => Some(e),
            _ => None,
        })
    }

    /// Iterates over child elements with the given namespace and local name.
    pub fn children_named<'a>(
        &'a self,
        namespace: &'a str,
        local_name: &'a str,
    ) -> impl Iterator<Item = &'a XmlElement> + 'a {
        self.child_elements()
            .filter(move |e| e.is(namespace, local_name))
    }

    /// Returns the first child element with the given namespace and local name.
    #[must_use]
    pub fn first_child_named(&self, namespace: &str, local_name: &str) -> Option<&XmlElement> {
        self.child_elements().find(|e| e.is(namespace, local_name))
    }

    /// Appends a child element and returns a mutable reference to it.
    pub fn append_child(&mut self, child: XmlElement) -> &mut XmlElement {
        self.children.push(XmlNode::Element(child));
        match self.children.last_mut() {
            Some(XmlNode::Element(e)) => e,
            _ => unreachable!("element was just pushed"),
        }
    }

    /// Creates a namespaced child element, appends it and returns it.
    pub fn append_element_ns(&mut self, namespace: &str, qualified_name: &str) -> &mut XmlElement {
        self.append_child(XmlElement::new_ns(namespace, qualified_name))
    }

    /// Inserts a child element at `index` among all child nodes.
    pub fn insert_child(&mut self, index: usize, child: XmlElement) {
        let index = index.min(self.children.len());
        self.children.insert(index, XmlNode::Element(child));
    }

    /// Removes every child element with the given name, returning how many were removed.
    pub fn remove_children_named(&mut self, namespace: &str, local_name: &str) -> usize {
        let before = self.children.len();
        self.children
            .retain(|node| !matches!(node, XmlNode::Element(e) if e.is(namespace, local_name)));
        before - self.children.len()
    }

    /// Returns a copy of this subtree that no longer depends on its ancestors.
    ///
    /// Inherited bindings for prefixes referenced from attribute values or
    /// text (`xsi:type="xs:string"`) are declared on the copy's root.
    #[must_use]
    pub fn detached(&self) -> Self {
        let mut copy = self.clone();
        for decl in self.inherited_namespaces() {
            let Some(prefix) = decl.prefix.as_deref() else {
                continue;
            };
            if !decl.uri.is_empty()
                && self.declared_namespace(Some(prefix)).is_none()
                && self.references_prefix(prefix)
            {
                copy.namespace_decls.push(decl.clone());
            }
        }
        copy.forget_inherited();
        copy
    }

    fn forget_inherited(&mut self) {
        self.inherited = None;
        for child in &mut self.children {
            if let XmlNode::Element(e) = child {
                e.forget_inherited();
            }
        }
    }

    /// Returns true if an attribute value or text node in this subtree is a
    /// QName with the given prefix.
    pub(crate) fn references_prefix(&self, prefix: &str) -> bool {
        self.attributes
            .iter()
            .any(|attr| qname_prefix(&attr.value) == Some(prefix))
            || self.children.iter().any(|node| match node {
                XmlNode::Element(e) => e.references_prefix(prefix),
                XmlNode::Text(text) => qname_prefix(text) == Some(prefix),
                XmlNode::Comment(_) => false,
            })
    }

    /// Removes namespace declarations in this subtree that only bind a prefix
    /// used by an element or attribute name. The writer regenerates those,
    /// so a detached subtree compares equal to one built in code.
    pub fn drop_implied_declarations(&mut self) {
        let own = (self.name.prefix.clone(), self.namespace.clone());
        let attributes = &self.attributes;
        self.namespace_decls.retain(|decl| {
            let uri = Some(decl.uri.clone());
            let implied_by_name = own.0 == decl.prefix && own.1 == uri;
            let implied_by_attribute = attributes.iter().any(|attr| {
                attr.name.prefix.is_some() && attr.name.prefix == decl.prefix && attr.namespace == uri
            });
            !(implied_by_name || implied_by_attribute)
        });
        for child in &mut self.children {
            if let XmlNode::Element(e) = child {
                e.drop_implied_declarations();
            }
        }
    }

    /// Appends a text node.
    pub fn append_text(&mut self, text: impl Into<String>) {
        self.children.push(XmlNode::Text(text.into()));
    }

    /// Appends a comment node.
    pub fn append_comment(&mut self, text: impl Into<String>) {
        self.children.push(XmlNode::Comment(text.into()));
    }

    pub(crate) fn push_node(&mut self, node: XmlNode) {
        self.children.push(node);
    }

    /// Replaces all children with a single text node.
    pub fn set_text(&mut self, text: impl Into<String>) {
        self.children.clear();
        let text = text.into();
        if !text.is_empty() {
            self.children.push(XmlNode::Text(text));
        }
    }

    /// Returns the concatenated text of all direct text children.
    #[must_use]
    pub fn text(&self) -> String {
        self.children
            .iter()
            .filter_map(|node| match node {
                XmlNode::Text(t) => Some(t.as_str()),
                _ => None,
            })
            .collect()
    }

    /// Returns the namespace URI bound to `prefix` by declarations on this element only.
    #[must_use]
    pub fn declared_namespace(&self, prefix: Option<&str>) -> Option<&str> {
        self.namespace_decls
            .iter()
            .find(|d| d.prefix.as_deref() == prefix)
            .map(|d| d.uri.as_str())
    }
}

fn qname_prefix(value: &str) -> Option<&str> {
    let (prefix, local) = value.trim().split_once(':')?;
    let is_ncname = |part: &str| {
        !part.is_empty()
            && part
                .chars()
                .all(|c| c.is_alphanumeric() || matches!(c, '-' | '_' | '.'))
    };
    (is_ncname(prefix) && is_ncname(local)).then_some(prefix)
}
