//! Serializing an element tree to XML text.

use std::fmt;

use quick_xml::escape::{escape, partial_escape};

use crate::element::{NamespaceDecl, XmlElement, XmlNode};
use crate::XML_NS;

impl XmlElement {
    /// Serializes this element and its subtree.
    ///
    /// Namespace declarations stored on an element are written where they
    /// add a binding; any prefix used by the element or its attributes that
    /// is not yet in scope is declared on the element that first needs it.
    /// Bindings a parsed element inherited are re-declared when its content
    /// refers to them and the output has not bound them already.
    #[must_use]
    pub fn to_xml_string(&self) -> String {
        let mut out = String::new();
        let mut scope = Vec::new();
        write_element(&mut out, self, &mut scope);
        out
    }
}

impl fmt::Display for XmlElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_xml_string())
    }
}

pub(crate) fn in_scope<'a>(scope: &'a [NamespaceDecl], prefix: Option<&str>) -> Option<&'a str> {
    scope
        .iter()
        .rev()
        .find(|decl| decl.prefix.as_deref() == prefix)
        .map(|decl| decl.uri.as_str())
}

fn write_element(out: &mut String, element: &XmlElement, scope: &mut Vec<NamespaceDecl>) {
    let mark = scope.len();
    let mut decls: Vec<NamespaceDecl> = Vec::new();

    for decl in element.namespace_declarations() {
        if in_scope(scope, decl.prefix.as_deref()) != Some(decl.uri.as_str()) {
            scope.push(decl.clone());
            decls.push(decl.clone());
        }
    }
    for decl in element.inherited_namespaces() {
        let Some(prefix) = decl.prefix.as_deref() else {
            continue;
        };
        if !decl.uri.is_empty()
            && element.declared_namespace(Some(prefix)).is_none()
            && in_scope(scope, Some(prefix)) != Some(decl.uri.as_str())
            && element.references_prefix(prefix)
        {
            scope.push(decl.clone());
            decls.push(decl.clone());
        }
    }

    let mut required: Vec<(Option<&str>, &str)> = Vec::new();
    match (element.prefix(), element.namespace_uri()) {
        (prefix, Some(uri)) => required.push((prefix, uri)),
        (None, None) => {
            if in_scope(scope, None).is_some_and(|uri| !uri.is_empty()) {
                required.push((None, ""));
            }
        }
        (Some(_), None) => {}
    }
    for attr in element.attributes() {
        if let (Some(prefix), Some(uri)) = (attr.name.prefix(), attr.namespace.as_deref()) {
            if prefix != "xml" && uri != XML_NS {
                required.push((Some(prefix), uri));
            }
        }
    }
    for (prefix, uri) in required {
        if in_scope(scope, prefix) != Some(uri) {
            let decl = NamespaceDecl {
                prefix: prefix.map(str::to_string),
                uri: uri.to_string(),
            };
            scope.push(decl.clone());
            decls.push(decl);
        }
    }

    let name = element.qualified_name();
    out.push('<');
    out.push_str(&name);
    for decl in &decls {
        match &decl.prefix {
            Some(prefix) => {
                out.push_str(" xmlns:");
                out.push_str(prefix);
            }
            None => out.push_str(" xmlns"),
        }
        out.push_str("=\"");
        out.push_str(&escape(decl.uri.as_str()));
        out.push('"');
    }
    for attr in element.attributes() {
        out.push(' ');
        out.push_str(&attr.name.to_string());
        out.push_str("=\"");
        out.push_str(&escape(attr.value.as_str()));
        out.push('"');
    }

    if element.children().is_empty() {
        out.push_str("/>");
    } else {
        out.push('>');
        for child in element.children() {
            match child {
                XmlNode::Element(e) => write_element(out, e, scope),
                XmlNode::Text(text) => out.push_str(&partial_escape(text.as_str())),
                XmlNode::Comment(text) => {
                    out.push_str("<!--");
                    out.push_str(text);
                    out.push_str("-->");
                }
            }
        }
        out.push_str("</");
        out.push_str(&name);
        out.push('>');
    }

    scope.truncate(mark);
}
