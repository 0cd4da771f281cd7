//! Parsing XML text into an element tree.

use std::sync::Arc;

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use crate::element::{NamespaceDecl, QualifiedName, XmlAttribute, XmlElement, XmlNode};
use crate::error::{XmlError, XmlResult};
use crate::{XMLNS_NS, XML_NS};

impl XmlElement {
    /// Parses a document and returns its root element.
    ///
    /// Text inside the root, whitespace included, and comments are kept as
    /// written, so the tree canonicalizes the same way the source does.
    pub fn parse(xml: &str) -> XmlResult<Self> {
        let mut reader = Reader::from_str(xml);
        let mut stack: Vec<XmlElement> = Vec::new();
        let mut scopes: Vec<Arc<[NamespaceDecl]>> = Vec::new();
        let mut root: Option<XmlElement> = None;

        loop {
            let event = reader.read_event().map_err(|err| XmlError::Syntax {
                position: reader.buffer_position(),
                message: err.to_string(),
            })?;
            match event {
                Event::Start(start) => {
                    let element = open_element(&start, &mut scopes)?;
                    stack.push(element);
                }
                Event::Empty(start) => {
                    let element = open_element(&start, &mut scopes)?;
                    scopes.pop();
                    attach(element, &mut stack, &mut root)?;
                }
                Event::End(_) => {
                    scopes.pop();
                    if let Some(element) = stack.pop() {
                        attach(element, &mut stack, &mut root)?;
                    }
                }
                Event::Text(text) => {
                    let value = text.unescape().map_err(|err| XmlError::Syntax {
                        position: reader.buffer_position(),
                        message: err.to_string(),
                    })?;
                    if let Some(parent) = stack.last_mut() {
                        parent.push_node(XmlNode::Text(value.into_owned()));
                    }
                }
                Event::CData(data) => {
                    let value = String::from_utf8(data.into_inner().into_owned())?;
                    if let Some(parent) = stack.last_mut() {
                        parent.push_node(XmlNode::Text(value));
                    }
                }
                Event::Comment(comment) => {
                    let value = String::from_utf8(comment.into_inner().into_owned())?;
                    if let Some(parent) = stack.last_mut() {
                        parent.push_node(XmlNode::Comment(value));
                    }
                }
                Event::Eof => break,
                _ => {}
            }
        }

        if !stack.is_empty() {
            return Err(XmlError::Syntax {
                position: reader.buffer_position(),
                message: "unexpected end of document".to_string(),
            });
        }
        root.ok_or(XmlError::NoRootElement)
    }
}

fn attach(
    element: XmlElement,
    stack: &mut [XmlElement],
    root: &mut Option<XmlElement>,
) -> XmlResult<()> {
    match stack.last_mut() {
        Some(parent) => {
            parent.push_node(XmlNode::Element(element));
            Ok(())
        }
        None if root.is_none() => {
            *root = Some(element);
            Ok(())
        }
        None => Err(XmlError::Syntax {
            position: 0,
            message: "more than one root element".to_string(),
        }),
    }
}

/// Builds an element from a start tag and pushes its namespace scope.
///
/// Each scope entry holds every binding in effect, so children that declare
/// nothing share their parent's entry.
fn open_element(start: &BytesStart<'_>, scopes: &mut Vec<Arc<[NamespaceDecl]>>) -> XmlResult<XmlElement> {
    let mut decls = Vec::new();
    let mut raw_attributes = Vec::new();

    for attr in start.attributes() {
        let attr = attr.map_err(|err| XmlError::Syntax {
            position: 0,
            message: err.to_string(),
        })?;
        let key = std::str::from_utf8(attr.key.as_ref())?.to_string();
        let value = attr
            .unescape_value()
            .map_err(|err| XmlError::Syntax {
                position: 0,
                message: err.to_string(),
            })?
            .into_owned();

        if key == "xmlns" {
            decls.push(NamespaceDecl { prefix: None, uri: value });
        } else if let Some(prefix) = key.strip_prefix("xmlns:") {
            decls.push(NamespaceDecl {
                prefix: Some(prefix.to_string()),
                uri: value,
            });
        } else {
            raw_attributes.push((QualifiedName::parse(&key), value));
        }
    }
    let inherited = scopes.last().filter(|scope| !scope.is_empty()).cloned();
    let scope = match &inherited {
        Some(parent) if decls.is_empty() => Arc::clone(parent),
        parent => {
            let mut bindings: Vec<NamespaceDecl> = parent
                .iter()
                .flat_map(|scope| scope.iter())
                .filter(|binding| !decls.iter().any(|decl| decl.prefix == binding.prefix))
                .cloned()
                .collect();
            bindings.extend(decls.iter().cloned());
            Arc::from(bindings)
        }
    };
    scopes.push(scope);

    let name = QualifiedName::parse(std::str::from_utf8(start.name().as_ref())?);
    let namespace = match name.prefix() {
        Some(prefix) => Some(resolve(scopes, prefix)?),
        None => lookup(scopes, None).filter(|uri| !uri.is_empty()),
    };

    let mut attributes = Vec::with_capacity(raw_attributes.len());
    for (name, value) in raw_attributes {
        let namespace = match name.prefix() {
            Some(prefix) => Some(resolve(scopes, prefix)?),
            None => None,
        };
        attributes.push(XmlAttribute {
            name,
            namespace,
            value,
        });
    }

    Ok(XmlElement::from_parts(name, namespace, decls, inherited, attributes))
}

fn lookup(scopes: &[Arc<[NamespaceDecl]>], prefix: Option<&str>) -> Option<String> {
    scopes
        .last()?
        .iter()
        .find(|decl| decl.prefix.as_deref() == prefix)
        .map(|decl| decl.uri.clone())
}

fn resolve(scopes: &[Arc<[NamespaceDecl]>], prefix: &str) -> XmlResult<String> {
    match prefix {
        "xml" => Ok(XML_NS.to_string()),
        "xmlns" => Ok(XMLNS_NS.to_string()),
        _ => lookup(scopes, Some(prefix))
            .filter(|uri| !uri.is_empty())
            .ok_or_else(|| XmlError::UnboundPrefix(prefix.to_string())),
    }
}
