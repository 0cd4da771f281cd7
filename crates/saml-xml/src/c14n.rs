//! Exclusive XML canonicalization (`http://www.w3.org/2001/10/xml-exc-c14n#`).
//!
//! Comments are omitted. Namespace declarations are rendered only where a
//! prefix is visibly used and not already rendered by an output ancestor.

use crate::element::{NamespaceDecl, XmlElement, XmlNode};
use crate::writer::in_scope;
use crate::XML_NS;

/// Canonicalizes `element` and its subtree.
#[must_use]
pub fn canonicalize(element: &XmlElement) -> String {
    canonicalize_excluding(element, |_| false)
}

/// Canonicalizes `element`, omitting every descendant element for which
/// `exclude` returns true (used for the enveloped-signature transform).
#[must_use]
pub fn canonicalize_excluding<F>(element: &XmlElement, exclude: F) -> String
where
    F: Fn(&XmlElement) -> bool,
{
    let mut out = String::new();
    let mut rendered = Vec::new();
    write_canonical(&mut out, element, &mut rendered, &exclude);
    out
}

fn write_canonical<F>(
    out: &mut String,
    element: &XmlElement,
    rendered: &mut Vec<NamespaceDecl>,
    exclude: &F,
) where
    F: Fn(&XmlElement) -> bool,
{
    let mark = rendered.len();

    let mut utilized: Vec<(Option<&str>, &str)> =
        vec![(element.prefix(), element.namespace_uri().unwrap_or(""))];
    for attr in element.attributes() {
        if let (Some(prefix), Some(uri)) = (attr.name.prefix(), attr.namespace.as_deref()) {
            if prefix != "xml" && uri != XML_NS {
                utilized.push((Some(prefix), uri));
            }
        }
    }

    let mut decls: Vec<NamespaceDecl> = Vec::new();
    for (prefix, uri) in utilized {
        if decls.iter().any(|d| d.prefix.as_deref() == prefix) {
            continue;
        }
        let current = in_scope(rendered, prefix).unwrap_or("");
        if current != uri {
            decls.push(NamespaceDecl {
                prefix: prefix.map(str::to_string),
                uri: uri.to_string(),
            });
        }
    }
    decls.sort_by(|a, b| a.prefix.cmp(&b.prefix));
    rendered.extend(decls.iter().cloned());

    let mut attributes: Vec<_> = element.attributes().iter().collect();
    attributes.sort_by(|a, b| {
        let ka = (a.namespace.as_deref().unwrap_or(""), a.local_name());
        let kb = (b.namespace.as_deref().unwrap_or(""), b.local_name());
        ka.cmp(&kb)
    });

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
        escape_attribute(out, &decl.uri);
        out.push('"');
    }
    for attr in attributes {
        out.push(' ');
        out.push_str(&attr.name.to_string());
        out.push_str("=\"");
        escape_attribute(out, &attr.value);
        out.push('"');
    }
    out.push('>');

    for child in element.children() {
        match child {
            XmlNode::Element(e) if !exclude(e) => write_canonical(out, e, rendered, exclude),
            XmlNode::Text(text) => escape_text(out, text),
            _ => {}
        }
    }

    out.push_str("</");
    out.push_str(&name);
    out.push('>');
    rendered.truncate(mark);
}

fn escape_text(out: &mut String, text: &str) {
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '\r' => out.push_str("&#xD;"),
            _ => out.push(c),
        }
    }
}

fn escape_attribute(out: &mut String, value: &str) {
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '"' => out.push_str("&quot;"),
            '\t' => out.push_str("&#x9;"),
            '\n' => out.push_str("&#xA;"),
            '\r' => out.push_str("&#xD;"),
            _ => out.push(c),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sorts_attributes_and_expands_empty_elements() {
        let root = XmlElement::parse(
            r#"<md:A xmlns:md="urn:md" xmlns:z="urn:z" xmlns:unused="urn:u" z:b="2" c="3" a="1"><md:B/></md:A>"#,
        )
        .unwrap();
        assert_eq!(
            canonicalize(&root),
            r#"<md:A xmlns:md="urn:md" xmlns:z="urn:z" a="1" c="3" z:b="2"><md:B></md:B></md:A>"#
        );
    }

    #[test]
    fn excluded_children_are_omitted() {
        let root = XmlElement::parse(
            r#"<md:A xmlns:md="urn:md" xmlns:ds="urn:ds"><ds:Signature>x</ds:Signature><md:B>t</md:B></md:A>"#,
        )
        .unwrap();
        let out = canonicalize_excluding(&root, |e| e.is("urn:ds", "Signature"));
        assert_eq!(out, r#"<md:A xmlns:md="urn:md"><md:B>t</md:B></md:A>"#);
    }

    #[test]
    fn comments_are_dropped_and_text_escaped() {
        let root = XmlElement::parse("<a><!--c-->x &gt; y &amp; z</a>").unwrap();
        assert_eq!(canonicalize(&root), "<a>x &gt; y &amp; z</a>");
    }

    #[test]
    fn indentation_is_part_of_the_canonical_form() {
        let pretty = XmlElement::parse("<a>\n  <b/>\n</a>").unwrap();
        let compact = XmlElement::parse("<a><b/></a>").unwrap();
        assert_eq!(canonicalize(&pretty), "<a>\n  <b></b>\n</a>");
        assert_ne!(canonicalize(&pretty), canonicalize(&compact));
    }

    #[test]
    fn formatting_of_namespace_declarations_does_not_matter() {
        let one = XmlElement::parse(r#"<p:a xmlns:p="urn:p"><p:b/></p:a>"#).unwrap();
        let two = XmlElement::parse(r#"<p:a xmlns:p="urn:p"><p:b xmlns:p="urn:p"></p:b></p:a>"#).unwrap();
        assert_eq!(canonicalize(&one), canonicalize(&two));
    }
}
