//! Exclusive XML Canonicalization 1.0, without comments.
//!
//! Only namespaces visibly utilized by an element (its own prefix and the
//! prefixes of its attributes) are rendered, plus the prefixes listed in an
//! `InclusiveNamespaces` `PrefixList`. A declaration is omitted when the
//! nearest output ancestor already rendered the same binding.

use std::collections::HashMap;
use std::fmt::Write as _;

use crate::dom::{Document, NodeId, NodeKind};
use crate::error::{XmlError, XmlResult};

/// Token used in a `PrefixList` for the default namespace.
pub const DEFAULT_PREFIX_TOKEN: &str = "#default";

type Rendered = HashMap<Option<String>, String>;

/// Canonicalizes the subtree rooted at `node`.
///
/// `inclusive_prefixes` holds the `PrefixList` tokens; `#default` stands for
/// the default namespace.
///
/// # Errors
///
/// Returns an error when `node` is not an element or a prefix is unbound.
pub fn canonicalize(
    doc: &Document,
    node: NodeId,
    inclusive_prefixes: &[String],
) -> XmlResult<Vec<u8>> {
    if doc.element(node).is_none() {
        return Err(XmlError::Malformed(
            "canonicalization target is not an element".to_string(),
        ));
    }
    let inclusive: Vec<Option<&str>> = inclusive_prefixes
        .iter()
        .map(|prefix| {
            if prefix == DEFAULT_PREFIX_TOKEN {
                None
            } else {
                Some(prefix.as_str())
            }
        })
        .collect();

    let mut out = String::new();
    write_element(doc, node, &inclusive, &Rendered::new(), &mut out)?;
    Ok(out.into_bytes())
}

/// Splits a whitespace separated `PrefixList` attribute.
#[must_use]
pub fn parse_prefix_list(value: &str) -> Vec<String> {
    value.split_whitespace().map(str::to_string).collect()
}

fn write_element(
    doc: &Document,
    node: NodeId,
    inclusive: &[Option<&str>],
    rendered: &Rendered,
    out: &mut String,
) -> XmlResult<()> {
    let Some(element) = doc.element(node) else {
        return Ok(());
    };

    let mut utilized: Vec<Option<&str>> = vec![element.prefix.as_deref()];
    utilized.extend(
        element
            .attributes
            .iter()
            .filter_map(|attr| attr.prefix.as_deref().map(Some)),
    );
    for prefix in inclusive {
        if prefix.is_none() || doc.lookup_namespace(node, *prefix).is_some() {
            utilized.push(*prefix);
        }
    }
    utilized.sort_unstable();
    utilized.dedup();

    let mut scope = rendered.clone();
    let mut declarations: Vec<(Option<&str>, String)> = Vec::new();
    for prefix in utilized {
        if prefix == Some("xml") {
            continue;
        }
        let uri = doc.lookup_namespace(node, prefix);
        match (prefix, uri) {
            (None, None) => {
                if rendered.get(&None).is_some_and(|value| !value.is_empty()) {
                    declarations.push((None, String::new()));
                    scope.insert(None, String::new());
                }
            }
            (Some(prefix), None) => return Err(XmlError::UnboundPrefix(prefix.to_string())),
            (prefix, Some(uri)) => {
                let key = prefix.map(str::to_string);
                if rendered.get(&key).map(String::as_str) != Some(uri) {
                    declarations.push((prefix, uri.to_string()));
                    scope.insert(key, uri.to_string());
                }
            }
        }
    }

    let name = element.qualified_name();
    out.push('<');
    out.push_str(&name);
    for (prefix, uri) in &declarations {
        match prefix {
            Some(prefix) => {
                let _ = write!(out, " xmlns:{prefix}=\"");
            }
            None => out.push_str(" xmlns=\""),
        }
        escape_attribute(uri, out);
        out.push('"');
    }

    let mut attributes: Vec<(&str, &str, String, &str)> = element
        .attributes
        .iter()
        .map(|attr| {
            let namespace = doc.attribute_namespace(node, attr).unwrap_or_default();
            (
                namespace,
                attr.local_name.as_str(),
                attr.qualified_name(),
                attr.value.as_str(),
            )
        })
        .collect();
    attributes.sort_by(|a, b| (a.0, a.1).cmp(&(b.0, b.1)));
    for (_, _, qualified, value) in &attributes {
        let _ = write!(out, " {qualified}=\"");
        escape_attribute(value, out);
        out.push('"');
    }
    out.push('>');

    for child in doc.children(node) {
        match doc.kind(*child) {
            NodeKind::Element(_) => write_element(doc, *child, inclusive, &scope, out)?,
            NodeKind::Text(text) => escape_text(text, out),
            NodeKind::ProcessingInstruction(pi) => {
                out.push_str("<?");
                out.push_str(pi);
                out.push_str("?>");
            }
            NodeKind::Comment(_) => {}
        }
    }

    out.push_str("</");
    out.push_str(&name);
    out.push('>');
    Ok(())
}

fn escape_text(text: &str, out: &mut String) {
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

fn escape_attribute(value: &str, out: &mut String) {
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

/// Returns true if `uri` names exclusive canonicalization without comments.
#[must_use]
pub fn is_exclusive(uri: &str) -> bool {
    uri == crate::types::c14n::EXCLUSIVE
}

#[cfg(test)]
mod tests {
    use super::*;

    fn c14n(xml: &str, id: Option<&str>, prefixes: &[&str]) -> String {
        let doc = Document::parse(xml).unwrap();
        let node = id.map_or(doc.root(), |id| doc.element_by_id(id).unwrap());
        let prefixes: Vec<String> = prefixes.iter().map(|p| (*p).to_string()).collect();
        String::from_utf8(canonicalize(&doc, node, &prefixes).unwrap()).unwrap()
    }

    #[test]
    fn renders_only_utilized_namespaces() {
        let xml = r#"<a:root xmlns:a="urn:a" xmlns:b="urn:b" xmlns="urn:d" xmlns:u="urn:unused"><b:child Id="c" z="1" b:x="3" a:attr="2">t &amp; &lt; &gt;</b:child></a:root>"#;
        assert_eq!(
            c14n(xml, Some("c"), &[]),
            r#"<b:child xmlns:a="urn:a" xmlns:b="urn:b" Id="c" z="1" a:attr="2" b:x="3">t &amp; &lt; &gt;</b:child>"#
        );
    }

    #[test]
    fn prefix_list_adds_in_scope_namespaces() {
        let xml = r#"<a:root xmlns:a="urn:a" xmlns:b="urn:b" xmlns="urn:d"><b:child Id="c"/></a:root>"#;
        assert_eq!(
            c14n(xml, Some("c"), &["#default", "a", "missing"]),
            r#"<b:child xmlns="urn:d" xmlns:a="urn:a" xmlns:b="urn:b" Id="c"></b:child>"#
        );
    }

    #[test]
    fn omits_declarations_rendered_by_ancestors() {
        let xml = r#"<r xmlns:p="urn:p"><p:a ID="a"><p:b xmlns:p="urn:p"/><p:c xmlns:p="urn:other"/></p:a></r>"#;
        assert_eq!(
            c14n(xml, Some("a"), &[]),
            r#"<p:a xmlns:p="urn:p" ID="a"><p:b></p:b><p:c xmlns:p="urn:other"></p:c></p:a>"#
        );
    }

    #[test]
    fn undeclares_default_namespace_only_when_needed() {
        let xml = r#"<r xmlns="urn:x"><c xmlns="" Id="c"><d/></c></r>"#;
        assert_eq!(
            c14n(xml, None, &[]),
            r#"<r xmlns="urn:x"><c xmlns="" Id="c"><d></d></c></r>"#
        );
        assert_eq!(c14n(xml, Some("c"), &[]), r#"<c Id="c"><d></d></c>"#);
    }

    #[test]
    fn drops_comments_and_keeps_processing_instructions() {
        let xml = "<r><!-- gone --><?pi data?>x</r>";
        assert_eq!(c14n(xml, None, &[]), "<r><?pi data?>x</r>");
    }

    #[test]
    fn escapes_attribute_values_and_carriage_returns() {
        let xml = "<r a=\"&quot;&lt;&amp;&#x9;&#xA;&#xD;\">line&#xD;</r>";
        assert_eq!(
            c14n(xml, None, &[]),
            "<r a=\"&quot;&lt;&amp;&#x9;&#xA;&#xD;\">line&#xD;</r>"
        );
    }

    #[test]
    fn normalizes_line_endings() {
        let xml = "<r>\r\n  <c/>\r\n</r>";
        assert_eq!(c14n(xml, None, &[]), "<r>\n  <c></c>\n</r>");
    }

    #[test]
    fn xml_prefix_is_never_declared() {
        let xml = r#"<r xml:lang="en"/>"#;
        assert_eq!(c14n(xml, None, &[]), r#"<r xml:lang="en"></r>"#);
    }

    #[test]
    fn rejects_non_element_targets() {
        let doc = Document::parse("<r>text</r>").unwrap();
        let text = doc.children(doc.root())[0];
        assert!(canonicalize(&doc, text, &[]).is_err());
    }

    #[test]
    fn splits_prefix_lists() {
        assert_eq!(parse_prefix_list(" wsse  #default\tds "), vec!["wsse", "#default", "ds"]);
        assert!(is_exclusive("http://www.w3.org/2001/10/xml-exc-c14n#"));
        assert!(!is_exclusive("http://www.w3.org/2001/10/xml-exc-c14n#WithComments"));
    }
}
