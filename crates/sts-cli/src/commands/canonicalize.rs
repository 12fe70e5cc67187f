//! Exclusive canonicalization of a document or one of its elements.

use std::io::Write as _;

use sts_xmldsig::{Document, c14n};

use crate::cli::CanonicalizeArgs;
use crate::{CliError, CliResult};

/// Runs `canonicalize`, writing the canonical bytes to stdout.
pub async fn run_canonicalize(args: CanonicalizeArgs) -> CliResult<()> {
    let xml = tokio::fs::read_to_string(&args.file).await?;
    let prefixes: Vec<String> = args
        .prefixes
        .iter()
        .flat_map(|list| c14n::parse_prefix_list(list))
        .collect();
    let canonical = canonicalize(&xml, args.id.as_deref(), &prefixes)?;

    let mut stdout = std::io::stdout().lock();
    stdout.write_all(&canonical)?;
    stdout.write_all(b"\n")?;
    Ok(())
}

/// Canonicalizes the element with `id`, or the document element.
pub fn canonicalize(xml: &str, id: Option<&str>, prefixes: &[String]) -> CliResult<Vec<u8>> {
    let doc = Document::parse(xml)?;
    let node = match id {
        Some(id) => doc
            .element_by_id(id)
            .ok_or_else(|| CliError::InvalidArgument(format!("no element with ID '{id}'")))?,
        None => doc.root(),
    };
    Ok(c14n::canonicalize(&doc, node, prefixes)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    const DOC: &str = r#"<S:Envelope xmlns:S="http://schemas.xmlsoap.org/soap/envelope/" xmlns:wsu="http://docs.oasis-open.org/wss/2004/01/oasis-200401-wss-wssecurity-utility-1.0.xsd"><S:Body wsu:Id="_body"><Ping xmlns="urn:test"  b="2" a="1"/></S:Body></S:Envelope>"#;

    #[test]
    fn canonicalizes_referenced_element() {
        let out = canonicalize(DOC, Some("_body"), &[]).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            r#"<S:Body xmlns:S="http://schemas.xmlsoap.org/soap/envelope/" xmlns:wsu="http://docs.oasis-open.org/wss/2004/01/oasis-200401-wss-wssecurity-utility-1.0.xsd" wsu:Id="_body"><Ping xmlns="urn:test" a="1" b="2"></Ping></S:Body>"#
        );
    }

    #[test]
    fn unknown_id_is_an_argument_error() {
        assert!(matches!(
            canonicalize(DOC, Some("_missing"), &[]),
            Err(CliError::InvalidArgument(_))
        ));
    }

    #[test]
    fn malformed_input_is_an_xml_error() {
        assert!(matches!(
            canonicalize("<a><b></a>", None, &[]),
            Err(CliError::Xml(_))
        ));
    }
}
