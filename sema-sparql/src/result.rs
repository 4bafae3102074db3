//! Result adapter
//!
//! Maps the tabular SELECT answer back into ordered page references.
//! Cells arrive as term strings - full IRIs from real endpoints,
//! prefixed names from test doubles - and anything unrecognizable is
//! dropped with a debug log rather than failing the result.

use sema_core::PageRef;
use tracing::debug;

/// Parse one result cell into a page reference.
///
/// Accepts full IRIs under the store's page namespaces and their
/// prefixed spellings. Percent-escapes in the local name are decoded.
pub fn parse_entity(cell: &str) -> Option<PageRef> {
    use sema_vocab::prefixes;

    let cell = cell.trim_start_matches('<').trim_end_matches('>');
    for (_, prefix, iri) in prefixes::ALL {
        let local = cell
            .strip_prefix(iri)
            .or_else(|| cell.strip_prefix(&format!("{prefix}:")));
        let Some(local) = local else { continue };
        let title = decode_local(local);
        let (namespace, title) = match prefix {
            "wiki" => split_embedded_namespace(&title)
                .unwrap_or((sema_vocab::ns::MAIN, title.clone())),
            "category" => (sema_vocab::ns::CATEGORY, title),
            "property" => (sema_vocab::ns::PROPERTY, title),
            "concept" => (sema_vocab::ns::CONCEPT, title),
            _ => return None,
        };
        return Some(PageRef::new(title, namespace));
    }
    debug!(cell, "unrecognized entity term, dropping row");
    None
}

/// Convert an ordered column of term strings into page references,
/// applying the look-ahead convention: `limit + 1` rows were requested,
/// so a surplus row only signals further results.
pub fn convert_entities<'a>(
    cells: impl Iterator<Item = &'a str>,
    limit: usize,
) -> (Vec<PageRef>, bool) {
    let mut entities: Vec<PageRef> = cells.filter_map(parse_entity).collect();
    let has_more = entities.len() > limit;
    entities.truncate(limit);
    (entities, has_more)
}

/// `wiki:3-Draft` style local names carry a foreign namespace code.
fn split_embedded_namespace(title: &str) -> Option<(i32, String)> {
    let (code, rest) = title.split_once('-')?;
    let code: i32 = code.parse().ok()?;
    if code == sema_vocab::ns::MAIN {
        return None;
    }
    Some((code, rest.to_string()))
}

fn decode_local(local: &str) -> String {
    let bytes = local.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' {
            if let (Some(h), Some(l)) = (
                bytes.get(i + 1).and_then(|b| (*b as char).to_digit(16)),
                bytes.get(i + 2).and_then(|b| (*b as char).to_digit(16)),
            ) {
                out.push((h * 16 + l) as u8);
                i += 3;
                continue;
            }
        }
        out.push(bytes[i]);
        i += 1;
    }
    String::from_utf8(out).unwrap_or_else(|_| local.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_iri() {
        let page = parse_entity("http://sema.dev/wiki/Berlin").unwrap();
        assert_eq!(page, PageRef::main("Berlin"));
    }

    #[test]
    fn test_parse_prefixed_and_bracketed() {
        assert_eq!(
            parse_entity("category:City").unwrap(),
            PageRef::category("City")
        );
        assert_eq!(
            parse_entity("<http://sema.dev/wiki/Berlin>").unwrap(),
            PageRef::main("Berlin")
        );
    }

    #[test]
    fn test_parse_percent_decoded() {
        assert_eq!(
            parse_entity("wiki:C%2B%2B").unwrap(),
            PageRef::main("C++")
        );
    }

    #[test]
    fn test_embedded_namespace_code() {
        let page = parse_entity("wiki:3-Draft").unwrap();
        assert_eq!(page.namespace, 3);
        assert_eq!(page.title, "Draft");
    }

    #[test]
    fn test_unknown_terms_dropped() {
        assert!(parse_entity("http://elsewhere.example/x").is_none());
    }

    #[test]
    fn test_look_ahead_truncation() {
        let cells = [
            "wiki:A",
            "wiki:B",
            "wiki:C",
        ];
        let (entities, has_more) = convert_entities(cells.iter().copied(), 2);
        assert_eq!(entities.len(), 2);
        assert!(has_more);

        let (entities, has_more) = convert_entities(cells.iter().copied(), 3);
        assert_eq!(entities.len(), 3);
        assert!(!has_more);
    }
}
