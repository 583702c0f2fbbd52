//! Selection in the page URL.
//!
//! The selection is stored as one query parameter holding comma-joined
//! ids (`?selected=Button_0%2CText_3`). Parsing is built on `winnow` and
//! accepts any `application/x-www-form-urlencoded` query; unknown keys
//! are kept so callers can look them up.

use crate::selection::Selection;
use comp_core::id::NodeId;
use comp_core::tree::Tree;
use winnow::combinator::{opt, preceded, separated};
use winnow::prelude::*;
use winnow::token::{take_till, take_while};

/// Split a query string into decoded `(key, value)` pairs, in order. A
/// leading `?` is ignored; a key without `=` gets an empty value.
pub fn parse_query(query: &str) -> Vec<(String, String)> {
    let input = query.strip_prefix('?').unwrap_or(query);
    match parse_pairs.parse(input) {
        Ok(pairs) => pairs
            .into_iter()
            .filter(|(key, _)| !key.is_empty())
            .map(|(key, value)| (decode(key), value.map(decode).unwrap_or_default()))
            .collect(),
        Err(e) => {
            log::debug!("unparseable query `{query}`: {e}");
            Vec::new()
        }
    }
}

/// The first value stored under `key`.
pub fn query_value(query: &str, key: &str) -> Option<String> {
    parse_query(query)
        .into_iter()
        .find_map(|(k, v)| (k == key).then_some(v))
}

/// Encode `ids` as `key=a%2Cb`. An empty selection encodes as an empty
/// string so the parameter disappears.
pub fn selection_to_query(ids: &[NodeId], key: &str) -> String {
    if ids.is_empty() {
        return String::new();
    }
    let joined = ids
        .iter()
        .map(NodeId::as_str)
        .collect::<Vec<_>>()
        .join(",");
    format!("{}={}", encode(key), encode(&joined))
}

/// Read the selection back from a query string, keeping only ids that
/// exist in `tree`.
pub fn selection_from_query(query: &str, key: &str, tree: &Tree) -> Selection {
    let Some(value) = query_value(query, key) else {
        return Selection::new();
    };
    let ids = value
        .split(',')
        .filter(|s| !s.is_empty())
        .map(NodeId::intern)
        .filter(|id| {
            let live = tree.contains(*id);
            if !live {
                log::trace!("query: dropping unknown id `{id}`");
            }
            live
        });
    Selection::from_ids(ids)
}

// ─── Parsers ─────────────────────────────────────────────────────────────

type RawPair<'a> = (&'a str, Option<&'a str>);

fn parse_pairs<'a>(input: &mut &'a str) -> ModalResult<Vec<RawPair<'a>>> {
    separated(0.., parse_pair, '&').parse_next(input)
}

fn parse_pair<'a>(input: &mut &'a str) -> ModalResult<RawPair<'a>> {
    let key = take_till(0.., ('=', '&')).parse_next(input)?;
    let value = opt(preceded('=', take_till(0.., '&'))).parse_next(input)?;
    Ok((key, value))
}

fn parse_percent_byte(input: &mut &str) -> ModalResult<u8> {
    preceded('%', take_while(2, |c: char| c.is_ascii_hexdigit()))
        .try_map(|hex: &str| u8::from_str_radix(hex, 16))
        .parse_next(input)
}

// ─── Form encoding ───────────────────────────────────────────────────────

fn decode(raw: &str) -> String {
    let mut input = raw;
    let mut bytes = Vec::with_capacity(raw.len());
    while let Some(c) = input.chars().next() {
        if let Ok(Some(byte)) = opt(parse_percent_byte).parse_next(&mut input) {
            bytes.push(byte);
            continue;
        }
        match c {
            '+' => bytes.push(b' '),
            _ => bytes.extend_from_slice(c.encode_utf8(&mut [0; 4]).as_bytes()),
        }
        input = &input[c.len_utf8()..];
    }
    String::from_utf8_lossy(&bytes).into_owned()
}

fn encode(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for byte in raw.bytes() {
        match byte {
            b'a'..=b'z' | b'A'..=b'Z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'*' => {
                out.push(byte as char)
            }
            b' ' => out.push('+'),
            _ => out.push_str(&format!("%{byte:02X}")),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use comp_core::model::ComponentNode;
    use pretty_assertions::assert_eq;

    #[test]
    fn parse_pairs_in_order() {
        assert_eq!(
            parse_query("?tab=props&selected=a%2Cb&flag"),
            vec![
                ("tab".to_string(), "props".to_string()),
                ("selected".to_string(), "a,b".to_string()),
                ("flag".to_string(), String::new()),
            ]
        );
        assert!(parse_query("").is_empty());
        assert!(parse_query("?").is_empty());
    }

    #[test]
    fn decode_handles_plus_and_bad_escapes() {
        assert_eq!(query_value("q=hello+world", "q").as_deref(), Some("hello world"));
        assert_eq!(query_value("q=100%", "q").as_deref(), Some("100%"));
        assert_eq!(query_value("q=%zz", "q").as_deref(), Some("%zz"));
        assert_eq!(query_value("q=caf%C3%A9", "q").as_deref(), Some("café"));
    }

    #[test]
    fn selection_encoding() {
        let ids = [NodeId::intern("Button_0"), NodeId::intern("Text_3")];
        assert_eq!(
            selection_to_query(&ids, "selected"),
            "selected=Button_0%2CText_3"
        );
        assert_eq!(selection_to_query(&[], "selected"), "");
    }

    #[test]
    fn selection_filters_unknown_ids() {
        let mut tree = Tree::new();
        tree.insert_child(
            NodeId::root(),
            ComponentNode::leaf(NodeId::intern("q_live"), "Button"),
            None,
        )
        .unwrap();
        let sel = selection_from_query("other=1&selected=q_gone%2Cq_live,,q_live", "selected", &tree);
        assert_eq!(sel.current(), &[NodeId::intern("q_live")]);

        assert!(selection_from_query("other=1", "selected", &tree).is_empty());
    }
}
