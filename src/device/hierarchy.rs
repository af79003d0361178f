//! Parser for `uiautomator dump` window hierarchies.
//!
//! The dump is flat enough that attribute extraction with `regex` is all we
//! need: every `<node .../>` becomes one [`ScreenElement`] in document order.

use regex::{Captures, Regex};
use std::sync::OnceLock;

use super::{Bounds, ScreenElement};

fn node_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    // Quoted values may legally contain '>'.
    RE.get_or_init(|| Regex::new(r#"<node\b((?:[^>"]|"[^"]*")*)>"#).expect("valid node regex"))
}

fn attr_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r#"([A-Za-z_:-]+)="([^"]*)""#).expect("valid attr regex"))
}

fn bounds_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"\[(-?\d+),(-?\d+)\]\[(-?\d+),(-?\d+)\]").expect("valid bounds regex")
    })
}

fn entity_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"&(#x[0-9a-fA-F]+|#[0-9]+|amp|lt|gt|quot|apos);").expect("valid entity regex")
    })
}

/// Decode the XML entities uiautomator emits in attribute values.
pub fn decode_entities(value: &str) -> String {
    entity_regex()
        .replace_all(value, |caps: &Captures| {
            let entity = &caps[1];
            let decoded = match entity {
                "amp" => Some('&'),
                "lt" => Some('<'),
                "gt" => Some('>'),
                "quot" => Some('"'),
                "apos" => Some('\''),
                _ if entity.starts_with("#x") => u32::from_str_radix(&entity[2..], 16)
                    .ok()
                    .and_then(char::from_u32),
                _ => entity[1..].parse::<u32>().ok().and_then(char::from_u32),
            };
            decoded
                .map(String::from)
                .unwrap_or_else(|| caps[0].to_string())
        })
        .into_owned()
}

/// Parse `[l,t][r,b]`. Malformed bounds become an empty rectangle.
pub fn parse_bounds(value: &str) -> Bounds {
    bounds_regex()
        .captures(value)
        .and_then(|caps| {
            let n = |i: usize| caps[i].parse::<i32>().ok();
            Some(Bounds::new(n(1)?, n(2)?, n(3)?, n(4)?))
        })
        .unwrap_or_default()
}

/// Parse a full hierarchy dump into elements, document order preserved.
pub fn parse_hierarchy(xml: &str) -> Vec<ScreenElement> {
    node_regex()
        .captures_iter(xml)
        .enumerate()
        .map(|(index, node)| {
            let mut element = ScreenElement {
                index,
                ..Default::default()
            };
            for attr in attr_regex().captures_iter(&node[1]) {
                let value = &attr[2];
                match &attr[1] {
                    "text" => element.text = decode_entities(value),
                    "content-desc" => element.description = decode_entities(value),
                    "resource-id" => element.resource_id = decode_entities(value),
                    "class" => element.class_name = decode_entities(value),
                    "bounds" => element.bounds = parse_bounds(value),
                    _ => {}
                }
            }
            element
        })
        .collect()
}
