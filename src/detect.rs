//! Heuristic payload classification and payload → node parsing.

use serde::Deserialize;

use crate::codec;
use crate::node::Node;
use crate::render::clash::{self, ClashProxy};

/// What a fetched payload looks like. A sniff, not a full parse.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PayloadKind {
    /// A Clash-style YAML config carrying a `proxies:` list.
    ClashConfig,
    /// A single share-link.
    SingleLink,
    /// Raw or base64-encoded newline-separated link list.
    EncodedList,
}

pub fn classify(payload: &str) -> PayloadKind {
    let trimmed = payload.trim();
    if codec::is_share_link(trimmed) {
        return PayloadKind::SingleLink;
    }
    if trimmed.lines().map(str::trim_start).any(|line| {
        line.starts_with("proxies:") || line.starts_with("port:") || line.starts_with("mixed-port:")
    }) {
        return PayloadKind::ClashConfig;
    }
    PayloadKind::EncodedList
}

/// Parse a payload into nodes, best-effort. Malformed entries are dropped
/// line by line; an unparseable payload contributes nothing.
pub fn parse_payload(payload: &str) -> Vec<Node> {
    match classify(payload) {
        PayloadKind::SingleLink => codec::parse_link(payload).into_iter().collect(),
        PayloadKind::ClashConfig => parse_clash_proxies(payload),
        PayloadKind::EncodedList => {
            let text =
                codec::base64_decode(payload.trim()).unwrap_or_else(|| payload.to_string());
            text.lines()
                .map(str::trim)
                .filter(|line| !line.is_empty())
                .filter_map(codec::parse_link)
                .collect()
        }
    }
}

#[derive(Deserialize, Default)]
#[serde(default)]
struct ClashInput {
    proxies: Vec<serde_yml::Value>,
}

fn parse_clash_proxies(payload: &str) -> Vec<Node> {
    let input: ClashInput = match serde_yml::from_str(payload) {
        Ok(input) => input,
        Err(e) => {
            tracing::debug!(error = %e, "clash payload rejected");
            return Vec::new();
        }
    };
    // per-entry tolerance: one bad record must not sink the rest
    input
        .proxies
        .into_iter()
        .filter_map(|value| serde_yml::from_value::<ClashProxy>(value).ok())
        .filter_map(clash::record_to_node)
        .collect()
}
