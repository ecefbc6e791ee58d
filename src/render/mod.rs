//! Output serialization: merged node set → one string blob.

pub mod clash;

use crate::codec;
use crate::node::Node;

/// Target output shape selected by the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// Base64-encoded newline-joined share-link list.
    #[default]
    RawList,
    /// Clash YAML document with proxies, one selector group and rules.
    Clash,
}

/// Render the node set. Nodes missing server/port are filtered out here;
/// an empty result is the empty string, never an error.
pub fn render(nodes: &[Node], format: OutputFormat) -> String {
    let usable: Vec<&Node> = nodes.iter().filter(|n| n.is_renderable()).collect();
    if usable.is_empty() {
        return String::new();
    }
    match format {
        OutputFormat::RawList => {
            let lines: Vec<String> = usable
                .iter()
                .filter_map(|n| codec::serialize_node(n))
                .collect();
            if lines.is_empty() {
                return String::new();
            }
            base64_blob(&lines.join("\n"))
        }
        OutputFormat::Clash => clash::render(&usable),
    }
}

fn base64_blob(s: &str) -> String {
    use base64::Engine;
    base64::engine::general_purpose::STANDARD.encode(s.as_bytes())
}
