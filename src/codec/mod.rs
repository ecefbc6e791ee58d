//! Per-protocol share-link codecs.
//!
//! Each codec exposes `parse(link) -> Option<Node>` and a serializer that
//! is its structural inverse. Dispatch goes through a static scheme
//! registry so adding a protocol is one table line plus one module.
//! Parse failures of any kind are local: the caller drops the line and
//! moves on, a malformed link never aborts a whole payload.

pub mod shadowsocks;
pub mod shadowsocksr;
pub mod trojan;
pub mod vless;
pub mod vmess;

use std::collections::HashMap;

use crate::node::{Network, Node, RealityOpts, TlsOpts, WsOpts};

type ParseFn = fn(&str) -> Option<Node>;

/// Scheme → parser registry, checked in order.
const REGISTRY: [(&str, ParseFn); 5] = [
    ("vmess://", vmess::parse),
    ("vless://", vless::parse),
    ("trojan://", trojan::parse),
    ("ss://", shadowsocks::parse),
    ("ssr://", shadowsocksr::parse),
];

/// Parse one share-link. Unknown scheme or malformed payload yields `None`.
pub fn parse_link(link: &str) -> Option<Node> {
    let link = link.trim();
    for (scheme, parse) in REGISTRY {
        if link.starts_with(scheme) {
            return parse(link);
        }
    }
    None
}

/// Whether the payload (after trimming) is a single recognized share-link.
pub fn is_share_link(payload: &str) -> bool {
    let payload = payload.trim();
    REGISTRY.iter().any(|(scheme, _)| payload.starts_with(scheme))
}

/// Serialize a node back to its share-link form. Nodes missing their
/// endpoint are unrepresentable and yield `None`.
pub fn serialize_node(node: &Node) -> Option<String> {
    if !node.is_renderable() {
        return None;
    }
    match node {
        Node::Vmess(n) => Some(vmess::serialize(n)),
        Node::Vless(n) => Some(vless::serialize(n)),
        Node::Trojan(n) => Some(trojan::serialize(n)),
        Node::Shadowsocks(n) => Some(shadowsocks::serialize(n)),
        Node::ShadowsocksR(n) => Some(shadowsocksr::serialize(n)),
    }
}

// ── 编码辅助 ──

/// Base64 decode tolerating the URL-safe alphabet, embedded newlines and
/// missing `=` padding. Subscription feeds produce all of these.
pub(crate) fn base64_decode(s: &str) -> Option<String> {
    use base64::Engine;
    let mut s = s.trim().replace(['\n', '\r'], "");
    s = s.replace('-', "+").replace('_', "/");
    while s.len() % 4 != 0 {
        s.push('=');
    }
    let bytes = base64::engine::general_purpose::STANDARD.decode(s.as_bytes()).ok()?;
    String::from_utf8(bytes).ok()
}

pub(crate) fn base64_encode(s: &str) -> String {
    use base64::Engine;
    base64::engine::general_purpose::STANDARD.encode(s.as_bytes())
}

/// URL-safe, unpadded variant for fields embedded inside ssr payloads,
/// where `/` and `=` would collide with the surrounding syntax.
pub(crate) fn base64_encode_urlsafe(s: &str) -> String {
    use base64::Engine;
    base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(s.as_bytes())
}

/// Percent-decode. Invalid escapes pass through untouched; `+` is kept
/// literal, matching URI fragment semantics rather than form encoding.
pub(crate) fn percent_decode(s: &str) -> String {
    let mut out = Vec::with_capacity(s.len());
    let bytes = s.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' && i + 2 < bytes.len() {
            if let Ok(byte) = u8::from_str_radix(&s[i + 1..i + 3], 16) {
                out.push(byte);
                i += 3;
                continue;
            }
        }
        out.push(bytes[i]);
        i += 1;
    }
    String::from_utf8_lossy(&out).into_owned()
}

/// Percent-encode everything outside the unreserved set.
pub(crate) fn percent_encode(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for b in s.bytes() {
        match b {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                out.push(b as char)
            }
            _ => out.push_str(&format!("%{:02X}", b)),
        }
    }
    out
}

/// Split `host:port`, handling bracketed IPv6 literals.
pub(crate) fn parse_host_port(s: &str) -> Option<(String, u16)> {
    if s.starts_with('[') {
        let end = s.find(']')?;
        let host = &s[1..end];
        let port_str = s.get(end + 2..)?;
        let port = port_str.parse().ok()?;
        return Some((host.to_string(), port));
    }
    let (host, port_str) = s.rsplit_once(':')?;
    let port = port_str.parse().ok()?;
    Some((host.to_string(), port))
}

/// Render a host for URL position, bracketing IPv6 literals.
pub(crate) fn host_for_url(host: &str) -> String {
    if host.contains(':') {
        format!("[{}]", host)
    } else {
        host.to_string()
    }
}

/// Parse a query string into a map, percent-decoding values.
pub(crate) fn parse_query(q: &str) -> HashMap<String, String> {
    let mut map = HashMap::new();
    for pair in q.split('&') {
        if let Some((k, v)) = pair.split_once('=') {
            map.insert(k.to_string(), percent_decode(v));
        }
    }
    map
}

/// Decomposed generic share-link URI: `scheme://user@host:port?query#fragment`.
pub(crate) struct UriParts {
    pub user_info: String,
    pub host: String,
    pub port: u16,
    pub query: HashMap<String, String>,
    pub fragment: Option<String>,
}

pub(crate) fn split_uri(link: &str, scheme: &str) -> Option<UriParts> {
    let rest = link.strip_prefix(scheme)?;
    let (rest, fragment) = match rest.rfind('#') {
        Some(i) => (&rest[..i], Some(rest[i + 1..].to_string())),
        None => (rest, None),
    };
    let (rest, query_raw) = match rest.find('?') {
        Some(i) => (&rest[..i], &rest[i + 1..]),
        None => (rest, ""),
    };
    let (user_info, host_port) = rest.rsplit_once('@')?;
    let (host, port) = parse_host_port(host_port)?;
    Some(UriParts {
        user_info: user_info.to_string(),
        host,
        port,
        query: parse_query(query_raw),
        fragment,
    })
}

// ── vless / trojan 共用的查询串处理 ──

/// Build the TLS overlay from URI query parameters.
///
/// `default_enabled` captures a long-standing quirk of the link formats:
/// a trojan link with no `security` parameter is TLS-on, a vless link with
/// no `security` parameter is TLS-off. Callers pass the right default for
/// their scheme; do not "fix" this. The legacy trojan-only aliases
/// (`peer`, `allowInsecure`, `insecure`) live in that codec, not here.
pub(crate) fn tls_from_query(q: &HashMap<String, String>, default_enabled: bool) -> TlsOpts {
    let security = q.get("security").map(String::as_str).unwrap_or("");
    let enabled = match security {
        "tls" | "reality" => true,
        "" => default_enabled,
        _ => false,
    };
    let reality = (security == "reality").then(|| RealityOpts {
        public_key: q.get("pbk").cloned().unwrap_or_default(),
        short_id: q.get("sid").cloned(),
    });
    TlsOpts {
        enabled,
        sni: q.get("sni").cloned(),
        server_name: q.get("host").cloned(),
        alpn: q
            .get("alpn")
            .map(|a| a.split(',').map(str::to_string).collect())
            .unwrap_or_default(),
        client_fingerprint: q.get("fp").cloned(),
        skip_cert_verify: false,
        reality,
    }
}

/// Derive transport options from `type` / `path` / `serviceName`.
pub(crate) fn transport_from_query(
    q: &HashMap<String, String>,
    tls: &TlsOpts,
) -> (Network, Option<WsOpts>, Option<String>) {
    let network = Network::from_str_lossy(q.get("type").map(String::as_str).unwrap_or("tcp"));
    match network {
        Network::Ws => (
            network,
            Some(WsOpts {
                path: q.get("path").cloned(),
                host_header: tls.server_name.clone(),
            }),
            None,
        ),
        Network::Grpc => (network, None, q.get("serviceName").cloned()),
        Network::Tcp => (network, None, None),
    }
}

/// Append the shared TLS / transport query parameters in canonical order.
pub(crate) fn push_common_query(
    query: &mut Vec<String>,
    tls: &TlsOpts,
    ws_opts: &Option<WsOpts>,
    grpc_service_name: &Option<String>,
) {
    if let Some(sni) = &tls.sni {
        query.push(format!("sni={}", sni));
    }
    if let Some(fp) = &tls.client_fingerprint {
        query.push(format!("fp={}", fp));
    }
    if !tls.alpn.is_empty() {
        query.push(format!("alpn={}", tls.alpn.join(",")));
    }
    if let Some(reality) = &tls.reality {
        query.push("security=reality".to_string());
        if !reality.public_key.is_empty() {
            query.push(format!("pbk={}", reality.public_key));
        }
        if let Some(sid) = &reality.short_id {
            query.push(format!("sid={}", sid));
        }
    } else if tls.enabled {
        query.push("security=tls".to_string());
    }
    if let Some(ws) = ws_opts {
        if let Some(path) = &ws.path {
            query.push(format!("path={}", percent_encode(path)));
        }
    }
    let host = tls
        .server_name
        .clone()
        .or_else(|| ws_opts.as_ref().and_then(|w| w.host_header.clone()));
    if let Some(host) = host {
        query.push(format!("host={}", host));
    }
    if let Some(service) = grpc_service_name {
        query.push(format!("serviceName={}", service));
    }
}
