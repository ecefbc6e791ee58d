//! shadowsocksr share-link codec.
//!
//! The whole payload is base64:
//! `server:port:protocol:cipher:obfs:base64(password)/?remarks=base64(name)
//! &obfsparam=base64(..)&protoparam=base64(..)`

use super::{base64_decode, base64_encode, base64_encode_urlsafe, parse_query};
use crate::node::{Node, SsrNode};

pub fn parse(link: &str) -> Option<Node> {
    let decoded = base64_decode(link.strip_prefix("ssr://")?)?;
    let (main, params) = match decoded.split_once('/') {
        Some((m, p)) => (m, p.trim_start_matches('?')),
        None => (decoded.as_str(), ""),
    };

    // rsplit keeps any ':' inside the server field intact
    let mut fields = main.rsplitn(6, ':');
    let password = base64_decode(fields.next()?)?;
    let obfs = fields.next()?.to_string();
    let cipher = fields.next()?.to_string();
    let protocol = fields.next()?.to_string();
    let port: u16 = fields.next()?.parse().ok()?;
    let server = fields.next()?.to_string();
    if server.is_empty() || port == 0 {
        return None;
    }

    let query = parse_query(params);
    let name = query
        .get("remarks")
        .and_then(|r| base64_decode(r))
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| "ssr".to_string());
    let obfs_param = query
        .get("obfsparam")
        .filter(|s| !s.is_empty())
        .and_then(|p| base64_decode(p));
    let protocol_param = query
        .get("protoparam")
        .filter(|s| !s.is_empty())
        .and_then(|p| base64_decode(p));

    Some(Node::ShadowsocksR(SsrNode {
        name,
        server,
        port,
        cipher,
        password,
        protocol,
        obfs,
        protocol_param,
        obfs_param,
    }))
}

pub fn serialize(n: &SsrNode) -> String {
    let mut plain = format!(
        "{}:{}:{}:{}:{}:{}/?remarks={}",
        n.server,
        n.port,
        n.protocol,
        n.cipher,
        n.obfs,
        base64_encode_urlsafe(&n.password),
        base64_encode_urlsafe(&n.name)
    );
    if let Some(obfs_param) = &n.obfs_param {
        plain.push_str(&format!("&obfsparam={}", base64_encode_urlsafe(obfs_param)));
    }
    if let Some(protocol_param) = &n.protocol_param {
        plain.push_str(&format!("&protoparam={}", base64_encode_urlsafe(protocol_param)));
    }
    format!("ssr://{}", base64_encode(&plain))
}
