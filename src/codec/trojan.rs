//! trojan share-link codec: generic URI with the password in user-info.
//!
//! Absent `security` means TLS is on; trojan links predate the parameter
//! and have always implied TLS. `security=none` turns it off explicitly.
//! `peer` is accepted as a legacy alias for `host`, and
//! `allowInsecure=1` / `insecure=1` map to skip-cert-verify.

use super::{host_for_url, percent_decode, percent_encode, push_common_query, split_uri,
            tls_from_query, transport_from_query};
use crate::node::{Node, TrojanNode};

pub fn parse(link: &str) -> Option<Node> {
    let uri = split_uri(link, "trojan://")?;
    if uri.user_info.is_empty() || uri.host.is_empty() {
        return None;
    }
    let name = uri
        .fragment
        .as_deref()
        .map(percent_decode)
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| "trojan".to_string());

    let mut tls = tls_from_query(&uri.query, true);
    // legacy aliases only trojan links carry
    if tls.server_name.is_none() {
        tls.server_name = uri.query.get("peer").cloned();
    }
    if uri.query.get("allowInsecure").map(String::as_str) == Some("1")
        || uri.query.get("insecure").map(String::as_str) == Some("1")
    {
        tls.skip_cert_verify = true;
    }
    let (network, ws_opts, grpc_service_name) = transport_from_query(&uri.query, &tls);

    Some(Node::Trojan(TrojanNode {
        name,
        server: uri.host,
        port: uri.port,
        password: percent_decode(&uri.user_info),
        network,
        tls,
        ws_opts,
        grpc_service_name,
    }))
}

// No emitted query encodes "TLS off": a node parsed from security=none
// serializes without the parameter and reparses as TLS-on.
pub fn serialize(n: &TrojanNode) -> String {
    let mut query = vec![format!("type={}", n.network.as_str())];
    push_common_query(&mut query, &n.tls, &n.ws_opts, &n.grpc_service_name);
    format!(
        "trojan://{}@{}:{}?{}#{}",
        percent_encode(&n.password),
        host_for_url(&n.server),
        n.port,
        query.join("&"),
        percent_encode(&n.name)
    )
}
