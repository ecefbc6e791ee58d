//! vless share-link codec: generic URI with uuid in user-info.
//!
//! No `security` query parameter means no TLS here (unlike trojan).

use super::{host_for_url, percent_decode, percent_encode, push_common_query, split_uri,
            tls_from_query, transport_from_query};
use crate::node::{Node, VlessNode};

pub fn parse(link: &str) -> Option<Node> {
    let uri = split_uri(link, "vless://")?;
    if uri.user_info.is_empty() || uri.host.is_empty() {
        return None;
    }
    let name = uri
        .fragment
        .as_deref()
        .map(percent_decode)
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| "vless".to_string());

    let tls = tls_from_query(&uri.query, false);
    let (network, ws_opts, grpc_service_name) = transport_from_query(&uri.query, &tls);

    Some(Node::Vless(VlessNode {
        name,
        server: uri.host,
        port: uri.port,
        uuid: uri.user_info,
        flow: uri.query.get("flow").cloned(),
        network,
        tls,
        ws_opts,
        grpc_service_name,
    }))
}

pub fn serialize(n: &VlessNode) -> String {
    let mut query = vec![format!("type={}", n.network.as_str())];
    if let Some(flow) = &n.flow {
        query.push(format!("flow={}", flow));
    }
    push_common_query(&mut query, &n.tls, &n.ws_opts, &n.grpc_service_name);
    format!(
        "vless://{}@{}:{}?{}#{}",
        n.uuid,
        host_for_url(&n.server),
        n.port,
        query.join("&"),
        percent_encode(&n.name)
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::{Network, RealityOpts, TlsOpts, WsOpts};

    #[test]
    fn parse_reality_link() {
        let link = "vless://5ea25ac3-ad00-43b6-ab93-a669f0a28453@35.234.14.177:39885\
                    ?type=tcp&flow=xtls-rprx-vision&sni=apple.com&fp=chrome\
                    &security=reality&pbk=411x8RtvqUqO9uLFkaYWZKFt5wgPCwZZFfsiblS-Sm0&sid=903b6445\
                    #TW%20Reality";
        let Some(Node::Vless(n)) = parse(link) else {
            panic!("expected vless node");
        };
        assert_eq!(n.name, "TW Reality");
        assert_eq!(n.port, 39885);
        assert_eq!(n.flow.as_deref(), Some("xtls-rprx-vision"));
        assert!(n.tls.enabled);
        let reality = n.tls.reality.expect("reality opts");
        assert_eq!(reality.public_key, "411x8RtvqUqO9uLFkaYWZKFt5wgPCwZZFfsiblS-Sm0");
        assert_eq!(reality.short_id.as_deref(), Some("903b6445"));
    }

    #[test]
    fn parse_no_security_means_no_tls() {
        let Some(Node::Vless(n)) = parse("vless://uuid@host.example:443?type=tcp#n") else {
            panic!("expected vless node");
        };
        assert!(!n.tls.enabled);
        assert!(n.tls.reality.is_none());
    }

    #[test]
    fn parse_empty_fragment_defaults_name() {
        let Some(Node::Vless(n)) = parse("vless://uuid@host.example:443?type=tcp") else {
            panic!("expected vless node");
        };
        assert_eq!(n.name, "vless");
    }

    #[test]
    fn parse_ws_host_feeds_header() {
        let link = "vless://uuid@cdn.example:443?type=ws&security=tls&path=%2Fargo&host=real.example#n";
        let Some(Node::Vless(n)) = parse(link) else {
            panic!("expected vless node");
        };
        assert_eq!(n.network, Network::Ws);
        let ws = n.ws_opts.expect("ws opts");
        assert_eq!(ws.path.as_deref(), Some("/argo"));
        assert_eq!(ws.host_header.as_deref(), Some("real.example"));
        assert_eq!(n.tls.server_name.as_deref(), Some("real.example"));
    }

    #[test]
    fn parse_ignores_trojan_only_aliases() {
        let link = "vless://uuid@host.example:443?security=tls&peer=sn.example&allowInsecure=1#n";
        let Some(Node::Vless(n)) = parse(link) else {
            panic!("expected vless node");
        };
        assert!(n.tls.server_name.is_none());
        assert!(!n.tls.skip_cert_verify);
    }

    #[test]
    fn parse_rejects_missing_userinfo_or_port() {
        assert!(parse("vless://host.example:443#n").is_none());
        assert!(parse("vless://uuid@host.example#n").is_none());
    }

    #[test]
    fn roundtrip_reality_tcp() {
        let node = VlessNode {
            name: "TW | Reality 01".to_string(),
            server: "35.234.14.177".to_string(),
            port: 39885,
            uuid: "5ea25ac3-ad00-43b6-ab93-a669f0a28453".to_string(),
            flow: Some("xtls-rprx-vision".to_string()),
            network: Network::Tcp,
            tls: TlsOpts {
                enabled: true,
                sni: Some("apple.com".to_string()),
                client_fingerprint: Some("chrome".to_string()),
                reality: Some(RealityOpts {
                    public_key: "pbk-value".to_string(),
                    short_id: Some("903b6445".to_string()),
                }),
                ..Default::default()
            },
            ws_opts: None,
            grpc_service_name: None,
        };
        let reparsed = parse(&serialize(&node)).expect("reparse");
        assert_eq!(reparsed, Node::Vless(node));
    }

    #[test]
    fn roundtrip_ws_tls_alpn() {
        let node = VlessNode {
            name: "US WS".to_string(),
            server: "cdn.example.com".to_string(),
            port: 443,
            uuid: "uuid".to_string(),
            flow: None,
            network: Network::Ws,
            tls: TlsOpts {
                enabled: true,
                sni: Some("sni.example".to_string()),
                server_name: Some("real.example".to_string()),
                alpn: vec!["h2".to_string(), "http/1.1".to_string()],
                ..Default::default()
            },
            ws_opts: Some(WsOpts {
                path: Some("/vless-argo?ed=2560".to_string()),
                host_header: Some("real.example".to_string()),
            }),
            grpc_service_name: None,
        };
        let reparsed = parse(&serialize(&node)).expect("reparse");
        assert_eq!(reparsed, Node::Vless(node));
    }

    #[test]
    fn roundtrip_grpc() {
        let node = VlessNode {
            name: "grpc".to_string(),
            server: "g.example".to_string(),
            port: 443,
            uuid: "uuid".to_string(),
            flow: None,
            network: Network::Grpc,
            tls: TlsOpts {
                enabled: true,
                ..Default::default()
            },
            ws_opts: None,
            grpc_service_name: Some("svc".to_string()),
        };
        let reparsed = parse(&serialize(&node)).expect("reparse");
        assert_eq!(reparsed, Node::Vless(node));
    }
}
