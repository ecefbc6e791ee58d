//! Clash 配置文档：proxies 记录 + 代理组 + 规则
//!
//! `ClashProxy` is the wire record used both ways: serialized when
//! rendering the structured output and deserialized when a subscription
//! source is itself a Clash config. Optional fields are omitted from the
//! document rather than written as null.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::common::SubError;
use crate::node::{
    Network, Node, RealityOpts, SsNode, SsrNode, TlsOpts, TrojanNode, VlessNode, VmessNode, WsOpts,
};

pub const GROUP_NAME: &str = "PROXY";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClashDoc {
    pub proxies: Vec<ClashProxy>,
    #[serde(rename = "proxy-groups")]
    pub proxy_groups: Vec<ClashProxyGroup>,
    pub rules: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClashProxyGroup {
    pub name: String,
    #[serde(rename = "type")]
    pub group_type: String,
    pub proxies: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ClashProxy {
    pub name: String,
    #[serde(rename = "type")]
    pub proxy_type: String,
    pub server: String,
    pub port: u16,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uuid: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cipher: Option<String>,
    #[serde(rename = "alterId", skip_serializing_if = "Option::is_none")]
    pub alter_id: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub flow: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub network: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub udp: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tls: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sni: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub servername: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alpn: Option<Vec<String>>,
    #[serde(rename = "client-fingerprint", skip_serializing_if = "Option::is_none")]
    pub client_fingerprint: Option<String>,
    #[serde(rename = "skip-cert-verify", skip_serializing_if = "Option::is_none")]
    pub skip_cert_verify: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub protocol: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub obfs: Option<String>,
    #[serde(rename = "protocol-param", skip_serializing_if = "Option::is_none")]
    pub protocol_param: Option<String>,
    #[serde(rename = "obfs-param", skip_serializing_if = "Option::is_none")]
    pub obfs_param: Option<String>,
    #[serde(rename = "reality-opts", skip_serializing_if = "Option::is_none")]
    pub reality_opts: Option<ClashRealityOpts>,
    #[serde(rename = "ws-opts", skip_serializing_if = "Option::is_none")]
    pub ws_opts: Option<ClashWsOpts>,
    #[serde(rename = "grpc-opts", skip_serializing_if = "Option::is_none")]
    pub grpc_opts: Option<ClashGrpcOpts>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ClashRealityOpts {
    #[serde(rename = "public-key")]
    pub public_key: String,
    #[serde(rename = "short-id", skip_serializing_if = "Option::is_none")]
    pub short_id: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ClashWsOpts {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub headers: Option<HashMap<String, String>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ClashGrpcOpts {
    #[serde(rename = "grpc-service-name", skip_serializing_if = "Option::is_none")]
    pub grpc_service_name: Option<String>,
}

/// Render the merged node set as a full Clash document: every proxy, one
/// selector group referencing them all, and the fixed two-rule policy.
pub fn render(nodes: &[&Node]) -> String {
    let proxies: Vec<ClashProxy> = nodes.iter().map(|n| proxy_record(n)).collect();
    let member_names = proxies.iter().map(|p| p.name.clone()).collect();
    let doc = ClashDoc {
        proxies,
        proxy_groups: vec![ClashProxyGroup {
            name: GROUP_NAME.to_string(),
            group_type: "select".to_string(),
            proxies: member_names,
        }],
        rules: vec![
            "GEOIP,CN,DIRECT".to_string(),
            format!("MATCH,{}", GROUP_NAME),
        ],
    };
    match to_yaml(&doc) {
        Ok(yaml) => yaml,
        Err(e) => {
            tracing::warn!(error = %e, "clash document dropped");
            String::new()
        }
    }
}

fn to_yaml(doc: &ClashDoc) -> Result<String, SubError> {
    serde_yml::to_string(doc).map_err(|e| SubError::Render(e.to_string()))
}

fn proxy_record(node: &Node) -> ClashProxy {
    match node {
        Node::Vmess(n) => vmess_record(n),
        Node::Vless(n) => vless_record(n),
        Node::Trojan(n) => trojan_record(n),
        Node::Shadowsocks(n) => ss_record(n),
        Node::ShadowsocksR(n) => ssr_record(n),
    }
}

fn tls_fields(record: &mut ClashProxy, tls: &TlsOpts) {
    record.tls = tls.enabled.then_some(true);
    record.sni = tls.sni.clone();
    record.servername = tls.server_name.clone();
    if !tls.alpn.is_empty() {
        record.alpn = Some(tls.alpn.clone());
    }
    record.client_fingerprint = tls.client_fingerprint.clone();
    record.skip_cert_verify = tls.skip_cert_verify.then_some(true);
    record.reality_opts = tls.reality.as_ref().map(|r| ClashRealityOpts {
        public_key: r.public_key.clone(),
        short_id: r.short_id.clone(),
    });
}

fn transport_fields(
    record: &mut ClashProxy,
    network: Network,
    ws_opts: &Option<WsOpts>,
    grpc_service_name: &Option<String>,
) {
    if network != Network::Tcp {
        record.network = Some(network.as_str().to_string());
    }
    if let Some(ws) = ws_opts {
        let headers = ws
            .host_header
            .as_ref()
            .map(|h| HashMap::from([("Host".to_string(), h.clone())]));
        record.ws_opts = Some(ClashWsOpts {
            path: ws.path.clone(),
            headers,
        });
    }
    if grpc_service_name.is_some() {
        record.grpc_opts = Some(ClashGrpcOpts {
            grpc_service_name: grpc_service_name.clone(),
        });
    }
}

fn vmess_record(n: &VmessNode) -> ClashProxy {
    let mut record = ClashProxy {
        name: n.name.clone(),
        proxy_type: "vmess".to_string(),
        server: n.server.clone(),
        port: n.port,
        uuid: Some(n.uuid.clone()),
        alter_id: Some(n.alter_id),
        cipher: Some(n.cipher.clone()),
        udp: Some(true),
        ..Default::default()
    };
    tls_fields(&mut record, &n.tls);
    transport_fields(&mut record, n.network, &n.ws_opts, &n.grpc_service_name);
    record
}

fn vless_record(n: &VlessNode) -> ClashProxy {
    let mut record = ClashProxy {
        name: n.name.clone(),
        proxy_type: "vless".to_string(),
        server: n.server.clone(),
        port: n.port,
        uuid: Some(n.uuid.clone()),
        flow: n.flow.clone(),
        ..Default::default()
    };
    tls_fields(&mut record, &n.tls);
    transport_fields(&mut record, n.network, &n.ws_opts, &n.grpc_service_name);
    record
}

fn trojan_record(n: &TrojanNode) -> ClashProxy {
    let mut record = ClashProxy {
        name: n.name.clone(),
        proxy_type: "trojan".to_string(),
        server: n.server.clone(),
        port: n.port,
        password: Some(n.password.clone()),
        udp: Some(true),
        ..Default::default()
    };
    tls_fields(&mut record, &n.tls);
    transport_fields(&mut record, n.network, &n.ws_opts, &n.grpc_service_name);
    // trojan always speaks TLS in Clash; the flag is implied, not written
    record.tls = None;
    record
}

fn ss_record(n: &SsNode) -> ClashProxy {
    ClashProxy {
        name: n.name.clone(),
        proxy_type: "ss".to_string(),
        server: n.server.clone(),
        port: n.port,
        cipher: Some(n.cipher.clone()),
        password: Some(n.password.clone()),
        ..Default::default()
    }
}

fn ssr_record(n: &SsrNode) -> ClashProxy {
    ClashProxy {
        name: n.name.clone(),
        proxy_type: "ssr".to_string(),
        server: n.server.clone(),
        port: n.port,
        cipher: Some(n.cipher.clone()),
        password: Some(n.password.clone()),
        protocol: Some(n.protocol.clone()),
        obfs: Some(n.obfs.clone()),
        protocol_param: n.protocol_param.clone(),
        obfs_param: n.obfs_param.clone(),
        ..Default::default()
    }
}

/// Convert one Clash proxy record back into the canonical model.
/// Unsupported types and records missing their endpoint yield `None`.
pub fn record_to_node(record: ClashProxy) -> Option<Node> {
    if record.server.is_empty() || record.port == 0 {
        return None;
    }
    let tls = TlsOpts {
        enabled: record.tls.unwrap_or(false)
            || record.reality_opts.is_some()
            || record.proxy_type == "trojan",
        sni: record.sni.clone(),
        server_name: record.servername.clone(),
        alpn: record.alpn.clone().unwrap_or_default(),
        client_fingerprint: record.client_fingerprint.clone(),
        skip_cert_verify: record.skip_cert_verify.unwrap_or(false),
        reality: record.reality_opts.as_ref().map(|r| RealityOpts {
            public_key: r.public_key.clone(),
            short_id: r.short_id.clone(),
        }),
    };
    let network = Network::from_str_lossy(record.network.as_deref().unwrap_or("tcp"));
    let ws_opts = (network == Network::Ws).then(|| {
        let ws = record.ws_opts.clone().unwrap_or_default();
        WsOpts {
            path: ws.path,
            host_header: ws
                .headers
                .and_then(|h| h.get("Host").cloned())
                .or_else(|| record.servername.clone()),
        }
    });
    let grpc_service_name = if network == Network::Grpc {
        record.grpc_opts.clone().and_then(|g| g.grpc_service_name)
    } else {
        None
    };

    match record.proxy_type.as_str() {
        "vmess" => Some(Node::Vmess(VmessNode {
            name: record.name,
            server: record.server,
            port: record.port,
            uuid: record.uuid.unwrap_or_default(),
            alter_id: record.alter_id.unwrap_or(0),
            cipher: record.cipher.unwrap_or_else(|| "auto".to_string()),
            network,
            tls,
            ws_opts,
            grpc_service_name,
        })),
        "vless" => Some(Node::Vless(VlessNode {
            name: record.name,
            server: record.server,
            port: record.port,
            uuid: record.uuid.unwrap_or_default(),
            flow: record.flow,
            network,
            tls,
            ws_opts,
            grpc_service_name,
        })),
        "trojan" => Some(Node::Trojan(TrojanNode {
            name: record.name,
            server: record.server,
            port: record.port,
            password: record.password.unwrap_or_default(),
            network,
            tls,
            ws_opts,
            grpc_service_name,
        })),
        "ss" | "shadowsocks" => Some(Node::Shadowsocks(SsNode {
            name: record.name,
            server: record.server,
            port: record.port,
            cipher: record.cipher.unwrap_or_default(),
            password: record.password.unwrap_or_default(),
        })),
        "ssr" => Some(Node::ShadowsocksR(SsrNode {
            name: record.name,
            server: record.server,
            port: record.port,
            cipher: record.cipher.unwrap_or_default(),
            password: record.password.unwrap_or_default(),
            protocol: record.protocol.unwrap_or_default(),
            obfs: record.obfs.unwrap_or_default(),
            protocol_param: record.protocol_param,
            obfs_param: record.obfs_param,
        })),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ss_node(name: &str) -> Node {
        Node::Shadowsocks(SsNode {
            name: name.to_string(),
            server: "1.2.3.4".to_string(),
            port: 8388,
            cipher: "aes-256-gcm".to_string(),
            password: "pw".to_string(),
        })
    }

    #[test]
    fn render_group_and_rules() {
        let n1 = ss_node("n1");
        let n2 = ss_node("n2");
        let yaml = render(&[&n1, &n2]);
        let doc: ClashDoc = serde_yml::from_str(&yaml).unwrap();
        assert_eq!(doc.proxy_groups.len(), 1);
        let group = &doc.proxy_groups[0];
        assert_eq!(group.name, "PROXY");
        assert_eq!(group.group_type, "select");
        assert_eq!(group.proxies, vec!["n1".to_string(), "n2".to_string()]);
        assert_eq!(
            doc.rules,
            vec!["GEOIP,CN,DIRECT".to_string(), "MATCH,PROXY".to_string()]
        );
    }

    #[test]
    fn render_omits_absent_optionals() {
        let n = ss_node("n1");
        let yaml = render(&[&n]);
        assert!(!yaml.contains("uuid"));
        assert!(!yaml.contains("null"));
        assert!(!yaml.contains("reality-opts"));
    }

    #[test]
    fn vless_record_carries_reality() {
        let node = Node::Vless(VlessNode {
            name: "r".to_string(),
            server: "h".to_string(),
            port: 443,
            uuid: "u".to_string(),
            flow: Some("xtls-rprx-vision".to_string()),
            network: Network::Tcp,
            tls: TlsOpts {
                enabled: true,
                sni: Some("apple.com".to_string()),
                client_fingerprint: Some("chrome".to_string()),
                reality: Some(RealityOpts {
                    public_key: "pk".to_string(),
                    short_id: Some("sid".to_string()),
                }),
                ..Default::default()
            },
            ws_opts: None,
            grpc_service_name: None,
        });
        let yaml = render(&[&node]);
        let doc: ClashDoc = serde_yml::from_str(&yaml).unwrap();
        let proxy = &doc.proxies[0];
        assert_eq!(proxy.proxy_type, "vless");
        assert_eq!(proxy.reality_opts.as_ref().unwrap().public_key, "pk");
        assert_eq!(proxy.flow.as_deref(), Some("xtls-rprx-vision"));
    }

    #[test]
    fn record_to_node_trojan_implies_tls() {
        let record = ClashProxy {
            name: "t".to_string(),
            proxy_type: "trojan".to_string(),
            server: "h".to_string(),
            port: 443,
            password: Some("pw".to_string()),
            ..Default::default()
        };
        let Some(Node::Trojan(n)) = record_to_node(record) else {
            panic!("expected trojan node");
        };
        assert!(n.tls.enabled);
    }

    #[test]
    fn record_to_node_rejects_unsupported_and_invalid() {
        let record = ClashProxy {
            name: "h".to_string(),
            proxy_type: "hysteria2".to_string(),
            server: "h".to_string(),
            port: 443,
            ..Default::default()
        };
        assert!(record_to_node(record).is_none());

        let record = ClashProxy {
            name: "x".to_string(),
            proxy_type: "ss".to_string(),
            server: String::new(),
            port: 443,
            ..Default::default()
        };
        assert!(record_to_node(record).is_none());
    }

    #[test]
    fn vmess_ws_record_roundtrips_through_yaml() {
        let node = Node::Vmess(VmessNode {
            name: "ws".to_string(),
            server: "cdn.example".to_string(),
            port: 443,
            uuid: "u".to_string(),
            alter_id: 0,
            cipher: "auto".to_string(),
            network: Network::Ws,
            tls: TlsOpts {
                enabled: true,
                server_name: Some("real.example".to_string()),
                ..Default::default()
            },
            ws_opts: Some(WsOpts {
                path: Some("/ws".to_string()),
                host_header: Some("real.example".to_string()),
            }),
            grpc_service_name: None,
        });
        let yaml = render(&[&node]);
        let doc: ClashDoc = serde_yml::from_str(&yaml).unwrap();
        let reparsed = record_to_node(doc.proxies[0].clone()).expect("node");
        assert_eq!(reparsed, node);
    }
}
