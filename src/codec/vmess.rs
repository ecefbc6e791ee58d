//! vmess share-link codec: `vmess://base64(json)`.
//!
//! The JSON payload uses the v2 field names (`ps,add,port,id,aid,scy,net,
//! tls,sni,host,path`). Numeric fields arrive as either strings or
//! numbers depending on the generator, so both are accepted.

use serde_json::{Map, Value};

use super::{base64_decode, base64_encode};
use crate::node::{Network, Node, TlsOpts, VmessNode, WsOpts};

pub fn parse(link: &str) -> Option<Node> {
    let payload = link.strip_prefix("vmess://")?;
    let decoded = base64_decode(payload)?;
    let json: Value = serde_json::from_str(&decoded).ok()?;

    let server = json.get("add")?.as_str()?.to_string();
    let port = u16::try_from(num_field(&json, "port")?).ok()?;
    if port == 0 {
        return None;
    }

    let name = str_field(&json, "ps").unwrap_or_else(|| "vmess".to_string());
    let uuid = str_field(&json, "id").unwrap_or_default();
    let alter_id = match num_field(&json, "aid") {
        Some(aid) => u32::try_from(aid).ok()?,
        None => 0,
    };
    let cipher = str_field(&json, "scy").unwrap_or_else(|| "auto".to_string());
    let network =
        Network::from_str_lossy(json.get("net").and_then(|v| v.as_str()).unwrap_or("tcp"));

    // `tls` is the literal string "tls" / "none" / absent, not a bool.
    let tls_str = json.get("tls").and_then(|v| v.as_str()).unwrap_or("");
    let host = str_field(&json, "host");
    let tls = TlsOpts {
        enabled: !tls_str.is_empty() && tls_str != "none",
        sni: str_field(&json, "sni"),
        server_name: host.clone(),
        ..Default::default()
    };

    let path = str_field(&json, "path");
    let (ws_opts, grpc_service_name) = match network {
        Network::Ws => (
            Some(WsOpts {
                path,
                host_header: host,
            }),
            None,
        ),
        Network::Grpc => (None, path),
        Network::Tcp => (None, None),
    };

    Some(Node::Vmess(VmessNode {
        name,
        server,
        port,
        uuid,
        alter_id,
        cipher,
        network,
        tls,
        ws_opts,
        grpc_service_name,
    }))
}

pub fn serialize(n: &VmessNode) -> String {
    let mut json = Map::new();
    json.insert("v".to_string(), Value::from("2"));
    json.insert("ps".to_string(), Value::from(n.name.as_str()));
    json.insert("add".to_string(), Value::from(n.server.as_str()));
    json.insert("port".to_string(), Value::from(n.port));
    json.insert("id".to_string(), Value::from(n.uuid.as_str()));
    json.insert("aid".to_string(), Value::from(n.alter_id));
    json.insert("scy".to_string(), Value::from(n.cipher.as_str()));
    json.insert("net".to_string(), Value::from(n.network.as_str()));
    json.insert(
        "tls".to_string(),
        Value::from(if n.tls.enabled { "tls" } else { "" }),
    );
    if let Some(sni) = &n.tls.sni {
        json.insert("sni".to_string(), Value::from(sni.as_str()));
    }
    let host = n
        .tls
        .server_name
        .clone()
        .or_else(|| n.ws_opts.as_ref().and_then(|w| w.host_header.clone()));
    if let Some(host) = host {
        json.insert("host".to_string(), Value::from(host));
    }
    match n.network {
        Network::Ws => {
            if let Some(path) = n.ws_opts.as_ref().and_then(|w| w.path.clone()) {
                json.insert("path".to_string(), Value::from(path));
            }
        }
        Network::Grpc => {
            if let Some(service) = &n.grpc_service_name {
                json.insert("path".to_string(), Value::from(service.as_str()));
            }
        }
        Network::Tcp => {}
    }
    format!("vmess://{}", base64_encode(&Value::Object(json).to_string()))
}

fn str_field(json: &Value, key: &str) -> Option<String> {
    json.get(key)
        .and_then(|v| v.as_str())
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// Accept `"443"` and `443` alike.
fn num_field(json: &Value, key: &str) -> Option<u64> {
    match json.get(key)? {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => s.parse().ok(),
        _ => None,
    }
}
