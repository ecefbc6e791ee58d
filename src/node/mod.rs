//! 节点模型
//!
//! One canonical, protocol-tagged representation of a proxy endpoint.
//! Each variant carries only the fields its protocol actually uses, so an
//! ssr node can never grow a reality overlay and a plain ss node has no
//! transport knobs. Nodes are immutable values built fresh per aggregation
//! call; nothing here persists.

/// Transport carried by vmess / vless / trojan nodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Network {
    #[default]
    Tcp,
    Ws,
    Grpc,
}

impl Network {
    pub fn as_str(self) -> &'static str {
        match self {
            Network::Tcp => "tcp",
            Network::Ws => "ws",
            Network::Grpc => "grpc",
        }
    }

    /// Lenient mapping used by the codecs: anything unrecognized is tcp.
    pub fn from_str_lossy(s: &str) -> Self {
        match s {
            "ws" => Network::Ws,
            "grpc" => Network::Grpc,
            _ => Network::Tcp,
        }
    }
}

/// Reality camouflage parameters, only valid inside an enabled TLS overlay.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RealityOpts {
    pub public_key: String,
    pub short_id: Option<String>,
}

/// Optional TLS overlay for vmess / vless / trojan.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TlsOpts {
    pub enabled: bool,
    pub sni: Option<String>,
    pub server_name: Option<String>,
    pub alpn: Vec<String>,
    pub client_fingerprint: Option<String>,
    pub skip_cert_verify: bool,
    pub reality: Option<RealityOpts>,
}

/// WebSocket transport options, set iff `network == Ws`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct WsOpts {
    pub path: Option<String>,
    pub host_header: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VmessNode {
    pub name: String,
    pub server: String,
    pub port: u16,
    pub uuid: String,
    pub alter_id: u32,
    pub cipher: String,
    pub network: Network,
    pub tls: TlsOpts,
    pub ws_opts: Option<WsOpts>,
    pub grpc_service_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VlessNode {
    pub name: String,
    pub server: String,
    pub port: u16,
    pub uuid: String,
    pub flow: Option<String>,
    pub network: Network,
    pub tls: TlsOpts,
    pub ws_opts: Option<WsOpts>,
    pub grpc_service_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrojanNode {
    pub name: String,
    pub server: String,
    pub port: u16,
    pub password: String,
    pub network: Network,
    pub tls: TlsOpts,
    pub ws_opts: Option<WsOpts>,
    pub grpc_service_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SsNode {
    pub name: String,
    pub server: String,
    pub port: u16,
    pub cipher: String,
    pub password: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SsrNode {
    pub name: String,
    pub server: String,
    pub port: u16,
    pub cipher: String,
    pub password: String,
    pub protocol: String,
    pub obfs: String,
    pub protocol_param: Option<String>,
    pub obfs_param: Option<String>,
}

/// A parsed proxy endpoint, tagged by protocol.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Vmess(VmessNode),
    Vless(VlessNode),
    Trojan(TrojanNode),
    Shadowsocks(SsNode),
    ShadowsocksR(SsrNode),
}

impl Node {
    pub fn kind(&self) -> &'static str {
        match self {
            Node::Vmess(_) => "vmess",
            Node::Vless(_) => "vless",
            Node::Trojan(_) => "trojan",
            Node::Shadowsocks(_) => "ss",
            Node::ShadowsocksR(_) => "ssr",
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Node::Vmess(n) => &n.name,
            Node::Vless(n) => &n.name,
            Node::Trojan(n) => &n.name,
            Node::Shadowsocks(n) => &n.name,
            Node::ShadowsocksR(n) => &n.name,
        }
    }

    pub fn server(&self) -> &str {
        match self {
            Node::Vmess(n) => &n.server,
            Node::Vless(n) => &n.server,
            Node::Trojan(n) => &n.server,
            Node::Shadowsocks(n) => &n.server,
            Node::ShadowsocksR(n) => &n.server,
        }
    }

    pub fn port(&self) -> u16 {
        match self {
            Node::Vmess(n) => n.port,
            Node::Vless(n) => n.port,
            Node::Trojan(n) => n.port,
            Node::Shadowsocks(n) => n.port,
            Node::ShadowsocksR(n) => n.port,
        }
    }

    /// Prepend the per-source remark prefix to the display name.
    pub fn prefix_name(&mut self, prefix: &str) {
        if prefix.is_empty() {
            return;
        }
        let name = match self {
            Node::Vmess(n) => &mut n.name,
            Node::Vless(n) => &mut n.name,
            Node::Trojan(n) => &mut n.name,
            Node::Shadowsocks(n) => &mut n.name,
            Node::ShadowsocksR(n) => &mut n.name,
        };
        *name = format!("{}{}", prefix, name);
    }

    /// A node missing its endpoint must never reach an output document.
    pub fn is_renderable(&self) -> bool {
        !self.server().is_empty() && self.port() != 0
    }
}
