//! shadowsocks share-link codec.
//!
//! Three sightings of the same scheme in the wild:
//!   `ss://base64(cipher:password)@host:port#name`
//!   `ss://cipher:password@host:port#name` (clear user-info)
//!   `ss://base64(cipher:password@host:port)#name` (legacy, whole payload)
//! A literal `:` in the raw user-info decides whether to base64-decode it.

use super::{base64_decode, base64_encode, host_for_url, parse_host_port, percent_decode,
            percent_encode};
use crate::node::{Node, SsNode};

pub fn parse(link: &str) -> Option<Node> {
    let rest = link.strip_prefix("ss://")?;
    let (main, name) = match rest.find('#') {
        Some(i) => (
            &rest[..i],
            Some(percent_decode(&rest[i + 1..])).filter(|s| !s.is_empty()),
        ),
        None => (rest, None),
    };
    let name = name.unwrap_or_else(|| "ss".to_string());

    let (cipher, password, server, port) = if let Some((user_raw, host_port)) = main.rsplit_once('@')
    {
        let user = if user_raw.contains(':') {
            percent_decode(user_raw)
        } else {
            base64_decode(user_raw)?
        };
        let (cipher, password) = user.split_once(':')?;
        let (server, port) = parse_host_port(host_port)?;
        (cipher.to_string(), password.to_string(), server, port)
    } else {
        // legacy form: the whole payload is base64
        let decoded = base64_decode(main)?;
        let (user, host_port) = decoded.rsplit_once('@')?;
        let (cipher, password) = user.split_once(':')?;
        let (server, port) = parse_host_port(host_port)?;
        (cipher.to_string(), password.to_string(), server, port)
    };

    Some(Node::Shadowsocks(SsNode {
        name,
        server,
        port,
        cipher,
        password,
    }))
}

pub fn serialize(n: &SsNode) -> String {
    let user_info = base64_encode(&format!("{}:{}", n.cipher, n.password));
    format!(
        "ss://{}@{}:{}#{}",
        user_info,
        host_for_url(&n.server),
        n.port,
        percent_encode(&n.name)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_base64_userinfo() {
        let link = format!(
            "ss://{}@1.2.3.4:8388#My%20SS",
            base64_encode("aes-256-gcm:password123")
        );
        let Some(Node::Shadowsocks(n)) = parse(&link) else {
            panic!("expected ss node");
        };
        assert_eq!(n.name, "My SS");
        assert_eq!(n.cipher, "aes-256-gcm");
        assert_eq!(n.password, "password123");
        assert_eq!(n.server, "1.2.3.4");
        assert_eq!(n.port, 8388);
    }

    #[test]
    fn parse_clear_userinfo() {
        let Some(Node::Shadowsocks(n)) = parse("ss://chacha20-ietf-poly1305:pw@h.example:8388#n")
        else {
            panic!("expected ss node");
        };
        assert_eq!(n.cipher, "chacha20-ietf-poly1305");
        assert_eq!(n.password, "pw");
    }

    #[test]
    fn parse_legacy_whole_base64() {
        let link = format!("ss://{}#old", base64_encode("rc4-md5:secret@5.6.7.8:8399"));
        let Some(Node::Shadowsocks(n)) = parse(&link) else {
            panic!("expected ss node");
        };
        assert_eq!(n.name, "old");
        assert_eq!(n.cipher, "rc4-md5");
        assert_eq!(n.password, "secret");
        assert_eq!(n.server, "5.6.7.8");
        assert_eq!(n.port, 8399);
    }

    #[test]
    fn parse_missing_name_defaults() {
        let link = format!("ss://{}@1.2.3.4:8388", base64_encode("aes-256-gcm:pw"));
        assert_eq!(parse(&link).map(|n| n.name().to_string()).as_deref(), Some("ss"));
    }

    #[test]
    fn parse_rejects_malformed() {
        assert!(parse("ss://@@@#n").is_none());
        assert!(parse(&format!("ss://{}@h:99#n", base64_encode("nocolon"))).is_none());
    }

    #[test]
    fn roundtrip() {
        let node = SsNode {
            name: "JP | 东京 01".to_string(),
            server: "jp1.example.com".to_string(),
            port: 8388,
            cipher: "aes-256-gcm".to_string(),
            password: "hunter2:with:colons".to_string(),
        };
        let reparsed = parse(&serialize(&node)).expect("reparse");
        assert_eq!(reparsed, Node::Shadowsocks(node));
    }
}
