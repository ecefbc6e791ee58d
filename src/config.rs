//! Sources file for the CLI front-end.
//!
//! ```yaml
//! sources:
//!   - url: https://provider.example/sub
//!     prefix: "A | "
//!   - url: "vless://uuid@host:443?security=tls#pinned"
//! ```

use anyhow::Result;
use serde::Deserialize;

use crate::aggregate::Source;

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct SourcesFile {
    pub sources: Vec<SourceEntry>,
}

#[derive(Debug, Deserialize)]
pub struct SourceEntry {
    pub url: String,
    #[serde(default)]
    pub prefix: String,
}

pub fn load_sources(path: &str) -> Result<Vec<Source>> {
    let content = std::fs::read_to_string(path)?;
    let file: SourcesFile = serde_yml::from_str(&content)?;
    Ok(file
        .sources
        .into_iter()
        .map(|entry| Source::new(entry.url, entry.prefix))
        .collect())
}
