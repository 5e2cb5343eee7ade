//! Router peer files.
//!
//! Each router has one YAML file `<root>/<router>.yml` holding a list of peer
//! records. Files are written sorted by peer name with every peer's own key
//! order kept, so re-saving an already sorted file leaves it byte-identical.

#![forbid(unsafe_code)]

mod error;

use std::fs;
use std::path::{Path, PathBuf};

use dn42_validation::PeerRecord;
use serde_json::Value;
use tracing::{debug, info};

pub use error::{Result, StoreError};

/// Extension of router files.
pub const ROUTER_EXTENSION: &str = "yml";

/// A peer with the line its list item starts on.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredPeer {
    /// The peer record.
    pub record: PeerRecord,
    /// 1-based line of the peer's list item, if known.
    pub line: Option<usize>,
}

/// The peers of one router as loaded from disk.
#[derive(Debug, Clone, PartialEq)]
pub struct RouterPeers {
    /// Router id (file stem).
    pub router: String,
    /// Path of the router file.
    pub path: PathBuf,
    /// Peers in file order.
    pub peers: Vec<StoredPeer>,
}

impl RouterPeers {
    /// The peer records, in file order.
    #[must_use]
    pub fn records(&self) -> Vec<PeerRecord> {
        self.peers.iter().map(|p| p.record.clone()).collect()
    }

    /// Consume into the peer records.
    #[must_use]
    pub fn into_records(self) -> Vec<PeerRecord> {
        self.peers.into_iter().map(|p| p.record).collect()
    }

    /// Line of the peer at `index`.
    #[must_use]
    pub fn line(&self, index: usize) -> Option<usize> {
        self.peers.get(index).and_then(|p| p.line)
    }
}

/// Directory of router files.
#[derive(Debug, Clone)]
pub struct PeerStore {
    root: PathBuf,
}

impl PeerStore {
    /// Create a store rooted at `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// The directory holding router files.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path of a router's file.
    #[must_use]
    pub fn path(&self, router: &str) -> PathBuf {
        self.root.join(format!("{router}.{ROUTER_EXTENSION}"))
    }

    /// Router ids, sorted.
    pub fn routers(&self) -> Result<Vec<String>> {
        let entries = fs::read_dir(&self.root).map_err(|e| StoreError::io(&self.root, e))?;

        let mut routers = Vec::new();
        for entry in entries {
            let path = entry.map_err(|e| StoreError::io(&self.root, e))?.path();
            if path.extension().and_then(|e| e.to_str()) != Some(ROUTER_EXTENSION) {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                routers.push(stem.to_string());
            }
        }
        routers.sort();
        debug!(root = %self.root.display(), count = routers.len(), "listed routers");
        Ok(routers)
    }

    /// Whether a router file exists.
    #[must_use]
    pub fn contains(&self, router: &str) -> bool {
        self.path(router).is_file()
    }

    /// Load a router's peers.
    ///
    /// An empty or null document has no peers.
    pub fn load(&self, router: &str) -> Result<RouterPeers> {
        let path = self.path(router);
        let text = fs::read_to_string(&path).map_err(|e| StoreError::io(&path, e))?;
        let records = parse_peers(&path, &text)?;
        let lines = item_lines(&text, records.len());

        let peers = records
            .into_iter()
            .zip(lines)
            .map(|(record, line)| StoredPeer { record, line })
            .collect::<Vec<_>>();

        debug!(router, peers = peers.len(), "loaded router");
        Ok(RouterPeers {
            router: router.to_string(),
            path,
            peers,
        })
    }

    /// Write a router's peers, sorted by name.
    ///
    /// Returns the path written.
    pub fn save(&self, router: &str, peers: &[PeerRecord]) -> Result<PathBuf> {
        let path = self.path(router);
        let text = render_peers(peers).map_err(|e| StoreError::yaml(&path, e))?;
        fs::write(&path, text).map_err(|e| StoreError::io(&path, e))?;
        info!(router, peers = peers.len(), path = %path.display(), "saved router");
        Ok(path)
    }
}

/// Render peers in router file layout.
///
/// Peers are sorted by name (stable; peers without a string name first), each
/// written as a one-item list keeping its key order, separated by a blank
/// line, after a `---` marker. Lists nested under a key are indented below
/// it (`sessions:` then `    - ipv4`), the layout hand-edited files use.
pub fn render_peers(peers: &[PeerRecord]) -> std::result::Result<String, serde_yaml::Error> {
    let mut sorted: Vec<&PeerRecord> = peers.iter().collect();
    sorted.sort_by(|a, b| a.name_str().cmp(&b.name_str()));

    let items = sorted
        .into_iter()
        .map(|peer| serde_yaml::to_string(&[peer]).map(|yaml| indent_sequences(&yaml)))
        .collect::<std::result::Result<Vec<_>, _>>()?;

    Ok(format!("---\n{}", items.join("\n")))
}

/// Indent block sequences that sit directly under a mapping key.
///
/// serde_yaml writes them at the key's own column; every line of such a
/// sequence moves two columns right, nested ones cumulatively.
fn indent_sequences(yaml: &str) -> String {
    let mut out = String::with_capacity(yaml.len());
    // Original columns of the sequences currently being shifted.
    let mut open: Vec<usize> = Vec::new();
    let mut key_column: Option<usize> = None;

    for line in yaml.lines() {
        let body = line.trim_start();
        let column = line.len() - body.len();
        let is_item = body == "-" || body.starts_with("- ");

        while let Some(&seq) = open.last() {
            if column > seq || (column == seq && is_item) {
                break;
            }
            open.pop();
        }
        if is_item && key_column == Some(column) {
            open.push(column);
        }

        if !body.is_empty() {
            out.push_str(&" ".repeat(2 * open.len()));
        }
        out.push_str(line);
        out.push('\n');

        key_column = (!is_item && body.ends_with(':')).then_some(column);
    }
    out
}

fn parse_peers(path: &Path, text: &str) -> Result<Vec<PeerRecord>> {
    let body = text.trim();
    if body.is_empty() || body == "---" {
        return Ok(Vec::new());
    }

    let document: Value = serde_yaml::from_str(text).map_err(|e| StoreError::yaml(path, e))?;
    let items = match document {
        Value::Null => return Ok(Vec::new()),
        Value::Array(items) => items,
        _ => {
            return Err(StoreError::NotASequence {
                path: path.to_path_buf(),
            })
        }
    };

    items
        .into_iter()
        .enumerate()
        .map(|(index, item)| {
            PeerRecord::from_value(item).map_err(|_| StoreError::NotAMapping {
                path: path.to_path_buf(),
                index,
            })
        })
        .collect()
}

/// Lines of top-level block-sequence items.
///
/// Falls back to unknown lines when the count does not match the number of
/// peers (flow-style lists, for example).
fn item_lines(text: &str, count: usize) -> Vec<Option<usize>> {
    let lines: Vec<usize> = text
        .lines()
        .enumerate()
        .filter(|(_, line)| line.starts_with('-') && !line.starts_with("---"))
        .map(|(index, _)| index + 1)
        .collect();

    if lines.len() == count {
        lines.into_iter().map(Some).collect()
    } else {
        vec![None; count]
    }
}
