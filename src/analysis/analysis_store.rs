//! Persistence for named analyses.
//!
//! A store keeps one document per `(owner, analysis)` pair. Saving replaces
//! the previous document (last writer wins) but keeps its `createdAt`.
//! Failures are returned to the caller and never touch the in-memory tree.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::analysis::analysis_tree::{AnalysisNode, NodeId, TreeSnapshot};
use crate::chess_errors::PersistenceError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisDocument {
    pub name: String,
    #[serde(default)]
    pub folder_id: Option<String>,
    pub nodes: Vec<AnalysisNode>,
    pub root_node_id: NodeId,
    pub last_node_id: NodeId,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl AnalysisDocument {
    pub fn new(name: impl Into<String>, folder_id: Option<String>, tree: TreeSnapshot) -> Self {
        let now = Utc::now();
        Self {
            name: name.into(),
            folder_id,
            nodes: tree.nodes,
            root_node_id: tree.root_node_id,
            last_node_id: tree.last_node_id,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn snapshot(&self) -> TreeSnapshot {
        TreeSnapshot {
            nodes: self.nodes.clone(),
            root_node_id: self.root_node_id,
            last_node_id: self.last_node_id,
        }
    }
}

pub trait AnalysisStore {
    /// `Ok(None)` when nothing was saved under this id.
    fn load(&self, owner_id: &str, analysis_id: &str) -> Result<Option<AnalysisDocument>, PersistenceError>;

    /// Store `document`, returning it as persisted (timestamps updated).
    fn save(
        &mut self,
        owner_id: &str,
        analysis_id: &str,
        document: AnalysisDocument,
    ) -> Result<AnalysisDocument, PersistenceError>;

    /// Analysis ids saved for `owner_id`, sorted.
    fn list(&self, owner_id: &str) -> Result<Vec<String>, PersistenceError>;
}

fn stamp(previous: Option<&AnalysisDocument>, mut document: AnalysisDocument) -> AnalysisDocument {
    if let Some(previous) = previous {
        document.created_at = previous.created_at;
    }
    document.updated_at = Utc::now();
    document
}

/// In-process store, mostly for tests and throwaway sessions.
#[derive(Debug, Default)]
pub struct MemoryStore {
    documents: HashMap<(String, String), AnalysisDocument>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl AnalysisStore for MemoryStore {
    fn load(&self, owner_id: &str, analysis_id: &str) -> Result<Option<AnalysisDocument>, PersistenceError> {
        Ok(self
            .documents
            .get(&(owner_id.to_owned(), analysis_id.to_owned()))
            .cloned())
    }

    fn save(
        &mut self,
        owner_id: &str,
        analysis_id: &str,
        document: AnalysisDocument,
    ) -> Result<AnalysisDocument, PersistenceError> {
        let key = (owner_id.to_owned(), analysis_id.to_owned());
        let stored = stamp(self.documents.get(&key), document);
        self.documents.insert(key, stored.clone());
        Ok(stored)
    }

    fn list(&self, owner_id: &str) -> Result<Vec<String>, PersistenceError> {
        let mut ids: Vec<String> = self
            .documents
            .keys()
            .filter(|(owner, _)| owner == owner_id)
            .map(|(_, id)| id.clone())
            .collect();
        ids.sort();
        Ok(ids)
    }
}

/// One pretty-printed JSON file per analysis under `<root>/<owner>/<id>.json`.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    root: PathBuf,
}

impl JsonFileStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    #[inline]
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn owner_dir(&self, owner_id: &str) -> Result<PathBuf, PersistenceError> {
        Ok(self.root.join(checked_component(owner_id)?))
    }

    fn document_path(&self, owner_id: &str, analysis_id: &str) -> Result<PathBuf, PersistenceError> {
        Ok(self
            .owner_dir(owner_id)?
            .join(format!("{}.json", checked_component(analysis_id)?)))
    }
}

/// Ids become path components, so anything that could escape the root is refused.
fn checked_component(id: &str) -> Result<&str, PersistenceError> {
    let valid = !id.is_empty()
        && id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_'));
    if valid {
        Ok(id)
    } else {
        Err(PersistenceError::Io(std::io::Error::new(
            std::io::ErrorKind::InvalidInput,
            format!("invalid storage id {id:?}"),
        )))
    }
}

impl AnalysisStore for JsonFileStore {
    fn load(&self, owner_id: &str, analysis_id: &str) -> Result<Option<AnalysisDocument>, PersistenceError> {
        let path = self.document_path(owner_id, analysis_id)?;
        let text = match fs::read_to_string(&path) {
            Ok(text) => text,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(err.into()),
        };
        let document = serde_json::from_str(&text)?;
        debug!(path = %path.display(), "analysis loaded");
        Ok(Some(document))
    }

    fn save(
        &mut self,
        owner_id: &str,
        analysis_id: &str,
        document: AnalysisDocument,
    ) -> Result<AnalysisDocument, PersistenceError> {
        let previous = self.load(owner_id, analysis_id)?;
        let stored = stamp(previous.as_ref(), document);

        fs::create_dir_all(self.owner_dir(owner_id)?)?;
        let path = self.document_path(owner_id, analysis_id)?;
        let staging = path.with_extension("json.tmp");
        fs::write(&staging, serde_json::to_string_pretty(&stored)?)?;
        fs::rename(&staging, &path)?;

        info!(path = %path.display(), nodes = stored.nodes.len(), "analysis saved");
        Ok(stored)
    }

    fn list(&self, owner_id: &str) -> Result<Vec<String>, PersistenceError> {
        let dir = self.owner_dir(owner_id)?;
        let entries = match fs::read_dir(&dir) {
            Ok(entries) => entries,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(err) => return Err(err.into()),
        };

        let mut ids = Vec::new();
        for entry in entries {
            let path = entry?.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some("json") {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|stem| stem.to_str()) {
                ids.push(stem.to_owned());
            }
        }
        ids.sort();
        Ok(ids)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::analysis_tree::AnalysisTree;
    use crate::game_state::game_state::GameState;

    fn document(name: &str) -> AnalysisDocument {
        AnalysisDocument::new(name, None, AnalysisTree::new(GameState::new_game()).snapshot())
    }

    fn scratch_dir(tag: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!(
            "power_chess_store_{tag}_{}_{}",
            std::process::id(),
            Utc::now().timestamp_nanos_opt().unwrap_or_default()
        ));
        let _ = fs::remove_dir_all(&dir);
        dir
    }

    #[test]
    fn memory_store_keeps_created_at() {
        let mut store = MemoryStore::new();
        let first = store.save("me", "game1", document("first")).expect("save should work");
        let second = store.save("me", "game1", document("second")).expect("save should work");
        assert_eq!(second.created_at, first.created_at);
        assert!(second.updated_at >= first.updated_at);
        assert_eq!(
            store.load("me", "game1").expect("load should work").map(|d| d.name),
            Some("second".to_owned())
        );
        assert_eq!(store.load("you", "game1").expect("load should work"), None);
        assert_eq!(store.list("me").expect("list should work"), vec!["game1".to_owned()]);
    }

    #[test]
    fn json_store_round_trips_documents() {
        let dir = scratch_dir("round_trip");
        let mut store = JsonFileStore::new(&dir);
        let saved = store.save("me", "opening", document("opening")).expect("save should work");
        let loaded = store
            .load("me", "opening")
            .expect("load should work")
            .expect("document should exist");
        assert_eq!(loaded, saved);
        assert_eq!(store.list("me").expect("list should work"), vec!["opening".to_owned()]);
        assert_eq!(store.load("me", "missing").expect("load should work"), None);
        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn json_store_refuses_path_tricks() {
        let store = JsonFileStore::new(scratch_dir("tricks"));
        assert!(matches!(
            store.load("me", "../escape"),
            Err(PersistenceError::Io(_))
        ));
    }

    #[test]
    fn document_uses_wire_names() {
        let json = serde_json::to_value(document("named")).expect("document should serialize");
        for key in ["name", "folderId", "nodes", "rootNodeId", "lastNodeId", "createdAt", "updatedAt"] {
            assert!(json.get(key).is_some(), "missing {key}");
        }
    }
}
