//! Store maintenance commands.

use std::path::PathBuf;

use serde::Serialize;

use super::{Output, to_json};
use crate::Result;
use crate::storage::Store;

/// Outcome of `store prune`.
#[derive(Debug, Serialize)]
pub struct PruneResult {
    pub pruned: usize,
}

impl Output for PruneResult {
    fn to_json(&self) -> String {
        to_json(self)
    }

    fn to_human(&self) -> String {
        match self.pruned {
            0 => "No orphaned files.".to_string(),
            1 => "Pruned 1 orphaned file.".to_string(),
            n => format!("Pruned {} orphaned files.", n),
        }
    }
}

/// Location of the open store.
#[derive(Debug, Serialize)]
pub struct StorePath {
    pub path: PathBuf,
}

impl Output for StorePath {
    fn to_json(&self) -> String {
        to_json(self)
    }

    fn to_human(&self) -> String {
        self.path.display().to_string()
    }
}

pub fn store_prune(store: &mut Store) -> Result<PruneResult> {
    let pruned = store.prune_orphan_files()?;
    Ok(PruneResult { pruned })
}

pub fn store_path(store: &Store) -> StorePath {
    StorePath {
        path: store.path().to_path_buf(),
    }
}
