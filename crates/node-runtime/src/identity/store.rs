use std::fmt;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use bn_01_bls_engine::{NodeIdentity, PUBLIC_KEY_LEN, SECRET_KEY_LEN};
use serde::{Deserialize, Serialize};
use shared_types::NodeId;
use thiserror::Error;
use tracing::{info, warn};
use zeroize::Zeroize;

/// Identity store errors.
#[derive(Debug, Error)]
pub enum IdentityStoreError {
    #[error("identity store I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("identity state file is corrupt: {0}")]
    Corrupt(String),

    #[error("node {0} is registered on-chain; deregister before deleting its identity")]
    RegisteredOnChain(NodeId),
}

/// Persisted node state.
#[derive(PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeState {
    pub node_id: NodeId,
    #[serde(with = "shared_types::hex_bytes")]
    pub private_key: [u8; SECRET_KEY_LEN],
    #[serde(with = "shared_types::hex_bytes")]
    pub public_key: [u8; PUBLIC_KEY_LEN],
    #[serde(default)]
    pub registered: bool,
    /// Stored for the staking collaborator; never interpreted here.
    #[serde(default = "default_stake_status")]
    pub stake_status: String,
}

fn default_stake_status() -> String {
    "none".to_string()
}

impl NodeState {
    /// Fresh, unregistered state for `identity`.
    pub fn from_identity(identity: &NodeIdentity) -> Self {
        Self {
            node_id: identity.node_id(),
            private_key: *identity.secret().to_bytes(),
            public_key: identity.public_key().to_bytes(),
            registered: false,
            stake_status: default_stake_status(),
        }
    }

    /// Rebuild the signing identity, checking the stored public key.
    pub fn identity(&self) -> Result<NodeIdentity, IdentityStoreError> {
        let identity = NodeIdentity::from_parts(self.node_id, &self.private_key)
            .map_err(|e| IdentityStoreError::Corrupt(e.to_string()))?;
        if identity.public_key().to_bytes() != self.public_key {
            return Err(IdentityStoreError::Corrupt(
                "public key does not match private key".into(),
            ));
        }
        Ok(identity)
    }
}

impl Drop for NodeState {
    fn drop(&mut self) {
        self.private_key.zeroize();
    }
}

impl fmt::Debug for NodeState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NodeState")
            .field("node_id", &self.node_id)
            .field("private_key", &"<redacted>")
            .field("registered", &self.registered)
            .field("stake_status", &self.stake_status)
            .finish()
    }
}

/// File-backed store for [`NodeState`].
#[derive(Debug, Clone)]
pub struct IdentityStore {
    path: PathBuf,
}

impl IdentityStore {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the state file; `None` when it does not exist.
    pub fn load(&self) -> Result<Option<NodeState>, IdentityStoreError> {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(self.io_error(e)),
        };
        serde_json::from_slice(&bytes)
            .map(Some)
            .map_err(|e| IdentityStoreError::Corrupt(e.to_string()))
    }

    /// Load the stored identity, or generate and persist a new one.
    pub fn load_or_create(&self) -> Result<(NodeIdentity, NodeState), IdentityStoreError> {
        if let Some(state) = self.load()? {
            let identity = state.identity()?;
            info!(
                node_id = %identity.node_id().short(),
                registered = state.registered,
                "Loaded node identity"
            );
            return Ok((identity, state));
        }

        let identity = NodeIdentity::generate();
        let state = NodeState::from_identity(&identity);
        self.save(&state)?;
        info!(
            node_id = %identity.node_id().short(),
            path = %self.path.display(),
            "Generated new node identity"
        );
        Ok((identity, state))
    }

    /// Atomically replace the state file.
    pub fn save(&self, state: &NodeState) -> Result<(), IdentityStoreError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|e| self.io_error(e))?;
            }
        }

        let mut bytes = serde_json::to_vec_pretty(state)
            .map_err(|e| IdentityStoreError::Corrupt(e.to_string()))?;

        let temp_path = self.path.with_extension("tmp");
        let result = write_and_sync(&temp_path, &bytes);
        bytes.zeroize();
        result.map_err(|e| self.io_error(e))?;

        fs::rename(&temp_path, &self.path).map_err(|e| self.io_error(e))
    }

    /// Record the on-chain registration flag.
    pub fn set_registered(&self, registered: bool) -> Result<NodeState, IdentityStoreError> {
        self.update(|state| state.registered = registered)
    }

    /// Record the staking collaborator's status string.
    pub fn set_stake_status(&self, status: &str) -> Result<NodeState, IdentityStoreError> {
        self.update(|state| state.stake_status = status.to_string())
    }

    /// Delete the identity. Refused while the node is registered on-chain.
    pub fn delete(&self) -> Result<(), IdentityStoreError> {
        let Some(state) = self.load()? else {
            return Ok(());
        };
        if state.registered {
            warn!(
                node_id = %state.node_id.short(),
                "Refusing to delete identity of a registered node"
            );
            return Err(IdentityStoreError::RegisteredOnChain(state.node_id));
        }
        match fs::remove_file(&self.path) {
            Ok(()) => {
                info!(node_id = %state.node_id.short(), "Deleted node identity");
                Ok(())
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(self.io_error(e)),
        }
    }

    fn update(
        &self,
        apply: impl FnOnce(&mut NodeState),
    ) -> Result<NodeState, IdentityStoreError> {
        let mut state = self.load()?.ok_or_else(|| {
            self.io_error(io::Error::new(io::ErrorKind::NotFound, "no identity stored"))
        })?;
        apply(&mut state);
        self.save(&state)?;
        Ok(state)
    }

    fn io_error(&self, source: io::Error) -> IdentityStoreError {
        IdentityStoreError::Io {
            path: self.path.clone(),
            source,
        }
    }
}

fn write_and_sync(path: &Path, bytes: &[u8]) -> io::Result<()> {
    let mut file = fs::File::create(path)?;
    file.write_all(bytes)?;
    file.sync_all()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_load_missing_file_is_none() {
        let dir = tempdir().unwrap();
        let store = IdentityStore::new(dir.path().join("state.json"));
        assert!(store.load().unwrap().is_none());
    }

    #[test]
    fn test_load_or_create_persists_and_reloads() {
        let dir = tempdir().unwrap();
        let store = IdentityStore::new(dir.path().join("nested/state.json"));

        let (created, state) = store.load_or_create().unwrap();
        assert!(!state.registered);
        assert_eq!(state.stake_status, "none");

        let (reloaded, _) = store.load_or_create().unwrap();
        assert_eq!(reloaded.node_id(), created.node_id());
        assert_eq!(reloaded.public_key(), created.public_key());
        assert!(!dir.path().join("nested/state.tmp").exists());
    }

    #[test]
    fn test_file_uses_camel_case_hex_fields() {
        let dir = tempdir().unwrap();
        let store = IdentityStore::new(dir.path().join("state.json"));
        let (identity, _) = store.load_or_create().unwrap();

        let json: serde_json::Value =
            serde_json::from_slice(&fs::read(store.path()).unwrap()).unwrap();
        assert_eq!(json["nodeId"], identity.node_id().to_hex());
        assert_eq!(json["privateKey"].as_str().unwrap().len(), 2 + 2 * SECRET_KEY_LEN);
        assert_eq!(json["publicKey"].as_str().unwrap().len(), 2 + 2 * PUBLIC_KEY_LEN);
        assert_eq!(json["registered"], false);
        assert_eq!(json["stakeStatus"], "none");
    }

    #[test]
    fn test_delete_refused_while_registered() {
        let dir = tempdir().unwrap();
        let store = IdentityStore::new(dir.path().join("state.json"));
        let (identity, _) = store.load_or_create().unwrap();

        store.set_registered(true).unwrap();
        let err = store.delete().unwrap_err();
        assert!(matches!(err, IdentityStoreError::RegisteredOnChain(id) if id == identity.node_id()));
        assert!(store.path().exists());

        store.set_registered(false).unwrap();
        store.delete().unwrap();
        assert!(!store.path().exists());
    }

    #[test]
    fn test_stake_status_is_passthrough() {
        let dir = tempdir().unwrap();
        let store = IdentityStore::new(dir.path().join("state.json"));
        store.load_or_create().unwrap();

        store.set_stake_status("pending").unwrap();
        assert_eq!(store.load().unwrap().unwrap().stake_status, "pending");
    }

    #[test]
    fn test_mismatched_public_key_is_corrupt() {
        let dir = tempdir().unwrap();
        let store = IdentityStore::new(dir.path().join("state.json"));
        let (_, mut state) = store.load_or_create().unwrap();

        state.public_key = NodeIdentity::generate().public_key().to_bytes();
        store.save(&state).unwrap();
        assert!(matches!(
            store.load_or_create(),
            Err(IdentityStoreError::Corrupt(_))
        ));
    }

    #[test]
    fn test_garbage_file_is_corrupt() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("state.json");
        fs::write(&path, b"{not json").unwrap();
        assert!(matches!(
            IdentityStore::new(path).load(),
            Err(IdentityStoreError::Corrupt(_))
        ));
    }

    #[test]
    fn test_debug_redacts_private_key() {
        let state = NodeState::from_identity(&NodeIdentity::generate());
        let rendered = format!("{state:?}");
        assert!(rendered.contains("<redacted>"));
        assert!(!rendered.contains(&shared_types::encode_hex(&state.private_key)));
    }
}
