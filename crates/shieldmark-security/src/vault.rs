// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Encrypted vault — lockdown-gated blob storage with AES-256-GCM at rest.
//
// Every operation checks the lockdown mode before doing any I/O, so the
// vault stays the last line of defense during a panic event even if calling
// code forgets to check state first. The symmetric key lives only in the
// secret store; a sealed blob is nonce ‖ ciphertext ‖ tag in a per-item
// file, with the plain index kept in vault_index.json.

use std::path::PathBuf;
use std::sync::Arc;

use chrono::Utc;
use ring::aead::{AES_256_GCM, Aad, LessSafeKey, NONCE_LEN, Nonce, UnboundKey};
use ring::rand::{SecureRandom, SystemRandom};
use tokio::sync::Mutex;
use tracing::{debug, instrument};

use shieldmark_bridge::SecretStore;
use shieldmark_core::error::{Result, ShieldmarkError};
use shieldmark_core::types::{LockdownMode, VaultItem, VaultItemId, VaultItemKind};

use crate::lockdown::LockdownController;
use crate::storage;

/// Secret-store key for the vault symmetric key.
const VAULT_KEY_SECRET_KEY: &str = "vault.symmetric_key";
/// AES-256 key length in bytes.
const VAULT_KEY_LEN: usize = 32;

/// Encrypted local vault gated by lockdown state.
pub struct Vault {
    secrets: Arc<dyn SecretStore>,
    lockdown: Arc<LockdownController>,
    index_path: PathBuf,
    blobs_dir: PathBuf,
    index: Mutex<Vec<VaultItem>>,
}

impl Vault {
    /// Open (or create) the vault under `dir`.
    ///
    /// Creates the blob directory and the symmetric key eagerly so that the
    /// first write cannot fail on key creation alone.
    #[instrument(skip_all, fields(dir = %dir.as_ref().display()))]
    pub async fn open(
        secrets: Arc<dyn SecretStore>,
        lockdown: Arc<LockdownController>,
        dir: impl AsRef<std::path::Path>,
    ) -> Result<Self> {
        let dir = dir.as_ref();
        let index_path = dir.join("vault_index.json");
        let blobs_dir = dir.join("vault_blobs");
        tokio::fs::create_dir_all(&blobs_dir).await?;

        let index: Vec<VaultItem> = storage::load_json(&index_path).await?.unwrap_or_default();
        let item_count = index.len();

        let vault = Self {
            secrets,
            lockdown,
            index_path,
            blobs_dir,
            index: Mutex::new(index),
        };
        vault.load_or_create_key()?;

        debug!(items = item_count, "vault opened");
        Ok(vault)
    }

    /// Snapshot of vault items, most recently updated first.
    pub async fn list_items(&self) -> Result<Vec<VaultItem>> {
        self.ensure_unlocked().await?;

        let index = self.index.lock().await;
        let mut items: Vec<VaultItem> = index.clone();
        items.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        Ok(items)
    }

    /// Encrypt `data` and store it as a new vault item.
    #[instrument(skip(self, data, title), fields(data_len = data.len(), ?kind))]
    pub async fn put_blob(
        &self,
        data: &[u8],
        title: &str,
        kind: VaultItemKind,
    ) -> Result<VaultItem> {
        self.ensure_unlocked().await?;

        let now = Utc::now();
        let mut item = VaultItem {
            id: VaultItemId::new(),
            kind,
            title: title.to_owned(),
            created_at: now,
            updated_at: now,
            reference: None,
        };

        let sealed = self.seal(data)?;
        let blob_path = self.blob_path(item.id);
        storage::write_atomic(&blob_path, &sealed).await?;
        item.reference = blob_path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned());

        let mut index = self.index.lock().await;
        index.push(item.clone());
        storage::save_json_atomic(&self.index_path, &*index).await?;

        Ok(item)
    }

    /// Load and decrypt the blob for `id`.
    #[instrument(skip(self))]
    pub async fn get_blob(&self, id: VaultItemId) -> Result<Vec<u8>> {
        self.ensure_unlocked().await?;

        let index = self.index.lock().await;
        let item = index
            .iter()
            .find(|item| item.id == id)
            .ok_or(ShieldmarkError::ItemNotFound(id))?;
        let blob_path = self.blob_path(item.id);
        drop(index);

        let sealed = tokio::fs::read(&blob_path).await?;
        self.open_sealed(&sealed)
    }

    async fn ensure_unlocked(&self) -> Result<()> {
        let state = self.lockdown.state().await;
        if state.mode != LockdownMode::Unlocked {
            return Err(ShieldmarkError::VaultLocked);
        }
        Ok(())
    }

    fn blob_path(&self, id: VaultItemId) -> PathBuf {
        self.blobs_dir.join(format!("{id}.bin"))
    }

    // -----------------------------------------------------------------------
    // Crypto
    // -----------------------------------------------------------------------

    /// Fetch the vault key from the secret store, generating it on first
    /// use. The key is created once and reused for every item.
    fn load_or_create_key(&self) -> Result<Vec<u8>> {
        if let Some(existing) = self.secrets.load_secret(VAULT_KEY_SECRET_KEY)? {
            return Ok(existing);
        }

        let rng = SystemRandom::new();
        let mut key = vec![0u8; VAULT_KEY_LEN];
        rng.fill(&mut key)
            .map_err(|_| ShieldmarkError::KeyGeneration("vault key generation failed".into()))?;
        self.secrets.store_secret(VAULT_KEY_SECRET_KEY, &key)?;

        debug!("vault symmetric key generated");
        Ok(key)
    }

    fn cipher(&self) -> Result<LessSafeKey> {
        let key = self.load_or_create_key()?;
        let unbound = UnboundKey::new(&AES_256_GCM, &key)
            .map_err(|_| ShieldmarkError::Encryption("vault key rejected".into()))?;
        Ok(LessSafeKey::new(unbound))
    }

    /// Seal `plaintext` into nonce ‖ ciphertext ‖ tag with a fresh random
    /// nonce.
    fn seal(&self, plaintext: &[u8]) -> Result<Vec<u8>> {
        let cipher = self.cipher()?;

        let rng = SystemRandom::new();
        let mut nonce_bytes = [0u8; NONCE_LEN];
        rng.fill(&mut nonce_bytes)
            .map_err(|_| ShieldmarkError::Encryption("nonce generation failed".into()))?;

        let mut in_out = plaintext.to_vec();
        cipher
            .seal_in_place_append_tag(
                Nonce::assume_unique_for_key(nonce_bytes),
                Aad::empty(),
                &mut in_out,
            )
            .map_err(|_| ShieldmarkError::Encryption("seal failed".into()))?;

        let mut sealed = Vec::with_capacity(NONCE_LEN + in_out.len());
        sealed.extend_from_slice(&nonce_bytes);
        sealed.extend_from_slice(&in_out);
        Ok(sealed)
    }

    /// Open a sealed blob. Any parse or authentication failure is
    /// `CorruptCiphertext` — decryption fails closed.
    fn open_sealed(&self, sealed: &[u8]) -> Result<Vec<u8>> {
        if sealed.len() < NONCE_LEN + AES_256_GCM.tag_len() {
            return Err(ShieldmarkError::CorruptCiphertext);
        }

        let cipher = self.cipher()?;
        let (nonce_bytes, ciphertext) = sealed.split_at(NONCE_LEN);
        let nonce = Nonce::try_assume_unique_for_key(nonce_bytes)
            .map_err(|_| ShieldmarkError::CorruptCiphertext)?;

        let mut in_out = ciphertext.to_vec();
        let plaintext = cipher
            .open_in_place(nonce, Aad::empty(), &mut in_out)
            .map_err(|_| ShieldmarkError::CorruptCiphertext)?;
        Ok(plaintext.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shieldmark_bridge::MemorySecretStore;

    use crate::audit::IncidentLog;

    struct Fixture {
        secrets: Arc<MemorySecretStore>,
        lockdown: Arc<LockdownController>,
        vault: Vault,
        _dir: tempfile::TempDir,
    }

    async fn make_vault() -> Fixture {
        let dir = tempfile::tempdir().expect("tempdir");
        let secrets = Arc::new(MemorySecretStore::new());
        let incidents = Arc::new(
            IncidentLog::open(dir.path().join("incidents.json"))
                .await
                .expect("open incident log"),
        );
        let lockdown = Arc::new(
            LockdownController::open(secrets.clone(), incidents).expect("open lockdown"),
        );
        let vault = Vault::open(secrets.clone(), lockdown.clone(), dir.path())
            .await
            .expect("open vault");
        Fixture {
            secrets,
            lockdown,
            vault,
            _dir: dir,
        }
    }

    #[tokio::test]
    async fn round_trip() {
        let fx = make_vault().await;
        let plaintext = b"sensitive evidence bytes";

        let item = fx
            .vault
            .put_blob(plaintext, "evidence", VaultItemKind::Blob)
            .await
            .unwrap();
        assert!(item.reference.is_some());

        let decrypted = fx.vault.get_blob(item.id).await.unwrap();
        assert_eq!(decrypted, plaintext);
    }

    #[tokio::test]
    async fn empty_blob_round_trip() {
        let fx = make_vault().await;
        let item = fx.vault.put_blob(b"", "empty", VaultItemKind::Note).await.unwrap();
        assert!(fx.vault.get_blob(item.id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn key_is_created_once_and_reused() {
        let fx = make_vault().await;
        let key_after_open = fx.secrets.load_secret(VAULT_KEY_SECRET_KEY).unwrap();
        assert_eq!(key_after_open.as_ref().map(Vec::len), Some(VAULT_KEY_LEN));

        fx.vault.put_blob(b"one", "a", VaultItemKind::Blob).await.unwrap();
        fx.vault.put_blob(b"two", "b", VaultItemKind::Blob).await.unwrap();

        let key_after_writes = fx.secrets.load_secret(VAULT_KEY_SECRET_KEY).unwrap();
        assert_eq!(key_after_open, key_after_writes);
    }

    #[tokio::test]
    async fn locked_vault_denies_all_operations() {
        let fx = make_vault().await;
        let stored = fx
            .vault
            .put_blob(b"before lockdown", "kept", VaultItemKind::Blob)
            .await
            .unwrap();

        fx.lockdown.engage_panic("panic").await.unwrap();

        assert!(matches!(
            fx.vault.list_items().await,
            Err(ShieldmarkError::VaultLocked)
        ));
        assert!(matches!(
            fx.vault.get_blob(stored.id).await,
            Err(ShieldmarkError::VaultLocked)
        ));
        assert!(matches!(
            fx.vault.put_blob(b"denied", "no", VaultItemKind::Blob).await,
            Err(ShieldmarkError::VaultLocked)
        ));
    }

    #[tokio::test]
    async fn denied_write_leaves_no_trace() {
        let fx = make_vault().await;
        fx.lockdown.engage_panic("panic").await.unwrap();

        let result = fx.vault.put_blob(b"denied", "no", VaultItemKind::Blob).await;
        assert!(result.is_err());

        // No index entry and no ciphertext file was created.
        assert!(fx.vault.index.lock().await.is_empty());
        let mut entries = tokio::fs::read_dir(&fx.vault.blobs_dir).await.unwrap();
        assert!(entries.next_entry().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn access_recovers_after_successful_unlock() {
        let fx = make_vault().await;
        fx.lockdown.engage_panic("panic").await.unwrap();

        fx.lockdown.begin_unlock_attempt().await.unwrap();
        fx.lockdown.complete_unlock(false).await.unwrap();
        assert!(fx.vault.list_items().await.is_err());

        fx.lockdown.begin_unlock_attempt().await.unwrap();
        fx.lockdown.complete_unlock(true).await.unwrap();

        let item = fx
            .vault
            .put_blob(b"after recovery", "ok", VaultItemKind::Blob)
            .await
            .unwrap();
        assert_eq!(fx.vault.get_blob(item.id).await.unwrap(), b"after recovery");
    }

    #[tokio::test]
    async fn missing_item_is_not_found() {
        let fx = make_vault().await;
        let missing = VaultItemId::new();

        assert!(matches!(
            fx.vault.get_blob(missing).await,
            Err(ShieldmarkError::ItemNotFound(id)) if id == missing
        ));
    }

    #[tokio::test]
    async fn tampered_ciphertext_fails_closed() {
        let fx = make_vault().await;
        let item = fx
            .vault
            .put_blob(b"integrity matters", "t", VaultItemKind::Blob)
            .await
            .unwrap();

        // Flip one ciphertext byte on disk.
        let path = fx.vault.blob_path(item.id);
        let mut sealed = tokio::fs::read(&path).await.unwrap();
        let last = sealed.len() - 1;
        sealed[last] ^= 0x01;
        tokio::fs::write(&path, &sealed).await.unwrap();

        assert!(matches!(
            fx.vault.get_blob(item.id).await,
            Err(ShieldmarkError::CorruptCiphertext)
        ));
    }

    #[tokio::test]
    async fn truncated_ciphertext_fails_closed() {
        let fx = make_vault().await;
        let item = fx
            .vault
            .put_blob(b"short me", "t", VaultItemKind::Blob)
            .await
            .unwrap();

        let path = fx.vault.blob_path(item.id);
        tokio::fs::write(&path, b"too short").await.unwrap();

        assert!(matches!(
            fx.vault.get_blob(item.id).await,
            Err(ShieldmarkError::CorruptCiphertext)
        ));
    }

    #[tokio::test]
    async fn list_is_most_recently_updated_first() {
        let fx = make_vault().await;
        fx.vault.put_blob(b"1", "first", VaultItemKind::Blob).await.unwrap();
        fx.vault.put_blob(b"2", "second", VaultItemKind::Blob).await.unwrap();

        let items = fx.vault.list_items().await.unwrap();
        assert_eq!(items.len(), 2);
        assert!(items[0].updated_at >= items[1].updated_at);
    }

    #[tokio::test]
    async fn items_survive_reopen_with_same_secret_store() {
        let dir = tempfile::tempdir().expect("tempdir");
        let secrets = Arc::new(MemorySecretStore::new());
        let incidents = Arc::new(
            IncidentLog::open(dir.path().join("incidents.json"))
                .await
                .unwrap(),
        );
        let lockdown =
            Arc::new(LockdownController::open(secrets.clone(), incidents).unwrap());

        let item = {
            let vault = Vault::open(secrets.clone(), lockdown.clone(), dir.path())
                .await
                .unwrap();
            vault
                .put_blob(b"durable secret", "kept", VaultItemKind::Blob)
                .await
                .unwrap()
        };

        let reopened = Vault::open(secrets, lockdown, dir.path()).await.unwrap();
        assert_eq!(reopened.get_blob(item.id).await.unwrap(), b"durable secret");
    }

    /// The end-to-end panic scenario: engage panic, expect denied writes,
    /// fail one re-auth, pass the next, then write and read normally.
    #[tokio::test]
    async fn panic_lockdown_scenario() {
        let fx = make_vault().await;

        fx.lockdown.engage_panic("user engaged panic button").await.unwrap();
        assert!(matches!(
            fx.vault.put_blob(b"blocked", "x", VaultItemKind::Blob).await,
            Err(ShieldmarkError::VaultLocked)
        ));

        fx.lockdown.begin_unlock_attempt().await.unwrap();
        fx.lockdown.complete_unlock(false).await.unwrap();
        assert_eq!(fx.lockdown.state().await.mode, LockdownMode::Locked);

        fx.lockdown.begin_unlock_attempt().await.unwrap();
        fx.lockdown.complete_unlock(true).await.unwrap();
        let state = fx.lockdown.state().await;
        assert_eq!(state.mode, LockdownMode::Unlocked);
        assert!(state.last_unlock_at.is_some());

        let item = fx
            .vault
            .put_blob(b"postcrisis", "recovered", VaultItemKind::Blob)
            .await
            .unwrap();
        assert_eq!(fx.vault.get_blob(item.id).await.unwrap(), b"postcrisis");
    }
}
