//! # Filesystem Keystore
//!
//! Ed25519 keys live under a root directory, one subdirectory per key id:
//!
//! ```text
//! <root>/keys.index.json          keyId -> {dir, alg, spkiSha256, createdAt}
//! <root>/<keyId>/private.pem      PKCS#8 PEM, mode 0600 on Unix (absent for imported keys)
//! <root>/<keyId>/public.pem       SPKI PEM
//! <root>/<keyId>/key.json         {keyId, algo, spkiSha256, createdAt}
//! ```
//!
//! The key id is the lowercase unpadded base32 of SHA-256 over the SPKI DER
//! encoding of the public key, truncated to the configured length. Equal
//! public keys always land in the same directory.
//!
//! Lookups return `Ok(None)` for ids that do not resolve. Errors are
//! reserved for filesystem and format failures.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use zkpip_core::digest::hex_encode;
use zkpip_core::Timestamp;

use crate::base32;
use crate::ed25519::{Ed25519KeyPair, Ed25519PublicKey};
use crate::error::KeystoreError;

/// Key id length used when none is configured.
pub const DEFAULT_KEY_ID_LENGTH: usize = 16;
/// Shortest accepted key id.
pub const MIN_KEY_ID_LENGTH: usize = 8;
/// Full base32 length of a SHA-256 digest.
pub const MAX_KEY_ID_LENGTH: usize = 52;

const INDEX_FILE: &str = "keys.index.json";
const PRIVATE_PEM: &str = "private.pem";
const PUBLIC_PEM: &str = "public.pem";
const KEY_META: &str = "key.json";

/// Supported key algorithms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KeyAlgorithm {
    Ed25519,
}

impl KeyAlgorithm {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ed25519 => "ed25519",
        }
    }
}

impl std::fmt::Display for KeyAlgorithm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A key as seen through the keystore. Public-only records have no
/// private PEM path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KeyRecord {
    pub key_id: String,
    pub algo: KeyAlgorithm,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub private_pem_path: Option<PathBuf>,
    pub public_pem_path: PathBuf,
    /// Lowercase hex SHA-256 of the SPKI DER.
    pub spki_sha256: String,
    pub created_at: Timestamp,
}

/// Contents of `<keyId>/key.json`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct KeyMeta {
    key_id: String,
    algo: KeyAlgorithm,
    spki_sha256: String,
    created_at: Timestamp,
}

/// One entry of `keys.index.json`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexEntry {
    /// Directory name relative to the keystore root.
    pub dir: String,
    pub alg: KeyAlgorithm,
    pub spki_sha256: String,
    pub created_at: Timestamp,
}

type KeyIndex = BTreeMap<String, IndexEntry>;

/// Validate a configured key id length.
pub fn check_key_id_length(length: usize) -> Result<usize, KeystoreError> {
    if (MIN_KEY_ID_LENGTH..=MAX_KEY_ID_LENGTH).contains(&length) {
        Ok(length)
    } else {
        Err(KeystoreError::InvalidKeyIdLength(length))
    }
}

/// Derive the key id of a public key.
pub fn key_id_for(public: &Ed25519PublicKey, length: usize) -> Result<String, KeystoreError> {
    let length = check_key_id_length(length)?;
    let mut id = base32::encode(&public.spki_sha256()?);
    id.truncate(length);
    Ok(id)
}

/// Key ids are base32, so anything else cannot name a key directory.
fn is_plausible_key_id(key_id: &str) -> bool {
    !key_id.is_empty()
        && key_id
            .bytes()
            .all(|b| b.is_ascii_lowercase() || (b'2'..=b'7').contains(&b))
}

/// A filesystem keystore rooted at one directory.
#[derive(Debug, Clone)]
pub struct Keystore {
    root: PathBuf,
    key_id_length: usize,
}

impl Keystore {
    /// A keystore using the default key id length. The directory is created
    /// on first write.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            key_id_length: DEFAULT_KEY_ID_LENGTH,
        }
    }

    /// A keystore with an explicit key id length.
    pub fn with_key_id_length(
        root: impl Into<PathBuf>,
        length: usize,
    ) -> Result<Self, KeystoreError> {
        Ok(Self {
            root: root.into(),
            key_id_length: check_key_id_length(length)?,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn key_id_length(&self) -> usize {
        self.key_id_length
    }

    /// Generate a fresh keypair and persist it.
    pub fn generate(&self, algorithm: KeyAlgorithm) -> Result<KeyRecord, KeystoreError> {
        match algorithm {
            KeyAlgorithm::Ed25519 => self.store_keypair(&Ed25519KeyPair::generate()),
        }
    }

    /// Persist an existing keypair. Storing the same key twice rewrites its
    /// files and keeps a single index entry.
    pub fn store_keypair(&self, keypair: &Ed25519KeyPair) -> Result<KeyRecord, KeystoreError> {
        let public = keypair.public_key();
        let (key_id, dir) = self.prepare_dir(&public)?;

        let private_path = dir.join(PRIVATE_PEM);
        let pem = keypair.to_pkcs8_pem()?;
        write_private(&private_path, pem.as_bytes())?;

        let mut record = self.write_public_parts(&key_id, &dir, &public)?;
        record.private_pem_path = Some(private_path);
        tracing::debug!(key_id = %record.key_id, "stored keypair");
        Ok(record)
    }

    /// Import a public key from SPKI PEM as a public-only record.
    pub fn import_public(&self, pem: &str) -> Result<KeyRecord, KeystoreError> {
        let public = Ed25519PublicKey::from_pem(pem)?;
        let (key_id, dir) = self.prepare_dir(&public)?;
        let mut record = self.write_public_parts(&key_id, &dir, &public)?;
        let private_path = dir.join(PRIVATE_PEM);
        if private_path.is_file() {
            record.private_pem_path = Some(private_path);
        }
        tracing::debug!(key_id = %record.key_id, "imported public key");
        Ok(record)
    }

    /// Path of the private PEM for a key id or unambiguous prefix.
    pub fn resolve_private(&self, key_id: &str) -> Result<Option<PathBuf>, KeystoreError> {
        Ok(self
            .resolve_dir(key_id)?
            .map(|dir| dir.join(PRIVATE_PEM))
            .filter(|p| p.is_file()))
    }

    /// Path of the public PEM for a key id or unambiguous prefix.
    pub fn resolve_public(&self, key_id: &str) -> Result<Option<PathBuf>, KeystoreError> {
        Ok(self
            .resolve_dir(key_id)?
            .map(|dir| dir.join(PUBLIC_PEM))
            .filter(|p| p.is_file()))
    }

    /// Load the signing keypair for a key id.
    pub fn load_keypair(&self, key_id: &str) -> Result<Option<Ed25519KeyPair>, KeystoreError> {
        let Some(path) = self.resolve_private(key_id)? else {
            return Ok(None);
        };
        let pem = zeroize::Zeroizing::new(
            fs::read_to_string(&path).map_err(KeystoreError::io(&path))?,
        );
        Ok(Some(Ed25519KeyPair::from_pkcs8_pem(&pem)?))
    }

    /// Load the public key for a key id.
    pub fn load_public(&self, key_id: &str) -> Result<Option<Ed25519PublicKey>, KeystoreError> {
        let Some(path) = self.resolve_public(key_id)? else {
            return Ok(None);
        };
        let pem = fs::read_to_string(&path).map_err(KeystoreError::io(&path))?;
        Ok(Some(Ed25519PublicKey::from_pem(&pem)?))
    }

    /// The record for a key id, if it resolves.
    pub fn get(&self, key_id: &str) -> Result<Option<KeyRecord>, KeystoreError> {
        match self.resolve_dir(key_id)? {
            Some(dir) => self.read_record(&dir).map(Some),
            None => Ok(None),
        }
    }

    /// Every key on disk, ordered by key id.
    pub fn list(&self) -> Result<Vec<KeyRecord>, KeystoreError> {
        let mut records = Vec::new();
        for dir in self.key_dirs()? {
            if dir.join(KEY_META).is_file() {
                records.push(self.read_record(&dir)?);
            }
        }
        records.sort_by(|a, b| a.key_id.cmp(&b.key_id));
        Ok(records)
    }

    // -----------------------------------------------------------------------
    // Internals
    // -----------------------------------------------------------------------

    fn prepare_dir(&self, public: &Ed25519PublicKey) -> Result<(String, PathBuf), KeystoreError> {
        let key_id = key_id_for(public, self.key_id_length)?;
        let dir = self.root.join(&key_id);
        fs::create_dir_all(&dir).map_err(KeystoreError::io(&dir))?;
        Ok((key_id, dir))
    }

    fn write_public_parts(
        &self,
        key_id: &str,
        dir: &Path,
        public: &Ed25519PublicKey,
    ) -> Result<KeyRecord, KeystoreError> {
        let public_path = dir.join(PUBLIC_PEM);
        let pem = public.to_pem()?;
        fs::write(&public_path, pem).map_err(KeystoreError::io(&public_path))?;

        let meta_path = dir.join(KEY_META);
        let spki_sha256 = hex_encode(&public.spki_sha256()?);
        // A re-stored key keeps the creation time it was first stored with.
        let created_at = read_meta(&meta_path)
            .filter(|existing| existing.spki_sha256 == spki_sha256)
            .map_or_else(Timestamp::now, |existing| existing.created_at);
        let meta = KeyMeta {
            key_id: key_id.to_string(),
            algo: KeyAlgorithm::Ed25519,
            spki_sha256,
            created_at,
        };
        write_json(&meta_path, &meta)?;

        let mut index = self.read_index()?.unwrap_or_default();
        index.insert(
            key_id.to_string(),
            IndexEntry {
                dir: key_id.to_string(),
                alg: meta.algo,
                spki_sha256: meta.spki_sha256.clone(),
                created_at: meta.created_at,
            },
        );
        write_json(&self.root.join(INDEX_FILE), &index)?;

        Ok(KeyRecord {
            key_id: meta.key_id,
            algo: meta.algo,
            private_pem_path: None,
            public_pem_path: public_path,
            spki_sha256: meta.spki_sha256,
            created_at: meta.created_at,
        })
    }

    fn read_record(&self, dir: &Path) -> Result<KeyRecord, KeystoreError> {
        let meta_path = dir.join(KEY_META);
        let text = fs::read_to_string(&meta_path).map_err(KeystoreError::io(&meta_path))?;
        let meta: KeyMeta =
            serde_json::from_str(&text).map_err(|e| KeystoreError::IndexCorrupt {
                path: meta_path.clone(),
                reason: e.to_string(),
            })?;
        let private_path = dir.join(PRIVATE_PEM);
        Ok(KeyRecord {
            key_id: meta.key_id,
            algo: meta.algo,
            private_pem_path: private_path.is_file().then_some(private_path),
            public_pem_path: dir.join(PUBLIC_PEM),
            spki_sha256: meta.spki_sha256,
            created_at: meta.created_at,
        })
    }

    fn read_index(&self) -> Result<Option<KeyIndex>, KeystoreError> {
        let path = self.root.join(INDEX_FILE);
        let text = match fs::read_to_string(&path) {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(KeystoreError::Io { path, source: e }),
        };
        serde_json::from_str(&text)
            .map(Some)
            .map_err(|e| KeystoreError::IndexCorrupt {
                path,
                reason: e.to_string(),
            })
    }

    fn key_dirs(&self) -> Result<Vec<PathBuf>, KeystoreError> {
        let entries = match fs::read_dir(&self.root) {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => {
                return Err(KeystoreError::Io {
                    path: self.root.clone(),
                    source: e,
                })
            }
        };
        let mut dirs = Vec::new();
        for entry in entries {
            let entry = entry.map_err(KeystoreError::io(&self.root))?;
            let path = entry.path();
            if path.is_dir() {
                dirs.push(path);
            }
        }
        dirs.sort();
        Ok(dirs)
    }

    /// Exact match through the index first, then a prefix scan over key
    /// directories holding a `public.pem`.
    fn resolve_dir(&self, key_id: &str) -> Result<Option<PathBuf>, KeystoreError> {
        if !is_plausible_key_id(key_id) {
            return Ok(None);
        }
        if let Some(index) = self.read_index()? {
            if let Some(entry) = index.get(key_id) {
                let dir = self.root.join(&entry.dir);
                if dir.is_dir() {
                    return Ok(Some(dir));
                }
                tracing::warn!(key_id, dir = %dir.display(), "index entry points at a missing directory");
            }
        }

        let matches: Vec<PathBuf> = self
            .key_dirs()?
            .into_iter()
            .filter(|dir| {
                dir.file_name()
                    .and_then(|n| n.to_str())
                    .is_some_and(|name| name.starts_with(key_id))
                    && dir.join(PUBLIC_PEM).is_file()
            })
            .collect();
        match matches.len() {
            0 => Ok(None),
            1 => Ok(matches.into_iter().next()),
            n => {
                tracing::warn!(key_id, candidates = n, "ambiguous key id prefix");
                Ok(None)
            }
        }
    }
}

fn write_json(path: &Path, value: &impl Serialize) -> Result<(), KeystoreError> {
    let mut text = serde_json::to_string_pretty(value).map_err(|e| KeystoreError::IndexCorrupt {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;
    text.push('\n');
    fs::write(path, text).map_err(KeystoreError::io(path))
}

#[cfg(unix)]
fn write_private(path: &Path, bytes: &[u8]) -> Result<(), KeystoreError> {
    use std::io::Write;
    use std::os::unix::fs::{OpenOptionsExt, PermissionsExt};

    let mut file = fs::OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .mode(0o600)
        .open(path)
        .map_err(KeystoreError::io(path))?;
    // `mode` only applies on creation.
    file.set_permissions(fs::Permissions::from_mode(0o600))
        .map_err(KeystoreError::io(path))?;
    file.write_all(bytes).map_err(KeystoreError::io(path))
}

#[cfg(not(unix))]
fn write_private(path: &Path, bytes: &[u8]) -> Result<(), KeystoreError> {
    fs::write(path, bytes).map_err(KeystoreError::io(path))
}

/// `key.json` at `path`, if it exists and parses.
fn read_meta(path: &Path) -> Option<KeyMeta> {
    let text = fs::read_to_string(path).ok()?;
    serde_json::from_str(&text).ok()
}
