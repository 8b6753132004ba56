//! In-memory Image Registry
//!
//! Holds decoded images keyed by an opaque id for the life of the process:
//! - Records are write-once; pixels and dimensions never change after insert
//! - Ids are `<fingerprint prefix>-<sequence>` and never reused
//! - There is no deletion and no persistence
//!
//! Deployment caveat: memory grows with every registration until the process
//! exits. Front ends that accept untrusted uploads should cap upload size and
//! restart (or shard) workers periodically.

use chrono::{DateTime, Utc};
use image::{ImageFormat, RgbImage};
use serde::Serialize;
use sha2::{Digest, Sha256};
use std::borrow::Borrow;
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, PoisonError, RwLock};
use crate::decoder::{self, DecodedImage};
use crate::error::{Result, PickerError};
use crate::settings::PickerSettings;

// ============================================================================
// RECORD TYPES
// ============================================================================

/// Opaque registry key handed back to callers.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct ImageId(String);

impl ImageId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for ImageId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ImageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A registered image. Immutable once constructed.
#[derive(Debug)]
pub struct ImageRecord {
    id: ImageId,
    pixels: RgbImage,
    /// SHA-256 of the encoded upload
    fingerprint: String,
    created_at: DateTime<Utc>,
}

impl ImageRecord {
    pub fn id(&self) -> &ImageId {
        &self.id
    }

    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    /// Row-major RGB buffer.
    pub fn pixels(&self) -> &RgbImage {
        &self.pixels
    }

    pub fn fingerprint(&self) -> &str {
        &self.fingerprint
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

/// What `register_image` reports back to the caller.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RegisteredImage {
    pub id: ImageId,
    pub width: u32,
    pub height: u32,
}

// ============================================================================
// REGISTRY
// ============================================================================

#[derive(Debug, Default)]
struct Entries {
    records: HashMap<ImageId, Arc<ImageRecord>>,
    next_seq: u64,
}

/// Process-lifetime image store. Share it by reference (or `Arc`) between requests.
#[derive(Debug, Default)]
pub struct ImageRegistry {
    settings: PickerSettings,
    entries: RwLock<Entries>,
}

impl ImageRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_settings(settings: PickerSettings) -> Self {
        Self {
            settings,
            entries: RwLock::default(),
        }
    }

    pub fn settings(&self) -> &PickerSettings {
        &self.settings
    }

    /// Decode `data` and store it. Nothing is inserted if decoding fails.
    pub fn register_bytes(&self, data: &[u8], hint: Option<ImageFormat>) -> Result<RegisteredImage> {
        let decoded = decoder::decode(data, hint, &self.settings)?;
        let (width, height) = (decoded.width, decoded.height);
        let id = self.register(decoded, hash_bytes(data));
        Ok(RegisteredImage { id, width, height })
    }

    /// Store an already decoded image under a fresh id.
    pub fn register(&self, decoded: DecodedImage, fingerprint: String) -> ImageId {
        let DecodedImage { width, height, pixels } = decoded;
        let created_at = Utc::now();

        // Records are immutable, so a poisoned lock still guards a consistent map
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        entries.next_seq += 1;
        let prefix: String = fingerprint.chars().take(12).collect();
        let id = ImageId(format!("{}-{}", prefix, entries.next_seq));
        let record = Arc::new(ImageRecord {
            id: id.clone(),
            pixels,
            fingerprint,
            created_at,
        });
        entries.records.insert(id.clone(), record);
        drop(entries);

        log::debug!("registered image {} ({}x{})", id, width, height);
        id
    }

    /// Look up a record by id.
    pub fn get(&self, id: &str) -> Result<Arc<ImageRecord>> {
        let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
        entries
            .records
            .get(id)
            .cloned()
            .ok_or_else(|| PickerError::NotFound(id.to_string()))
    }

    pub fn contains(&self, id: &str) -> bool {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .records
            .contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.entries.read().unwrap_or_else(PoisonError::into_inner).records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// All live ids, sorted.
    pub fn ids(&self) -> Vec<ImageId> {
        let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
        let mut ids: Vec<ImageId> = entries.records.keys().cloned().collect();
        ids.sort();
        ids
    }
}

// ============================================================================
// UTILITY FUNCTIONS
// ============================================================================

/// Calculate SHA-256 hash of image bytes
pub fn hash_bytes(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    let result = hasher.finalize();
    format!("{:x}", result)
}

// ============================================================================
// TESTS
// ============================================================================
