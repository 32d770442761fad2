//! The archive backend: the side that touches the file system, decrypts, and
//! owns the recent-files list.
//!
//! Responses use the backend's own wire shapes ([`OpenSuccess`],
//! [`BackendError`], [`History`]). Nothing outside the gateway looks at them.

use crate::store::HistoryStore;
use crate::utils::{file_name_of, get_formatted_size};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{error, info, warn};
use zip::result::ZipError;
use zip::ZipArchive;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Meta {
    pub name: String,
    pub size: String,
    pub compressed: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OpenSuccess {
    pub meta: Meta,
    pub contents: Vec<String>,
    pub path: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackendError {
    #[serde(default)]
    pub password_required: bool,
    #[serde(default)]
    pub path: String,
    #[serde(default)]
    pub message: String,
}

impl BackendError {
    pub fn message(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            ..Self::default()
        }
    }

    pub fn password_required(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            password_required: true,
            path: path.into(),
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryItem {
    pub name: String,
    pub path: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct History {
    pub history: Vec<HistoryItem>,
}

pub trait ArchiveBackend: Send + Sync {
    /// Opens `path`, or asks the user for a file when it is `None`.
    fn open_file(
        &self,
        path: Option<String>,
        password: Option<String>,
    ) -> Result<OpenSuccess, BackendError>;

    fn refresh(&self) -> Result<History, BackendError>;
}

/// Chooses an archive when an open request carries no path.
pub trait FilePicker: Send + Sync {
    fn pick_archive(&self) -> Option<PathBuf>;
}

pub struct DialogPicker;

impl FilePicker for DialogPicker {
    fn pick_archive(&self) -> Option<PathBuf> {
        rfd::FileDialog::new()
            .add_filter("ZIP", &["zip"])
            .pick_file()
    }
}

pub struct ZipBackend {
    store: Mutex<HistoryStore>,
    picker: Box<dyn FilePicker>,
}

impl ZipBackend {
    pub fn new(store: HistoryStore) -> Self {
        Self::with_picker(store, DialogPicker)
    }

    pub fn with_picker(store: HistoryStore, picker: impl FilePicker + 'static) -> Self {
        Self {
            store: Mutex::new(store),
            picker: Box::new(picker),
        }
    }

    fn read_archive(path: &Path, password: Option<&str>) -> Result<OpenSuccess, BackendError> {
        let display_path = path.to_string_lossy().into_owned();
        let file = File::open(path)
            .map_err(|e| BackendError::message(format!("cannot open {}: {}", display_path, e)))?;
        let compressed = file
            .metadata()
            .map(|meta| meta.len())
            .map_err(|e| BackendError::message(e.to_string()))?;
        let mut archive =
            ZipArchive::new(file).map_err(|e| BackendError::message(e.to_string()))?;

        let mut contents = Vec::with_capacity(archive.len());
        let mut uncompressed = 0u64;
        for i in 0..archive.len() {
            let entry = archive
                .by_index_raw(i)
                .map_err(|e| BackendError::message(e.to_string()))?;
            uncompressed = uncompressed.saturating_add(entry.size());
            contents.push(entry.name().to_string());
        }

        // The first entry that refuses to open without a password decides.
        let mut first_encrypted = None;
        for i in 0..archive.len() {
            match archive.by_index(i) {
                Ok(_) => {}
                Err(ZipError::UnsupportedArchive(msg)) if msg == ZipError::PASSWORD_REQUIRED => {
                    first_encrypted = Some(i);
                    break;
                }
                Err(e) => return Err(BackendError::message(e.to_string())),
            }
        }

        if let (Some(index), Some(password)) = (first_encrypted, password) {
            // ZipCrypto's header check lets about one wrong password in 256
            // through; only the entry's CRC at end of data settles it.
            let verified = match archive.by_index_decrypt(index, password.as_bytes()) {
                Ok(mut entry) => io::copy(&mut entry, &mut io::sink()).is_ok(),
                Err(ZipError::InvalidPassword) => false,
                Err(e) => return Err(BackendError::message(e.to_string())),
            };
            if !verified {
                return Err(BackendError::password_required(
                    display_path,
                    "invalid password",
                ));
            }
        } else if first_encrypted.is_some() {
            return Err(BackendError::password_required(display_path, ""));
        }

        Ok(OpenSuccess {
            meta: Meta {
                name: file_name_of(&display_path),
                size: get_formatted_size(uncompressed),
                compressed: get_formatted_size(compressed),
            },
            contents,
            path: display_path,
        })
    }
}

impl ArchiveBackend for ZipBackend {
    fn open_file(
        &self,
        path: Option<String>,
        password: Option<String>,
    ) -> Result<OpenSuccess, BackendError> {
        let path = match path {
            Some(path) => PathBuf::from(path),
            None => self
                .picker
                .pick_archive()
                .ok_or_else(|| BackendError::message("no file selected"))?,
        };

        info!("Opening archive: {:?}", path);
        let result = Self::read_archive(&path, password.as_deref());

        match &result {
            Ok(success) => {
                info!("Archive opened: {} entries", success.contents.len());
                if let Err(e) = self.store.lock().insert(&success.path) {
                    error!("Failed to record recent file: {}", e);
                }
            }
            Err(e) if e.password_required => info!("Archive {} needs a password", e.path),
            Err(e) => warn!("Failed to open archive: {}", e.message),
        }
        result
    }

    fn refresh(&self) -> Result<History, BackendError> {
        Ok(History {
            history: self.store.lock().snapshot(),
        })
    }
}
