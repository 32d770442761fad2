use crate::backend::HistoryItem;
use crate::error::StoreError;
use crate::utils::file_name_of;
use std::collections::VecDeque;
use std::fs::{self, OpenOptions};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Bounded list of opened archive paths, most recent first.
///
/// When backed by a file the list is rewritten, one path per line, after
/// every insert.
#[derive(Debug)]
pub struct HistoryStore {
    file: Option<PathBuf>,
    capacity: usize,
    queue: VecDeque<String>,
}

impl HistoryStore {
    pub fn open(path: impl AsRef<Path>, capacity: usize) -> Result<Self, StoreError> {
        if capacity == 0 {
            return Err(StoreError::ZeroCapacity);
        }
        let path = path.as_ref().to_path_buf();
        let io_err = |source| StoreError::Io {
            path: path.clone(),
            source,
        };

        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(&path)
            .map_err(io_err)?;

        let mut queue = VecDeque::new();
        for line in BufReader::new(file).lines() {
            let line = line.map_err(io_err)?;
            let line = line.trim();
            if line.is_empty() || queue.len() >= capacity {
                continue;
            }
            queue.push_back(line.to_string());
        }

        info!("Loaded {} recent files from {:?}", queue.len(), path);
        Ok(Self {
            file: Some(path),
            capacity,
            queue,
        })
    }

    /// A store that is never written anywhere. Holds at least one entry.
    pub fn in_memory(capacity: usize) -> Self {
        Self {
            file: None,
            capacity: capacity.max(1),
            queue: VecDeque::new(),
        }
    }

    /// Moves `path` to the front, evicting the oldest entry when full.
    pub fn insert(&mut self, path: &str) -> Result<(), StoreError> {
        if let Some(existing) = self.queue.iter().position(|item| item == path) {
            self.queue.remove(existing);
        } else if self.queue.len() >= self.capacity {
            if let Some(evicted) = self.queue.pop_back() {
                debug!("Evicting {} from recent files", evicted);
            }
        }
        self.queue.push_front(path.to_string());
        self.save()
    }

    fn save(&self) -> Result<(), StoreError> {
        let Some(path) = &self.file else {
            return Ok(());
        };
        let io_err = |source| StoreError::Io {
            path: path.clone(),
            source,
        };

        let mut writer = BufWriter::new(fs::File::create(path).map_err(io_err)?);
        for item in &self.queue {
            writeln!(writer, "{}", item).map_err(io_err)?;
        }
        writer.flush().map_err(io_err)
    }

    pub fn snapshot(&self) -> Vec<HistoryItem> {
        self.queue
            .iter()
            .map(|path| HistoryItem {
                name: file_name_of(path),
                path: path.clone(),
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }
}
