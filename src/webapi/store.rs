//! In-memory task list
//!
//! Tasks are addressed by their position in the list. The `id` field is a
//! creation counter that is reported to clients but never used for lookup.

use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

use super::error::ApiError;
use super::types::{Additional, Task, TransferInfo, STATUS_DOWNLOADING, STATUS_PAUSED, STATUS_WAITING};
use crate::config::FixtureConfig;

#[derive(Debug, Error)]
pub enum SeedError {
    #[error("failed to read seed file {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse seed file {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
}

/// Task as written in a seed file; `id` is assigned on load
#[derive(Debug, Deserialize)]
pub struct SeedTask {
    pub title: String,
    #[serde(default = "default_seed_status")]
    pub status: String,
    #[serde(default)]
    pub size: u64,
    #[serde(default)]
    pub additional: Additional,
}

fn default_seed_status() -> String {
    STATUS_WAITING.to_string()
}

#[derive(Debug, Deserialize)]
struct SeedFile {
    #[serde(default)]
    tasks: Vec<SeedTask>,
}

#[derive(Debug)]
pub struct TaskStore {
    tasks: Vec<Task>,
    next_id: u64,
}

impl Default for TaskStore {
    fn default() -> Self {
        Self::new()
    }
}

impl TaskStore {
    pub const fn new() -> Self {
        Self {
            tasks: Vec::new(),
            next_id: 1,
        }
    }

    /// Build the startup store: demo tasks first, then the seed file
    pub fn seeded(fixture: &FixtureConfig) -> Result<Self, SeedError> {
        let mut store = Self::new();
        if fixture.seed_demo_tasks {
            for seed in demo_tasks() {
                store.insert(seed);
            }
        }
        if let Some(path) = &fixture.seed_file {
            for seed in load_seed_file(Path::new(path))? {
                store.insert(seed);
            }
        }
        Ok(store)
    }

    pub fn list(&self) -> &[Task] {
        &self.tasks
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Append a new waiting task with no progress
    pub fn create(&mut self, title: &str) -> &Task {
        self.insert(SeedTask {
            title: title.to_string(),
            status: default_seed_status(),
            size: 0,
            additional: Additional::default(),
        })
    }

    /// Remove the tasks at `indices`, all positions taken before removal.
    /// Nothing is removed unless every index is valid.
    pub fn delete(&mut self, indices: &[usize]) -> Result<(), ApiError> {
        self.check_indices(indices)?;

        let mut sorted = indices.to_vec();
        sorted.sort_unstable();
        sorted.dedup();
        for index in sorted.into_iter().rev() {
            self.tasks.remove(index);
        }
        Ok(())
    }

    /// Set the status label of the tasks at `indices`, all or nothing
    pub fn set_status(&mut self, indices: &[usize], status: &str) -> Result<(), ApiError> {
        self.check_indices(indices)?;

        for &index in indices {
            self.tasks[index].status = status.to_string();
        }
        Ok(())
    }

    fn check_indices(&self, indices: &[usize]) -> Result<(), ApiError> {
        let len = self.tasks.len();
        match indices.iter().find(|&&index| index >= len) {
            Some(&index) => Err(ApiError::InvalidTaskId { index, len }),
            None => Ok(()),
        }
    }

    fn insert(&mut self, seed: SeedTask) -> &Task {
        let id = self.next_id;
        self.next_id += 1;
        self.tasks.push(Task {
            id,
            title: seed.title,
            status: seed.status,
            size: seed.size,
            additional: seed.additional,
        });
        &self.tasks[self.tasks.len() - 1]
    }
}

/// The two tasks a fresh fake NAS has always reported
pub fn demo_tasks() -> Vec<SeedTask> {
    vec![
        SeedTask {
            title: "test 1".to_string(),
            status: STATUS_DOWNLOADING.to_string(),
            size: 1234,
            additional: Additional {
                transfer: TransferInfo {
                    size_downloaded: 500,
                    size_uploaded: 250,
                    speed_download: 100,
                    speed_upload: 50,
                },
            },
        },
        SeedTask {
            title: "test 2".to_string(),
            status: STATUS_PAUSED.to_string(),
            size: 1_234_567,
            additional: Additional {
                transfer: TransferInfo {
                    size_downloaded: 900_000,
                    size_uploaded: 25_000,
                    speed_download: 100,
                    speed_upload: 50,
                },
            },
        },
    ]
}

pub fn load_seed_file(path: &Path) -> Result<Vec<SeedTask>, SeedError> {
    let content = std::fs::read_to_string(path).map_err(|source| SeedError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    parse_seed(&content).map_err(|source| SeedError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

fn parse_seed(content: &str) -> Result<Vec<SeedTask>, toml::de::Error> {
    toml::from_str::<SeedFile>(content).map(|file| file.tasks)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store_with(titles: &[&str]) -> TaskStore {
        let mut store = TaskStore::new();
        for title in titles {
            store.create(title);
        }
        store
    }

    fn titles(store: &TaskStore) -> Vec<&str> {
        store.list().iter().map(|t| t.title.as_str()).collect()
    }

    #[test]
    fn test_create_appends_waiting_task() {
        let mut store = store_with(&["a"]);
        let task = store.create("b").clone();
        assert_eq!(task.title, "b");
        assert_eq!(task.status, STATUS_WAITING);
        assert_eq!(task.size, 0);
        assert_eq!(task.additional, Additional::default());
        assert_eq!(titles(&store), vec!["a", "b"]);
    }

    #[test]
    fn test_ids_are_never_reused() {
        let mut store = store_with(&["a", "b"]);
        store.delete(&[1]).unwrap();
        let id = store.create("c").id;
        assert_eq!(id, 3);
    }

    #[test]
    fn test_delete_removes_exactly_that_task() {
        let mut store = store_with(&["a", "b", "c"]);
        store.delete(&[1]).unwrap();
        assert_eq!(titles(&store), vec!["a", "c"]);
    }

    #[test]
    fn test_delete_multiple_uses_original_positions() {
        let mut store = store_with(&["a", "b", "c", "d"]);
        store.delete(&[3, 0, 0]).unwrap();
        assert_eq!(titles(&store), vec!["b", "c"]);
    }

    #[test]
    fn test_delete_out_of_range_leaves_store_unchanged() {
        let mut store = store_with(&["a", "b"]);
        let err = store.delete(&[0, 2]).unwrap_err();
        assert_eq!(err, ApiError::InvalidTaskId { index: 2, len: 2 });
        assert_eq!(titles(&store), vec!["a", "b"]);
    }

    #[test]
    fn test_set_status() {
        let mut store = store_with(&["a", "b"]);
        store.set_status(&[1], STATUS_PAUSED).unwrap();
        assert_eq!(store.list()[0].status, STATUS_WAITING);
        assert_eq!(store.list()[1].status, STATUS_PAUSED);

        assert!(store.set_status(&[0, 5], STATUS_PAUSED).is_err());
        assert_eq!(store.list()[0].status, STATUS_WAITING);
    }

    #[test]
    fn test_seeded_demo_tasks() {
        let fixture = FixtureConfig {
            sid: 1,
            seed_demo_tasks: true,
            seed_file: None,
        };
        let store = TaskStore::seeded(&fixture).unwrap();
        assert_eq!(titles(&store), vec!["test 1", "test 2"]);
        assert_eq!(store.list()[1].additional.transfer.size_downloaded, 900_000);
        assert_eq!(store.list()[1].id, 2);
    }

    #[test]
    fn test_seeded_from_shipped_seed_file() {
        let fixture = FixtureConfig {
            sid: 1,
            seed_demo_tasks: false,
            seed_file: Some(concat!(env!("CARGO_MANIFEST_DIR"), "/seed_tasks.toml").to_string()),
        };
        let store = TaskStore::seeded(&fixture).unwrap();
        assert_eq!(titles(&store), vec!["debian-12.iso", "archive.tar.gz"]);
        assert_eq!(store.list()[0].status, STATUS_DOWNLOADING);
        assert_eq!(store.list()[0].additional.transfer.speed_download, 1_048_576);
        assert_eq!(store.list()[1].status, "finished");
        assert_eq!(store.list()[1].additional.transfer.speed_upload, 0);
    }

    #[test]
    fn test_seed_file_follows_demo_tasks() {
        let fixture = FixtureConfig {
            sid: 1,
            seed_demo_tasks: true,
            seed_file: Some(concat!(env!("CARGO_MANIFEST_DIR"), "/seed_tasks.toml").to_string()),
        };
        let store = TaskStore::seeded(&fixture).unwrap();
        assert_eq!(
            titles(&store),
            vec!["test 1", "test 2", "debian-12.iso", "archive.tar.gz"]
        );
        let ids: Vec<u64> = store.list().iter().map(|t| t.id).collect();
        assert_eq!(ids, vec![1, 2, 3, 4]);
    }

    #[test]
    fn test_seeded_with_malformed_seed_file() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        std::io::Write::write_all(&mut file, b"[[tasks]]\nsize = \"big\"\n").unwrap();
        let fixture = FixtureConfig {
            sid: 1,
            seed_demo_tasks: false,
            seed_file: Some(file.path().to_str().unwrap().to_string()),
        };
        let err = TaskStore::seeded(&fixture).unwrap_err();
        assert!(matches!(err, SeedError::Parse { .. }));
    }

    #[test]
    fn test_parse_seed() {
        let seeds = parse_seed(
            r#"
            [[tasks]]
            title = "ubuntu.iso"
            status = "finished"
            size = 100

            [tasks.additional.transfer]
            size_downloaded = 100

            [[tasks]]
            title = "bare"
            "#,
        )
        .unwrap();
        assert_eq!(seeds.len(), 2);
        assert_eq!(seeds[0].status, "finished");
        assert_eq!(seeds[0].additional.transfer.size_downloaded, 100);
        assert_eq!(seeds[1].status, STATUS_WAITING);
        assert_eq!(seeds[1].size, 0);
    }

    #[test]
    fn test_parse_seed_rejects_missing_title() {
        assert!(parse_seed("[[tasks]]\nstatus = \"paused\"\n").is_err());
    }

    #[test]
    fn test_missing_seed_file() {
        let err = load_seed_file(Path::new("does/not/exist.toml")).unwrap_err();
        assert!(matches!(err, SeedError::Read { .. }));
    }
}
