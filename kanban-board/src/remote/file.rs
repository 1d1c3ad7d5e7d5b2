//! A [`RemoteStore`] persisted to a single JSON file.

use super::{RemoteOperation, RemoteResponse, RemoteStore, RemoteTables};
use crate::error::{BoardError, Result};
use crate::types::{Board, BoardId, List};
use async_trait::async_trait;
use chrono::Utc;
use fs2::FileExt;
use serde_json::Value;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::sync::Mutex;
use tracing::{debug, warn};

/// Store whose tables live in a JSON file.
///
/// Every successful mutation rewrites the file through a temp file and
/// rename. A mutation is applied to a copy of the tables and committed in
/// memory only once the file write has finished, so a failed or abandoned
/// call leaves neither the file nor the tables changed.
///
/// The store does not lock the file itself; callers sharing a file across
/// processes hold a [`BoardFileLock`] for the duration of their work.
#[derive(Debug)]
pub struct JsonFileRemote {
    path: PathBuf,
    tables: Mutex<RemoteTables>,
}

impl JsonFileRemote {
    /// Open an existing board file
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let content = fs::read_to_string(&path).await?;
        let tables: RemoteTables = serde_json::from_str(&content)?;
        debug!(path = %path.display(), boards = tables.boards.len(), "opened board file");
        Ok(Self {
            path,
            tables: Mutex::new(tables),
        })
    }

    /// Create a new board file holding one board and its lists.
    ///
    /// Refuses to overwrite an existing file.
    pub async fn create(path: impl Into<PathBuf>, board: Board, lists: Vec<List>) -> Result<Self> {
        let path = path.into();
        if fs::try_exists(&path).await? {
            return Err(BoardError::validation(
                "board_file",
                format!("{} already exists", path.display()),
            ));
        }

        let mut tables = RemoteTables::default();
        tables.insert_board(board, lists);
        write_tables(&path, &tables).await?;
        debug!(path = %path.display(), "created board file");
        Ok(Self {
            path,
            tables: Mutex::new(tables),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Ids of every board in the file
    pub async fn board_ids(&self) -> Vec<BoardId> {
        self.tables.lock().await.board_ids()
    }

    /// Path of the lock file guarding the board file at `path`
    pub fn lock_path(path: &Path) -> PathBuf {
        path.with_extension("lock")
    }

    /// Try to take the exclusive lock on a board file (non-blocking)
    pub async fn lock(path: impl AsRef<Path>) -> Result<BoardFileLock> {
        let lock_path = Self::lock_path(path.as_ref());
        if let Some(parent) = lock_path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).await?;
            }
        }

        let file = std::fs::OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(&lock_path)?;

        match FileExt::try_lock_exclusive(&file) {
            Ok(()) => Ok(BoardFileLock {
                file,
                path: lock_path,
            }),
            Err(_) => Err(BoardError::LockBusy {
                path: lock_path.display().to_string(),
            }),
        }
    }
}

/// RAII lock guard on a board file; released on drop
#[derive(Debug)]
pub struct BoardFileLock {
    file: std::fs::File,
    path: PathBuf,
}

impl BoardFileLock {
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for BoardFileLock {
    fn drop(&mut self) {
        let _ = FileExt::unlock(&self.file);
    }
}

#[async_trait]
impl RemoteStore for JsonFileRemote {
    async fn execute(&self, operation: &str, variables: Value) -> RemoteResponse {
        let op = match RemoteOperation::decode(operation, variables) {
            Ok(op) => op,
            Err(e) => return RemoteResponse::error(e.to_string()),
        };
        let mut tables = self.tables.lock().await;
        if !op.is_mutation() {
            return match tables.apply(op, Utc::now()) {
                Ok(data) => RemoteResponse::data(data),
                Err(message) => RemoteResponse::error(message),
            };
        }

        // Nothing is committed across the write's await points; dropping
        // this future mid-write discards `next`.
        let mut next = tables.clone();
        let data = match next.apply(op, Utc::now()) {
            Ok(data) => data,
            Err(message) => return RemoteResponse::error(message),
        };
        if let Err(e) = write_tables(&self.path, &next).await {
            warn!(operation, path = %self.path.display(), error = %e, "failed to persist board file");
            return RemoteResponse::error(format!("failed to persist: {e}"));
        }
        *tables = next;
        RemoteResponse::data(data)
    }
}

async fn write_tables(path: &Path, tables: &RemoteTables) -> Result<()> {
    let content = serde_json::to_string_pretty(tables)?;
    atomic_write(path, content.as_bytes()).await
}

/// Write a file atomically: temp file in the same directory, then rename
async fn atomic_write(path: &Path, content: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).await?;
        }
    }

    let temp_path = path.with_extension("tmp");
    fs::write(&temp_path, content).await?;
    fs::rename(&temp_path, path).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{CardId, ListId, UserId};
    use tempfile::TempDir;

    async fn setup() -> (TempDir, JsonFileRemote, Board) {
        let temp = TempDir::new().unwrap();
        let board = Board::new("Test");
        let lists = board.default_lists();
        let remote = JsonFileRemote::create(temp.path().join("board.json"), board.clone(), lists)
            .await
            .unwrap();
        (temp, remote, board)
    }

    #[tokio::test]
    async fn test_create_then_open() {
        let (_temp, remote, board) = setup().await;
        let reopened = JsonFileRemote::open(remote.path()).await.unwrap();
        assert_eq!(reopened.board_ids().await, vec![board.id]);
    }

    #[tokio::test]
    async fn test_create_refuses_existing_file() {
        let (_temp, remote, board) = setup().await;
        let err = JsonFileRemote::create(remote.path(), board, Vec::new())
            .await
            .unwrap_err();
        assert!(matches!(err, BoardError::Validation { .. }));
    }

    #[tokio::test]
    async fn test_open_missing_file() {
        let temp = TempDir::new().unwrap();
        let err = JsonFileRemote::open(temp.path().join("missing.json"))
            .await
            .unwrap_err();
        assert!(matches!(err, BoardError::Io(_)));
    }

    #[tokio::test]
    async fn test_mutations_are_persisted() {
        let (_temp, remote, board) = setup().await;
        let list_id = {
            let tables = remote.tables.lock().await;
            tables.lists[0].id.clone()
        };

        let op = RemoteOperation::CreateCard {
            list_id: list_id.clone(),
            title: "Persist me".into(),
            position: 0,
            created_by: UserId::from_string("u1"),
        };
        let response = remote.execute(op.name(), op.variables().unwrap()).await;
        let card_id: CardId = serde_json::from_value(response.data.unwrap()["id"].clone()).unwrap();

        let reopened = JsonFileRemote::open(remote.path()).await.unwrap();
        let tables = reopened.tables.lock().await;
        let card = tables.find_card(&card_id).unwrap();
        assert_eq!(card.title, "Persist me");
        assert_eq!(card.list_id, list_id);
        assert_eq!(tables.board_ids(), vec![board.id]);
        assert!(!remote.path().with_extension("tmp").exists());
    }

    #[tokio::test]
    async fn test_locking() {
        let (_temp, remote, _board) = setup().await;

        let first = JsonFileRemote::lock(remote.path()).await.unwrap();
        assert_eq!(first.path(), JsonFileRemote::lock_path(remote.path()));

        let err = JsonFileRemote::lock(remote.path()).await.unwrap_err();
        assert!(matches!(err, BoardError::LockBusy { .. }));
        assert!(err.is_retryable());

        drop(first);
        let _second = JsonFileRemote::lock(remote.path()).await.unwrap();
    }

    #[tokio::test]
    async fn test_failed_operation_leaves_file_untouched() {
        let (_temp, remote, _board) = setup().await;
        let before = std::fs::read_to_string(remote.path()).unwrap();

        let op = RemoteOperation::ArchiveList {
            id: ListId::from_string("missing"),
        };
        let response = remote.execute(op.name(), op.variables().unwrap()).await;
        assert!(response.is_error());
        assert_eq!(std::fs::read_to_string(remote.path()).unwrap(), before);
    }
}
