use std::{
    ffi::OsString,
    fs::TryLockError,
    ops::Deref,
    path::{Path, PathBuf},
    sync::Arc,
    time::{Duration, SystemTime},
};

use uuid::Uuid;

pub(crate) type ArcTmpDir = Arc<TmpDir>;

const TMP_DIR_NAME: &str = "tubely";

/// Held exclusively for as long as the owning process runs
pub(crate) const LOCK_FILE_NAME: &str = ".lock";

/// Per-process scratch directory
///
/// Lives at `<temporary_directory>/tubely/<uuid>` and is removed when the last reference drops
#[derive(Debug)]
pub(crate) struct TmpDir {
    path: Option<PathBuf>,
    _lock: std::fs::File,
}

impl TmpDir {
    pub(crate) async fn init<P: AsRef<Path>>(path: P) -> std::io::Result<Arc<Self>> {
        let path = path.as_ref().join(TMP_DIR_NAME).join(Uuid::now_v7().to_string());
        tokio::fs::create_dir_all(&path).await?;

        let lock = tokio::fs::File::create(path.join(LOCK_FILE_NAME))
            .await?
            .into_std()
            .await;
        lock.try_lock().map_err(std::io::Error::from)?;

        Ok(Arc::new(TmpDir {
            path: Some(path),
            _lock: lock,
        }))
    }

    /// Remove scratch directories left behind by processes that exited without cleaning up
    ///
    /// Directories created after the sweep began, or still locked by a running process, are kept.
    pub(crate) async fn sweep<P: AsRef<Path>>(path: P) -> std::io::Result<()> {
        let path = path.as_ref().join(TMP_DIR_NAME);
        let started = SystemTime::now()
            .duration_since(SystemTime::UNIX_EPOCH)
            .unwrap_or_default();

        let mut entries = match tokio::fs::read_dir(&path).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(()),
            Err(e) => return Err(e),
        };

        while let Some(entry) = entries.next_entry().await? {
            let dir = entry.path();

            let created = if entry.file_type().await?.is_dir() {
                created_at(&dir)
            } else {
                None
            };

            let Some(created) = created else {
                tracing::debug!("Skipping unknown entry {}", dir.display());
                continue;
            };

            if created >= started || is_locked(&dir).await? {
                tracing::debug!("Skipping live scratch directory {}", dir.display());
                continue;
            }

            match tokio::fs::remove_dir_all(&dir).await {
                Ok(()) => tracing::info!("Removed stale scratch directory {}", dir.display()),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => return Err(e),
            }
        }

        Ok(())
    }

    fn root(&self) -> &Path {
        self.path.as_deref().expect("tmp path exists")
    }

    pub(crate) fn tmp_file(&self, ext: Option<&str>) -> TmpFile {
        let name = match ext {
            Some(ext) => format!("upload-{}{ext}", Uuid::now_v7()),
            None => format!("upload-{}", Uuid::now_v7()),
        };

        TmpFile(Some(self.root().join(name)))
    }

    pub(crate) async fn cleanup(self: Arc<Self>) -> std::io::Result<()> {
        if let Some(path) = Arc::into_inner(self).and_then(|mut this| this.path.take()) {
            tokio::fs::remove_dir_all(path).await?;
        }

        Ok(())
    }
}

/// When the UUIDv7 a scratch directory is named after was generated
fn created_at(dir: &Path) -> Option<Duration> {
    let uuid = Uuid::parse_str(dir.file_name()?.to_str()?).ok()?;
    let (secs, nanos) = uuid.get_timestamp()?.to_unix();

    Some(Duration::new(secs, nanos))
}

async fn is_locked(dir: &Path) -> std::io::Result<bool> {
    let file = match tokio::fs::File::open(dir.join(LOCK_FILE_NAME)).await {
        Ok(file) => file.into_std().await,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(false),
        Err(e) => return Err(e),
    };

    match file.try_lock() {
        Ok(()) => Ok(false),
        Err(TryLockError::WouldBlock) => Ok(true),
        Err(TryLockError::Error(e)) => Err(e),
    }
}

impl Drop for TmpDir {
    fn drop(&mut self) {
        if let Some(path) = self.path.take() {
            let _ = std::fs::remove_dir_all(path);
        }
    }
}

/// A scratch file path that deletes whatever is at it when dropped
#[must_use]
#[derive(Debug)]
pub(crate) struct TmpFile(Option<PathBuf>);

impl TmpFile {
    /// A guard for `<this path><suffix>`, next to this file
    pub(crate) fn sibling(&self, suffix: &str) -> TmpFile {
        let mut name = OsString::from(self.as_os_str());
        name.push(suffix);
        TmpFile(Some(PathBuf::from(name)))
    }

    pub(crate) async fn cleanup(mut self) -> std::io::Result<()> {
        if let Some(path) = self.0.take() {
            match tokio::fs::remove_file(&path).await {
                Ok(()) => {}
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => return Err(e),
            }
        }

        Ok(())
    }
}

impl AsRef<Path> for TmpFile {
    fn as_ref(&self) -> &Path {
        self
    }
}

impl Deref for TmpFile {
    type Target = Path;

    fn deref(&self) -> &Self::Target {
        self.0.as_deref().expect("tmp file path exists")
    }
}

impl Drop for TmpFile {
    fn drop(&mut self) {
        if let Some(path) = self.0.take() {
            let _ = std::fs::remove_file(path);
        }
    }
}

#[cfg(test)]
mod tests {
    use uuid::Uuid;

    use super::{TmpDir, LOCK_FILE_NAME};

    #[actix_web::test]
    async fn tmp_files_are_removed_on_drop() {
        let root = tempfile::tempdir().expect("Created tempdir");
        let tmp_dir = TmpDir::init(root.path()).await.expect("Created tmp dir");

        let file = tmp_dir.tmp_file(Some(".mp4"));
        let path = file.to_path_buf();
        tokio::fs::write(&file, b"hewwo").await.expect("Wrote file");
        assert!(path.exists());

        drop(file);
        assert!(!path.exists());
    }

    #[actix_web::test]
    async fn sibling_sits_next_to_original() {
        let root = tempfile::tempdir().expect("Created tempdir");
        let tmp_dir = TmpDir::init(root.path()).await.expect("Created tmp dir");

        let file = tmp_dir.tmp_file(Some(".mp4"));
        let sibling = file.sibling(".processing");

        assert_eq!(file.parent(), sibling.parent());
        assert!(sibling.to_string_lossy().ends_with(".mp4.processing"));
    }

    #[actix_web::test]
    async fn cleanup_tolerates_missing_files() {
        let root = tempfile::tempdir().expect("Created tempdir");
        let tmp_dir = TmpDir::init(root.path()).await.expect("Created tmp dir");

        tmp_dir
            .tmp_file(None)
            .cleanup()
            .await
            .expect("Missing file is fine");
    }

    #[actix_web::test]
    async fn sweep_removes_only_dead_directories() {
        let root = tempfile::tempdir().expect("Created tempdir");
        let scratch = root.path().join("tubely");

        // left by a process that crashed before it could lock
        let crashed = scratch.join(Uuid::now_v7().to_string());
        std::fs::create_dir_all(&crashed).expect("Created dir");
        std::fs::write(crashed.join("upload-1.mp4"), b"half").expect("Wrote file");

        // left by a process that exited, releasing its lock
        let exited = scratch.join(Uuid::now_v7().to_string());
        std::fs::create_dir_all(&exited).expect("Created dir");
        std::fs::write(exited.join(LOCK_FILE_NAME), b"").expect("Wrote lock");

        let live = TmpDir::init(root.path()).await.expect("Created tmp dir");
        let live_path = live.root().to_path_buf();
        let live_file = live.tmp_file(Some(".mp4"));
        tokio::fs::write(&live_file, b"in flight").await.expect("Wrote file");

        let unrelated = scratch.join("not-a-uuid");
        std::fs::create_dir_all(&unrelated).expect("Created dir");

        std::thread::sleep(std::time::Duration::from_millis(2));
        TmpDir::sweep(root.path()).await.expect("Swept");

        assert!(!crashed.exists());
        assert!(!exited.exists());
        assert!(live_file.exists());
        assert!(unrelated.exists());

        live.cleanup().await.expect("Cleaned up");
        assert!(!live_path.exists());
    }

    #[actix_web::test]
    async fn sweep_keeps_directories_newer_than_itself() {
        let root = tempfile::tempdir().expect("Created tempdir");

        let tomorrow = std::time::SystemTime::now()
            .duration_since(std::time::SystemTime::UNIX_EPOCH)
            .expect("After epoch")
            .as_secs()
            + 24 * 60 * 60;
        let future = Uuid::new_v7(uuid::Timestamp::from_unix(uuid::NoContext, tomorrow, 0));
        let newer = root.path().join("tubely").join(future.to_string());
        std::fs::create_dir_all(&newer).expect("Created dir");

        TmpDir::sweep(root.path()).await.expect("Swept");
        assert!(newer.exists());
    }

    #[actix_web::test]
    async fn sweep_tolerates_missing_directory() {
        let root = tempfile::tempdir().expect("Created tempdir");

        TmpDir::sweep(root.path()).await.expect("Nothing to sweep");
    }
}
