use crate::api::DeskApi;
use crate::identity::LocalIdentity;
use crate::init::STORE_FILE;
use crate::store::fs::FileTreeStore;
use std::path::PathBuf;
use tempfile::TempDir;

pub struct TestEnv {
    // Kept so the directory outlives the test.
    pub _temp_dir: TempDir,
    pub root: PathBuf,
    pub store_path: PathBuf,
}

impl Default for TestEnv {
    fn default() -> Self {
        Self::new()
    }
}

impl TestEnv {
    pub fn new() -> Self {
        let temp_dir = tempfile::tempdir().expect("failed to create temp dir");
        let root = temp_dir.path().to_path_buf();
        let store_path = root.join(STORE_FILE);
        Self {
            _temp_dir: temp_dir,
            root,
            store_path,
        }
    }

    /// Opens the store file, as a new process would.
    pub fn store(&self) -> FileTreeStore {
        FileTreeStore::open(&self.store_path).expect("failed to open test store")
    }

    pub fn api(&self) -> DeskApi<FileTreeStore, LocalIdentity> {
        DeskApi::new(self.store(), LocalIdentity::new())
    }
}
