use camino::{Utf8Path, Utf8PathBuf};

/// Locate Rentscope-related files on the user system.
pub struct RentscopeLocator {
    root_dir: Utf8PathBuf,
}

impl RentscopeLocator {
    /// Create a new [`RentscopeLocator`] rooted at the given system home directory.
    pub fn new(system_home_dir: &Utf8Path) -> Self {
        Self {
            root_dir: system_home_dir.join(".rentscope"),
        }
    }

    pub fn root_dir(&self) -> &Utf8Path {
        &self.root_dir
    }

    /// The default configuration file.
    pub fn config_file(&self) -> Utf8PathBuf {
        self.root_dir.join("rentscope.yml")
    }

    /// The default location of the persisted key-value store.
    pub fn storage_file(&self) -> Utf8PathBuf {
        self.root_dir.join("storage.json")
    }
}
