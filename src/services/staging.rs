use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use rand::Rng;

/// A private directory under the staging root for one submission's downloads.
#[derive(Debug)]
pub struct StagingDir {
    path: PathBuf,
}

impl StagingDir {
    pub fn create(root: &Path) -> io::Result<Self> {
        fs::create_dir_all(root)?;
        loop {
            let token: u64 = rand::thread_rng().gen();
            let path = root.join(format!("{token:016x}"));
            match fs::create_dir(&path) {
                Ok(()) => return Ok(Self { path }),
                Err(e) if e.kind() == io::ErrorKind::AlreadyExists => continue,
                Err(e) => return Err(e),
            }
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Removes the directory and whatever is still in it.
    pub fn discard(self) {
        if let Err(e) = fs::remove_dir_all(&self.path) {
            if e.kind() != io::ErrorKind::NotFound {
                tracing::warn!(
                    path = %self.path.display(),
                    error = %e,
                    "could not clear staging directory"
                );
            }
        }
    }
}
