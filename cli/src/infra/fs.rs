//! Filesystem infrastructure: implements `FileOracle`.

use std::path::Path;

use crate::application::ports::FileOracle;

/// Production filesystem implementation of `FileOracle`.
pub struct LocalFs;

impl FileOracle for LocalFs {
    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }
}
