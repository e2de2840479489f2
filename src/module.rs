//! Host-side source loading for `import`.

use std::io;
use std::path::Path;

/// The engine asks the host for module source bytes through this
/// trait; it stays out of filesystem business otherwise.
pub trait SourceProvider: Send + Sync {
  fn read_source(&self, path: &str) -> io::Result<String>;
}

/// Reads the path verbatim, relative to the process working
/// directory.
pub struct FsProvider;

impl SourceProvider for FsProvider {
  fn read_source(&self, path: &str) -> io::Result<String> {
    std::fs::read_to_string(Path::new(path))
  }
}
