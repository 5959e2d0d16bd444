//! Diff file naming and creation

use regex::{NoExpand, Regex};
use std::fs::{File, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};

use dumpdelta_core::{Diagnostic, DiagnosticCode, Location, Severity};

#[derive(Debug, thiserror::Error)]
pub enum OutputError {
    #[error("output file {} already exists", .0.display())]
    Collision(PathBuf),

    #[error("error creating file {}: {source}", .path.display())]
    Create {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl OutputError {
    pub fn to_diagnostic(&self) -> Diagnostic {
        let path = match self {
            Self::Collision(path) | Self::Create { path, .. } => path,
        };
        Diagnostic::new(DiagnosticCode::OutputCollision, Severity::Error, self.to_string())
            .with_location(Location::new(path.display().to_string()))
    }
}

/// Derives diff file names from dump names
///
/// A trailing `.gz`/`.bz2` is replaced by the suffix; any other name gets the
/// suffix appended.
#[derive(Debug, Clone)]
pub struct OutputNamer {
    compression: Regex,
    suffix: String,
}

impl OutputNamer {
    pub fn new(suffix: impl Into<String>) -> Result<Self, regex::Error> {
        Ok(Self {
            compression: Regex::new(r"(\.gz|\.bz2)?$")?,
            suffix: suffix.into(),
        })
    }

    pub fn output_path(&self, dump: &Path) -> PathBuf {
        let name = dump.to_string_lossy();
        PathBuf::from(
            self.compression
                .replace(&name, NoExpand(self.suffix.as_str()))
                .into_owned(),
        )
    }
}

/// Create `path` for writing; never overwrites an existing file
pub fn create_output(path: &Path) -> Result<File, OutputError> {
    OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(path)
        .map_err(|source| match source.kind() {
            io::ErrorKind::AlreadyExists => OutputError::Collision(path.to_path_buf()),
            _ => OutputError::Create {
                path: path.to_path_buf(),
                source,
            },
        })
}
