//! Dump file opening with transparent decompression

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use crate::error::DumpError;

/// Compression format, detected from the file name suffix
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Compression {
    None,
    Gzip,
    Bzip2,
}

impl Compression {
    /// Recognized compression suffixes
    pub const SUFFIXES: [&'static str; 2] = [".gz", ".bz2"];

    pub fn from_path(path: &Path) -> Self {
        let name = path.to_string_lossy();
        if name.ends_with(".gz") {
            Self::Gzip
        } else if name.ends_with(".bz2") {
            Self::Bzip2
        } else {
            Self::None
        }
    }

    /// `name` without its compression suffix, if it has one
    pub fn strip_suffix(name: &str) -> &str {
        Self::SUFFIXES
            .iter()
            .find_map(|suffix| name.strip_suffix(*suffix))
            .unwrap_or(name)
    }
}

/// Read a whole dump as text, decompressing by suffix
pub fn read_dump(path: &Path) -> Result<String, DumpError> {
    let io_error = |source: std::io::Error| DumpError::Io {
        path: path.to_path_buf(),
        source,
    };

    let file = BufReader::new(File::open(path).map_err(io_error)?);
    let mut reader: Box<dyn Read> = match Compression::from_path(path) {
        Compression::None => Box::new(file),
        Compression::Gzip => Box::new(flate2::read::GzDecoder::new(file)),
        Compression::Bzip2 => Box::new(bzip2::read::BzDecoder::new(file)),
    };

    let mut text = String::new();
    reader.read_to_string(&mut text).map_err(io_error)?;
    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const DUMP: &str = "CREATE TABLE t (id INT);\nINSERT INTO t VALUES (1);\n";

    #[test]
    fn detects_compression() {
        assert_eq!(Compression::from_path(Path::new("a.sql")), Compression::None);
        assert_eq!(Compression::from_path(Path::new("a.sql.gz")), Compression::Gzip);
        assert_eq!(Compression::from_path(Path::new("a.sql.bz2")), Compression::Bzip2);
    }

    #[test]
    fn strips_compression_suffix() {
        assert_eq!(Compression::strip_suffix("a.sql.bz2"), "a.sql");
        assert_eq!(Compression::strip_suffix("a.sql.gz"), "a.sql");
        assert_eq!(Compression::strip_suffix("a.sql"), "a.sql");
    }

    #[test]
    fn reads_plain_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dump.sql");
        std::fs::write(&path, DUMP).unwrap();

        assert_eq!(read_dump(&path).unwrap(), DUMP);
    }

    #[test]
    fn reads_gzip_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dump.sql.gz");
        let mut encoder = flate2::write::GzEncoder::new(
            File::create(&path).unwrap(),
            flate2::Compression::default(),
        );
        encoder.write_all(DUMP.as_bytes()).unwrap();
        encoder.finish().unwrap();

        assert_eq!(read_dump(&path).unwrap(), DUMP);
    }

    #[test]
    fn reads_bzip2_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dump.sql.bz2");
        let mut encoder = bzip2::write::BzEncoder::new(
            File::create(&path).unwrap(),
            bzip2::Compression::default(),
        );
        encoder.write_all(DUMP.as_bytes()).unwrap();
        encoder.finish().unwrap();

        assert_eq!(read_dump(&path).unwrap(), DUMP);
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = read_dump(Path::new("/nonexistent/dump.sql")).unwrap_err();
        assert!(matches!(err, DumpError::Io { .. }));
    }
}
