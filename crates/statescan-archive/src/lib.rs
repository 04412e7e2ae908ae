//! Reads class artifacts out of dependency archives and exploded directories.
//!
//! The scanner treats a project root and every dependency archive the same
//! way: as a source of named `.class` entries. This crate is the only place
//! that knows the difference between a directory tree and a zip container.

use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use thiserror::Error;

const METADATA_PREFIX: &str = "META-INF/";
const CLASS_SUFFIX: &str = ".class";

#[derive(Debug, Error)]
pub enum Error {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to read archive {path}: {source}")]
    Zip {
        path: PathBuf,
        #[source]
        source: zip::result::ZipError,
    },
}

pub type Result<T> = std::result::Result<T, Error>;

/// One class artifact's entry name and raw bytes, as found in an archive or
/// exploded directory. `name` is the archive-relative path with forward
/// slashes, matching the form the decoder's canonical-name derivation
/// expects.
#[derive(Clone, Debug)]
pub struct ClassEntry {
    pub name: String,
    pub bytes: Vec<u8>,
}

/// A single dependency archive or exploded classes directory.
#[derive(Clone, Debug)]
pub struct Archive {
    path: PathBuf,
}

impl Archive {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Every class artifact contained in this archive or directory. Entries
    /// under the metadata prefix are skipped. A single unreadable entry is
    /// skipped with a logged warning rather than aborting the whole archive.
    pub fn class_entries(&self) -> Result<Vec<ClassEntry>> {
        if self.path.is_dir() {
            self.class_entries_from_dir()
        } else {
            self.class_entries_from_zip()
        }
    }

    fn class_entries_from_dir(&self) -> Result<Vec<ClassEntry>> {
        let files = statescan_core::collect_files_with_extension(&self.path, "class")
            .map_err(|source| Error::Io {
                path: self.path.clone(),
                source,
            })?;

        let mut entries = Vec::with_capacity(files.len());
        for file in files {
            let name = file
                .strip_prefix(&self.path)
                .unwrap_or(&file)
                .to_string_lossy()
                .replace('\\', "/");
            if name.starts_with(METADATA_PREFIX) {
                continue;
            }
            match std::fs::read(&file) {
                Ok(bytes) => entries.push(ClassEntry { name, bytes }),
                Err(err) => {
                    tracing::warn!(
                        path = %file.display(),
                        error = %err,
                        "skipping unreadable class artifact"
                    );
                }
            }
        }
        Ok(entries)
    }

    fn class_entries_from_zip(&self) -> Result<Vec<ClassEntry>> {
        let file = File::open(&self.path).map_err(|source| Error::Io {
            path: self.path.clone(),
            source,
        })?;
        let mut zip = zip::ZipArchive::new(file).map_err(|source| Error::Zip {
            path: self.path.clone(),
            source,
        })?;

        let mut entries = Vec::with_capacity(zip.len());
        for i in 0..zip.len() {
            let mut entry = match zip.by_index(i) {
                Ok(entry) => entry,
                Err(err) => {
                    tracing::warn!(
                        path = %self.path.display(),
                        index = i,
                        error = %err,
                        "skipping unreadable archive entry"
                    );
                    continue;
                }
            };

            let name = entry.name().to_string();
            if !name.ends_with(CLASS_SUFFIX) || name.starts_with(METADATA_PREFIX) {
                continue;
            }

            let mut bytes = Vec::with_capacity(entry.size() as usize);
            if let Err(err) = entry.read_to_end(&mut bytes) {
                tracing::warn!(
                    path = %self.path.display(),
                    entry = %name,
                    error = %err,
                    "skipping unreadable archive entry"
                );
                continue;
            }
            entries.push(ClassEntry { name, bytes });
        }
        Ok(entries)
    }

    /// Reads a single named entry, for callers that already know the path
    /// they want rather than enumerating the whole archive.
    ///
    /// Returns `Ok(None)` when the entry isn't present.
    pub fn read(&self, name: &str) -> Result<Option<Vec<u8>>> {
        if self.path.is_dir() {
            let candidate = self.path.join(name);
            if !candidate.exists() {
                return Ok(None);
            }
            return std::fs::read(&candidate).map(Some).map_err(|source| Error::Io {
                path: candidate,
                source,
            });
        }

        let file = File::open(&self.path).map_err(|source| Error::Io {
            path: self.path.clone(),
            source,
        })?;
        let mut zip = zip::ZipArchive::new(file).map_err(|source| Error::Zip {
            path: self.path.clone(),
            source,
        })?;
        match zip.by_name(name) {
            Ok(mut entry) => {
                let mut buf = Vec::new();
                entry.read_to_end(&mut buf).map_err(|source| Error::Io {
                    path: self.path.clone(),
                    source,
                })?;
                Ok(Some(buf))
            }
            Err(zip::result::ZipError::FileNotFound) => Ok(None),
            Err(source) => Err(Error::Zip {
                path: self.path.clone(),
                source,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Cursor, Write};

    #[test]
    fn enumerates_class_files_in_directory_tree() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("com/example")).unwrap();
        std::fs::write(dir.path().join("com/example/Widget.class"), b"stub").unwrap();
        std::fs::write(dir.path().join("com/example/notes.txt"), b"ignore me").unwrap();
        std::fs::create_dir_all(dir.path().join("META-INF")).unwrap();
        std::fs::write(dir.path().join("META-INF/MANIFEST.class"), b"stub").unwrap();

        let archive = Archive::new(dir.path());
        let entries = archive.class_entries().unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].name, "com/example/Widget.class");
    }

    fn build_zip(entries: &[(&str, &[u8])]) -> Vec<u8> {
        let mut cursor = Cursor::new(Vec::new());
        {
            let mut writer = zip::ZipWriter::new(&mut cursor);
            let options = zip::write::SimpleFileOptions::default()
                .compression_method(zip::CompressionMethod::Stored);
            for (name, bytes) in entries {
                writer.start_file(*name, options).unwrap();
                writer.write_all(bytes).unwrap();
            }
            writer.finish().unwrap();
        }
        cursor.into_inner()
    }

    #[test]
    fn enumerates_class_files_in_zip_and_skips_metadata() {
        let dir = tempfile::tempdir().unwrap();
        let jar_path = dir.path().join("dep.jar");
        let bytes = build_zip(&[
            ("com/example/Widget.class", b"stub"),
            ("META-INF/MANIFEST.MF", b"Manifest-Version: 1.0"),
            ("com/example/readme.txt", b"not a class"),
        ]);
        std::fs::write(&jar_path, bytes).unwrap();

        let archive = Archive::new(&jar_path);
        let entries = archive.class_entries().unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].name, "com/example/Widget.class");
        assert_eq!(entries[0].bytes, b"stub");
    }

    #[test]
    fn read_named_entry_from_zip() {
        let dir = tempfile::tempdir().unwrap();
        let jar_path = dir.path().join("dep.jar");
        std::fs::write(&jar_path, build_zip(&[("com/example/Widget.class", b"stub")])).unwrap();

        let archive = Archive::new(&jar_path);
        assert_eq!(
            archive.read("com/example/Widget.class").unwrap(),
            Some(b"stub".to_vec())
        );
        assert_eq!(archive.read("com/example/Missing.class").unwrap(), None);
    }
}
