//! Walks a project's compiled-class directories and dependency archives,
//! decoding every class artifact and classifying each `ClassNode` as
//! *project* or *dependency*.
//!
//! Scanning is tolerant: an unreadable artifact is skipped with a logged
//! warning so that one corrupt entry doesn't abort the whole scan.

use std::path::{Path, PathBuf};

use thiserror::Error;

use statescan_archive::Archive;
use statescan_core::is_runtime_namespace;
use statescan_model::ClassNode;

const SHADE_MARKERS: &[&str] = &[".shade.", ".shaded.", ".relocated.", ".repackaged."];
const ARCHIVE_EXTENSIONS: &[&str] = &["jar", "zip"];

#[derive(Debug, Error)]
pub enum Error {
    #[error("failed to walk {path}: {source}")]
    Walk {
        path: PathBuf,
        #[source]
        source: walkdir::Error,
    },
    #[error(transparent)]
    Archive(#[from] statescan_archive::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

/// Package-prefix filter controlling which classes are marked `is_project`.
///
/// A class qualifies when its canonical name starts with some prefix in
/// `include`, does not start with any prefix in `exclude`, and does not
/// contain a shaded/relocated sub-namespace marker. `root_packages` admits
/// dependency classes under those prefixes as project-equivalent roots (used
/// by the reachability analyzer to seed extra entry points), independent of
/// the include/exclude decision.
#[derive(Clone, Debug, Default)]
pub struct ProjectFilter {
    pub include: Vec<String>,
    pub exclude: Vec<String>,
    pub root_packages: Vec<String>,
}

impl ProjectFilter {
    pub fn new(include: Vec<String>, exclude: Vec<String>, root_packages: Vec<String>) -> Self {
        Self {
            include,
            exclude,
            root_packages,
        }
    }

    fn is_project(&self, canonical_name: &str) -> bool {
        if SHADE_MARKERS.iter().any(|marker| canonical_name.contains(marker)) {
            return false;
        }
        if self.exclude.iter().any(|prefix| canonical_name.starts_with(prefix.as_str())) {
            return false;
        }
        self.include.iter().any(|prefix| canonical_name.starts_with(prefix.as_str()))
            || self
                .root_packages
                .iter()
                .any(|prefix| canonical_name.starts_with(prefix.as_str()))
    }
}

/// Running totals produced by a scan, folded into the final `ScanMeta`.
#[derive(Clone, Copy, Debug, Default)]
pub struct ScanCounts {
    pub classes_scanned: usize,
    pub archives_scanned: usize,
}

/// Scans `project_root` for `.class` artifacts (walking the directory tree
/// directly) and every archive in `dependency_archives`, decoding each into a
/// `ClassNode` and assigning `is_project` per `filter`.
pub fn scan_project(
    project_root: &Path,
    dependency_archives: &[PathBuf],
    filter: &ProjectFilter,
) -> Result<(Vec<ClassNode>, ScanCounts)> {
    let mut classes = Vec::new();
    let mut counts = ScanCounts::default();

    scan_directory_tree(project_root, filter, &mut classes, &mut counts)?;

    for archive_path in dependency_archives {
        scan_archive(archive_path, filter, &mut classes, &mut counts)?;
    }

    Ok((classes, counts))
}

fn scan_directory_tree(
    root: &Path,
    filter: &ProjectFilter,
    classes: &mut Vec<ClassNode>,
    counts: &mut ScanCounts,
) -> Result<()> {
    for entry in walkdir::WalkDir::new(root) {
        let entry = entry.map_err(|source| Error::Walk {
            path: root.to_path_buf(),
            source,
        })?;
        if !entry.file_type().is_file() {
            continue;
        }
        let path = entry.path();
        let is_archive = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ARCHIVE_EXTENSIONS.iter().any(|a| a.eq_ignore_ascii_case(ext)));
        if is_archive {
            scan_archive(path, filter, classes, counts)?;
            continue;
        }
        if path.extension().and_then(|e| e.to_str()) != Some("class") {
            continue;
        }

        match std::fs::read(path) {
            Ok(bytes) => decode_into(&bytes, path.display().to_string(), filter, classes, counts),
            Err(err) => {
                tracing::warn!(path = %path.display(), error = %err, "skipping unreadable class artifact");
            }
        }
    }
    Ok(())
}

fn scan_archive(
    path: &Path,
    filter: &ProjectFilter,
    classes: &mut Vec<ClassNode>,
    counts: &mut ScanCounts,
) -> Result<()> {
    let archive = Archive::new(path);
    let entries = match archive.class_entries() {
        Ok(entries) => entries,
        Err(err) => {
            tracing::warn!(path = %path.display(), error = %err, "skipping unreadable archive");
            return Ok(());
        }
    };
    counts.archives_scanned += 1;
    for entry in entries {
        decode_into(&entry.bytes, format!("{}!{}", path.display(), entry.name), filter, classes, counts);
    }
    Ok(())
}

fn decode_into(
    bytes: &[u8],
    source_label: String,
    filter: &ProjectFilter,
    classes: &mut Vec<ClassNode>,
    counts: &mut ScanCounts,
) {
    match statescan_classfile::decode_class(bytes) {
        Ok(mut node) => {
            node.is_project = filter.is_project(node.name.as_str());
            counts.classes_scanned += 1;
            classes.push(node);
        }
        Err(err) => {
            tracing::warn!(source = %source_label, error = %err, "skipping unreadable class artifact");
        }
    }
}

/// Whether `canonical_name` falls in a standard runtime namespace
/// (`java.`, `javax.`, `sun.`, `jdk.`), re-exported for callers that only
/// depend on `statescan-scan`.
pub fn is_runtime_class(canonical_name: &str) -> bool {
    is_runtime_namespace(canonical_name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn project_filter_respects_include_exclude_and_shading() {
        let filter = ProjectFilter::new(
            vec!["com.example.".to_string()],
            vec!["com.example.generated.".to_string()],
            vec![],
        );
        assert!(filter.is_project("com.example.Service"));
        assert!(!filter.is_project("com.example.generated.Stub"));
        assert!(!filter.is_project("com.other.Thing"));
        assert!(!filter.is_project("com.example.shade.guava.Lists"));
    }

    #[test]
    fn root_packages_admit_dependency_classes_as_project_equivalent() {
        let filter = ProjectFilter::new(
            vec!["com.example.".to_string()],
            vec![],
            vec!["com.example.vendored.".to_string()],
        );
        assert!(filter.is_project("com.example.vendored.Helper"));
    }

    #[test]
    fn scans_directory_tree_and_marks_project_classes() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("com/example")).unwrap();
        // A minimal empty class body would fail to parse; this test only
        // exercises the walk + skip-on-failure path since building a valid
        // class byte stream is covered by statescan-classfile's own tests.
        std::fs::write(dir.path().join("com/example/Broken.class"), b"not a class").unwrap();

        let filter = ProjectFilter::new(vec!["com.example.".to_string()], vec![], vec![]);
        let (classes, counts) = scan_project(dir.path(), &[], &filter).unwrap();
        assert!(classes.is_empty());
        assert_eq!(counts.classes_scanned, 0);
    }
}
