use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Recursively collect files under `root` that have `extension`.
///
/// Missing directories are treated as empty.
pub fn collect_files_with_extension(root: &Path, extension: &str) -> io::Result<Vec<PathBuf>> {
    if !root.is_dir() {
        return Ok(Vec::new());
    }

    let mut files = Vec::new();
    let mut pending = vec![root.to_path_buf()];

    while let Some(dir) = pending.pop() {
        let entries = match fs::read_dir(&dir) {
            Ok(entries) => entries,
            Err(err) if err.kind() == io::ErrorKind::NotFound => continue,
            Err(err) => return Err(err),
        };

        for entry in entries {
            let entry = entry?;
            let file_type = entry.file_type()?;
            let path = entry.path();

            if file_type.is_dir() {
                pending.push(path);
                continue;
            }

            if file_type.is_file() && path.extension().is_some_and(|ext| ext == extension) {
                files.push(path);
            }
        }
    }

    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collects_matching_extension_only() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("Foo.class"), b"").unwrap();
        fs::write(dir.path().join("readme.txt"), b"").unwrap();
        let nested = dir.path().join("pkg");
        fs::create_dir(&nested).unwrap();
        fs::write(nested.join("Bar.class"), b"").unwrap();

        let mut found = collect_files_with_extension(dir.path(), "class").unwrap();
        found.sort();

        assert_eq!(found.len(), 2);
        assert!(found.iter().all(|p| p.extension().unwrap() == "class"));
    }

    #[test]
    fn missing_directory_yields_empty_result() {
        let missing = Path::new("/nonexistent/statescan-core-test-path");
        assert_eq!(
            collect_files_with_extension(missing, "class").unwrap(),
            Vec::<PathBuf>::new()
        );
    }
}
