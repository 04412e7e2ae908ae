//! Recognition set for mutating filesystem operations, in the same spirit
//! as `statescan_model::mutability`'s built-in type families: a fixed list
//! of standard-library method names that write to local disk, which is
//! itself the thing that breaks horizontal scaling (every instance has its
//! own disk).

use std::collections::HashSet;
use std::sync::OnceLock;

fn file_owners() -> &'static HashSet<&'static str> {
    static SET: OnceLock<HashSet<&'static str>> = OnceLock::new();
    SET.get_or_init(|| {
        [
            "java.io.File",
            "java.nio.file.Files",
            "java.io.FileOutputStream",
            "java.io.FileWriter",
            "java.io.RandomAccessFile",
        ]
        .into_iter()
        .collect()
    })
}

fn mutating_methods() -> &'static HashSet<&'static str> {
    static SET: OnceLock<HashSet<&'static str>> = OnceLock::new();
    SET.get_or_init(|| {
        [
            "delete",
            "deleteIfExists",
            "write",
            "writeString",
            "move",
            "copy",
            "createFile",
            "createDirectory",
            "createDirectories",
            "createTempFile",
            "createTempDirectory",
            "mkdir",
            "mkdirs",
            "renameTo",
            "createNewFile",
            "setLastModified",
            "setExecutable",
            "setReadable",
            "setWritable",
        ]
        .into_iter()
        .collect()
    })
}

/// True if `owner.method` is a recognized disk-mutating operation.
pub fn is_mutating_file_operation(owner: &str, method: &str) -> bool {
    file_owners().contains(owner) && mutating_methods().contains(method)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recognizes_files_write() {
        assert!(is_mutating_file_operation("java.nio.file.Files", "write"));
    }

    #[test]
    fn does_not_flag_read_operations() {
        assert!(!is_mutating_file_operation("java.nio.file.Files", "readAllBytes"));
    }

    #[test]
    fn does_not_flag_unrelated_owners() {
        assert!(!is_mutating_file_operation("java.lang.String", "write"));
    }
}
