use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, error};

/// Expands `~` and makes the directory absolute.
pub fn resolve_dir(dir: &str) -> PathBuf {
    let expanded = PathBuf::from(shellexpand::tilde(dir).as_ref());
    std::path::absolute(&expanded).unwrap_or(expanded)
}

/// Lower cased extensions, each with a leading dot.
pub fn normalize_extensions(extensions: &[String]) -> Vec<String> {
    extensions
        .iter()
        .map(|e| e.trim().to_lowercase())
        .filter(|e| !e.is_empty() && e != ".")
        .map(|e| if e.starts_with('.') { e } else { format!(".{e}") })
        .collect()
}

/// Sorted names of the regular files in `dir` ending with one of `extensions`.
///
/// The comparison ignores case. A missing or unreadable directory is
/// reported and yields an empty list.
pub fn list_files(dir: &Path, extensions: &[String]) -> Vec<String> {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) => {
            println!("Error: Path not found: {}", dir.display());
            error!("Could not list {}: {e}", dir.display());
            return Vec::new();
        }
    };

    let extensions = normalize_extensions(extensions);
    let mut files: Vec<String> = entries
        .filter_map(|entry| entry.ok())
        .filter(|entry| fs::metadata(entry.path()).is_ok_and(|m| m.is_file()))
        .filter_map(|entry| entry.file_name().into_string().ok())
        .filter(|name| {
            let lower = name.to_lowercase();
            extensions.iter().any(|ext| lower.ends_with(ext.as_str()))
        })
        .collect();
    files.sort();
    files.dedup();
    debug!("Found {} matching files in {}", files.len(), dir.display());
    files
}

#[cfg(test)]
mod tests {
    use super::*;

    fn exts() -> Vec<String> {
        vec![".csv".into(), "dat".into(), ".TXT".into()]
    }

    #[test]
    fn lists_matching_files_sorted_and_case_insensitive() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["b.dat", "a.CSV", "notes.Txt", "image.png", "c.csv.bak", "Z.csv"] {
            fs::write(dir.path().join(name), "x").unwrap();
        }
        fs::create_dir(dir.path().join("folder.csv")).unwrap();

        let files = list_files(dir.path(), &exts());
        assert_eq!(files, ["Z.csv", "a.CSV", "b.dat", "notes.Txt"]);
    }

    #[test]
    fn missing_directory_gives_empty_list() {
        let dir = tempfile::tempdir().unwrap();
        assert!(list_files(&dir.path().join("nope"), &exts()).is_empty());
    }

    #[test]
    fn extensions_are_normalized() {
        let normalized = normalize_extensions(&[" CSV".into(), ".Dat".into(), "".into()]);
        assert_eq!(normalized, [".csv", ".dat"]);
    }

    #[test]
    fn resolve_dir_is_absolute() {
        assert!(resolve_dir(".").is_absolute());
        assert!(resolve_dir("~").is_absolute());
    }
}
