use std::path::{Path, PathBuf};

use rayon::prelude::*;

use crate::error::Result;

/// A named group of document bodies, ready for ingestion.
///
/// The name comes from a top-level directory and doubles as the target
/// collection name.
#[derive(Debug, Clone)]
pub struct DocumentGroup {
    pub name: String,
    pub documents: Vec<String>,
}

/// Supported file extensions for document discovery.
const SUPPORTED_EXTENSIONS: &[&str] = &["md", "txt"];

/// Walk a base directory and build one [`DocumentGroup`] per top-level
/// subdirectory.
///
/// Files anywhere under a subdirectory contribute their trimmed content;
/// files that are unreadable, non-text, or empty after trimming are
/// dropped. Hidden files and directories (names starting with `.`) are
/// skipped. Groups that end up with no documents are omitted entirely.
///
/// Groups are returned in lexicographic name order, and files within a
/// group are read in sorted path order, so repeated runs over the same
/// tree see the same input.
pub fn load_groups(base: &Path) -> Result<Vec<DocumentGroup>> {
    let mut entries: Vec<_> = std::fs::read_dir(base)?
        .collect::<std::io::Result<Vec<_>>>()?;
    entries.sort_by_key(|entry| entry.file_name());

    let mut groups = Vec::new();

    for entry in entries {
        let name = entry.file_name().to_string_lossy().to_string();
        if name.starts_with('.') {
            continue;
        }
        if !entry.file_type()?.is_dir() {
            continue;
        }

        let mut files = Vec::new();
        collect_files(&entry.path(), &mut files)?;
        files.sort();

        // Read file contents in parallel; order is preserved by rayon.
        let documents: Vec<String> = files
            .par_iter()
            .filter_map(|path| {
                let content = std::fs::read_to_string(path).ok()?;
                let trimmed = content.trim();
                (!trimmed.is_empty()).then(|| trimmed.to_string())
            })
            .collect();

        if !documents.is_empty() {
            groups.push(DocumentGroup { name, documents });
        }
    }

    Ok(groups)
}

fn collect_files(dir: &Path, results: &mut Vec<PathBuf>) -> Result<()> {
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        let file_name = entry.file_name();
        let name = file_name.to_string_lossy();

        // Skip hidden files and directories.
        if name.starts_with('.') {
            continue;
        }

        let file_type = entry.file_type()?;
        if file_type.is_dir() {
            collect_files(&entry.path(), results)?;
        } else if file_type.is_file() && is_supported(&entry.path()) {
            results.push(entry.path());
        }
    }

    Ok(())
}

fn is_supported(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| SUPPORTED_EXTENSIONS.contains(&ext))
}
