//! Keyword search over the user's documents.
//!
//! Text-like files are matched on content, binary document formats on
//! filename only. Results are capped; the flow layer handles paging and
//! selection.

use crate::config::FileSearchConfig;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use walkdir::WalkDir;

/// Document extensions considered during a search.
const SEARCH_EXTENSIONS: &[&str] = &["txt", "pdf", "docx", "doc", "xlsx", "xls", "pptx", "ppt"];
/// Extensions whose content is scanned directly.
const TEXT_EXTENSIONS: &[&str] = &["txt"];

/// One matching document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileHit {
    /// Full path, used for opening.
    pub path: PathBuf,
    /// Filename shown and read out.
    pub name: String,
    /// Parent directory name for disambiguation.
    pub folder: String,
}

/// Search state carried between turns: a follow-up "open number three"
/// or "show all" only makes sense right after a search.
#[derive(Debug, Default)]
pub struct FileSearchSession {
    /// Results of the most recent search.
    pub last_results: Vec<FileHit>,
    /// Keyword that produced them.
    pub last_keyword: String,
    /// True while the assistant is waiting for a selection.
    pub in_selection_mode: bool,
}

impl FileSearchSession {
    /// Record a fresh set of results and enter selection mode.
    pub fn begin(&mut self, keyword: &str, results: Vec<FileHit>) {
        self.in_selection_mode = !results.is_empty();
        self.last_keyword = keyword.to_owned();
        self.last_results = results;
    }

    /// Leave selection mode, keeping nothing.
    pub fn reset(&mut self) {
        self.last_results.clear();
        self.last_keyword.clear();
        self.in_selection_mode = false;
    }
}

/// Walks configured roots looking for documents that mention a keyword.
pub struct FileSearchManager {
    roots: Vec<PathBuf>,
    skip_dirs: Vec<String>,
    max_results: usize,
}

impl FileSearchManager {
    /// Build a manager from config; empty roots default to the home
    /// directory.
    #[must_use]
    pub fn new(config: &FileSearchConfig) -> Self {
        let roots = if config.roots.is_empty() {
            dirs::home_dir().into_iter().collect()
        } else {
            config.roots.clone()
        };
        Self {
            roots,
            skip_dirs: config.skip_dirs.clone(),
            max_results: config.max_results,
        }
    }

    /// Search all roots for documents matching `keyword`.
    #[must_use]
    pub fn search(&self, keyword: &str) -> Vec<FileHit> {
        let needle = keyword.to_lowercase();
        let mut hits = Vec::new();

        for root in &self.roots {
            debug!(root = %root.display(), keyword, "searching");
            let walker = WalkDir::new(root).into_iter().filter_entry(|entry| {
                entry.depth() == 0
                    || entry.file_name().to_str().is_none_or(|name| {
                        !self.skip_dirs.iter().any(|skip| skip == name) && !name.starts_with('.')
                    })
            });

            for entry in walker.filter_map(std::result::Result::ok) {
                if hits.len() >= self.max_results {
                    info!(keyword, count = hits.len(), "result cap reached");
                    return hits;
                }
                if !entry.file_type().is_file() {
                    continue;
                }
                let path = entry.path();
                if Self::matches(path, &needle) {
                    hits.push(Self::hit_for(path));
                }
            }
        }

        info!(keyword, count = hits.len(), "search finished");
        hits
    }

    fn matches(path: &Path, needle: &str) -> bool {
        let Some(ext) = path.extension().and_then(|e| e.to_str()) else {
            return false;
        };
        let ext = ext.to_lowercase();
        if !SEARCH_EXTENSIONS.contains(&ext.as_str()) {
            return false;
        }

        let name_matches = path
            .file_name()
            .and_then(|n| n.to_str())
            .is_some_and(|n| n.to_lowercase().contains(needle));

        if TEXT_EXTENSIONS.contains(&ext.as_str()) {
            name_matches
                || std::fs::read_to_string(path)
                    .is_ok_and(|body| body.to_lowercase().contains(needle))
        } else {
            name_matches
        }
    }

    fn hit_for(path: &Path) -> FileHit {
        let name = path
            .file_name()
            .map_or_else(String::new, |n| n.to_string_lossy().into_owned());
        let folder = path
            .parent()
            .and_then(Path::file_name)
            .map_or_else(String::new, |n| n.to_string_lossy().into_owned());
        FileHit {
            path: path.to_path_buf(),
            name,
            folder,
        }
    }
}

/// Open a document with the desktop's default application.
#[must_use]
pub fn open_file(hit: &FileHit) -> String {
    if let Err(e) = open::that(&hit.path) {
        warn!(path = %hit.path.display(), "failed to open file: {e}");
        return format!("Sorry, I couldn't open {}: {e}", hit.name);
    }
    format!("Opening {}", hit.name)
}
