//! Folder tree scanning.
//!
//! Walks the library root and builds an immutable tree of folders, marking
//! the ones that directly contain playable tracks.

use std::ffi::OsStr;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::ScanError;

/// Depth past which subfolders are no longer entered.
const MAX_SCAN_DEPTH: usize = 64;

/// Case-insensitive allowlist of playable file extensions.
#[derive(Clone, Debug)]
pub struct TrackFilter {
    extensions: Vec<String>,
}

impl Default for TrackFilter {
    fn default() -> Self {
        TrackFilter::new(["mp3"])
    }
}

impl TrackFilter {
    pub fn new<I, S>(extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            extensions: extensions
                .into_iter()
                .map(|ext| ext.as_ref().trim_start_matches('.').to_ascii_lowercase())
                .collect(),
        }
    }

    /// Whether a path names a playable track.
    pub fn matches(&self, path: &Path) -> bool {
        let Some(ext) = path.extension().and_then(OsStr::to_str) else {
            return false;
        };
        let ext = ext.to_ascii_lowercase();
        self.extensions.iter().any(|allowed| *allowed == ext)
    }
}

/// One folder in the scanned tree, immutable after the scan.
#[derive(Clone, Debug)]
pub struct FolderNode {
    path: PathBuf,
    is_leaf: bool,
    children: Vec<FolderNode>,
}

impl FolderNode {
    pub fn path(&self) -> &Path {
        self.path.as_path()
    }

    /// Display name derived from the last path component.
    pub fn name(&self) -> String {
        self.path
            .file_name()
            .and_then(OsStr::to_str)
            .unwrap_or("<unknown>")
            .to_string()
    }

    /// Whether this folder directly contains at least one playable track.
    pub fn is_leaf(&self) -> bool {
        self.is_leaf
    }

    /// Subfolders, sorted case-insensitively by name.
    pub fn children(&self) -> &[FolderNode] {
        self.children.as_slice()
    }
}

/// Scanned folder tree rooted at the library directory.
#[derive(Clone, Debug)]
pub struct FolderTree {
    root: FolderNode,
}

impl FolderTree {
    /// Scan the library root and build a new tree.
    ///
    /// Unreadable folders are kept as childless nodes; only a missing or
    /// non-directory root fails the scan.
    pub fn scan(root: &Path, filter: &TrackFilter) -> Result<FolderTree, ScanError> {
        let root = root
            .canonicalize()
            .map_err(|_| ScanError::NotADirectory(root.to_path_buf()))?;
        if !root.is_dir() {
            return Err(ScanError::NotADirectory(root));
        }

        tracing::info!(root = %root.display(), "scanning folder tree");
        let tree = FolderTree {
            root: scan_folder(&root, filter, 0),
        };
        tracing::info!(
            root = %tree.root.path.display(),
            folders = tree.walk().count(),
            "folder scan complete"
        );
        Ok(tree)
    }

    pub fn root(&self) -> &FolderNode {
        &self.root
    }

    /// Visit every folder in preorder, parents before children.
    pub fn walk(&self) -> Walk<'_> {
        Walk {
            stack: vec![&self.root],
        }
    }

    /// Find a folder by its scanned path.
    pub fn find(&self, path: &Path) -> Option<&FolderNode> {
        self.walk().find(|node| node.path == path)
    }
}

/// Preorder iterator over a folder tree.
pub struct Walk<'a> {
    stack: Vec<&'a FolderNode>,
}

impl<'a> Iterator for Walk<'a> {
    type Item = &'a FolderNode;

    fn next(&mut self) -> Option<&'a FolderNode> {
        let node = self.stack.pop()?;
        for child in node.children.iter().rev() {
            self.stack.push(child);
        }
        Some(node)
    }
}

fn scan_folder(dir: &Path, filter: &TrackFilter, depth: usize) -> FolderNode {
    let mut is_leaf = false;
    let mut subdirs: Vec<(String, PathBuf)> = Vec::new();

    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(err) => {
            tracing::warn!(path = %dir.display(), error = %err, "skipping unreadable folder");
            return FolderNode {
                path: dir.to_path_buf(),
                is_leaf: false,
                children: Vec::new(),
            };
        }
    };

    for entry in entries {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) => {
                tracing::warn!(path = %dir.display(), error = %err, "skipping unreadable entry");
                continue;
            }
        };
        // file_type() does not follow symlinks, so link cycles are never entered.
        let file_type = match entry.file_type() {
            Ok(file_type) => file_type,
            Err(err) => {
                tracing::warn!(path = %entry.path().display(), error = %err, "skipping unreadable entry");
                continue;
            }
        };
        let path = entry.path();
        if file_type.is_dir() {
            let name = path
                .file_name()
                .and_then(OsStr::to_str)
                .unwrap_or("<unknown>")
                .to_lowercase();
            subdirs.push((name, path));
        } else if file_type.is_file() && filter.matches(&path) {
            is_leaf = true;
        }
    }

    if depth >= MAX_SCAN_DEPTH && !subdirs.is_empty() {
        tracing::warn!(path = %dir.display(), depth, "folder tree too deep, not descending");
        subdirs.clear();
    }

    subdirs.sort_by(|a, b| a.0.cmp(&b.0));
    let children = subdirs
        .into_iter()
        .map(|(_, path)| scan_folder(&path, filter, depth + 1))
        .collect();

    FolderNode {
        path: dir.to_path_buf(),
        is_leaf,
        children,
    }
}

/// List playable tracks directly inside a folder, sorted by file name.
pub fn list_tracks(dir: &Path, filter: &TrackFilter) -> Result<Vec<PathBuf>, ScanError> {
    let entries = fs::read_dir(dir).map_err(|source| ScanError::ReadDir {
        path: dir.to_path_buf(),
        source,
    })?;

    let mut tracks: Vec<(String, PathBuf)> = Vec::new();
    for entry in entries {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) => {
                tracing::warn!(path = %dir.display(), error = %err, "skipping unreadable entry");
                continue;
            }
        };
        let file_type = match entry.file_type() {
            Ok(file_type) => file_type,
            Err(_) => continue,
        };
        let path = entry.path();
        if file_type.is_file() && filter.matches(&path) {
            let name = path
                .file_name()
                .and_then(OsStr::to_str)
                .unwrap_or("<unknown>")
                .to_lowercase();
            tracks.push((name, path));
        }
    }

    tracks.sort_by(|a, b| a.0.cmp(&b.0));
    Ok(tracks.into_iter().map(|(_, path)| path).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_root(tag: &str) -> PathBuf {
        let root = std::env::temp_dir().join(format!(
            "ambience-library-{tag}-{}",
            std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .unwrap()
                .as_nanos()
        ));
        let _ = std::fs::create_dir_all(&root);
        root
    }

    #[test]
    fn filter_matches_case_insensitively() {
        let filter = TrackFilter::new(["mp3", "WAV"]);
        assert!(filter.matches(Path::new("/music/a.MP3")));
        assert!(filter.matches(Path::new("/music/b.wav")));
        assert!(!filter.matches(Path::new("/music/c.flac")));
        assert!(!filter.matches(Path::new("/music/noext")));
    }

    #[test]
    fn scan_marks_folders_with_tracks_as_leaves() {
        let root = make_root("leaves");
        let ambient = root.join("ambient");
        let caves = ambient.join("caves");
        let empty = root.join("empty");
        let _ = std::fs::create_dir_all(&caves);
        let _ = std::fs::create_dir_all(&empty);
        let _ = std::fs::write(ambient.join("drips.mp3"), b"test");
        let _ = std::fs::write(caves.join("notes.txt"), b"test");

        let tree = FolderTree::scan(&root, &TrackFilter::default()).expect("scan");
        assert!(!tree.root().is_leaf());

        let ambient_node = tree
            .walk()
            .find(|node| node.name() == "ambient")
            .expect("ambient node");
        assert!(ambient_node.is_leaf());
        assert_eq!(ambient_node.children().len(), 1);
        assert!(!ambient_node.children()[0].is_leaf());

        let empty_node = tree
            .walk()
            .find(|node| node.name() == "empty")
            .expect("empty node");
        assert!(!empty_node.is_leaf());
    }

    #[test]
    fn scan_sorts_children_case_insensitively() {
        let root = make_root("sorted");
        for name in ["Winds", "bells", "Caves"] {
            let _ = std::fs::create_dir_all(root.join(name));
        }

        let tree = FolderTree::scan(&root, &TrackFilter::default()).expect("scan");
        let names = tree
            .root()
            .children()
            .iter()
            .map(|node| node.name())
            .collect::<Vec<_>>();
        assert_eq!(names, vec!["bells", "Caves", "Winds"]);
    }

    #[test]
    fn scan_rejects_missing_root() {
        let missing = std::env::temp_dir().join("ambience-library-definitely-missing");
        let result = FolderTree::scan(&missing, &TrackFilter::default());
        assert!(matches!(result, Err(ScanError::NotADirectory(_))));
    }

    #[test]
    fn scan_rejects_file_root() {
        let root = make_root("fileroot");
        let file = root.join("track.mp3");
        let _ = std::fs::write(&file, b"test");
        let result = FolderTree::scan(&file, &TrackFilter::default());
        assert!(matches!(result, Err(ScanError::NotADirectory(_))));
    }

    #[cfg(unix)]
    #[test]
    fn scan_survives_unreadable_subfolder() {
        use std::os::unix::fs::PermissionsExt;

        let root = make_root("unreadable");
        let locked = root.join("locked");
        let open = root.join("open");
        let _ = std::fs::create_dir_all(&locked);
        let _ = std::fs::create_dir_all(&open);
        let _ = std::fs::write(open.join("wind.mp3"), b"test");
        let _ = std::fs::set_permissions(&locked, std::fs::Permissions::from_mode(0o000));

        let tree = FolderTree::scan(&root, &TrackFilter::default()).expect("scan");
        assert!(tree.walk().any(|node| node.name() == "locked"));
        let open_node = tree
            .walk()
            .find(|node| node.name() == "open")
            .expect("open node");
        assert!(open_node.is_leaf());

        let _ = std::fs::set_permissions(&locked, std::fs::Permissions::from_mode(0o755));
    }

    #[test]
    fn walk_visits_parents_before_children() {
        let root = make_root("walk");
        let _ = std::fs::create_dir_all(root.join("a").join("inner"));
        let _ = std::fs::create_dir_all(root.join("b"));

        let tree = FolderTree::scan(&root, &TrackFilter::default()).expect("scan");
        let names = tree.walk().map(|node| node.name()).collect::<Vec<_>>();
        assert_eq!(names[1..], ["a", "inner", "b"]);
    }

    #[test]
    fn find_locates_nested_folder() {
        let root = make_root("find");
        let inner = root.join("outer").join("inner");
        let _ = std::fs::create_dir_all(&inner);

        let tree = FolderTree::scan(&root, &TrackFilter::default()).expect("scan");
        let canonical = inner.canonicalize().expect("canonicalize");
        assert!(tree.find(&canonical).is_some());
        assert!(tree.find(Path::new("/nope")).is_none());
    }

    #[test]
    fn list_tracks_ignores_subfolders_and_other_files() {
        let root = make_root("list");
        let nested = root.join("nested");
        let _ = std::fs::create_dir_all(&nested);
        let _ = std::fs::write(root.join("b.mp3"), b"test");
        let _ = std::fs::write(root.join("A.mp3"), b"test");
        let _ = std::fs::write(root.join("notes.txt"), b"test");
        let _ = std::fs::write(nested.join("deep.mp3"), b"test");

        let tracks = list_tracks(&root, &TrackFilter::default()).expect("list");
        let names = tracks
            .iter()
            .map(|path| path.file_name().unwrap().to_string_lossy().to_string())
            .collect::<Vec<_>>();
        assert_eq!(names, vec!["A.mp3", "b.mp3"]);
    }

    #[test]
    fn list_tracks_fails_for_missing_folder() {
        let missing = std::env::temp_dir().join("ambience-library-missing-list");
        assert!(matches!(
            list_tracks(&missing, &TrackFilter::default()),
            Err(ScanError::ReadDir { .. })
        ));
    }
}
