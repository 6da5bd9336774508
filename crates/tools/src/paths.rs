//! Path Resolution
//!
//! Two concerns live here:
//!
//! - `validate_path`: the confinement check every filesystem tool runs its
//!   path argument through. Relative paths resolve against the session's
//!   working directory, `..` components are folded lexically, and anything
//!   escaping the project root is rejected.
//! - `PathResolver`: the explicit resolution service the orchestrator uses
//!   when a recorded relative path has gone stale. Fallbacks run in a fixed
//!   order — exact join, basename match in the known-file registry, bounded
//!   directory scan — and "not found" is a typed outcome, not a guess.

use std::path::{Component, Path, PathBuf};

/// Directories a bounded scan never descends into.
const SCAN_SKIP_DIRS: &[&str] = &["node_modules", "target", "dist", "build", ".git"];

// ============================================================================
// validate_path
// ============================================================================

/// Resolve a tool's path argument and confine it to the project root.
///
/// Returns the absolute path on success, or an error string suitable for
/// folding back to the model.
pub fn validate_path(
    path_str: &str,
    working_dir: &Path,
    project_root: &Path,
) -> Result<PathBuf, String> {
    if path_str.trim().is_empty() {
        return Err("Path is empty".to_string());
    }

    let path = Path::new(path_str);
    let joined = if path.is_absolute() {
        path.to_path_buf()
    } else {
        working_dir.join(path)
    };

    let normalized = normalize_lexically(&joined);
    if !normalized.starts_with(project_root) {
        return Err(format!(
            "Path escapes project root: {}",
            path_str
        ));
    }
    Ok(normalized)
}

/// Fold `.` and `..` components without touching the filesystem, so the
/// confinement check cannot be bypassed through non-existent paths.
fn normalize_lexically(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                out.pop();
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}

// ============================================================================
// PathResolver
// ============================================================================

/// How a path was (or was not) resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// The relative path exists exactly where expected.
    Exact(PathBuf),
    /// A registry entry with the same basename exists on disk.
    Registry(PathBuf),
    /// A bounded directory scan located the basename.
    Scan(PathBuf),
    /// No strategy located the file.
    NotFound,
}

impl Resolution {
    /// The resolved path, when one was found.
    pub fn path(&self) -> Option<&Path> {
        match self {
            Self::Exact(p) | Self::Registry(p) | Self::Scan(p) => Some(p),
            Self::NotFound => None,
        }
    }
}

/// Resolves possibly-stale relative paths against the project.
pub struct PathResolver {
    project_root: PathBuf,
    /// Relative paths the session already knows about (generated files).
    registry: Vec<String>,
    /// Depth bound for the scan fallback.
    max_scan_depth: usize,
}

impl PathResolver {
    pub fn new(project_root: impl AsRef<Path>) -> Self {
        Self {
            project_root: project_root.as_ref().to_path_buf(),
            registry: Vec::new(),
            max_scan_depth: 4,
        }
    }

    /// Replace the known-file registry (relative paths).
    pub fn with_registry(mut self, registry: Vec<String>) -> Self {
        self.registry = registry;
        self
    }

    pub fn with_max_scan_depth(mut self, depth: usize) -> Self {
        self.max_scan_depth = depth;
        self
    }

    /// Resolve a relative path with the fixed fallback order.
    pub fn resolve(&self, relative: &str) -> Resolution {
        // 1. Exact location.
        let exact = self.project_root.join(relative);
        if exact.is_file() {
            return Resolution::Exact(exact);
        }

        // 2. Registry basename match.
        let basename = Path::new(relative)
            .file_name()
            .map(|n| n.to_string_lossy().into_owned());
        if let Some(ref basename) = basename {
            for known in &self.registry {
                if known == relative {
                    continue;
                }
                let known_base = Path::new(known).file_name().map(|n| n.to_string_lossy());
                if known_base.as_deref() == Some(basename.as_str()) {
                    let candidate = self.project_root.join(known);
                    if candidate.is_file() {
                        return Resolution::Registry(candidate);
                    }
                }
            }
        }

        // 3. Bounded scan.
        if let Some(ref basename) = basename {
            if let Some(found) = self.scan_for(basename, &self.project_root, self.max_scan_depth) {
                return Resolution::Scan(found);
            }
        }

        Resolution::NotFound
    }

    fn scan_for(&self, basename: &str, dir: &Path, depth: usize) -> Option<PathBuf> {
        let entries = std::fs::read_dir(dir).ok()?;
        let mut subdirs = Vec::new();
        for entry in entries.flatten() {
            let path = entry.path();
            let name = entry.file_name().to_string_lossy().into_owned();
            if path.is_file() {
                if name == basename {
                    return Some(path);
                }
            } else if path.is_dir()
                && depth > 0
                && !name.starts_with('.')
                && !SCAN_SKIP_DIRS.contains(&name.as_str())
            {
                subdirs.push(path);
            }
        }
        for subdir in subdirs {
            if let Some(found) = self.scan_for(basename, &subdir, depth - 1) {
                return Some(found);
            }
        }
        None
    }
}
