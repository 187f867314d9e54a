//! File name guard for reads under a fixed root directory.
//!
//! The pipeline is: coarse pre-filter, extension allowlist, join onto the
//! canonical root, canonicalize, containment. The pre-filter turns away the
//! obvious traversal shapes early; containment is the check that holds when
//! the pre-filter is bypassed (a symlink inside the root, for instance).

use std::fmt;
use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;

use super::{Guard, GuardResult};
use crate::policy::FilePathPolicy;
use crate::{Rejection, RejectionKind, Tainted, Verified};

const MALFORMED: Rejection =
    Rejection::new(RejectionKind::MalformedInput, "file name is empty or contains path syntax");
const DISALLOWED: Rejection =
    Rejection::new(RejectionKind::DisallowedType, "file extension not allowed");
const ESCAPE: Rejection =
    Rejection::new(RejectionKind::PathEscape, "path resolves outside root");

/// An absolute, symlink-resolved path strictly inside the policy root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CanonicalPath(PathBuf);

impl CanonicalPath {
    /// The resolved path.
    pub fn as_path(&self) -> &Path {
        &self.0
    }

    /// Lower-case extension without the dot.
    pub fn extension(&self) -> Option<String> {
        extension_of(&self.0)
    }
}

impl AsRef<Path> for CanonicalPath {
    fn as_ref(&self) -> &Path {
        &self.0
    }
}

impl fmt::Display for CanonicalPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.display().fmt(f)
    }
}

fn extension_of(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase)
}

fn prefilter(name: &str) -> Result<(), Rejection> {
    if name.is_empty()
        || name.contains("..")
        || name.contains('/')
        || name.contains('\\')
        || name.contains('\0')
    {
        return Err(MALFORMED);
    }
    Ok(())
}

/// Resolves `candidate` the way the filesystem will on open.
///
/// A target that does not exist yet keeps its lexical form; the read will
/// fail with not-found. A dangling symlink does not get that treatment: its
/// destination is unknown, so it is treated as an escape.
fn resolve(candidate: &Path) -> Result<PathBuf, Rejection> {
    match fs::canonicalize(candidate) {
        Ok(resolved) => Ok(resolved),
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            if fs::symlink_metadata(candidate).is_ok() {
                Err(ESCAPE)
            } else {
                Ok(candidate.to_path_buf())
            }
        }
        Err(_) => Err(ESCAPE),
    }
}

fn contained(root: &Path, resolved: &Path) -> bool {
    match resolved.strip_prefix(root) {
        Ok(relative) => {
            let mut components = relative.components().peekable();
            components.peek().is_some()
                && components.all(|c| matches!(c, Component::Normal(_)))
        }
        Err(_) => false,
    }
}

/// Admits a client-supplied file name if it names an allowed file type
/// strictly inside the policy root.
///
/// # Examples
///
/// ```
/// use input_guard::{FilePathGuard, FilePathPolicy, Guard, RejectionKind, Tainted};
///
/// let root = tempfile::tempdir().unwrap();
/// let guard = FilePathGuard::new(FilePathPolicy::new(root.path(), [".png"]).unwrap());
///
/// let ok = guard.check(Tainted::new("logo.png".to_string())).unwrap();
/// assert!(ok.as_ref().as_path().starts_with(root.path().canonicalize().unwrap()));
///
/// let err = guard.check(Tainted::new("../../etc/passwd".to_string())).unwrap_err();
/// assert_eq!(err.kind(), RejectionKind::MalformedInput);
/// ```
#[derive(Debug, Clone)]
pub struct FilePathGuard {
    policy: Arc<FilePathPolicy>,
}

impl FilePathGuard {
    /// Creates a guard over the given policy.
    pub fn new(policy: FilePathPolicy) -> Self {
        Self {
            policy: Arc::new(policy),
        }
    }

    /// Canonical root directory.
    pub fn root(&self) -> &Path {
        self.policy.root()
    }
}

impl Guard for FilePathGuard {
    type Output = CanonicalPath;

    const NAME: &'static str = "file_path";

    fn check(&self, input: Tainted<String>) -> GuardResult<CanonicalPath> {
        let name = input.peek();
        prefilter(name)?;

        match extension_of(Path::new(name)) {
            Some(ext) if self.policy.allows_extension(&ext) => {}
            _ => return Err(DISALLOWED),
        }

        let root = self.policy.root();
        let resolved = resolve(&root.join(name))?;
        if !contained(root, &resolved) {
            return Err(ESCAPE);
        }

        Ok(Verified::new_unchecked(CanonicalPath(resolved)))
    }
}
