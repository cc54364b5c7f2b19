//! Indexed path tracking
//!
//! Canonical paths drop positional components: `a.$.b` and `a.0.b` both
//! become `a.b`. An update planner asks whether a mutated path might touch
//! an indexed one and skips index maintenance when it cannot.

use std::borrow::Cow;
use std::collections::BTreeSet;

/// Elide `.$` and `.<digits>` components after the first.
///
/// Returns the path and whether anything was elided. The first component
/// is never elided, and a component is only elided when it consists
/// entirely of `$` or of digits.
pub fn canonicalize(path: &str) -> (Cow<'_, str>, bool) {
    if !path.contains('.') {
        return (Cow::Borrowed(path), false);
    }
    let bytes = path.as_bytes();
    let mut out = String::with_capacity(path.len());
    let mut kept_from = 0;
    let mut modified = false;
    let mut i = 0;

    while i < bytes.len() {
        if bytes[i] != b'.' || i + 1 == bytes.len() {
            i += 1;
            continue;
        }
        let next = bytes[i + 1];
        let skip_to = if next == b'$' && (i + 2 == bytes.len() || bytes[i + 2] == b'.') {
            Some(i + 2)
        } else if next.is_ascii_digit() {
            let mut j = i + 1;
            while j < bytes.len() && bytes[j].is_ascii_digit() {
                j += 1;
            }
            (j == bytes.len() || bytes[j] == b'.').then_some(j)
        } else {
            None
        };

        match skip_to {
            Some(end) => {
                out.push_str(&path[kept_from..i]);
                kept_from = end;
                i = end;
                modified = true;
            }
            None => i += 1,
        }
    }

    if !modified {
        return (Cow::Borrowed(path), false);
    }
    out.push_str(&path[kept_from..]);
    (Cow::Owned(out), true)
}

/// `a` starts with `prefix` and the match ends at a component boundary
fn starts_with_component(a: &str, prefix: &str) -> bool {
    a.starts_with(prefix) && (a.len() == prefix.len() || a.as_bytes()[prefix.len()] == b'.')
}

/// Set of canonical indexed paths
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IndexPathSet {
    canonical: BTreeSet<String>,
}

impl IndexPathSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_path(&mut self, path: &str) {
        let (canonical, _) = canonicalize(path);
        self.canonical.insert(canonical.into_owned());
    }

    pub fn clear(&mut self) {
        self.canonical.clear();
    }

    /// Whether a change to `path` might affect an indexed path: one is a
    /// component-wise prefix of the other.
    pub fn might_be_indexed(&self, path: &str) -> bool {
        let (path, _) = canonicalize(path);
        self.canonical
            .iter()
            .any(|idx| starts_with_component(&path, idx) || starts_with_component(idx, &path))
    }

    pub fn len(&self) -> usize {
        self.canonical.len()
    }

    pub fn is_empty(&self) -> bool {
        self.canonical.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.canonical.iter().map(String::as_str)
    }
}
