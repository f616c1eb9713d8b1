//! Path/pattern classification engine.

use std::collections::HashMap;

use serde::ser::{Serialize, SerializeMap, SerializeStruct, Serializer};

use crate::resolver::{FsGlobResolver, GlobResolver};
use crate::spec::{EnumEntryKind, MoreFsError, SpecEntry};

/// Ordered, deduplicated classification of literal paths and glob patterns.
///
/// Every call to [`FileSet::add`] (including the one made by the
/// constructors) runs in two phases: inputs that exist as literal paths are
/// recorded first, in input order; the rest are expanded as glob patterns
/// afterwards. A pattern that matches nothing is recorded verbatim as
/// [`EnumEntryKind::Missing`].
///
/// A path is recorded at most once. The dedup key is the path string as
/// probed or as returned by the resolver, without normalization, so
/// `a/b` and `a//b` are distinct entries.
#[derive(Debug, Clone)]
pub struct FileSet<R = FsGlobResolver> {
    resolver: R,
    l_entries: Vec<SpecEntry>,
    dict_index: HashMap<String, usize>,
}

impl FileSet<FsGlobResolver> {
    /// Classify `files` against the filesystem with default glob options.
    pub fn new<I, S>(files: I) -> Result<Self, MoreFsError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self::with_resolver(files, FsGlobResolver::default())
    }
}

impl<R: GlobResolver> FileSet<R> {
    /// Classify `files` using a custom resolver.
    pub fn with_resolver<I, S>(files: I, resolver: R) -> Result<Self, MoreFsError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut file_set = Self {
            resolver,
            l_entries: Vec::new(),
            dict_index: HashMap::new(),
        };
        file_set.add(files)?;
        Ok(file_set)
    }

    /// Merge more inputs into the set.
    ///
    /// Paths already recorded are never reclassified. On error the entries
    /// recorded before the failing probe stay in the set.
    pub fn add<I, S>(&mut self, files: I) -> Result<(), MoreFsError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut l_direct: Vec<String> = Vec::new();
        let mut l_remainder: Vec<String> = Vec::new();
        for file in files {
            let file = file.as_ref();
            if self.resolver.probe_exists(file)? {
                l_direct.push(file.to_string());
            } else {
                l_remainder.push(file.to_string());
            }
        }
        tracing::debug!(
            n_direct = l_direct.len(),
            n_remainder = l_remainder.len(),
            "classifying inputs"
        );

        for path in l_direct {
            if self.dict_index.contains_key(&path) {
                tracing::trace!(%path, "duplicate literal path skipped");
                continue;
            }
            let kind = if self.resolver.probe_is_directory(&path)? {
                EnumEntryKind::Directory
            } else {
                EnumEntryKind::File
            };
            self.record(path, kind);
        }

        for pattern in l_remainder {
            let l_matches = self.resolver.expand_glob(&pattern)?;
            if l_matches.is_empty() {
                self.record(pattern, EnumEntryKind::Missing);
                continue;
            }
            for spec_match in l_matches {
                self.record(spec_match.path, spec_match.kind);
            }
        }
        Ok(())
    }

    fn record(&mut self, path: String, kind: EnumEntryKind) -> bool {
        if self.dict_index.contains_key(&path) {
            tracing::trace!(%path, "duplicate path skipped");
            return false;
        }
        tracing::trace!(%path, kind = kind.code(), "entry recorded");
        self.dict_index.insert(path.clone(), self.l_entries.len());
        self.l_entries.push(SpecEntry { path, kind });
        true
    }
}

impl<R> FileSet<R> {
    /// All entries in discovery order.
    pub fn entries(&self) -> &[SpecEntry] {
        &self.l_entries
    }

    /// Existing non-directory paths.
    pub fn files(&self) -> Vec<&str> {
        self.paths_of_kind(EnumEntryKind::File)
    }

    /// Existing directory paths.
    pub fn dirs(&self) -> Vec<&str> {
        self.paths_of_kind(EnumEntryKind::Directory)
    }

    /// Inputs that matched nothing, verbatim.
    pub fn not_existing(&self) -> Vec<&str> {
        self.paths_of_kind(EnumEntryKind::Missing)
    }

    /// Kind recorded for `path`, if any.
    pub fn kind_of(&self, path: &str) -> Option<EnumEntryKind> {
        self.dict_index.get(path).map(|&idx| self.l_entries[idx].kind)
    }

    pub fn len(&self) -> usize {
        self.l_entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.l_entries.is_empty()
    }

    fn paths_of_kind(&self, kind: EnumEntryKind) -> Vec<&str> {
        self.l_entries
            .iter()
            .filter(|e| e.kind == kind)
            .map(|e| e.path.as_str())
            .collect()
    }
}

struct StatsView<'a>(&'a [SpecEntry]);

impl Serialize for StatsView<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for entry in self.0 {
            map.serialize_entry(&entry.path, &entry.kind)?;
        }
        map.end()
    }
}

impl<R> Serialize for FileSet<R> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("FileSet", 4)?;
        state.serialize_field("stats", &StatsView(&self.l_entries))?;
        state.serialize_field("files", &self.files())?;
        state.serialize_field("dirs", &self.dirs())?;
        state.serialize_field("notExisting", &self.not_existing())?;
        state.end()
    }
}
