//! Glob resolver adapter: existence probes and pattern expansion.

use std::collections::HashSet;
use std::fs;
use std::io;

use glob::MatchOptions;

use crate::spec::{EnumEntryKind, MoreFsError, SpecGlobMatch, SpecGlobOptions};

/// Filesystem capabilities consumed by [`crate::FileSet`].
///
/// Implementations report directory matches through an explicit
/// [`EnumEntryKind`] tag; the engine never stats glob results itself.
pub trait GlobResolver {
    /// `true` if `path` exists as a literal path.
    fn probe_exists(&self, path: &str) -> Result<bool, MoreFsError>;

    /// `true` if `path` is a directory. Only meaningful after `probe_exists`.
    fn probe_is_directory(&self, path: &str) -> Result<bool, MoreFsError>;

    /// Expand `pattern` into matched paths, each tagged `File` or `Directory`.
    fn expand_glob(&self, pattern: &str) -> Result<Vec<SpecGlobMatch>, MoreFsError>;
}

/// [`GlobResolver`] backed by the real filesystem and the `glob` crate.
#[derive(Debug, Clone, Copy, Default)]
pub struct FsGlobResolver {
    spec_glob_options: SpecGlobOptions,
}

impl FsGlobResolver {
    pub fn new(spec_glob_options: SpecGlobOptions) -> Self {
        Self { spec_glob_options }
    }

    fn match_options(&self) -> MatchOptions {
        MatchOptions {
            case_sensitive: self.spec_glob_options.if_case_sensitive,
            require_literal_separator: self.spec_glob_options.if_literal_separator,
            require_literal_leading_dot: !self.spec_glob_options.if_dot,
        }
    }

    fn expand_one(
        &self,
        pattern: &str,
        if_dirs_only: bool,
    ) -> Result<Vec<SpecGlobMatch>, MoreFsError> {
        let iter_paths = match glob::glob_with(pattern, self.match_options()) {
            Ok(v) => v,
            Err(e) => {
                tracing::debug!(pattern, error = %e, "unparsable glob pattern, treated as no match");
                return Ok(Vec::new());
            }
        };

        let mut l_matches = Vec::new();
        for res_path in iter_paths {
            let path_match = res_path.map_err(|e| {
                let path_err = e.path().to_path_buf();
                MoreFsError::fault(path_err, io::Error::from(e))
            })?;
            let kind = match fs::metadata(&path_match) {
                Ok(meta) if meta.is_dir() => EnumEntryKind::Directory,
                Ok(_) => EnumEntryKind::File,
                // dangling symlink: the link itself matched
                Err(e) if is_not_found(&e) => EnumEntryKind::File,
                Err(e) => return Err(MoreFsError::fault(path_match, e)),
            };
            if if_dirs_only && kind != EnumEntryKind::Directory {
                continue;
            }
            l_matches.push(SpecGlobMatch {
                path: path_match.to_string_lossy().into_owned(),
                kind,
            });
        }
        Ok(l_matches)
    }
}

impl GlobResolver for FsGlobResolver {
    fn probe_exists(&self, path: &str) -> Result<bool, MoreFsError> {
        match fs::metadata(path) {
            Ok(_) => Ok(true),
            Err(e) if is_not_found(&e) => Ok(false),
            Err(e) => Err(MoreFsError::fault(path, e)),
        }
    }

    fn probe_is_directory(&self, path: &str) -> Result<bool, MoreFsError> {
        fs::metadata(path)
            .map(|meta| meta.is_dir())
            .map_err(|e| MoreFsError::fault(path, e))
    }

    /// A trailing `**` matches the base directory and everything below it,
    /// files included (the `glob` crate alone would yield directories only).
    ///
    /// Paths come back as the `glob` crate formats them: a leading `./` is
    /// dropped, so `./d/*` yields `d/e`, while the literal probe of `./d/e`
    /// keeps the prefix. The two spellings are distinct entries in a
    /// [`crate::FileSet`].
    fn expand_glob(&self, pattern: &str) -> Result<Vec<SpecGlobMatch>, MoreFsError> {
        let mut l_matches = Vec::new();
        let mut set_seen = HashSet::new();
        let mut push_unique = |l_found: Vec<SpecGlobMatch>| {
            for spec_match in l_found {
                if set_seen.insert(spec_match.path.clone()) {
                    l_matches.push(spec_match);
                }
            }
        };

        if pattern == "**" {
            push_unique(self.expand_one("**/*", false)?);
        } else if let Some(pattern_base) = pattern.strip_suffix("/**") {
            push_unique(self.expand_one(pattern_base, true)?);
            push_unique(self.expand_one(&format!("{pattern}/*"), false)?);
        } else {
            push_unique(self.expand_one(pattern, false)?);
        }
        Ok(l_matches)
    }
}

/// Expand `pattern` on the filesystem with default match options.
pub fn expand_glob_paths(pattern: &str) -> Result<Vec<String>, MoreFsError> {
    Ok(FsGlobResolver::default()
        .expand_glob(pattern)?
        .into_iter()
        .map(|m| m.path)
        .collect())
}

pub(crate) fn is_not_found(e: &io::Error) -> bool {
    matches!(
        e.kind(),
        io::ErrorKind::NotFound | io::ErrorKind::NotADirectory
    )
}

#[cfg(test)]
mod tests {
    use std::fs;

    use tempfile::TempDir;

    use super::{FsGlobResolver, GlobResolver, expand_glob_paths};
    use crate::spec::{EnumEntryKind, MoreFsError, SpecGlobOptions};

    fn p(dir: &TempDir, rel: &str) -> String {
        dir.path().join(rel).to_string_lossy().into_owned()
    }

    #[test]
    fn probes_report_existence_and_directory() {
        let tmp = TempDir::new().expect("tempdir");
        fs::create_dir(tmp.path().join("d")).expect("mkdir");
        fs::write(tmp.path().join("f.txt"), "x").expect("write");

        let resolver = FsGlobResolver::default();
        assert!(resolver.probe_exists(&p(&tmp, "d")).expect("probe"));
        assert!(resolver.probe_exists(&p(&tmp, "f.txt")).expect("probe"));
        assert!(!resolver.probe_exists(&p(&tmp, "nope")).expect("probe"));
        assert!(!resolver.probe_exists(&p(&tmp, "f.txt/below")).expect("probe"));
        assert!(resolver.probe_is_directory(&p(&tmp, "d")).expect("probe"));
        assert!(!resolver.probe_is_directory(&p(&tmp, "f.txt")).expect("probe"));
    }

    #[test]
    fn expand_glob_tags_directories() {
        let tmp = TempDir::new().expect("tempdir");
        fs::create_dir(tmp.path().join("d")).expect("mkdir");
        fs::write(tmp.path().join("f.txt"), "x").expect("write");

        let l_matches = FsGlobResolver::default()
            .expand_glob(&p(&tmp, "*"))
            .expect("expand");
        assert_eq!(l_matches.len(), 2);
        assert_eq!(l_matches[0].path, p(&tmp, "d"));
        assert_eq!(l_matches[0].kind, EnumEntryKind::Directory);
        assert_eq!(l_matches[1].path, p(&tmp, "f.txt"));
        assert_eq!(l_matches[1].kind, EnumEntryKind::File);
    }

    #[test]
    fn expand_glob_hides_dot_files_unless_enabled() {
        let tmp = TempDir::new().expect("tempdir");
        fs::write(tmp.path().join(".hidden"), "x").expect("write");
        fs::write(tmp.path().join("shown"), "x").expect("write");

        let l_default = expand_glob_paths(&p(&tmp, "*")).expect("expand");
        assert_eq!(l_default, vec![p(&tmp, "shown")]);

        let resolver = FsGlobResolver::new(SpecGlobOptions {
            if_dot: true,
            ..SpecGlobOptions::default()
        });
        let l_dot = resolver.expand_glob(&p(&tmp, "*")).expect("expand");
        assert_eq!(l_dot.len(), 2);
    }

    #[test]
    fn trailing_globstar_includes_base_and_files() {
        let tmp = TempDir::new().expect("tempdir");
        fs::create_dir_all(tmp.path().join("d/sub")).expect("mkdir");
        fs::write(tmp.path().join("d/a.txt"), "x").expect("write");
        fs::write(tmp.path().join("d/sub/b.txt"), "x").expect("write");

        let l_matches = FsGlobResolver::default()
            .expand_glob(&p(&tmp, "d/**"))
            .expect("expand");
        let l_found: Vec<(String, EnumEntryKind)> =
            l_matches.into_iter().map(|m| (m.path, m.kind)).collect();
        assert_eq!(
            l_found,
            vec![
                (p(&tmp, "d"), EnumEntryKind::Directory),
                (p(&tmp, "d/a.txt"), EnumEntryKind::File),
                (p(&tmp, "d/sub"), EnumEntryKind::Directory),
                (p(&tmp, "d/sub/b.txt"), EnumEntryKind::File),
            ]
        );
    }

    #[cfg(unix)]
    #[test]
    fn glob_errors_become_filesystem_faults() {
        use std::os::unix::fs::PermissionsExt;

        let tmp = TempDir::new().expect("tempdir");
        let path_locked = tmp.path().join("locked");
        fs::create_dir_all(path_locked.join("inner")).expect("mkdir");
        fs::set_permissions(&path_locked, fs::Permissions::from_mode(0o000)).expect("chmod");
        if fs::read_dir(&path_locked).is_ok() {
            // running as root, permissions are not enforced
            fs::set_permissions(&path_locked, fs::Permissions::from_mode(0o755)).expect("chmod");
            return;
        }

        let res = FsGlobResolver::default().expand_glob(&p(&tmp, "locked/*"));
        fs::set_permissions(&path_locked, fs::Permissions::from_mode(0o755)).expect("chmod");

        match res {
            Err(MoreFsError::FilesystemFault { path, .. }) => {
                assert!(path.starts_with(&path_locked));
            }
            other => panic!("expected fault, got {other:?}"),
        }
    }

    #[test]
    fn invalid_pattern_yields_no_matches() {
        let l_matches = FsGlobResolver::default()
            .expand_glob("[unclosed")
            .expect("expand");
        assert!(l_matches.is_empty());
    }
}
