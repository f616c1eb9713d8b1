use std::fs;
use std::io;
use std::path::Path;

use globset::{Glob, GlobMatcher};
use regex::Regex;

use crate::spec::{EnumPatternMode, MoreFsError};

////////////////////////////////////////////////////////////////////////////////
// #region PatternMatching

#[derive(Debug, Clone)]
pub(crate) enum TypePatternMatcher {
    Literal(String),
    Glob(GlobMatcher),
    Regex(Regex),
}

impl TypePatternMatcher {
    pub(crate) fn is_match(&self, value: &str) -> bool {
        match self {
            Self::Literal(v) => value.contains(v.as_str()),
            Self::Glob(v) => v.is_match(value),
            Self::Regex(v) => v.is_match(value),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub(crate) struct SpecPathFilter {
    pub(crate) pattern_include: Option<TypePatternMatcher>,
    pub(crate) pattern_exclude: Option<TypePatternMatcher>,
}

impl SpecPathFilter {
    pub(crate) fn from_raw(
        pattern_include: Option<&str>,
        pattern_exclude: Option<&str>,
        rule_pattern: EnumPatternMode,
    ) -> Result<Self, MoreFsError> {
        Ok(Self {
            pattern_include: _compile(pattern_include, rule_pattern)?,
            pattern_exclude: _compile(pattern_exclude, rule_pattern)?,
        })
    }

    /// Included when no include pattern or it matches, and no exclude pattern matches.
    pub(crate) fn should_include(&self, value: &str) -> bool {
        let b_included = self
            .pattern_include
            .as_ref()
            .is_none_or(|p| p.is_match(value));
        let b_excluded = self
            .pattern_exclude
            .as_ref()
            .is_some_and(|p| p.is_match(value));
        b_included && !b_excluded
    }
}

fn _compile(
    pattern: Option<&str>,
    rule_pattern: EnumPatternMode,
) -> Result<Option<TypePatternMatcher>, MoreFsError> {
    let Some(pattern) = pattern else {
        return Ok(None);
    };

    match rule_pattern {
        EnumPatternMode::Literal => Ok(Some(TypePatternMatcher::Literal(pattern.to_string()))),
        EnumPatternMode::Glob => {
            let matcher = Glob::new(pattern)
                .map_err(|e| {
                    MoreFsError::InvalidArgument(format!(
                        "Invalid pattern in include/exclude: {e}"
                    ))
                })?
                .compile_matcher();
            Ok(Some(TypePatternMatcher::Glob(matcher)))
        }
        EnumPatternMode::Regex => {
            let regex = Regex::new(pattern).map_err(|e| {
                MoreFsError::InvalidArgument(format!("Invalid pattern in include/exclude: {e}"))
            })?;
            Ok(Some(TypePatternMatcher::Regex(regex)))
        }
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region FileUtilities

pub(crate) fn copy_file_with_metadata(
    path_file_src: &Path,
    path_file_dst: &Path,
    if_preserve_metadata: bool,
) -> Result<(), io::Error> {
    fs::copy(path_file_src, path_file_dst)?;
    if if_preserve_metadata {
        apply_metadata(path_file_src, path_file_dst)?;
    }
    Ok(())
}

fn apply_metadata(path_file_src: &Path, path_file_dst: &Path) -> Result<(), io::Error> {
    use filetime::{FileTime, set_file_times};

    let stat_src = fs::metadata(path_file_src)?;
    fs::set_permissions(path_file_dst, stat_src.permissions())?;

    let file_time_access = FileTime::from_last_access_time(&stat_src);
    let file_time_modify = FileTime::from_last_modification_time(&stat_src);
    set_file_times(path_file_dst, file_time_access, file_time_modify)?;

    #[cfg(target_os = "linux")]
    copy_xattrs_linux(path_file_src, path_file_dst);
    Ok(())
}

#[cfg(target_os = "linux")]
fn copy_xattrs_linux(path_file_src: &Path, path_file_dst: &Path) {
    let iter_xattr_names = match xattr::list(path_file_src) {
        Ok(v) => v,
        Err(_) => return,
    };

    for name in iter_xattr_names {
        let Some(raw_value) = xattr::get(path_file_src, &name).ok().flatten() else {
            continue;
        };
        if let Err(e) = xattr::set(path_file_dst, &name, &raw_value) {
            tracing::warn!(path = %path_file_dst.display(), error = %e, "xattr not copied");
        }
    }
}

pub(crate) fn calculate_worker_limit(num_workers_max: Option<usize>) -> usize {
    let n_cpu = std::thread::available_parallelism()
        .map(|v| v.get())
        .unwrap_or(1);

    match num_workers_max {
        Some(n) => n.clamp(1, n_cpu),
        None => n_cpu.clamp(1, 8),
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use super::SpecPathFilter;
    use crate::spec::{EnumPatternMode, MoreFsError};

    #[test]
    fn regex_filter_is_unanchored() {
        let spec_filter =
            SpecPathFilter::from_raw(Some(r"\.rs$"), Some("target"), EnumPatternMode::Regex)
                .expect("compile");
        assert!(spec_filter.should_include("src/lib.rs"));
        assert!(!spec_filter.should_include("target/debug/build.rs"));
        assert!(!spec_filter.should_include("README.md"));
    }

    #[test]
    fn glob_filter_matches_whole_path() {
        let spec_filter = SpecPathFilter::from_raw(Some("**/*.txt"), None, EnumPatternMode::Glob)
            .expect("compile");
        assert!(spec_filter.should_include("a/b/c.txt"));
        assert!(!spec_filter.should_include("a/b/c.md"));
    }

    #[test]
    fn literal_filter_is_substring() {
        let spec_filter =
            SpecPathFilter::from_raw(None, Some("skip"), EnumPatternMode::Literal).expect("compile");
        assert!(spec_filter.should_include("keep/me"));
        assert!(!spec_filter.should_include("a/skip/me"));
    }

    #[test]
    fn invalid_patterns_are_rejected() {
        let err = SpecPathFilter::from_raw(Some("(unclosed"), None, EnumPatternMode::Regex)
            .expect_err("bad regex");
        assert!(matches!(err, MoreFsError::InvalidArgument(_)));

        let err = SpecPathFilter::from_raw(None, Some("[z-a"), EnumPatternMode::Glob)
            .expect_err("bad glob");
        assert!(matches!(err, MoreFsError::InvalidArgument(_)));
    }
}
