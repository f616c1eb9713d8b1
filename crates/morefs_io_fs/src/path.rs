//! Path derivation helpers: safe names, output paths, extensions, temp paths.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;

use crate::resolver::{FsGlobResolver, GlobResolver};
use crate::spec::MoreFsError;

/// Upper bound on renaming attempts in [`get_safe_path`].
pub const SAFE_PATH_MAX_ATTEMPTS: usize = 1000;

static RE_TRAILING_EXTENSION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\.([A-Za-z0-9_]+)$").expect("static regex"));
static RE_OUTPUT_DIR_EXPLICIT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\./|^/|\.\./").expect("static regex"));

////////////////////////////////////////////////////////////////////////////////
// #region SafePath

/// Return `path` unchanged if it is free, otherwise insert `_` before the
/// trailing extension until the result does not exist.
///
/// `out/report.txt` becomes `out/report_.txt`, then `out/report__.txt`, etc.
/// A path without a `.<word>` suffix cannot be disambiguated and fails with
/// [`MoreFsError::SafePathExhausted`] if it already exists.
pub fn get_safe_path(path: &str) -> Result<String, MoreFsError> {
    let resolver = FsGlobResolver::default();
    let mut path_candidate = path.to_string();
    for n_attempt in 0..SAFE_PATH_MAX_ATTEMPTS {
        if !resolver.probe_exists(&path_candidate)? {
            return Ok(path_candidate);
        }
        let path_next = RE_TRAILING_EXTENSION
            .replace(&path_candidate, "_.$1")
            .into_owned();
        if path_next == path_candidate {
            return Err(MoreFsError::SafePathExhausted {
                path: PathBuf::from(path),
                attempts: n_attempt + 1,
            });
        }
        path_candidate = path_next;
    }
    Err(MoreFsError::SafePathExhausted {
        path: PathBuf::from(path),
        attempts: SAFE_PATH_MAX_ATTEMPTS,
    })
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region OutputPaths

/// Replace the trailing `.<word>` extension of `file` with `.<ext>`.
///
/// Files without such an extension are returned unchanged.
pub fn replace_file_extension(file: &str, ext: &str) -> String {
    RE_TRAILING_EXTENSION
        .replace(file, |_: &regex::Captures| format!(".{ext}"))
        .into_owned()
}

/// `dirname(file)/sub_dir/basename(file)`.
pub fn get_sub_dir_path(file: &str, sub_dir: &str) -> Result<String, MoreFsError> {
    if sub_dir.is_empty() {
        return Err(MoreFsError::InvalidArgument(
            "get_sub_dir_path: must supply a sub directory path".to_string(),
        ));
    }
    let path_file = Path::new(file);
    let path_parent = path_file.parent().unwrap_or(Path::new(""));
    let path_out = match path_file.file_name() {
        Some(name) => path_parent.join(sub_dir).join(name),
        None => path_parent.join(sub_dir),
    };
    Ok(path_out.to_string_lossy().into_owned())
}

/// Derive where the output for `file` should go.
///
/// An `output_dir` starting with `./` or `/`, or containing `../`, is an
/// explicit location and `file` is joined onto it. Any other value names a
/// sub directory created next to `file`. Returns `None` when either argument
/// is empty.
pub fn get_output_path(file: &str, output_dir: &str) -> Option<String> {
    let output_dir = output_dir.trim();
    if file.is_empty() || output_dir.is_empty() {
        return None;
    }
    if RE_OUTPUT_DIR_EXPLICIT.is_match(output_dir) {
        return Some(
            Path::new(output_dir)
                .join(file)
                .to_string_lossy()
                .into_owned(),
        );
    }
    get_sub_dir_path(file, output_dir).ok()
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region TempPaths

/// Random file path in the OS temp directory.
///
/// The file name is a random `u32` followed by the basename of `file`
/// (`temp-file` when absent). Nothing is created.
pub fn get_temp_file_path(file: Option<&str>) -> PathBuf {
    let file = file.unwrap_or("temp-file");
    let name_base = Path::new(file)
        .file_name()
        .map(|v| v.to_string_lossy().into_owned())
        .unwrap_or_default();
    let n_rand: u32 = rand::random();
    std::env::temp_dir().join(format!("{n_rand}{name_base}"))
}

/// `dirname` inside the OS temp directory, created if missing.
pub fn get_temp_dir(dirname: &str) -> Result<PathBuf, MoreFsError> {
    if dirname.is_empty() {
        return Err(MoreFsError::InvalidArgument(
            "get_temp_dir: please supply a directory name".to_string(),
        ));
    }
    let path_dir = std::env::temp_dir().join(dirname);
    fs::create_dir_all(&path_dir).map_err(|e| MoreFsError::fault(&path_dir, e))?;
    Ok(path_dir)
}

// #endregion
////////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use std::fs;

    use tempfile::TempDir;

    use super::{
        get_output_path, get_safe_path, get_sub_dir_path, get_temp_dir, get_temp_file_path,
        replace_file_extension,
    };
    use crate::spec::MoreFsError;

    #[test]
    fn safe_path_returns_free_path_unchanged() {
        let tmp = TempDir::new().expect("tempdir");
        let path = tmp.path().join("free.txt").to_string_lossy().into_owned();
        assert_eq!(get_safe_path(&path).expect("safe"), path);
    }

    #[test]
    fn safe_path_appends_marker_until_free() {
        let tmp = TempDir::new().expect("tempdir");
        fs::write(tmp.path().join("a.txt"), "1").expect("write");
        fs::write(tmp.path().join("a_.txt"), "2").expect("write");
        let path = tmp.path().join("a.txt").to_string_lossy().into_owned();

        let path_safe = get_safe_path(&path).expect("safe");
        assert_eq!(
            path_safe,
            tmp.path().join("a__.txt").to_string_lossy().into_owned()
        );
        assert_ne!(path_safe, path);
        assert!(!std::path::Path::new(&path_safe).exists());
    }

    #[test]
    fn safe_path_without_extension_is_fatal() {
        let tmp = TempDir::new().expect("tempdir");
        fs::write(tmp.path().join("Makefile"), "x").expect("write");
        let path = tmp.path().join("Makefile").to_string_lossy().into_owned();

        let err = get_safe_path(&path).expect_err("no progress");
        assert!(matches!(
            err,
            MoreFsError::SafePathExhausted { attempts: 1, .. }
        ));
    }

    #[test]
    fn safe_path_ignores_non_ascii_suffix() {
        let tmp = TempDir::new().expect("tempdir");
        fs::write(tmp.path().join("notes.日本"), "x").expect("write");
        let path = tmp.path().join("notes.日本").to_string_lossy().into_owned();

        let err = get_safe_path(&path).expect_err("no ascii extension");
        assert!(matches!(
            err,
            MoreFsError::SafePathExhausted { attempts: 1, .. }
        ));
    }

    #[test]
    fn output_path_dispatch() {
        assert_eq!(
            get_output_path("a/b.txt", "./out").as_deref(),
            Some("./out/a/b.txt")
        );
        assert_eq!(
            get_output_path("a/b.txt", "/abs").as_deref(),
            Some("/abs/a/b.txt")
        );
        assert_eq!(
            get_output_path("a/b.txt", "x/../y").as_deref(),
            Some("x/../y/a/b.txt")
        );
        assert_eq!(
            get_output_path("a/b.txt", " build ").as_deref(),
            Some("a/build/b.txt")
        );
        assert_eq!(get_output_path("b.txt", "build").as_deref(), Some("build/b.txt"));
        assert_eq!(get_output_path("", "build"), None);
        assert_eq!(get_output_path("a/b.txt", "  "), None);
    }

    #[test]
    fn sub_dir_path_requires_name() {
        assert_eq!(get_sub_dir_path("x/y.md", "sub").expect("path"), "x/sub/y.md");
        assert!(matches!(
            get_sub_dir_path("x/y.md", ""),
            Err(MoreFsError::InvalidArgument(_))
        ));
    }

    #[test]
    fn replaces_trailing_extension_only() {
        assert_eq!(replace_file_extension("doc/readme.md", "html"), "doc/readme.html");
        assert_eq!(replace_file_extension("a.tar.gz", "zip"), "a.tar.zip");
        assert_eq!(replace_file_extension("Makefile", "bak"), "Makefile");
        assert_eq!(replace_file_extension("x.md", "$1"), "x.$1");
        assert_eq!(replace_file_extension("x.日本", "md"), "x.日本");
        assert_eq!(replace_file_extension("x.café", "md"), "x.café");
    }

    #[test]
    fn temp_paths_live_in_temp_dir() {
        let path_file = get_temp_file_path(Some("dir/name.log"));
        assert!(path_file.starts_with(std::env::temp_dir()));
        let name = path_file.file_name().expect("name").to_string_lossy().into_owned();
        assert!(name.ends_with("name.log"));
        assert!(name.trim_end_matches("name.log").parse::<u32>().is_ok());

        let path_default = get_temp_file_path(None);
        assert!(path_default.to_string_lossy().ends_with("temp-file"));

        let dirname = format!("morefs_test_{}", std::process::id());
        let path_dir = get_temp_dir(&dirname).expect("temp dir");
        assert!(path_dir.is_dir());
        fs::remove_dir_all(&path_dir).expect("cleanup");

        assert!(matches!(
            get_temp_dir(""),
            Err(MoreFsError::InvalidArgument(_))
        ));
    }
}
