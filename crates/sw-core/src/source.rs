//! Migration sources
//!
//! A [`Source`] knows which scripts exist and serves them by the version they
//! produce. Scripts are ordered by name; position `i` (0-based) produces
//! version `i + 1`.

use crate::error::{CoreError, CoreResult};
use crate::Version;
use glob::{MatchOptions, Pattern};
use std::fmt;
use std::fs::File;
use std::io::{BufReader, Cursor, Read};
use std::path::{Component, Path, PathBuf};

/// Default glob pattern for [`FileSource`]
pub const DEFAULT_PATTERN: &str = "*.sql";

/// Supplies migration scripts in version order.
pub trait Source {
    /// Version to apply after `current`, or `None` when no migrations remain.
    ///
    /// A negative `current` is treated as "nothing to apply". A `current`
    /// beyond the number of available scripts is [`CoreError::VersionAhead`].
    fn next(&self, current: Version) -> CoreResult<Option<Version>>;

    /// Open the script that produces `version`.
    ///
    /// Returns [`CoreError::MigrationNotFound`] when `version` is not in
    /// `1..=count`.
    fn read(&self, version: Version) -> CoreResult<Script>;

    /// Display name of the script that produces `version`, without opening it.
    fn name(&self, version: Version) -> CoreResult<String> {
        self.read(version).map(|script| script.name)
    }
}

impl<S: Source + ?Sized> Source for Box<S> {
    fn next(&self, current: Version) -> CoreResult<Option<Version>> {
        (**self).next(current)
    }

    fn read(&self, version: Version) -> CoreResult<Script> {
        (**self).read(version)
    }

    fn name(&self, version: Version) -> CoreResult<String> {
        (**self).name(version)
    }
}

impl<S: Source + ?Sized> Source for &S {
    fn next(&self, current: Version) -> CoreResult<Option<Version>> {
        (**self).next(current)
    }

    fn read(&self, version: Version) -> CoreResult<Script> {
        (**self).read(version)
    }

    fn name(&self, version: Version) -> CoreResult<String> {
        (**self).name(version)
    }
}

/// An opened migration script.
///
/// The body is released when the script is dropped.
pub struct Script {
    /// Version this script produces when applied
    pub version: Version,

    /// Display name (file name relative to the source root)
    pub name: String,

    body: Box<dyn Read + Send>,
}

impl Script {
    pub fn new(version: Version, name: impl Into<String>, body: impl Read + Send + 'static) -> Self {
        Self {
            version,
            name: name.into(),
            body: Box::new(body),
        }
    }
}

impl Read for Script {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        self.body.read(buf)
    }
}

impl fmt::Debug for Script {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Script")
            .field("version", &self.version)
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

/// Shared sequencing rule: `current` against the number of scripts.
fn next_version(current: Version, available: usize) -> CoreResult<Option<Version>> {
    if current < 0 {
        return Ok(None);
    }
    let count = available as Version;
    if current == count {
        return Ok(None);
    }
    if current > count {
        return Err(CoreError::VersionAhead { current, available });
    }
    Ok(Some(current + 1))
}

/// Map a version to its 0-based script index, if in range.
fn script_index(version: Version, available: usize) -> CoreResult<usize> {
    if version <= 0 || version > available as Version {
        return Err(CoreError::MigrationNotFound { version });
    }
    Ok((version - 1) as usize)
}

/// Scripts discovered on disk by a glob pattern under a root directory.
#[derive(Debug, Clone)]
pub struct FileSource {
    root: PathBuf,
    pattern: String,
}

impl FileSource {
    /// Source reading `*.sql` from `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            pattern: DEFAULT_PATTERN.to_string(),
        }
    }

    /// Replace the glob pattern. `*` does not match across `/`, so
    /// `sub/*.sql` selects scripts one directory down.
    pub fn with_pattern(mut self, pattern: impl Into<String>) -> CoreResult<Self> {
        let pattern = pattern.into();
        if pattern.is_empty() {
            return Err(CoreError::InvalidPattern {
                pattern,
                message: "pattern must not be empty".to_string(),
            });
        }
        Pattern::new(&pattern).map_err(|e| CoreError::InvalidPattern {
            pattern: pattern.clone(),
            message: e.to_string(),
        })?;
        self.pattern = pattern;
        Ok(self)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    /// Names of all matching scripts, relative to the root, sorted.
    pub fn scripts(&self) -> CoreResult<Vec<String>> {
        Ok(self.entries()?.into_iter().map(|(name, _)| name).collect())
    }

    /// Root with `.` components dropped; glob reports matches without them.
    fn glob_root(&self) -> PathBuf {
        self.root
            .components()
            .filter(|c| !matches!(c, Component::CurDir))
            .collect()
    }

    /// `(display name, path as matched)` for every script, sorted by name.
    fn entries(&self) -> CoreResult<Vec<(String, PathBuf)>> {
        if !self.root.is_dir() {
            log::warn!(
                "Migration directory {} does not exist; no scripts found",
                self.root.display()
            );
            return Ok(Vec::new());
        }

        let root = self.glob_root();
        let full_pattern = if root.as_os_str().is_empty() {
            self.pattern.clone()
        } else {
            let escaped = Pattern::escape(root.to_string_lossy().trim_end_matches('/'));
            format!("{}/{}", escaped, self.pattern)
        };
        let options = MatchOptions {
            case_sensitive: true,
            require_literal_separator: true,
            require_literal_leading_dot: false,
        };

        let paths =
            glob::glob_with(&full_pattern, options).map_err(|e| CoreError::InvalidPattern {
                pattern: self.pattern.clone(),
                message: e.to_string(),
            })?;

        let mut entries = Vec::new();
        for entry in paths {
            let path = entry.map_err(|e| CoreError::IoWithPath {
                path: e.path().display().to_string(),
                source: e.into_error(),
            })?;
            if !path.is_file() {
                continue;
            }
            let name = self.display_name(&root, &path)?;
            entries.push((name, path));
        }
        entries.sort_by(|a, b| a.0.cmp(&b.0));

        log::debug!(
            "Discovered {} migration script(s) in {} matching '{}'",
            entries.len(),
            self.root.display(),
            self.pattern
        );
        Ok(entries)
    }

    fn display_name(&self, root: &Path, path: &Path) -> CoreResult<String> {
        let relative = path
            .strip_prefix(root)
            .map_err(|_| CoreError::InvalidPattern {
                pattern: self.pattern.clone(),
                message: format!(
                    "match {} is outside {}",
                    path.display(),
                    self.root.display()
                ),
            })?;
        Ok(relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/"))
    }

    fn entry(&self, version: Version) -> CoreResult<(String, PathBuf)> {
        let mut entries = self.entries()?;
        let index = script_index(version, entries.len())?;
        Ok(entries.swap_remove(index))
    }
}

impl Source for FileSource {
    fn next(&self, current: Version) -> CoreResult<Option<Version>> {
        if current < 0 {
            return Ok(None);
        }
        next_version(current, self.entries()?.len())
    }

    fn read(&self, version: Version) -> CoreResult<Script> {
        let (name, path) = self.entry(version)?;
        let file = File::open(&path).map_err(|e| CoreError::IoWithPath {
            path: path.display().to_string(),
            source: e,
        })?;
        Ok(Script::new(version, name, BufReader::new(file)))
    }

    fn name(&self, version: Version) -> CoreResult<String> {
        self.entry(version).map(|(name, _)| name)
    }
}

/// Scripts held in memory, e.g. embedded with `include_str!`.
#[derive(Debug, Clone, Default)]
pub struct StaticSource {
    scripts: Vec<(String, String)>,
}

impl StaticSource {
    /// Build from `(name, sql)` pairs; order is taken from the sorted names.
    pub fn new<I, N, S>(scripts: I) -> Self
    where
        I: IntoIterator<Item = (N, S)>,
        N: Into<String>,
        S: Into<String>,
    {
        let mut scripts: Vec<(String, String)> = scripts
            .into_iter()
            .map(|(name, sql)| (name.into(), sql.into()))
            .collect();
        scripts.sort_by(|a, b| a.0.cmp(&b.0));
        Self { scripts }
    }

    pub fn len(&self) -> usize {
        self.scripts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scripts.is_empty()
    }

    /// Script names in version order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.scripts.iter().map(|(name, _)| name.as_str())
    }
}

impl Source for StaticSource {
    fn next(&self, current: Version) -> CoreResult<Option<Version>> {
        next_version(current, self.scripts.len())
    }

    fn read(&self, version: Version) -> CoreResult<Script> {
        let index = script_index(version, self.scripts.len())?;
        let (name, sql) = &self.scripts[index];
        Ok(Script::new(
            version,
            name.clone(),
            Cursor::new(sql.clone().into_bytes()),
        ))
    }

    fn name(&self, version: Version) -> CoreResult<String> {
        let index = script_index(version, self.scripts.len())?;
        Ok(self.scripts[index].0.clone())
    }
}

#[cfg(test)]
#[path = "source_test.rs"]
mod tests;
