//! Resolving `import "name"` to a file.

use std::path::{Path, PathBuf};

/// Maps an import name to the file it refers to.
pub trait ImportResolver {
    /// `importing_file` is the file containing the `import`, if the program
    /// came from one.
    fn resolve(&self, name: &str, importing_file: Option<&Path>) -> Option<PathBuf>;
}

/// Looks for imports on the filesystem.
///
/// Candidates are tried in order: the name itself if absolute, then relative
/// to the importing file's directory, the working directory, and finally the
/// `stdlib` directory.
#[derive(Debug, Clone)]
pub struct FileResolver {
    pub stdlib_dir: PathBuf,
}

impl Default for FileResolver {
    fn default() -> Self {
        Self {
            stdlib_dir: PathBuf::from("stdlib"),
        }
    }
}

impl FileResolver {
    fn candidates(&self, name: &str, importing_file: Option<&Path>) -> Vec<PathBuf> {
        let path = Path::new(name);
        if path.is_absolute() {
            return vec![path.to_path_buf()];
        }

        let mut candidates = Vec::with_capacity(3);
        if let Some(dir) = importing_file.and_then(Path::parent)
            && !dir.as_os_str().is_empty()
        {
            candidates.push(dir.join(path));
        }
        match std::env::current_dir() {
            Ok(cwd) => candidates.push(cwd.join(path)),
            Err(_) => candidates.push(path.to_path_buf()),
        }
        candidates.push(self.stdlib_dir.join(path));
        candidates
    }
}

impl ImportResolver for FileResolver {
    fn resolve(&self, name: &str, importing_file: Option<&Path>) -> Option<PathBuf> {
        let found = self
            .candidates(name, importing_file)
            .into_iter()
            .find(|candidate| candidate.is_file());
        tracing::debug!(name, ?found, "resolved import");
        found
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn scratch_dir(label: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("aoxim-import-{label}-{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn test_absolute_path() {
        let dir = scratch_dir("abs");
        let file = dir.join("lib.calc");
        fs::write(&file, "x = 1").unwrap();

        let resolver = FileResolver::default();
        assert_eq!(resolver.resolve(file.to_str().unwrap(), None), Some(file.clone()));
        fs::remove_dir_all(dir).unwrap();
    }

    #[test]
    fn test_relative_to_importing_file() {
        let dir = scratch_dir("rel");
        fs::write(dir.join("helper.calc"), "y = 2").unwrap();
        let main = dir.join("main.calc");

        let resolver = FileResolver::default();
        assert_eq!(
            resolver.resolve("helper.calc", Some(&main)),
            Some(dir.join("helper.calc"))
        );
        fs::remove_dir_all(dir).unwrap();
    }

    #[test]
    fn test_stdlib_dir_is_last_resort() {
        let dir = scratch_dir("std");
        fs::write(dir.join("strings.calc"), "").unwrap();

        let resolver = FileResolver {
            stdlib_dir: dir.clone(),
        };
        assert_eq!(resolver.resolve("strings.calc", None), Some(dir.join("strings.calc")));
        assert_eq!(resolver.resolve("missing-module.calc", None), None);
        fs::remove_dir_all(dir).unwrap();
    }
}
