// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use std::path::{Path, PathBuf};

use path_clean::clean;

pub const DEFAULT_CONFIG_NAME: &str = "fixn.config.yaml";

pub type FindInParent = fn(&Path, &str) -> Option<PathBuf>;

/// Walk up from `path` looking for `filename`
pub fn find_in_parent(path: &Path, filename: &str) -> Option<PathBuf> {
    let mut current = path.to_path_buf();

    loop {
        let file_path = current.join(filename);
        if file_path.exists() {
            return Some(file_path);
        }

        if !current.pop() {
            break;
        }
    }

    None
}

/// Precedence: explicit file (relative to cwd) > nearest file above cwd > OS config dir
pub fn resolve_config_path(
    find_in_parent: FindInParent,
    cwd: &Path,
    default_config_dir: &Path,
    default_filename: &str,
    cli_file: Option<&Path>,
) -> PathBuf {
    if let Some(cli_file) = cli_file {
        if cli_file.is_absolute() {
            return cli_file.to_path_buf();
        }
        return clean(cwd.join(cli_file));
    }

    if let Some(found) = find_in_parent(cwd, default_filename) {
        return found;
    }

    clean(default_config_dir.join(default_filename))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn not_found(_: &Path, _: &str) -> Option<PathBuf> {
        None
    }

    fn found(_: &Path, _: &str) -> Option<PathBuf> {
        Some(PathBuf::from("/work/fixn.config.yaml"))
    }

    #[test]
    fn test_resolve_cli() {
        let path = resolve_config_path(
            not_found,
            Path::new("/work/frontend"),
            Path::new("/home/me/.config/fixn"),
            DEFAULT_CONFIG_NAME,
            Some(Path::new("../conf/sepolia.yaml")),
        );
        assert_eq!(path, PathBuf::from("/work/conf/sepolia.yaml"));

        let path = resolve_config_path(
            found,
            Path::new("/work/frontend"),
            Path::new("/home/me/.config/fixn"),
            DEFAULT_CONFIG_NAME,
            Some(Path::new("/etc/fixn.yaml")),
        );
        assert_eq!(path, PathBuf::from("/etc/fixn.yaml"));
    }

    #[test]
    fn test_resolve_search_then_default() {
        let path = resolve_config_path(
            found,
            Path::new("/work/frontend"),
            Path::new("/home/me/.config/fixn"),
            DEFAULT_CONFIG_NAME,
            None,
        );
        assert_eq!(path, PathBuf::from("/work/fixn.config.yaml"));

        let path = resolve_config_path(
            not_found,
            Path::new("/work/frontend"),
            Path::new("/home/me/.config/fixn"),
            DEFAULT_CONFIG_NAME,
            None,
        );
        assert_eq!(path, PathBuf::from("/home/me/.config/fixn/fixn.config.yaml"));
    }

    #[test]
    fn test_find_in_parent() -> std::io::Result<()> {
        let dir = tempfile::tempdir()?;
        let nested = dir.path().join("a").join("b");
        fs::create_dir_all(&nested)?;
        fs::write(dir.path().join(DEFAULT_CONFIG_NAME), "chain: {}")?;

        assert_eq!(
            find_in_parent(&nested, DEFAULT_CONFIG_NAME),
            Some(dir.path().join(DEFAULT_CONFIG_NAME))
        );
        assert_eq!(find_in_parent(&nested, "missing.yaml"), None);
        Ok(())
    }
}
