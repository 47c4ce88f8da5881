//! Keeps `tests/unit/` in lockstep with `src/`

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;
    use std::fs;
    use std::io;
    use std::path::Path;

    // Module wiring and entry points carry no logic of their own
    const EXEMPT_SOURCES: [&str; 2] = ["main.rs", "lib.rs"];

    fn is_module_file(path: &str) -> bool {
        path == "mod.rs" || path.ends_with("/mod.rs")
    }

    fn relative_paths(base: &Path) -> BTreeSet<String> {
        let mut paths = BTreeSet::new();
        if let Err(error) = walk(base, base, &mut paths) {
            assert!(!base.exists(), "Failed to scan {}: {error}", base.display());
        }
        paths
    }

    fn walk(dir: &Path, base: &Path, paths: &mut BTreeSet<String>) -> Result<(), io::Error> {
        if !dir.is_dir() {
            return Ok(());
        }
        for entry in fs::read_dir(dir)? {
            let path = entry?.path();
            let relative = path
                .strip_prefix(base)
                .map_err(|_| io::Error::other("Failed to strip prefix"))?
                .to_string_lossy()
                .replace('\\', "/");

            if path.is_dir() {
                paths.insert(relative);
                walk(&path, base, paths)?;
            } else if path.extension().and_then(|ext| ext.to_str()) == Some("rs") {
                paths.insert(relative);
            }
        }
        Ok(())
    }

    // Tests every source file has a unit test file at the mirrored path
    // Verified by adding a source file without a test counterpart
    #[test]
    fn test_all_src_files_have_unit_tests() {
        let src_paths = relative_paths(Path::new("src"));
        let test_paths = relative_paths(Path::new("tests/unit"));

        let missing: Vec<String> = src_paths
            .iter()
            .filter(|path| !EXEMPT_SOURCES.contains(&path.as_str()) && !is_module_file(path))
            .filter(|path| !test_paths.contains(*path))
            .map(|path| format!("  - src/{path} -> tests/unit/{path}"))
            .collect();

        assert!(
            missing.is_empty(),
            "Source files without unit tests:\n{}",
            missing.join("\n")
        );
    }

    // Tests every unit test file mirrors an existing source file
    // Verified by renaming a source module
    #[test]
    fn test_all_unit_tests_have_src_counterparts() {
        let src_paths = relative_paths(Path::new("src"));
        let test_paths = relative_paths(Path::new("tests/unit"));

        let orphaned: Vec<String> = test_paths
            .iter()
            .filter(|path| !is_module_file(path) && !src_paths.contains(*path))
            .map(|path| format!("  - tests/unit/{path} (no src/{path})"))
            .collect();

        assert!(
            orphaned.is_empty(),
            "Unit test files without a source counterpart:\n{}",
            orphaned.join("\n")
        );
    }

    // Tests that no test file is an empty shell
    // Verified by removing the tests from a unit file
    #[test]
    fn test_all_test_files_contain_tests() {
        let tests_dir = Path::new("tests");
        let files_without_tests: Vec<String> = relative_paths(tests_dir)
            .into_iter()
            .filter(|path| path.ends_with(".rs"))
            .filter(|path| path != "main.rs" && !is_module_file(path))
            .filter(|path| {
                fs::read_to_string(tests_dir.join(path))
                    .map(|content| !content.contains("#[test]"))
                    .unwrap_or(true)
            })
            .map(|path| format!("  - tests/{path}"))
            .collect();

        assert!(
            files_without_tests.is_empty(),
            "Test files without any #[test] functions:\n{}",
            files_without_tests.join("\n")
        );
    }
}
