//! Interactive log-file picker.
//!
//! This is intentionally kept separate from clap parsing:
//! - clap handles structured flags/subcommands
//! - the picker provides the "run `epi` and choose a log" UX when no file was
//!   given and the default one is missing
//!
//! The picker searches for `*.txt` and `*.log` files under the current working
//! directory.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use crate::error::{AppError, Result};

/// Default directory recursion depth for finding log files.
const DEFAULT_SEARCH_DEPTH: usize = 4;

/// Extensions offered by the picker.
const LOG_EXTENSIONS: [&str; 2] = ["txt", "log"];

/// Prompt the user to select a log file from the current directory tree.
///
/// Behavior:
/// - list discovered log files
/// - accept either a number (from the list) or an explicit path
/// - `q` cancels
pub fn prompt_for_log_path() -> Result<PathBuf> {
    let files = discover_log_files(Path::new("."));
    if files.is_empty() {
        return Err(AppError::InvalidQuery(
            "no .txt/.log files found; provide one with `epi show -f <file>`".to_string(),
        ));
    }

    println!("Found {} log file(s):", files.len());
    for (idx, path) in files.iter().enumerate() {
        println!("{:>3}) {}", idx + 1, pretty_path(path));
    }

    loop {
        print!("Select a file by number (1-{}) or type a path (q to quit): ", files.len());
        io::stdout()
            .flush()
            .map_err(|e| AppError::Terminal(format!("failed to write prompt: {e}")))?;

        let mut input = String::new();
        let bytes = io::stdin()
            .read_line(&mut input)
            .map_err(|e| AppError::Terminal(format!("failed to read input: {e}")))?;

        if bytes == 0 {
            return Err(AppError::InvalidQuery(
                "no input received; provide a log path with `-f <file>`".to_string(),
            ));
        }

        let input = input.trim();
        if input.eq_ignore_ascii_case("q") {
            return Err(AppError::InvalidQuery("canceled".to_string()));
        }

        if let Ok(choice) = input.parse::<usize>() {
            if (1..=files.len()).contains(&choice) {
                return validate_log_path(&files[choice - 1]);
            }
            println!("Invalid choice: {choice}. Enter a number between 1 and {}.", files.len());
            continue;
        }

        match validate_log_path(Path::new(input)) {
            Ok(path) => return Ok(path),
            Err(err) => println!("{err}"),
        }
    }
}

/// Check that `path` names an existing regular file.
///
/// Any extension is accepted here; only discovery filters by extension.
pub fn validate_log_path(path: &Path) -> Result<PathBuf> {
    if !path.exists() {
        return Err(AppError::Io {
            path: path.to_path_buf(),
            source: io::Error::new(io::ErrorKind::NotFound, "no such file"),
        });
    }
    if path.is_dir() {
        return Err(AppError::InvalidQuery(format!(
            "expected a file, got a directory: {}",
            path.display()
        )));
    }
    Ok(path.to_path_buf())
}

/// Discover log files under `root` (deterministic order).
pub fn discover_log_files(root: &Path) -> Vec<PathBuf> {
    let mut out = Vec::new();
    find_log_files(root, 0, DEFAULT_SEARCH_DEPTH, &mut out);
    out.sort_by_key(|p| pretty_path(p));
    out
}

fn find_log_files(root: &Path, depth: usize, max_depth: usize, out: &mut Vec<PathBuf>) {
    if depth > max_depth {
        return;
    }

    let Ok(entries) = fs::read_dir(root) else {
        return;
    };

    for entry in entries.flatten() {
        let path = entry.path();
        let Ok(file_type) = entry.file_type() else {
            continue;
        };

        if file_type.is_dir() {
            if !should_skip_dir(&path) {
                find_log_files(&path, depth + 1, max_depth, out);
            }
            continue;
        }

        if file_type.is_file() && has_log_extension(&path) {
            out.push(path);
        }
    }
}

fn has_log_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| LOG_EXTENSIONS.iter().any(|want| ext.eq_ignore_ascii_case(want)))
}

fn should_skip_dir(path: &Path) -> bool {
    let name = path.file_name().and_then(|s| s.to_str()).unwrap_or("");
    matches!(name, ".git" | "target" | "node_modules")
}

fn pretty_path(path: &Path) -> String {
    let stripped = path.strip_prefix("./").unwrap_or(path);
    stripped.display().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn discovers_txt_and_log_files_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        fs::create_dir_all(root.join("nested")).unwrap();
        fs::create_dir_all(root.join("target")).unwrap();
        fs::write(root.join("b.log"), "").unwrap();
        fs::write(root.join("a.TXT"), "").unwrap();
        fs::write(root.join("nested/c.txt"), "").unwrap();
        fs::write(root.join("skip.csv"), "").unwrap();
        fs::write(root.join("target/d.txt"), "").unwrap();

        let names: Vec<String> = discover_log_files(root)
            .iter()
            .map(|p| p.strip_prefix(root).unwrap().display().to_string())
            .collect();
        assert_eq!(names, vec!["a.TXT", "b.log", "nested/c.txt"]);
    }

    #[test]
    fn validate_rejects_missing_and_directories() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            validate_log_path(&dir.path().join("missing.txt")),
            Err(AppError::Io { .. })
        ));
        assert!(matches!(validate_log_path(dir.path()), Err(AppError::InvalidQuery(_))));

        let file = dir.path().join("covid.txt");
        fs::write(&file, "date\t01-04-2020\n").unwrap();
        assert_eq!(validate_log_path(&file).unwrap(), file);
    }
}
