use std::fs;
use std::path::{Path, PathBuf};

use log::info;

use crate::config::OUTPUT_DIR_NAME;
use crate::dedup::{Category, SessionState};
use crate::error::{Result, SwallowError};

pub fn file_name(category: Category) -> &'static str {
    match category {
        Category::Email => "unique_emails.txt",
        Category::Phone => "unique_china_phones.txt",
        Category::StudentId => "unique_student_ids.txt",
    }
}

/// Writes each non-empty set, sorted and newline-joined, to
/// `<dir>/Output/`. Returns the files written.
pub fn save_results<P: AsRef<Path>>(state: &SessionState, dir: P) -> Result<Vec<PathBuf>> {
    if state.is_empty() {
        return Err(SwallowError::NothingToSave);
    }

    let folder = dir.as_ref().join(OUTPUT_DIR_NAME);
    fs::create_dir_all(&folder).map_err(|e| SwallowError::io(&folder, e))?;

    let mut written = Vec::new();
    for category in Category::ALL {
        let set = state.set(category);
        if set.is_empty() {
            continue;
        }
        let path = folder.join(file_name(category));
        fs::write(&path, set.sorted().join("\n")).map_err(|e| SwallowError::io(&path, e))?;
        info!("Saved {} unique {} to {:?}", set.len(), category.plural(), path);
        written.push(path);
    }
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use tempfile::TempDir;

    fn page(items: &[&str]) -> HashSet<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_empty_session_saves_nothing() {
        let dir = TempDir::new().unwrap();
        let err = save_results(&SessionState::new(), dir.path()).unwrap_err();
        assert!(matches!(err, SwallowError::NothingToSave));
        assert!(!dir.path().join(OUTPUT_DIR_NAME).exists());
    }

    #[test]
    fn test_only_non_empty_sets_are_written_sorted() {
        let dir = TempDir::new().unwrap();
        let mut state = SessionState::new();
        state.record(Category::Email, page(&["z@x.cn", "a@x.cn", "M@x.cn"]));

        let written = save_results(&state, dir.path()).unwrap();
        assert_eq!(written.len(), 1);

        let folder = dir.path().join(OUTPUT_DIR_NAME);
        let content = fs::read_to_string(folder.join("unique_emails.txt")).unwrap();
        assert_eq!(content, "M@x.cn\na@x.cn\nz@x.cn");
        assert!(!folder.join("unique_china_phones.txt").exists());
        assert!(!folder.join("unique_student_ids.txt").exists());
    }

    #[test]
    fn test_utf8_content() {
        let dir = TempDir::new().unwrap();
        let mut state = SessionState::new();
        state.record(Category::StudentId, page(&["2023A12345", "学号2023"]));
        save_results(&state, dir.path()).unwrap();

        let path = dir.path().join(OUTPUT_DIR_NAME).join("unique_student_ids.txt");
        assert_eq!(fs::read_to_string(path).unwrap(), "2023A12345\n学号2023");
    }
}
