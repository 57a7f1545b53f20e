use std::path::PathBuf;
use std::time::Duration;

use crate::dedup::Category;

pub const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";
pub const FETCH_TIMEOUT: Duration = Duration::from_secs(10);
pub const CONNECTIVITY_URL: &str = "http://www.baidu.com";
pub const CONNECTIVITY_TIMEOUT: Duration = Duration::from_secs(5);
pub const TEMPLATE_FILE_NAME: &str = ".student_id_templates.json";
pub const OUTPUT_DIR_NAME: &str = "Output";

#[derive(Debug, Clone)]
pub struct ScrapeConfig {
    pub user_agent: String,
    pub fetch_timeout: Duration,
    pub connectivity_url: String,
    pub connectivity_timeout: Duration,
    pub template_file: PathBuf,
}

impl Default for ScrapeConfig {
    fn default() -> Self {
        ScrapeConfig {
            user_agent: USER_AGENT.to_string(),
            fetch_timeout: FETCH_TIMEOUT,
            connectivity_url: CONNECTIVITY_URL.to_string(),
            connectivity_timeout: CONNECTIVITY_TIMEOUT,
            template_file: default_template_file(),
        }
    }
}

/// `~/.student_id_templates.json`, or the working directory when there is no home.
pub fn default_template_file() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(TEMPLATE_FILE_NAME)
}

/// Which categories a run extracts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Categories {
    pub email: bool,
    pub phone: bool,
    pub student_id: bool,
}

impl Default for Categories {
    fn default() -> Self {
        Categories {
            email: true,
            phone: true,
            student_id: false,
        }
    }
}

impl Categories {
    pub fn all() -> Self {
        Categories {
            email: true,
            phone: true,
            student_id: true,
        }
    }

    pub fn contains(&self, category: Category) -> bool {
        match category {
            Category::Email => self.email,
            Category::Phone => self.phone,
            Category::StudentId => self.student_id,
        }
    }

    pub fn enabled(&self) -> Vec<Category> {
        Category::ALL
            .into_iter()
            .filter(|&c| self.contains(c))
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        !(self.email || self.phone || self.student_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_categories() {
        let categories = Categories::default();
        assert_eq!(categories.enabled(), vec![Category::Email, Category::Phone]);
        assert!(!categories.is_empty());
    }

    #[test]
    fn test_no_categories() {
        let categories = Categories {
            email: false,
            phone: false,
            student_id: false,
        };
        assert!(categories.is_empty());
        assert!(categories.enabled().is_empty());
    }

    #[test]
    fn test_default_template_file_name() {
        let path = default_template_file();
        assert!(path.ends_with(TEMPLATE_FILE_NAME));
    }
}
