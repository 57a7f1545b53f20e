//! Named student-ID patterns.
//!
//! The store starts from the built-in templates and layers the user's JSON
//! file on top. Only user-added or user-modified entries are written back,
//! so unmodified built-ins never end up in the file.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use log::{error, info, warn};
use regex::Regex;

use crate::error::{Result, SwallowError};
use crate::patterns;

/// Name of the composite template. It always selects the full alternation.
pub const ALL_TEMPLATE: &str = "all";

pub fn builtin_templates() -> BTreeMap<String, String> {
    [
        (ALL_TEMPLATE, patterns::student_id_composite()),
        ("10-digit", patterns::STUDENT_ID_10_DIGIT),
        ("12-digit", patterns::STUDENT_ID_12_DIGIT),
        ("9-digit", patterns::STUDENT_ID_9_DIGIT),
        ("with-letter", patterns::STUDENT_ID_WITH_LETTER),
        ("short", patterns::STUDENT_ID_SHORT),
    ]
    .into_iter()
    .map(|(name, pattern)| (name.to_string(), pattern.to_string()))
    .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TemplateOrigin {
    BuiltIn,
    /// A built-in name carrying a user pattern.
    Modified,
    User,
}

#[derive(Debug)]
pub struct TemplateStore {
    path: PathBuf,
    builtins: BTreeMap<String, String>,
    templates: BTreeMap<String, String>,
}

impl TemplateStore {
    /// Built-ins merged with the file at `path`. A missing, unreadable or
    /// malformed file leaves the built-ins in place.
    pub fn load<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref().to_path_buf();
        let builtins = builtin_templates();
        let mut templates = builtins.clone();

        match read_user_templates(&path) {
            Ok(Some(saved)) => {
                let count = saved.len();
                for (name, pattern) in saved {
                    if name == ALL_TEMPLATE {
                        warn!("Ignoring saved template '{}': the name is reserved", name);
                        continue;
                    }
                    templates.insert(name, pattern);
                }
                info!("Loaded {} saved templates from {:?}", count, path);
            }
            Ok(None) => info!("No template file at {:?}. Using built-in templates.", path),
            Err(e) => error!("Failed to load template file: {}", e),
        }

        TemplateStore {
            path,
            builtins,
            templates,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Current name → pattern mapping.
    pub fn templates(&self) -> &BTreeMap<String, String> {
        &self.templates
    }

    /// All names, the composite first.
    pub fn names(&self) -> Vec<&str> {
        let mut names = vec![ALL_TEMPLATE];
        names.extend(
            self.templates
                .keys()
                .map(String::as_str)
                .filter(|&name| name != ALL_TEMPLATE),
        );
        names
    }

    pub fn origin(&self, name: &str) -> Option<TemplateOrigin> {
        let pattern = self.templates.get(name)?;
        Some(match self.builtins.get(name) {
            Some(builtin) if builtin == pattern => TemplateOrigin::BuiltIn,
            Some(_) => TemplateOrigin::Modified,
            None => TemplateOrigin::User,
        })
    }

    pub fn select(&self, name: &str) -> Option<&str> {
        if name == ALL_TEMPLATE {
            return Some(patterns::student_id_composite());
        }
        self.templates.get(name).map(String::as_str)
    }

    /// Validates, stores and persists. A failed write is logged; the
    /// in-memory template is kept either way.
    pub fn save(&mut self, name: &str, pattern: &str) -> Result<()> {
        let name = name.trim();
        let pattern = pattern.trim();
        if name.is_empty() {
            return Err(SwallowError::EmptyTemplateName);
        }
        if name == ALL_TEMPLATE {
            return Err(SwallowError::ReservedTemplate(name.to_string()));
        }
        Regex::new(pattern).map_err(|e| SwallowError::pattern(pattern, e))?;

        self.templates.insert(name.to_string(), pattern.to_string());
        info!("Template '{}' saved", name);
        self.persist_or_log();
        Ok(())
    }

    /// Removing a built-in only lasts for this session; it is seeded again
    /// on the next load.
    pub fn remove(&mut self, name: &str) -> Result<()> {
        if name == ALL_TEMPLATE {
            return Err(SwallowError::ReservedTemplate(name.to_string()));
        }
        if self.templates.remove(name).is_none() {
            return Err(SwallowError::UnknownTemplate(name.to_string()));
        }
        info!("Template '{}' removed", name);
        self.persist_or_log();
        Ok(())
    }

    /// Entries that differ from the built-ins.
    pub fn user_templates(&self) -> BTreeMap<&str, &str> {
        self.templates
            .iter()
            .filter(|(name, pattern)| self.builtins.get(*name) != Some(*pattern))
            .map(|(name, pattern)| (name.as_str(), pattern.as_str()))
            .collect()
    }

    pub fn persist(&self) -> Result<()> {
        let json = serde_json::to_string_pretty(&self.user_templates()).map_err(|e| {
            SwallowError::Json {
                path: self.path.clone(),
                source: e,
            }
        })?;
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| SwallowError::io(parent, e))?;
        }
        fs::write(&self.path, json).map_err(|e| SwallowError::io(&self.path, e))
    }

    fn persist_or_log(&self) {
        if let Err(e) = self.persist() {
            error!("Failed to save template file: {}", e);
        }
    }
}

fn read_user_templates(path: &Path) -> Result<Option<BTreeMap<String, String>>> {
    if !path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(path).map_err(|e| SwallowError::io(path, e))?;
    serde_json::from_str(&content)
        .map(Some)
        .map_err(|e| SwallowError::Json {
            path: path.to_path_buf(),
            source: e,
        })
}
