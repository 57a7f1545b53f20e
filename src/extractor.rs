use regex::Regex;
use std::collections::HashSet;
use std::sync::LazyLock;

use crate::dedup::Category;
use crate::error::{Result, SwallowError};
use crate::patterns;

static EMAIL_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(patterns::EMAIL).expect("built-in email pattern"));
static PHONE_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(patterns::CHINA_PHONE).expect("built-in phone pattern"));
static STUDENT_ID_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(patterns::student_id_composite()).expect("built-in student ID pattern")
});

/// The student-ID pattern in effect. An invalid custom pattern is kept so
/// every extraction can report it.
#[derive(Debug, Clone)]
enum StudentIdPattern {
    Compiled(Regex),
    Invalid { pattern: String, error: regex::Error },
}

#[derive(Debug, Clone)]
pub struct Extractor {
    email_regex: Regex,
    phone_regex: Regex,
    student_id: StudentIdPattern,
}

impl Default for Extractor {
    fn default() -> Self {
        Self::new()
    }
}

impl Extractor {
    /// Built-in patterns, with the composite student-ID alternation.
    pub fn new() -> Self {
        Extractor {
            email_regex: EMAIL_REGEX.clone(),
            phone_regex: PHONE_REGEX.clone(),
            student_id: StudentIdPattern::Compiled(STUDENT_ID_REGEX.clone()),
        }
    }

    /// Uses `pattern` for student IDs. Blank input falls back to the
    /// composite pattern; invalid input is reported on every extraction.
    pub fn with_student_id_pattern(pattern: &str) -> Self {
        let student_id = match compile_trimmed(pattern) {
            Ok(Some(regex)) => StudentIdPattern::Compiled(regex),
            Ok(None) => StudentIdPattern::Compiled(STUDENT_ID_REGEX.clone()),
            Err(error) => StudentIdPattern::Invalid {
                pattern: pattern.trim().to_string(),
                error,
            },
        };
        Extractor {
            student_id,
            ..Self::new()
        }
    }

    pub fn student_id_pattern(&self) -> &str {
        match &self.student_id {
            StudentIdPattern::Compiled(regex) => regex.as_str(),
            StudentIdPattern::Invalid { pattern, .. } => pattern,
        }
    }

    /// The pattern error, if the student-ID pattern did not compile.
    pub fn student_id_error(&self) -> Option<SwallowError> {
        match &self.student_id {
            StudentIdPattern::Compiled(_) => None,
            StudentIdPattern::Invalid { pattern, error } => {
                Some(SwallowError::pattern(pattern, error.clone()))
            }
        }
    }

    pub fn extract(&self, category: Category, text: &str) -> Result<HashSet<String>> {
        match category {
            Category::Email => Ok(self.extract_emails(text)),
            Category::Phone => Ok(self.extract_phones(text)),
            Category::StudentId => self.extract_student_ids(text),
        }
    }

    pub fn extract_emails(&self, text: &str) -> HashSet<String> {
        self.email_regex
            .find_iter(text)
            .map(|m| m.as_str().to_string())
            .collect()
    }

    /// Matches are normalized to 11 bare digits.
    pub fn extract_phones(&self, text: &str) -> HashSet<String> {
        self.phone_regex
            .find_iter(text)
            .filter_map(|m| clean_phone(m.as_str()))
            .collect()
    }

    pub fn extract_student_ids(&self, text: &str) -> Result<HashSet<String>> {
        match &self.student_id {
            StudentIdPattern::Compiled(regex) => Ok(regex
                .find_iter(text)
                .map(|m| m.as_str().to_string())
                .collect()),
            StudentIdPattern::Invalid { pattern, error } => {
                Err(SwallowError::pattern(pattern, error.clone()))
            }
        }
    }
}

/// Strips every non-digit. Keeps 11 digits as is and drops the country code
/// from 13 digits starting with `86`; anything else is rejected.
pub fn clean_phone(raw: &str) -> Option<String> {
    let digits: String = raw.chars().filter(|c| c.is_ascii_digit()).collect();
    match digits.len() {
        11 => Some(digits),
        13 if digits.starts_with("86") => Some(digits[2..].to_string()),
        _ => None,
    }
}

/// `Ok(None)` for blank input, which means the composite pattern applies.
pub fn validate_pattern(pattern: &str) -> Result<Option<Regex>> {
    compile_trimmed(pattern).map_err(|e| SwallowError::pattern(pattern.trim(), e))
}

fn compile_trimmed(pattern: &str) -> std::result::Result<Option<Regex>, regex::Error> {
    let pattern = pattern.trim();
    if pattern.is_empty() {
        return Ok(None);
    }
    Regex::new(pattern).map(Some)
}

/// Whether the whole candidate matches `pattern` (or the composite pattern).
pub fn matches_student_id(candidate: &str, pattern: Option<&str>) -> Result<bool> {
    if candidate.is_empty() {
        return Ok(false);
    }
    let pattern = match pattern.map(str::trim) {
        Some(p) if !p.is_empty() => p,
        _ => patterns::student_id_composite(),
    };
    let anchored = format!("^(?:{pattern})$");
    let regex = Regex::new(&anchored).map_err(|e| SwallowError::pattern(pattern, e))?;
    Ok(regex.is_match(candidate))
}
