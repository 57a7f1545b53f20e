//! Built-in regular expressions.
//!
//! Student-ID patterns only accept years from 2000 on where the format
//! carries an enrolment year.

use std::sync::LazyLock;

pub const EMAIL: &str = r"(?i)[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Z|a-z]{2,}";

/// Mainland mobile numbers: plain 11 digits, `1XX XXXX XXXX` and
/// `1XXX-XXXX-XXXX`, each with an optional `+86` prefix.
pub const CHINA_PHONE: &str = r"(?:\+86\s?)?1[3-9]\d{9}|(?:\+86\s?)?1[3-9]\d{1}\s?\d{4}\s?\d{4}|(?:\+86\s?)?1[3-9]\d{2}-\d{4}-\d{4}";

/// Enrolment year, college, major, sequence.
pub const STUDENT_ID_10_DIGIT: &str = r"\b20\d{2}\d{6}\b";
/// Enrolment year, campus, college, major, sequence.
pub const STUDENT_ID_12_DIGIT: &str = r"\b20\d{2}\d{8}\b";
pub const STUDENT_ID_9_DIGIT: &str = r"\b\d{3}\d{6}\b|\b20\d{2}\d{5}\b";
/// Letter prefix (B/M/D/Y), infix or suffix, plus generic uppercase alphanumerics.
pub const STUDENT_ID_WITH_LETTER: &str =
    r"\b[BMDY]20\d{2}\d{4,6}\b|\b20\d{2}[A-Z]\d{4,5}\b|\b20\d{2}\d{4,6}[A-Z]\b|\b[A-Z0-9]{8,12}\b";
/// Primary/secondary schools and vocational colleges.
pub const STUDENT_ID_SHORT: &str = r"\b\d{6,8}\b";

pub const STUDENT_ID_SUB_PATTERNS: [&str; 5] = [
    STUDENT_ID_10_DIGIT,
    STUDENT_ID_12_DIGIT,
    STUDENT_ID_9_DIGIT,
    STUDENT_ID_WITH_LETTER,
    STUDENT_ID_SHORT,
];

static STUDENT_ID_COMPOSITE: LazyLock<String> =
    LazyLock::new(|| STUDENT_ID_SUB_PATTERNS.join("|"));

/// Alternation of every built-in student-ID pattern.
pub fn student_id_composite() -> &'static str {
    &STUDENT_ID_COMPOSITE
}
