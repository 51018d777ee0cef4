use serde::{Deserialize, Serialize};

pub const GRADE_MIN: u8 = 2;
pub const GRADE_MAX: u8 = 5;

/// The five graded subjects. The variant order is the display and export
/// column order everywhere.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Subject {
    Informatics,
    Physics,
    Math,
    Literature,
    Music,
}

impl Subject {
    pub const ALL: [Subject; 5] = [
        Subject::Informatics,
        Subject::Physics,
        Subject::Math,
        Subject::Literature,
        Subject::Music,
    ];

    pub fn key(self) -> &'static str {
        match self {
            Subject::Informatics => "informatics",
            Subject::Physics => "physics",
            Subject::Math => "math",
            Subject::Literature => "literature",
            Subject::Music => "music",
        }
    }
}

/// One grade cell per subject; `None` means "absent".
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Grades {
    pub informatics: Option<u8>,
    pub physics: Option<u8>,
    pub math: Option<u8>,
    pub literature: Option<u8>,
    pub music: Option<u8>,
}

impl Grades {
    pub fn get(&self, subject: Subject) -> Option<u8> {
        match subject {
            Subject::Informatics => self.informatics,
            Subject::Physics => self.physics,
            Subject::Math => self.math,
            Subject::Literature => self.literature,
            Subject::Music => self.music,
        }
    }

    pub fn set(&mut self, subject: Subject, grade: Option<u8>) {
        match subject {
            Subject::Informatics => self.informatics = grade,
            Subject::Physics => self.physics = grade,
            Subject::Math => self.math = grade,
            Subject::Literature => self.literature = grade,
            Subject::Music => self.music = grade,
        }
    }
}

/// Parse a raw grade cell. Empty or whitespace-only text is absent; anything
/// that does not carry a leading integer in 2..=5 collapses to absent too.
/// Total over arbitrary input, never an error.
pub fn parse_grade(raw: &str) -> Option<u8> {
    let t = raw.trim();
    if t.is_empty() {
        return None;
    }
    let n = parse_leading_int(t)?;
    if (i64::from(GRADE_MIN)..=i64::from(GRADE_MAX)).contains(&n) {
        Some(n as u8)
    } else {
        None
    }
}

/// Form-level validity feedback: blank is fine (absent), otherwise the text
/// must parse to a grade in range.
pub fn is_valid_grade(raw: &str) -> bool {
    raw.trim().is_empty() || parse_grade(raw).is_some()
}

/// Leading-integer semantics: optional sign, then digits, trailing garbage
/// ignored. No digits at all is a failed parse.
fn parse_leading_int(t: &str) -> Option<i64> {
    let bytes = t.as_bytes();
    let mut i = 0usize;
    let negative = match bytes.first() {
        Some(b'-') => {
            i = 1;
            true
        }
        Some(b'+') => {
            i = 1;
            false
        }
        _ => false,
    };
    let start = i;
    while i < bytes.len() && bytes[i].is_ascii_digit() {
        i += 1;
    }
    if i == start {
        return None;
    }
    let n: i64 = t[start..i].parse().ok()?;
    Some(if negative { -n } else { n })
}
