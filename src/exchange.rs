use crate::grades::{parse_grade, Grades, Subject};
use crate::roster::StudentRecord;

/// Fixed header line of the `;`-delimited interchange format.
pub const EXPORT_HEADER: &str = "ФИО;Класс;Информатика;Физика;Математика;Литература;Музыка";
/// Download name offered to the consuming UI.
pub const EXPORT_FILE_NAME: &str = "оценки.csv";
pub const EXPORT_CONTENT_TYPE: &str = "text/csv;charset=utf-8";
/// Prefix forcing UTF-8 detection in spreadsheet tools.
pub const UTF8_BOM: char = '\u{feff}';

const MIN_COLUMNS: usize = 7;

#[derive(Debug, Default)]
pub struct ImportOutcome {
    pub records: Vec<StudentRecord>,
    pub skipped_rows: usize,
}

/// Parse uploaded file contents. Blank rows are dropped, the first surviving
/// row is the header and is discarded unconditionally. Rows with fewer than
/// 7 columns, or with a blank name or class, are skipped and counted; grade
/// cells go through the lenient validator.
pub fn parse_roster(content: &str) -> ImportOutcome {
    let mut outcome = ImportOutcome::default();
    let mut rows = content.lines().filter(|row| !row.trim().is_empty());
    if rows.next().is_none() {
        return outcome;
    }

    for row in rows {
        let columns: Vec<&str> = row.split(';').collect();
        if columns.len() < MIN_COLUMNS {
            outcome.skipped_rows += 1;
            continue;
        }
        let name = columns[0].trim();
        let class_name = columns[1].trim();
        if name.is_empty() || class_name.is_empty() {
            outcome.skipped_rows += 1;
            continue;
        }

        let mut grades = Grades::default();
        for (offset, subject) in Subject::ALL.into_iter().enumerate() {
            grades.set(subject, parse_grade(columns[2 + offset]));
        }
        outcome.records.push(StudentRecord {
            name: name.to_string(),
            class_name: class_name.to_string(),
            grades,
        });
    }
    outcome
}

/// Serialize records back to the interchange format: header line, one
/// `;`-joined line per record in store order, absent grades as empty fields,
/// every line newline-terminated. The BOM prefix is a download concern and
/// is applied at the command boundary.
pub fn render_roster(records: &[StudentRecord]) -> String {
    let mut out = String::from(EXPORT_HEADER);
    out.push('\n');
    for record in records {
        out.push_str(&record.name);
        out.push(';');
        out.push_str(&record.class_name);
        for subject in Subject::ALL {
            out.push(';');
            if let Some(grade) = record.grades.get(subject) {
                out.push_str(&grade.to_string());
            }
        }
        out.push('\n');
    }
    out
}
