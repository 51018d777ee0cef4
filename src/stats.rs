use serde::Serialize;

use crate::grades::Subject;
use crate::roster::StudentRecord;

/// Frequency of each grade value 2..=5, serialized under the literal grade
/// value as key.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct GradeCounts {
    #[serde(rename = "2")]
    pub twos: usize,
    #[serde(rename = "3")]
    pub threes: usize,
    #[serde(rename = "4")]
    pub fours: usize,
    #[serde(rename = "5")]
    pub fives: usize,
}

impl GradeCounts {
    /// Count one grade. Values outside 2..=5 cannot come from the validator;
    /// if one slips through it is ignored rather than miscounted.
    fn record(&mut self, grade: u8) {
        match grade {
            2 => self.twos += 1,
            3 => self.threes += 1,
            4 => self.fours += 1,
            5 => self.fives += 1,
            _ => {}
        }
    }
}

/// Descriptive statistics over one subject's present grades. Recomputed on
/// demand, never persisted; percentages are a render-time concern of the
/// consuming layer.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SubjectStats {
    pub values: Vec<u8>,
    pub count: usize,
    pub mean: f64,
    pub median: f64,
    pub counts: GradeCounts,
}

/// Per-subject statistics, field order matching `Subject::ALL`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SubjectBreakdown {
    pub informatics: SubjectStats,
    pub physics: SubjectStats,
    pub math: SubjectStats,
    pub literature: SubjectStats,
    pub music: SubjectStats,
}

impl SubjectBreakdown {
    fn set(&mut self, subject: Subject, stats: SubjectStats) {
        match subject {
            Subject::Informatics => self.informatics = stats,
            Subject::Physics => self.physics = stats,
            Subject::Math => self.math = stats,
            Subject::Literature => self.literature = stats,
            Subject::Music => self.music = stats,
        }
    }
}

/// One class bucket; records keep their original relative order.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassGroup {
    pub class_name: String,
    pub records: Vec<StudentRecord>,
}

/// Aggregates computed independently within one class.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassStats {
    pub class_name: String,
    pub subjects: SubjectBreakdown,
}

/// Statistics for one subject's present grades. Empty input yields zeroed
/// stats so downstream percentage math stays defined (0/0 guarded by the
/// renderer).
pub fn subject_stats(values: &[u8]) -> SubjectStats {
    if values.is_empty() {
        return SubjectStats::default();
    }
    let count = values.len();
    let sum: u32 = values.iter().map(|&v| u32::from(v)).sum();
    let mean = f64::from(sum) / count as f64;
    let median = median_of(values);
    let mut counts = GradeCounts::default();
    for &v in values {
        counts.record(v);
    }
    SubjectStats {
        values: values.to_vec(),
        count,
        mean,
        median,
        counts,
    }
}

fn median_of(values: &[u8]) -> f64 {
    let mut sorted = values.to_vec();
    sorted.sort_unstable();
    let n = sorted.len();
    if n % 2 == 1 {
        f64::from(sorted[n / 2])
    } else {
        (f64::from(sorted[n / 2 - 1]) + f64::from(sorted[n / 2])) / 2.0
    }
}

/// Partition records by class. Buckets appear in first-seen order and each
/// bucket preserves the original relative record order; repeated calls on
/// identical input yield identical output.
pub fn group_by_class(records: &[StudentRecord]) -> Vec<ClassGroup> {
    let mut groups: Vec<ClassGroup> = Vec::new();
    for record in records {
        match groups.iter_mut().find(|g| g.class_name == record.class_name) {
            Some(group) => group.records.push(record.clone()),
            None => groups.push(ClassGroup {
                class_name: record.class_name.clone(),
                records: vec![record.clone()],
            }),
        }
    }
    groups
}

/// Aggregate across the full collection regardless of class: for each
/// subject, every present grade feeds `subject_stats`.
pub fn overall_statistics(records: &[StudentRecord]) -> SubjectBreakdown {
    let mut out = SubjectBreakdown::default();
    for subject in Subject::ALL {
        let values: Vec<u8> = records
            .iter()
            .filter_map(|r| r.grades.get(subject))
            .collect();
        out.set(subject, subject_stats(&values));
    }
    out
}

/// Independent per-class aggregates; class order matches `group_by_class`.
pub fn class_statistics(records: &[StudentRecord]) -> Vec<ClassStats> {
    group_by_class(records)
        .into_iter()
        .map(|group| ClassStats {
            subjects: overall_statistics(&group.records),
            class_name: group.class_name,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grades::Grades;

    fn record(name: &str, class_name: &str, grades: Grades) -> StudentRecord {
        StudentRecord {
            name: name.to_string(),
            class_name: class_name.to_string(),
            grades,
        }
    }

    #[test]
    fn empty_input_yields_zeroed_stats() {
        let stats = subject_stats(&[]);
        assert_eq!(stats.count, 0);
        assert_eq!(stats.mean, 0.0);
        assert_eq!(stats.median, 0.0);
        assert_eq!(stats.counts, GradeCounts::default());
        assert!(stats.values.is_empty());
    }

    #[test]
    fn median_odd_takes_middle_element() {
        assert_eq!(subject_stats(&[2, 3, 4]).median, 3.0);
        assert_eq!(subject_stats(&[4, 2, 3]).median, 3.0);
    }

    #[test]
    fn median_even_averages_middle_two() {
        assert_eq!(subject_stats(&[2, 3, 4, 5]).median, 3.5);
        assert_eq!(subject_stats(&[5, 5, 2, 2]).median, 3.5);
    }

    #[test]
    fn mean_is_unrounded() {
        let stats = subject_stats(&[4, 4, 5]);
        assert!((stats.mean - 13.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn frequency_table_counts_each_value() {
        let stats = subject_stats(&[5, 4, 4, 2, 5, 5]);
        assert_eq!(stats.counts.fives, 3);
        assert_eq!(stats.counts.fours, 2);
        assert_eq!(stats.counts.threes, 0);
        assert_eq!(stats.counts.twos, 1);
        assert_eq!(stats.count, 6);
    }

    #[test]
    fn grouping_keeps_first_seen_class_order() {
        let records = vec![
            record("a", "10A", Grades::default()),
            record("b", "11B", Grades::default()),
            record("c", "10A", Grades::default()),
            record("d", "9C", Grades::default()),
        ];
        let groups = group_by_class(&records);
        let names: Vec<&str> = groups.iter().map(|g| g.class_name.as_str()).collect();
        assert_eq!(names, ["10A", "11B", "9C"]);
        let first: Vec<&str> = groups[0].records.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(first, ["a", "c"]);
    }

    #[test]
    fn grouping_is_deterministic_across_calls() {
        let records = vec![
            record("a", "10A", Grades::default()),
            record("b", "11B", Grades::default()),
            record("c", "10A", Grades::default()),
        ];
        let once = group_by_class(&records);
        let twice = group_by_class(&records);
        assert_eq!(once.len(), twice.len());
        for (g1, g2) in once.iter().zip(twice.iter()) {
            assert_eq!(g1.class_name, g2.class_name);
            assert_eq!(g1.records, g2.records);
        }
    }

    #[test]
    fn overall_statistics_collects_present_grades_only() {
        let mut g1 = Grades::default();
        g1.set(Subject::Informatics, Some(5));
        let mut g2 = Grades::default();
        g2.set(Subject::Informatics, Some(4));
        let records = vec![
            record("Ivanov", "10A", g1),
            record("Petrov", "10A", g2),
            record("Sidorov", "10A", Grades::default()),
        ];

        let overall = overall_statistics(&records);
        assert_eq!(overall.informatics.values, vec![5, 4]);
        assert_eq!(overall.informatics.count, 2);
        assert!((overall.informatics.mean - 4.5).abs() < 1e-9);
        assert!((overall.informatics.median - 4.5).abs() < 1e-9);
        assert_eq!(overall.physics.count, 0);
    }

    #[test]
    fn class_statistics_matches_grouping_order() {
        let mut g = Grades::default();
        g.set(Subject::Math, Some(4));
        let records = vec![
            record("a", "11B", g),
            record("b", "10A", g),
            record("c", "11B", g),
        ];
        let per_class = class_statistics(&records);
        assert_eq!(per_class.len(), 2);
        assert_eq!(per_class[0].class_name, "11B");
        assert_eq!(per_class[0].subjects.math.count, 2);
        assert_eq!(per_class[1].class_name, "10A");
        assert_eq!(per_class[1].subjects.math.count, 1);
    }

    #[test]
    fn removing_a_class_last_record_drops_the_class() {
        let mut g = Grades::default();
        g.set(Subject::Math, Some(4));
        let mut records = vec![record("a", "10A", g), record("b", "11B", g)];
        records.remove(1);
        let groups = group_by_class(&records);
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].class_name, "10A");
        assert!(class_statistics(&records)
            .iter()
            .all(|c| c.class_name != "11B"));
    }
}
