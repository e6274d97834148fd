//! Inner join of subjects and enrollments plus per-key aggregation.

use std::collections::{BTreeMap, BTreeSet};

use rosterkit_io_xlsx::SpecRawRow;
use tracing::debug;

use crate::normalize::normalize_key_value;
use crate::spec::SpecRosterSchema;

/// Distinct non-blank key values found in `column`.
pub fn collect_join_keys(rows: &[SpecRawRow], column: &str) -> BTreeSet<String> {
    rows.iter()
        .filter_map(|row| normalize_key_value(row.get(column)))
        .collect()
}

/// Keys present in both sets.
pub fn intersect_join_keys(a: &BTreeSet<String>, b: &BTreeSet<String>) -> BTreeSet<String> {
    a.intersection(b).cloned().collect()
}

/// Rows whose `column` key is in `keys`, in source order.
pub fn filter_rows_by_keys<'a>(
    rows: &'a [SpecRawRow],
    column: &str,
    keys: &BTreeSet<String>,
) -> Vec<&'a SpecRawRow> {
    rows.iter()
        .filter(|row| {
            normalize_key_value(row.get(column)).is_some_and(|c_key| keys.contains(&c_key))
        })
        .collect()
}

/// Per-key course lists and display names, built in one pass and read-only
/// afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SpecEnrollmentIndex {
    dict_courses_by_key: BTreeMap<String, Vec<String>>,
    dict_name_by_key: BTreeMap<String, String>,
}

impl SpecEnrollmentIndex {
    /// Group enrollment rows by key, keeping row order.
    ///
    /// Every key gets a (possibly empty) course list. Blank course codes are
    /// skipped; the first non-blank name of a key wins.
    pub fn build(rows: &[&SpecRawRow], schema: &SpecRosterSchema) -> Self {
        let mut dict_courses_by_key: BTreeMap<String, Vec<String>> = BTreeMap::new();
        let mut dict_name_by_key: BTreeMap<String, String> = BTreeMap::new();

        for row in rows {
            let Some(c_key) = normalize_key_value(row.get(&schema.col_enrollment_key)) else {
                continue;
            };

            let l_courses = dict_courses_by_key.entry(c_key.clone()).or_default();
            if let Some(c_course) = normalize_key_value(row.get(&schema.col_enrollment_course)) {
                l_courses.push(c_course);
            }

            if !dict_name_by_key.contains_key(&c_key)
                && let Some(c_name) = normalize_key_value(row.get(&schema.col_enrollment_name))
            {
                dict_name_by_key.insert(c_key, c_name);
            }
        }

        Self {
            dict_courses_by_key,
            dict_name_by_key,
        }
    }

    /// Course codes of `key` in enrollment row order.
    pub fn courses(&self, key: &str) -> &[String] {
        self.dict_courses_by_key
            .get(key)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// First non-blank display name of `key`, or `""`.
    pub fn display_name(&self, key: &str) -> &str {
        self.dict_name_by_key
            .get(key)
            .map(String::as_str)
            .unwrap_or_default()
    }

    /// Number of grouped keys.
    pub fn len(&self) -> usize {
        self.dict_courses_by_key.len()
    }

    /// Whether no key was grouped.
    pub fn is_empty(&self) -> bool {
        self.dict_courses_by_key.is_empty()
    }
}

/// Outcome of the join step.
#[derive(Debug, Clone)]
pub struct SpecJoinResult<'a> {
    /// Distinct non-blank File 1 keys.
    pub keys_subjects: BTreeSet<String>,
    /// Distinct non-blank File 2 keys.
    pub keys_enrollments: BTreeSet<String>,
    /// Keys present in both files.
    pub keys_common: BTreeSet<String>,
    /// File 1 rows with a common key, in File 1 order.
    pub subjects: Vec<&'a SpecRawRow>,
    /// Aggregated File 2 rows with a common key.
    pub index: SpecEnrollmentIndex,
}

/// Inner-join subjects and enrollments on their key columns.
pub fn join_rosters<'a>(
    subjects: &'a [SpecRawRow],
    enrollments: &[SpecRawRow],
    schema: &SpecRosterSchema,
) -> SpecJoinResult<'a> {
    let keys_subjects = collect_join_keys(subjects, &schema.col_subject_key);
    let keys_enrollments = collect_join_keys(enrollments, &schema.col_enrollment_key);
    let keys_common = intersect_join_keys(&keys_subjects, &keys_enrollments);

    let l_subjects = filter_rows_by_keys(subjects, &schema.col_subject_key, &keys_common);
    let l_enrollments = filter_rows_by_keys(enrollments, &schema.col_enrollment_key, &keys_common);
    let index = SpecEnrollmentIndex::build(&l_enrollments, schema);

    debug!(
        n_keys_subjects = keys_subjects.len(),
        n_keys_enrollments = keys_enrollments.len(),
        n_keys_common = keys_common.len(),
        n_rows_subjects = l_subjects.len(),
        n_rows_enrollments = l_enrollments.len(),
        "joined rosters"
    );

    SpecJoinResult {
        keys_subjects,
        keys_enrollments,
        keys_common,
        subjects: l_subjects,
        index,
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rosterkit_io_xlsx::EnumCellValue;

    use super::*;

    fn row(cells: &[(&str, &str)]) -> SpecRawRow {
        cells
            .iter()
            .map(|(k, v)| (*k, EnumCellValue::String(v.to_string())))
            .collect()
    }

    fn subject(code: &str, username: &str) -> SpecRawRow {
        row(&[("code", code), ("username", username)])
    }

    fn enrollment(code: &str, name: &str, course: &str) -> SpecRawRow {
        row(&[("studentCode", code), ("fullName", name), ("courseCode", course)])
    }

    fn keys(values: &[&str]) -> BTreeSet<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    #[test]
    fn collect_join_keys_skips_blank_and_missing() {
        let rows = vec![
            subject(" 1 ", "a"),
            subject("", "b"),
            row(&[("username", "c")]),
            subject("1", "d"),
            subject("2", "e"),
        ];
        assert_eq!(collect_join_keys(&rows, "code"), keys(&["1", "2"]));
    }

    #[test]
    fn filter_rows_by_keys_keeps_order_and_duplicates() {
        let rows = vec![subject("2", "a"), subject("1", "b"), subject("3", "c"), subject("2", "d")];
        let l_rows = filter_rows_by_keys(&rows, "code", &keys(&["2", "3"]));

        let l_contacts: Vec<_> = l_rows
            .iter()
            .map(|r| r.get("username").cloned())
            .collect();
        assert_eq!(
            l_contacts,
            vec![
                Some(EnumCellValue::String("a".to_string())),
                Some(EnumCellValue::String("c".to_string())),
                Some(EnumCellValue::String("d".to_string())),
            ]
        );
    }

    #[test]
    fn enrollment_index_groups_in_row_order_with_first_name_winning() {
        let rows = vec![
            enrollment("1", "   ", "101"),
            enrollment("1", "Ali Hassan", "102"),
            enrollment("2", "Mona", ""),
            enrollment("1", "Someone Else", "103"),
            row(&[("studentCode", "3"), ("fullName", "Omar")]),
        ];
        let l_rows: Vec<&SpecRawRow> = rows.iter().collect();
        let index = SpecEnrollmentIndex::build(&l_rows, &SpecRosterSchema::english());

        assert_eq!(index.len(), 3);
        assert_eq!(index.courses("1"), ["101", "102", "103"]);
        assert_eq!(index.display_name("1"), "Ali Hassan");
        assert!(index.courses("2").is_empty());
        assert_eq!(index.display_name("2"), "Mona");
        assert!(index.courses("3").is_empty());
        assert!(index.courses("missing").is_empty());
        assert_eq!(index.display_name("missing"), "");
    }

    #[test]
    fn join_rosters_is_a_strict_inner_join() {
        let subjects = vec![subject("1", "a@x.com"), subject("2", "b@x.com"), subject("", "c")];
        let enrollments = vec![
            enrollment("1", "Ali Hassan", "101"),
            enrollment("1", "Ali Hassan", "102"),
            enrollment("4", "Nobody", "900"),
        ];

        let join = join_rosters(&subjects, &enrollments, &SpecRosterSchema::english());
        assert_eq!(join.keys_subjects, keys(&["1", "2"]));
        assert_eq!(join.keys_enrollments, keys(&["1", "4"]));
        assert_eq!(join.keys_common, keys(&["1"]));
        assert_eq!(join.subjects.len(), 1);
        assert_eq!(join.index.len(), 1);
        assert_eq!(join.index.courses("1"), ["101", "102"]);
        assert!(join.index.courses("4").is_empty());
    }
}
