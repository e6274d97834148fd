//! Output record assembly and rectangular padding.

use rosterkit_io_xlsx::{SpecRawRow, derive_text_from_cell_value};

use crate::join::SpecEnrollmentIndex;
use crate::normalize::{normalize_key_value, split_full_name};
use crate::spec::{SpecEnrollmentSlot, SpecOutputRecord, SpecRosterSchema};

/// Build one record per subject row, in the given order.
///
/// Records carry only their own courses; see [`pad_enrollment_slots`].
pub fn assemble_output_records(
    subjects: &[&SpecRawRow],
    index: &SpecEnrollmentIndex,
    schema: &SpecRosterSchema,
    password: &str,
    role: &str,
) -> Vec<SpecOutputRecord> {
    subjects
        .iter()
        .map(|row| {
            let c_key = normalize_key_value(row.get(&schema.col_subject_key)).unwrap_or_default();
            let c_email = row
                .get(&schema.col_subject_contact)
                .map(derive_text_from_cell_value)
                .unwrap_or_default();
            let (c_first, c_rest) = split_full_name(index.display_name(&c_key));

            let enrollments = index
                .courses(&c_key)
                .iter()
                .map(|c_course| SpecEnrollmentSlot {
                    course: c_course.clone(),
                    role: role.to_string(),
                })
                .collect();

            SpecOutputRecord {
                username: c_key,
                firstname: c_first,
                lastname: c_rest,
                email: c_email,
                password: password.to_string(),
                enrollments,
            }
        })
        .collect()
}

/// Pad every record with empty slots up to the widest record; return that width.
pub fn pad_enrollment_slots(records: &mut [SpecOutputRecord]) -> usize {
    let n_courses_max = records
        .iter()
        .map(|record| record.enrollments.len())
        .max()
        .unwrap_or(0);
    for record in records.iter_mut() {
        record
            .enrollments
            .resize_with(n_courses_max, SpecEnrollmentSlot::default);
    }
    n_courses_max
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rosterkit_io_xlsx::EnumCellValue;

    use super::*;

    fn row(cells: &[(&str, EnumCellValue)]) -> SpecRawRow {
        cells.iter().map(|(k, v)| (*k, v.clone())).collect()
    }

    fn text(v: &str) -> EnumCellValue {
        EnumCellValue::String(v.to_string())
    }

    #[test]
    fn assemble_maps_fields_and_courses() {
        let schema = SpecRosterSchema::english();
        let enrollments = vec![
            row(&[
                ("studentCode", EnumCellValue::Number(1.0)),
                ("fullName", text("Ali Hassan Omar")),
                ("courseCode", text("101")),
            ]),
            row(&[
                ("studentCode", text("1")),
                ("courseCode", EnumCellValue::Number(102.0)),
            ]),
        ];
        let l_enrollments: Vec<&SpecRawRow> = enrollments.iter().collect();
        let index = SpecEnrollmentIndex::build(&l_enrollments, &schema);

        let subjects = vec![
            row(&[("code", text(" 1")), ("username", text("a@x.com"))]),
            row(&[("code", text("1"))]),
        ];
        let l_subjects: Vec<&SpecRawRow> = subjects.iter().collect();
        let l_records = assemble_output_records(&l_subjects, &index, &schema, "pw", "student");

        assert_eq!(l_records.len(), 2);
        assert_eq!(
            l_records[0].values(),
            vec!["1", "Ali", "Hassan Omar", "a@x.com", "pw", "101", "student", "102", "student"]
        );
        assert_eq!(l_records[1].email, "");
        assert_eq!(l_records[1].enrollments.len(), 2);
    }

    #[test]
    fn subject_without_courses_or_name_gets_empty_fields() {
        let schema = SpecRosterSchema::english();
        let subjects = vec![row(&[("code", text("9")), ("username", text("z@x.com"))])];
        let l_subjects: Vec<&SpecRawRow> = subjects.iter().collect();

        let l_records = assemble_output_records(
            &l_subjects,
            &SpecEnrollmentIndex::default(),
            &schema,
            "pw",
            "student",
        );
        assert_eq!(l_records[0].values(), vec!["9", "", "", "z@x.com", "pw"]);
    }

    #[test]
    fn pad_enrollment_slots_makes_records_rectangular() {
        let slot = |c: &str| SpecEnrollmentSlot {
            course: c.to_string(),
            role: "r".to_string(),
        };
        let mut l_records = vec![
            SpecOutputRecord {
                enrollments: vec![slot("a")],
                ..SpecOutputRecord::default()
            },
            SpecOutputRecord {
                enrollments: vec![slot("b"), slot("c"), slot("d")],
                ..SpecOutputRecord::default()
            },
            SpecOutputRecord::default(),
        ];

        assert_eq!(pad_enrollment_slots(&mut l_records), 3);
        assert!(l_records.iter().all(|r| r.enrollments.len() == 3));
        assert_eq!(l_records[0].enrollments[0], slot("a"));
        assert_eq!(l_records[0].enrollments[2], SpecEnrollmentSlot::default());
        assert_eq!(pad_enrollment_slots(&mut []), 0);
    }
}
