//! Merge pipeline: validate, decode, join, assemble, encode.

use std::fs;
use std::path::{Path, PathBuf};

use rosterkit_io_xlsx::{
    SpecRawRow, SpecSheetRecords, XlsxWriter, decode_sheet_rows, locate_header_row,
    normalize_output_file_name, read_sheet_grid,
};
use tracing::{debug, info};

use crate::assemble::assemble_output_records;
use crate::conf::C_SHEET_NAME_MERGED;
use crate::join::join_rosters;
use crate::normalize::normalize_records;
use crate::report::ReportMerge;
use crate::spec::{
    EnumRosterFile, MergeError, SpecMergeConfig, SpecMergeOutput, SpecMergedTable,
    SpecRosterSchema,
};

/// Merge a subject roster (File 1) with an enrollment export (File 2).
///
/// Steps:
/// 1. Validate `config` before touching any input.
/// 2. Decode File 1 with its header on the first used row and check its
///    required columns.
/// 3. Locate File 2's header by scanning, then decode File 2 again from there.
/// 4. Inner-join on the key columns, aggregate courses per key and assemble
///    one padded record per matched File 1 row.
/// 5. Encode the table as a single-sheet workbook.
///
/// Nothing is returned on failure; there is no partial output.
pub fn merge_rosters(
    bytes_subjects: &[u8],
    bytes_enrollments: &[u8],
    config: &SpecMergeConfig,
) -> Result<SpecMergeOutput, MergeError> {
    config.validate()?;
    let file_name = normalize_output_file_name(&config.output_file_name);
    info!(file_name = %file_name, "merge started");

    let records_subjects = decode_subjects(bytes_subjects, &config.schema)?;
    let records_enrollments = decode_enrollments(
        bytes_enrollments,
        &config.schema,
        config.n_rows_header_scan_max,
    )?;

    let (table, mut report) =
        build_merged_table(&records_subjects.rows, &records_enrollments.rows, config);
    report.row_header_enrollments = records_enrollments.row_header;

    let bytes = encode_merged_table(&table, &mut report)?;
    info!(
        n_rows = table.height(),
        n_courses_max = table.n_courses_max(),
        n_bytes = bytes.len(),
        "merge finished"
    );

    Ok(SpecMergeOutput {
        file_name,
        bytes,
        table,
        report,
        path_file_out: None,
    })
}

/// Read both inputs from disk, merge them and write the workbook into `dir_out`.
///
/// An invalid `config` is rejected before either input file is opened. The
/// output file is only created once the whole merge has succeeded.
pub fn merge_roster_files<P, Q, R>(
    path_subjects: P,
    path_enrollments: Q,
    dir_out: R,
    config: &SpecMergeConfig,
) -> Result<SpecMergeOutput, MergeError>
where
    P: AsRef<Path>,
    Q: AsRef<Path>,
    R: AsRef<Path>,
{
    config.validate()?;
    let bytes_subjects = read_input(path_subjects.as_ref())?;
    let bytes_enrollments = read_input(path_enrollments.as_ref())?;

    let mut output = merge_rosters(&bytes_subjects, &bytes_enrollments, config)?;

    let path_file_out = dir_out.as_ref().join(&output.file_name);
    fs::write(&path_file_out, &output.bytes).map_err(|source| MergeError::Io {
        path: path_file_out.clone(),
        source,
    })?;
    info!(path = %path_file_out.display(), "merged workbook written");

    output.path_file_out = Some(path_file_out);
    Ok(output)
}

/// Decode File 1 and check that every required column is present.
pub fn decode_subjects(
    bytes: &[u8],
    schema: &SpecRosterSchema,
) -> Result<SpecSheetRecords, MergeError> {
    let records = decode_sheet_rows(bytes, None)
        .map_err(|err| MergeError::from_read_error(EnumRosterFile::Subjects, err))?;
    let records = normalize_records(records);

    for c_required in schema.subject_required() {
        if !records.columns.contains(&c_required) {
            return Err(MergeError::MissingColumn {
                file: EnumRosterFile::Subjects,
                column: c_required,
            });
        }
    }

    debug!(n_rows = records.rows.len(), "decoded subjects");
    Ok(records)
}

/// Locate File 2's header row, then decode File 2 again from that row.
pub fn decode_enrollments(
    bytes: &[u8],
    schema: &SpecRosterSchema,
    n_rows_header_scan_max: usize,
) -> Result<SpecSheetRecords, MergeError> {
    let to_merge_error = |err| MergeError::from_read_error(EnumRosterFile::Enrollments, err);

    let l_grid = read_sheet_grid(bytes).map_err(to_merge_error)?;
    let n_row_header = locate_header_row(
        &l_grid,
        &schema.enrollment_required(),
        n_rows_header_scan_max,
    )
    .map_err(to_merge_error)?;
    debug!(n_row_header, "located enrollment header");

    let records = decode_sheet_rows(bytes, Some(n_row_header)).map_err(to_merge_error)?;
    let records = normalize_records(records);

    debug!(n_rows = records.rows.len(), "decoded enrollments");
    Ok(records)
}

/// Join normalized inputs and assemble the padded output table.
pub fn build_merged_table(
    subjects: &[SpecRawRow],
    enrollments: &[SpecRawRow],
    config: &SpecMergeConfig,
) -> (SpecMergedTable, ReportMerge) {
    let schema = &config.schema;
    let join = join_rosters(subjects, enrollments, schema);

    let l_records = assemble_output_records(
        &join.subjects,
        &join.index,
        schema,
        &config.default_password,
        &config.default_role,
    );
    let table = SpecMergedTable::from_records(l_records);

    let mut report = ReportMerge {
        cnt_rows_subjects: subjects.len() as u64,
        cnt_rows_enrollments: enrollments.len() as u64,
        cnt_keys_subjects: join.keys_subjects.len() as u64,
        cnt_keys_enrollments: join.keys_enrollments.len() as u64,
        cnt_keys_common: join.keys_common.len() as u64,
        cnt_rows_output: table.height() as u64,
        n_courses_max: table.n_courses_max() as u64,
        ..ReportMerge::default()
    };

    let n_keys_unmatched = join.keys_subjects.len() - join.keys_common.len();
    if n_keys_unmatched > 0 {
        report.warn(format!(
            "{n_keys_unmatched} File 1 key(s) have no match in File 2 and were excluded."
        ));
    }
    let n_rows_duplicate = join.subjects.len() - join.keys_common.len();
    if n_rows_duplicate > 0 {
        report.warn(format!(
            "{n_rows_duplicate} File 1 row(s) repeat an earlier key and were kept."
        ));
    }

    (table, report)
}

/// Render the table as a workbook with a single `Merged Data` sheet.
///
/// Writer warnings are appended to `report`.
pub fn encode_merged_table(
    table: &SpecMergedTable,
    report: &mut ReportMerge,
) -> Result<Vec<u8>, MergeError> {
    let df = table
        .to_dataframe()
        .map_err(|err| MergeError::Encode(err.to_string()))?;

    let mut writer = XlsxWriter::default();
    writer
        .write_sheet_from_dataframe(&df, C_SHEET_NAME_MERGED)
        .map_err(|err| MergeError::Encode(err.to_string()))?;
    for report_sheet in writer.report() {
        for c_warning in report_sheet.warnings {
            report.warn(c_warning);
        }
    }
    writer
        .save_to_buffer()
        .map_err(|err| MergeError::Encode(err.to_string()))
}

fn read_input(path: &Path) -> Result<Vec<u8>, MergeError> {
    fs::read(path).map_err(|source| MergeError::Io {
        path: PathBuf::from(path),
        source,
    })
}
