//! `rosterkit_merge` v1:
//! Joins a subject roster with an enrollment export into one upload sheet.
//!
//! Modules:
//! - `conf`      : default values and output column names
//! - `spec`      : config, schema, output models and errors
//! - `normalize` : header/key trimming and name splitting
//! - `join`      : key intersection and per-key course aggregation
//! - `assemble`  : output records and rectangular padding
//! - `report`    : run counters and warnings
//! - `merge`     : end-to-end pipeline (bytes or files in, workbook out)
pub mod assemble;
pub mod conf;
pub mod join;
pub mod merge;
pub mod normalize;
pub mod report;
pub mod spec;

pub use conf::{
    C_COLUMN_PREFIX_COURSE, C_COLUMN_PREFIX_ROLE, C_OUTPUT_FILE_NAME_DEFAULT, C_PASSWORD_DEFAULT,
    C_ROLE_DEFAULT, C_SHEET_NAME_MERGED, TUP_COLUMNS_CORE,
};
pub use join::{SpecEnrollmentIndex, SpecJoinResult, join_rosters};
pub use merge::{
    build_merged_table, decode_enrollments, decode_subjects, encode_merged_table,
    merge_roster_files, merge_rosters,
};
pub use normalize::{normalize_key_value, split_full_name};
pub use report::ReportMerge;
pub use spec::{
    EnumRosterFile, MergeError, SpecEnrollmentSlot, SpecMergeConfig, SpecMergeOutput,
    SpecMergedTable, SpecOutputRecord, SpecRosterSchema,
};
