//! Merge constants and default presets.

/// Password copied into every output row unless configured otherwise.
pub const C_PASSWORD_DEFAULT: &str = "Adminn.1";
/// Role paired with every course unless configured otherwise.
pub const C_ROLE_DEFAULT: &str = "student";
/// Output workbook name unless configured otherwise.
pub const C_OUTPUT_FILE_NAME_DEFAULT: &str = "output.xlsx";
/// Name of the single sheet in the output workbook.
pub const C_SHEET_NAME_MERGED: &str = "Merged Data";

/// Fixed leading output columns, in order.
pub const TUP_COLUMNS_CORE: [&str; 5] = ["username", "firstname", "lastname", "email", "password"];
/// Prefix of the repeated course columns (`course1`, `course2`, ...).
pub const C_COLUMN_PREFIX_COURSE: &str = "course";
/// Prefix of the repeated role columns (`role1`, `role2`, ...).
pub const C_COLUMN_PREFIX_ROLE: &str = "role";
