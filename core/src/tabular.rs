//! Whitespace-tabular output of virsh (`list --all`, `domblklist --details`)
//!
//! virsh has no machine-readable mode for these listings, so every parser in
//! the crate goes through [`parse_tabular_output`] and works on the resulting
//! rows of fields.

/// Header labels that start the first line of the tables we read
pub const LIST_HEADERS: &[&str] = &["Id"];
pub const BLKLIST_HEADERS: &[&str] = &["Type", "Target"];

/// Split table output into rows of whitespace-separated fields.
///
/// Blank lines, separator rules (`---…`) and lines starting with one of
/// `headers` are skipped. Field counts are not checked here; callers drop
/// rows that are too short for their columns.
pub fn parse_tabular_output(raw: &str, headers: &[&str]) -> Vec<Vec<String>> {
    raw.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .filter(|line| !line.starts_with("---"))
        .filter(|line| !headers.iter().any(|h| line.starts_with(h)))
        .map(|line| line.split_whitespace().map(str::to_string).collect())
        .collect()
}
