//! Comparing user entered names.

/// Whether `a` and `b` are the same name when case is ignored.
///
/// Unlike SQLite's `NOCASE`, this folds accented letters too, so "Itaú" matches "ITAÚ".
pub fn same_name(a: &str, b: &str) -> bool {
    a.trim().to_lowercase() == b.trim().to_lowercase()
}
