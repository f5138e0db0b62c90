/// Derive a filesystem identifier from a human-entered title.
///
/// Lower-cases, turns spaces into `_`, and drops `.` and `,`. Nothing else is escaped, so
/// `/` or `:` in a title end up in the path as-is.
pub fn slugify(text: &str) -> String {
    text.to_lowercase().replace(' ', "_").replace(['.', ','], "")
}
