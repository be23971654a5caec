//! Parsing of `diffstat -t` tabular output.

use svnchurn_core::{ChurnError, DiffRecord};

/// The fixed header line `diffstat -t` prints before the data rows.
pub const DIFF_HEADER: &str = "INSERTED,DELETED,MODIFIED,FILENAME";

/// Parse captured `diffstat -t` stdout into per-file records.
///
/// The first line is the fixed header and is discarded without inspection.
/// Every remaining non-empty line must split on `,` into exactly four
/// fields: three unsigned counts and a path (diffstat never emits commas
/// inside the path field). Input order is preserved.
///
/// # Errors
///
/// Returns [`ChurnError::Parse`] on any malformed line. A dropped record
/// would be an undetected missing fact with no compensating signal, so
/// malformed output aborts the revision instead of being skipped.
///
/// # Examples
///
/// ```
/// use svnchurn_diffstat::parse_diffstat;
///
/// let stdout = "INSERTED,DELETED,MODIFIED,FILENAME\n12,3,4,src/foo/bar.c\n";
/// let records = parse_diffstat(stdout).unwrap();
/// assert_eq!(records.len(), 1);
/// assert_eq!(records[0].added, 12);
/// assert_eq!(records[0].path, "src/foo/bar.c");
/// ```
pub fn parse_diffstat(stdout: &str) -> Result<Vec<DiffRecord>, ChurnError> {
    let mut records = Vec::new();

    for line in stdout.lines().skip(1) {
        if line.trim().is_empty() {
            continue;
        }
        let fields: Vec<&str> = line.split(',').collect();
        if fields.len() != 4 {
            return Err(ChurnError::Parse(format!(
                "expected 4 comma-separated fields, found {} in: {line}",
                fields.len()
            )));
        }
        records.push(DiffRecord {
            added: parse_count(fields[0], line)?,
            removed: parse_count(fields[1], line)?,
            modified: parse_count(fields[2], line)?,
            path: fields[3].to_string(),
        });
    }

    Ok(records)
}

fn parse_count(field: &str, line: &str) -> Result<u64, ChurnError> {
    field
        .trim()
        .parse()
        .map_err(|_| ChurnError::Parse(format!("non-numeric count '{field}' in: {line}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_input_yields_no_records() {
        assert!(parse_diffstat("").unwrap().is_empty());
    }

    #[test]
    fn header_only_yields_no_records() {
        let stdout = format!("{DIFF_HEADER}\n");
        assert!(parse_diffstat(&stdout).unwrap().is_empty());
    }

    #[test]
    fn n_data_lines_yield_n_records() {
        let stdout = "INSERTED,DELETED,MODIFIED,FILENAME\n\
                      12,3,4,src/foo/bar.c\n\
                      0,0,0,README\n";
        let records = parse_diffstat(stdout).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].added, 12);
        assert_eq!(records[0].removed, 3);
        assert_eq!(records[0].modified, 4);
        assert_eq!(records[0].path, "src/foo/bar.c");
        assert_eq!(records[1].path, "README");
    }

    #[test]
    fn input_order_is_preserved() {
        let stdout = "INSERTED,DELETED,MODIFIED,FILENAME\n\
                      1,0,0,b.c\n\
                      2,0,0,a/long/path.c\n\
                      3,0,0,z.c\n";
        let records = parse_diffstat(stdout).unwrap();
        let paths: Vec<&str> = records.iter().map(|r| r.path.as_str()).collect();
        assert_eq!(paths, ["b.c", "a/long/path.c", "z.c"]);
    }

    #[test]
    fn blank_lines_are_skipped() {
        let stdout = "INSERTED,DELETED,MODIFIED,FILENAME\n\n1,2,3,f.c\n\n";
        assert_eq!(parse_diffstat(stdout).unwrap().len(), 1);
    }

    #[test]
    fn wrong_field_count_is_a_hard_error() {
        let stdout = "INSERTED,DELETED,MODIFIED,FILENAME\n1,2,f.c\n";
        let err = parse_diffstat(stdout).unwrap_err();
        assert!(matches!(err, ChurnError::Parse(_)));
        assert!(err.to_string().contains("1,2,f.c"));
    }

    #[test]
    fn path_with_embedded_comma_is_a_hard_error() {
        // Five fields after the split; better to abort than to guess.
        let stdout = "INSERTED,DELETED,MODIFIED,FILENAME\n1,2,3,a,b.c\n";
        assert!(parse_diffstat(stdout).is_err());
    }

    #[test]
    fn non_numeric_count_is_a_hard_error() {
        let stdout = "INSERTED,DELETED,MODIFIED,FILENAME\nx,2,3,f.c\n";
        let err = parse_diffstat(stdout).unwrap_err();
        assert!(err.to_string().contains("non-numeric"));
    }

    #[test]
    fn header_is_discarded_even_if_unexpected() {
        // First line is skipped without inspection.
        let stdout = "garbage first line\n1,2,3,f.c\n";
        let records = parse_diffstat(stdout).unwrap();
        assert_eq!(records.len(), 1);
    }
}
