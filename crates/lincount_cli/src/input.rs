//! Reading matrices and right-hand sides from the command line

use crate::error::{CliError, Result};
use std::path::Path;

/// Parse whitespace-separated integer rows. Blank lines and lines starting
/// with `#` are skipped.
pub fn parse_matrix(path: &Path, text: &str) -> Result<Vec<Vec<i64>>> {
    let mut rows = Vec::new();
    for (idx, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let row = line
            .split_whitespace()
            .map(|token| {
                token.parse::<i64>().map_err(|_| CliError::MatrixEntry {
                    path: path.to_path_buf(),
                    line: idx + 1,
                    token: token.to_string(),
                })
            })
            .collect::<Result<Vec<_>>>()?;
        rows.push(row);
    }
    if rows.is_empty() {
        return Err(CliError::EmptyFile(path.to_path_buf()));
    }
    Ok(rows)
}

pub fn read_matrix(path: &Path) -> Result<Vec<Vec<i64>>> {
    let text = std::fs::read_to_string(path).map_err(|source| CliError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_matrix(path, &text)
}

/// Parse `b1,b2,...`
pub fn parse_rhs(s: &str) -> Result<Vec<i64>> {
    s.split(',')
        .map(|t| {
            let t = t.trim();
            t.parse::<i64>().map_err(|_| CliError::RhsEntry(t.to_string()))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_matrix() {
        let rows = parse_matrix(Path::new("a.txt"), "# coins\n1 2 5\n\n 0  1 1 \n").unwrap();
        assert_eq!(rows, vec![vec![1, 2, 5], vec![0, 1, 1]]);
    }

    #[test]
    fn test_parse_matrix_errors() {
        let err = parse_matrix(Path::new("a.txt"), "1 2\n3 x\n").unwrap_err();
        assert!(matches!(err, CliError::MatrixEntry { line: 2, .. }));
        assert!(matches!(
            parse_matrix(Path::new("a.txt"), "\n# nothing\n"),
            Err(CliError::EmptyFile(_))
        ));
    }

    #[test]
    fn test_parse_rhs() {
        assert_eq!(parse_rhs("3, 4,0").unwrap(), vec![3, 4, 0]);
        assert_eq!(parse_rhs("-1").unwrap(), vec![-1]);
        assert!(matches!(parse_rhs("1,,2"), Err(CliError::RhsEntry(_))));
    }
}
