//! Dense feature vector files
//!
//! One vector per line, components separated by whitespace or commas. Blank
//! lines and lines starting with `#` are skipped. Every vector in a file must
//! have the same length.

use crate::core::{FeatureVector, Result, SVMError};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

/// Load vectors from a file
pub fn load_vectors<P: AsRef<Path>>(path: P) -> Result<Vec<FeatureVector>> {
    let file = File::open(path)?;
    read_vectors(BufReader::new(file))
}

/// Parse vectors from a reader
pub fn read_vectors<R: BufRead>(reader: R) -> Result<Vec<FeatureVector>> {
    let mut vectors: Vec<FeatureVector> = Vec::new();

    for (line_no, line) in reader.lines().enumerate() {
        let line = line?;
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let vector = parse_line(line)
            .map_err(|e| SVMError::ParseError(format!("Line {}: {e}", line_no + 1)))?;

        if let Some(first) = vectors.first() {
            if first.len() != vector.len() {
                return Err(SVMError::DimensionMismatch {
                    expected: first.len(),
                    actual: vector.len(),
                });
            }
        }
        vectors.push(vector);
    }

    Ok(vectors)
}

fn parse_line(line: &str) -> std::result::Result<FeatureVector, String> {
    line.split(|c: char| c == ',' || c.is_whitespace())
        .filter(|token| !token.is_empty())
        .map(|token| {
            token
                .parse::<f64>()
                .map_err(|_| format!("Invalid value \"{token}\""))
        })
        .collect::<std::result::Result<Vec<f64>, String>>()
        .map(FeatureVector::new)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Cursor, Write};
    use tempfile::NamedTempFile;

    #[test]
    fn test_read_mixed_separators() {
        let input = "# header comment\n1.0 2.0 3\n\n-1,0.5,  2e-3\n";
        let vectors = read_vectors(Cursor::new(input)).expect("valid input");
        assert_eq!(vectors.len(), 2);
        assert_eq!(vectors[0].values(), &[1.0, 2.0, 3.0]);
        assert_eq!(vectors[1].values(), &[-1.0, 0.5, 2e-3]);
    }

    #[test]
    fn test_invalid_value() {
        let result = read_vectors(Cursor::new("1.0 abc\n"));
        assert!(matches!(result, Err(SVMError::ParseError(msg)) if msg.contains("Line 1")));
    }

    #[test]
    fn test_ragged_rows() {
        let result = read_vectors(Cursor::new("1 2\n3\n"));
        assert!(matches!(
            result,
            Err(SVMError::DimensionMismatch {
                expected: 2,
                actual: 1
            })
        ));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = NamedTempFile::new().expect("Failed to create temp file");
        writeln!(file, "0.5 0.25").expect("Failed to write");
        writeln!(file, "# skipped").expect("Failed to write");
        writeln!(file, "1.5 -0.25").expect("Failed to write");
        file.flush().expect("Failed to flush");

        let vectors = load_vectors(file.path()).expect("valid file");
        assert_eq!(vectors.len(), 2);
        assert_eq!(vectors[1].values(), &[1.5, -0.25]);
    }

    #[test]
    fn test_empty_input() {
        let vectors = read_vectors(Cursor::new("# nothing\n")).expect("valid input");
        assert!(vectors.is_empty());
    }
}
