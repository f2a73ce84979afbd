//! Model serialization and persistence
//!
//! A model file is a text header followed by a binary payload:
//!
//! ```text
//! SVM_COST: <f64>
//! SVM_EPS: <f64>
//! KERNEL: linear|poly|rbf|sigmoid
//! GAMMA: <f64>
//! COEF0: <f64>
//! DEGREE: <f64>
//! THRESHOLD: <f64>
//! NUM_POS: <uint>
//! NUM_NEG: <uint>
//! NUM_SVS: <uint>
//! <payload>
//! ```
//!
//! Header labels are matched case-insensitively. The payload is little-endian.
//! A vector is written as its `u64` length followed by the `f64` values. Linear
//! models store the collapsed weight vector; other kernels store `NUM_SVS`
//! entries of `f64` weight followed by the support vector.

use crate::classifier::{DecisionModel, SupportVector, SvmClassifier};
use crate::core::{FeatureVector, Result, SVMError, SvmParams};
use crate::kernel::KernelType;
use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter, Read, Write};
use std::path::Path;

impl SvmClassifier {
    /// Save the model to a file
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let file = File::create(path)?;
        let mut writer = BufWriter::new(file);
        self.write_to(&mut writer)?;
        writer.flush()?;
        Ok(())
    }

    /// Load a model from a file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path)?;
        let mut reader = BufReader::new(file);
        Self::read_from(&mut reader)
    }

    /// Serialize the model
    pub fn write_to<W: Write>(&self, writer: &mut W) -> Result<()> {
        write!(writer, "{}", self.params())?;
        writeln!(writer, "THRESHOLD: {}", self.threshold())?;
        writeln!(writer, "NUM_POS: {}", self.num_pos())?;
        writeln!(writer, "NUM_NEG: {}", self.num_neg())?;
        writeln!(writer, "NUM_SVS: {}", self.num_support_vectors())?;

        match self.model() {
            DecisionModel::Linear { weights } => write_vector(writer, weights)?,
            DecisionModel::Kernel { support } => {
                for sv in support {
                    writer.write_all(&sv.weight.to_le_bytes())?;
                    write_vector(writer, &sv.vector)?;
                }
            }
        }
        Ok(())
    }

    /// Deserialize a model written by [`SvmClassifier::write_to`]
    pub fn read_from<R: BufRead>(reader: &mut R) -> Result<Self> {
        let mut header = HeaderReader {
            reader: &mut *reader,
        };
        let cost = header.number("SVM_COST")?;
        let eps = header.number("SVM_EPS")?;
        let kernel = header.value("KERNEL")?.parse::<KernelType>()?;
        let gamma = header.number("GAMMA")?;
        let coef0 = header.number("COEF0")?;
        let degree = header.number("DEGREE")?;
        let threshold = header.number("THRESHOLD")?;
        let num_pos = header.count("NUM_POS")?;
        let num_neg = header.count("NUM_NEG")?;
        let num_svs = header.count("NUM_SVS")?;

        let params = SvmParams::from_parts(cost, eps, kernel, gamma, coef0, degree)?;

        let model = if params.is_linear() {
            DecisionModel::Linear {
                weights: read_vector(reader)?,
            }
        } else {
            let mut support = Vec::with_capacity(num_svs.min(PREALLOC_LIMIT));
            for _ in 0..num_svs {
                let weight = read_f64(reader)?;
                let vector = read_vector(reader)?;
                if let Some(first) = support.first().map(|sv: &SupportVector| sv.vector.len()) {
                    if first != vector.len() {
                        return Err(SVMError::ParseError(format!(
                            "Support vector length {} differs from {first}",
                            vector.len()
                        )));
                    }
                }
                support.push(SupportVector::new(weight, vector));
            }
            DecisionModel::Kernel { support }
        };

        Ok(Self::from_parts(
            params, threshold, num_pos, num_neg, num_svs, model,
        ))
    }
}

/// Upper bound on speculative allocation driven by untrusted counts
const PREALLOC_LIMIT: usize = 1 << 16;

struct HeaderReader<'a, R: BufRead> {
    reader: &'a mut R,
}

impl<R: BufRead> HeaderReader<'_, R> {
    /// Read the next header line and return the value after `label:`
    fn value(&mut self, label: &str) -> Result<String> {
        let mut line = String::new();
        if self.reader.read_line(&mut line)? == 0 {
            return Err(SVMError::ParseError(format!(
                "Unexpected end of header, expected {label}"
            )));
        }
        let (key, value) = line.split_once(':').ok_or_else(|| {
            SVMError::ParseError(format!("Malformed header line \"{}\"", line.trim_end()))
        })?;
        if !key.trim().eq_ignore_ascii_case(label) {
            return Err(SVMError::ParseError(format!(
                "Expected {label}, found \"{}\"",
                key.trim()
            )));
        }
        Ok(value.trim().to_string())
    }

    fn number(&mut self, label: &str) -> Result<f64> {
        let value = self.value(label)?;
        value
            .parse::<f64>()
            .map_err(|_| SVMError::ParseError(format!("Invalid value for {label}: \"{value}\"")))
    }

    fn count(&mut self, label: &str) -> Result<usize> {
        let value = self.value(label)?;
        value
            .parse::<usize>()
            .map_err(|_| SVMError::ParseError(format!("Invalid value for {label}: \"{value}\"")))
    }
}

fn write_vector<W: Write>(writer: &mut W, vector: &FeatureVector) -> Result<()> {
    writer.write_all(&(vector.len() as u64).to_le_bytes())?;
    for value in vector.values() {
        writer.write_all(&value.to_le_bytes())?;
    }
    Ok(())
}

fn read_vector<R: Read>(reader: &mut R) -> Result<FeatureVector> {
    let len = read_u64(reader)?;
    let len = usize::try_from(len)
        .map_err(|_| SVMError::ParseError(format!("Vector length {len} out of range")))?;
    let mut values = Vec::with_capacity(len.min(PREALLOC_LIMIT));
    for _ in 0..len {
        values.push(read_f64(reader)?);
    }
    Ok(FeatureVector::new(values))
}

fn read_u64<R: Read>(reader: &mut R) -> Result<u64> {
    let mut buf = [0u8; 8];
    read_payload(reader, &mut buf)?;
    Ok(u64::from_le_bytes(buf))
}

fn read_f64<R: Read>(reader: &mut R) -> Result<f64> {
    let mut buf = [0u8; 8];
    read_payload(reader, &mut buf)?;
    Ok(f64::from_le_bytes(buf))
}

fn read_payload<R: Read>(reader: &mut R, buf: &mut [u8]) -> Result<()> {
    reader.read_exact(buf).map_err(|e| match e.kind() {
        io::ErrorKind::UnexpectedEof => SVMError::ParseError("Truncated model payload".to_string()),
        _ => SVMError::IoError(e),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;
    use tempfile::NamedTempFile;

    fn kernel_model() -> SvmClassifier {
        let params = SvmParams::new(10.0, 1e-3, "rbf", 0.75, 0.0, 1.0).expect("valid params");
        SvmClassifier::from_support_vectors(
            params,
            -0.125,
            3,
            4,
            3,
            vec![
                SupportVector::new(1.5, FeatureVector::new(vec![0.1, 0.2, 0.3])),
                SupportVector::new(-1.5, FeatureVector::new(vec![-1.0, 2.0, 1e-7])),
            ],
        )
    }

    fn linear_model() -> SvmClassifier {
        let params = SvmParams::linear(1.0, 1e-4).expect("valid params");
        SvmClassifier::from_support_vectors(
            params,
            0.3333333333333333,
            5,
            6,
            2,
            vec![
                SupportVector::new(0.7, FeatureVector::new(vec![1.0, 1.0])),
                SupportVector::new(-0.7, FeatureVector::new(vec![-1.0, 0.5])),
            ],
        )
    }

    fn round_trip(model: &SvmClassifier) -> SvmClassifier {
        let mut bytes = Vec::new();
        model.write_to(&mut bytes).expect("serialize");
        SvmClassifier::read_from(&mut Cursor::new(bytes)).expect("deserialize")
    }

    #[test]
    fn test_header_layout() {
        let mut bytes = Vec::new();
        linear_model().write_to(&mut bytes).expect("serialize");
        let text = String::from_utf8_lossy(&bytes);
        assert!(text.starts_with(
            "SVM_COST: 1\nSVM_EPS: 0.0001\nKERNEL: linear\nGAMMA: 1\nCOEF0: 0\nDEGREE: 1\n\
             THRESHOLD: 0.3333333333333333\nNUM_POS: 5\nNUM_NEG: 6\nNUM_SVS: 2\n"
        ));
    }

    #[test]
    fn test_round_trip_kernel_model() {
        let model = kernel_model();
        let loaded = round_trip(&model);
        assert_eq!(loaded, model);

        let probe = FeatureVector::new(vec![0.5, -0.5, 1.0]);
        assert_eq!(loaded.predict(&probe), model.predict(&probe));
    }

    #[test]
    fn test_round_trip_sigmoid_without_support_vectors() {
        let params = SvmParams::new(1.0, 1e-3, "SIGMOID", 0.5, -1.5, 1.0).expect("valid params");
        let model = SvmClassifier::from_support_vectors(params, 0.75, 1, 1, 4, Vec::new());
        let loaded = round_trip(&model);

        assert_eq!(loaded.params(), model.params());
        assert_eq!(loaded.dims(), None);
        let probe = FeatureVector::new(vec![1.0, 2.0, 3.0, 4.0]);
        assert_eq!(loaded.predict(&probe), model.predict(&probe));
    }

    #[test]
    fn test_round_trip_linear_model() {
        let model = linear_model();
        let loaded = round_trip(&model);
        assert_eq!(loaded.linear_weights(), model.linear_weights());
        assert_eq!(loaded.num_support_vectors(), 2);
        assert_eq!(loaded.threshold(), model.threshold());
    }

    #[test]
    fn test_round_trip_file() {
        let model = kernel_model();
        let file = NamedTempFile::new().expect("temp file");
        model.save(file.path()).expect("save");
        let loaded = SvmClassifier::load(file.path()).expect("load");
        assert_eq!(loaded, model);
    }

    #[test]
    fn test_case_insensitive_labels() {
        let mut bytes = Vec::new();
        linear_model().write_to(&mut bytes).expect("serialize");
        let text_end = bytes
            .windows(9)
            .position(|w| w == b"NUM_SVS: ")
            .expect("header present");
        bytes[..text_end].make_ascii_lowercase();
        let loaded = SvmClassifier::read_from(&mut Cursor::new(bytes)).expect("deserialize");
        assert_eq!(loaded, linear_model());
    }

    #[test]
    fn test_unknown_kernel() {
        let input = "SVM_COST: 1\nSVM_EPS: 0.001\nKERNEL: cubic\n";
        let result = SvmClassifier::read_from(&mut Cursor::new(input.as_bytes()));
        assert!(matches!(result, Err(SVMError::InvalidKernel(name)) if name == "cubic"));
    }

    #[test]
    fn test_unexpected_label() {
        let input = "SVM_COST: 1\nSVM_TOL: 0.001\n";
        let result = SvmClassifier::read_from(&mut Cursor::new(input.as_bytes()));
        assert!(matches!(result, Err(SVMError::ParseError(_))));
    }

    #[test]
    fn test_missing_header_line() {
        let input = "SVM_COST: 1\nSVM_EPS: 0.001\nKERNEL: linear\n";
        let result = SvmClassifier::read_from(&mut Cursor::new(input.as_bytes()));
        assert!(matches!(result, Err(SVMError::ParseError(_))));
    }

    #[test]
    fn test_truncated_payload() {
        let mut bytes = Vec::new();
        kernel_model().write_to(&mut bytes).expect("serialize");
        bytes.truncate(bytes.len() - 4);
        let result = SvmClassifier::read_from(&mut Cursor::new(bytes));
        assert!(matches!(result, Err(SVMError::ParseError(msg)) if msg.contains("Truncated")));
    }
}
