//! Model artifacts - frozen parameters on disk
//!
//! One JSON file per model key. The file is a state dict: tensor name →
//! `{ "shape": [...], "data": [...] }`, data row-major. A PyTorch
//! `model.state_dict()` dumped tensor by tensor produces exactly this.
//!
//! ```json
//! {
//!   "linear.weight": { "shape": [1, 15], "data": [0.12, -0.4, ...] },
//!   "linear.bias":   { "shape": [1],     "data": [-0.03] }
//! }
//! ```

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use super::error::LoadError;

/// File extension of artifact files
pub const ARTIFACT_EXTENSION: &str = "json";

/// One named tensor
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TensorEntry {
    pub shape: Vec<usize>,
    pub data: Vec<f32>,
}

/// Parsed artifact contents
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StateDict {
    tensors: HashMap<String, TensorEntry>,
}

impl StateDict {
    pub fn from_slice(bytes: &[u8], path: &Path) -> Result<Self, LoadError> {
        serde_json::from_slice(bytes).map_err(|source| LoadError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn insert(&mut self, name: impl Into<String>, entry: TensorEntry) {
        self.tensors.insert(name.into(), entry);
    }

    pub fn tensor_count(&self) -> usize {
        self.tensors.len()
    }

    /// Fetch a tensor and check its shape and element count
    fn tensor(&self, name: &str, expected: &[usize]) -> Result<&TensorEntry, LoadError> {
        let entry = self
            .tensors
            .get(name)
            .ok_or_else(|| LoadError::MissingTensor(name.to_string()))?;

        if entry.shape != expected {
            return Err(LoadError::ShapeMismatch {
                name: name.to_string(),
                expected: expected.to_vec(),
                actual: entry.shape.clone(),
            });
        }

        let declared: usize = entry.shape.iter().product();
        if entry.data.len() != declared {
            return Err(LoadError::DataLength {
                name: name.to_string(),
                declared,
                actual: entry.data.len(),
            });
        }

        Ok(entry)
    }

    /// `[rows, cols]` tensor as a matrix
    pub fn matrix(&self, name: &str, rows: usize, cols: usize) -> Result<Array2<f32>, LoadError> {
        let entry = self.tensor(name, &[rows, cols])?;
        Array2::from_shape_vec((rows, cols), entry.data.clone()).map_err(|_| LoadError::DataLength {
            name: name.to_string(),
            declared: rows * cols,
            actual: entry.data.len(),
        })
    }

    /// `[len]` tensor as a vector
    pub fn vector(&self, name: &str, len: usize) -> Result<Array1<f32>, LoadError> {
        let entry = self.tensor(name, &[len])?;
        Ok(Array1::from(entry.data.clone()))
    }
}

/// Where an artifact came from and what it hashed to
#[derive(Debug, Clone, Serialize)]
pub struct ArtifactInfo {
    pub path: PathBuf,
    /// Hex SHA-256 of the file bytes
    pub checksum: String,
    pub size_bytes: u64,
}

/// Read, fingerprint and parse an artifact file
pub fn read_artifact(path: &Path) -> Result<(StateDict, ArtifactInfo), LoadError> {
    if !path.exists() {
        return Err(LoadError::Missing(path.to_path_buf()));
    }

    let bytes = fs::read(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let info = ArtifactInfo {
        path: path.to_path_buf(),
        checksum: hex::encode(Sha256::digest(&bytes)),
        size_bytes: bytes.len() as u64,
    };

    let state_dict = StateDict::from_slice(&bytes, path)?;
    Ok((state_dict, info))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(shape: Vec<usize>, data: Vec<f32>) -> TensorEntry {
        TensorEntry { shape, data }
    }

    #[test]
    fn test_matrix_and_vector() {
        let mut dict = StateDict::default();
        dict.insert("w", entry(vec![2, 3], vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0]));
        dict.insert("b", entry(vec![2], vec![0.5, -0.5]));

        let w = dict.matrix("w", 2, 3).unwrap();
        assert_eq!(w[[1, 0]], 4.0);
        assert_eq!(w[[0, 2]], 3.0);

        let b = dict.vector("b", 2).unwrap();
        assert_eq!(b[1], -0.5);
    }

    #[test]
    fn test_missing_tensor() {
        let dict = StateDict::default();
        let err = dict.vector("linear.bias", 1).unwrap_err();
        assert!(matches!(err, LoadError::MissingTensor(name) if name == "linear.bias"));
    }

    #[test]
    fn test_shape_mismatch() {
        let mut dict = StateDict::default();
        dict.insert("w", entry(vec![1, 14], vec![0.0; 14]));

        let err = dict.matrix("w", 1, 15).unwrap_err();
        assert!(matches!(err, LoadError::ShapeMismatch { .. }));
    }

    #[test]
    fn test_declared_shape_disagrees_with_data() {
        let mut dict = StateDict::default();
        dict.insert("b", entry(vec![3], vec![1.0, 2.0]));

        let err = dict.vector("b", 3).unwrap_err();
        assert!(matches!(err, LoadError::DataLength { declared: 3, actual: 2, .. }));
    }

    #[test]
    fn test_read_artifact_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = read_artifact(&dir.path().join("LR_eps0.1.json")).unwrap_err();
        assert!(err.is_missing());
    }

    #[test]
    fn test_read_artifact_checksum_and_parse() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("LR_eps0.1.json");
        let body = r#"{"linear.bias": {"shape": [1], "data": [0.25]}}"#;
        std::fs::write(&path, body).unwrap();

        let (dict, info) = read_artifact(&path).unwrap();
        assert_eq!(dict.tensor_count(), 1);
        assert_eq!(info.size_bytes, body.len() as u64);
        assert_eq!(info.checksum, hex::encode(Sha256::digest(body.as_bytes())));
        assert_eq!(info.checksum.len(), 64);
    }

    #[test]
    fn test_read_artifact_corrupt() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("MLP_eps5.0.json");
        std::fs::write(&path, "{ not json").unwrap();

        let err = read_artifact(&path).unwrap_err();
        assert!(matches!(err, LoadError::Parse { .. }));
        assert!(!err.is_missing());
    }
}
