//! Content hash of a prepared bundle.

use sha2::{Digest, Sha256};

use crate::assembler::DataBundle;
use crate::error::AppResult;

/// SHA-256 hex digest of the bundle's JSON form.
pub fn fingerprint(bundle: &DataBundle) -> AppResult<String> {
    let json = serde_json::to_string(bundle)?;
    let mut hasher = Sha256::new();
    hasher.update(json.as_bytes());
    Ok(format!("{:x}", hasher.finalize()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assembler::assemble;
    use hz_core::Value;
    use hz_projection::ParameterProjection;

    fn bundle(regions: &[&str]) -> DataBundle {
        assemble([(
            "regions",
            ParameterProjection::Set(regions.iter().map(|r| Value::from(*r)).collect()),
        )])
    }

    #[test]
    fn hash_stability() {
        let a = fingerprint(&bundle(&["R1", "R2"])).unwrap();
        let b = fingerprint(&bundle(&["R1", "R2"])).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.len(), 64);
    }

    #[test]
    fn hash_differs_for_different_inputs() {
        let a = fingerprint(&bundle(&["R1", "R2"])).unwrap();
        let b = fingerprint(&bundle(&["R2", "R1"])).unwrap();
        assert_ne!(a, b);
    }
}
