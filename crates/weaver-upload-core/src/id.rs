//! Upload identifier generation.

use rand::Rng;

use crate::types::UploadId;

const ID_LEN: usize = 10;

/// Random alphanumeric identifier.
///
/// Only needs to be unique among the uploads in flight in one document.
pub fn generate() -> UploadId {
    let id: String = rand::rng()
        .sample_iter(&rand::distr::Alphanumeric)
        .take(ID_LEN)
        .map(char::from)
        .collect();
    UploadId::new(id)
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn test_generate_shape() {
        let id = generate();
        assert_eq!(id.as_str().len(), ID_LEN);
        assert!(id.as_str().chars().all(|c| c.is_ascii_alphanumeric()));
    }

    #[test]
    fn test_generate_distinct() {
        let ids: HashSet<_> = (0..256).map(|_| generate()).collect();
        assert_eq!(ids.len(), 256);
    }
}
