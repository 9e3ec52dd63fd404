use super::candidate::Candidate;
use super::{validate_request, DecodeError, Decoder};

/// Canned-response decoder for offline testing of training loops.
///
/// Returns the configured candidates truncated to `count`, applying the same
/// input validation as the engine-backed decoder so it is substitutable
/// wherever [`Decoder`] is consumed.
#[derive(Default)]
pub struct MockDecoder {
    candidates: Vec<Candidate>,
}

impl MockDecoder {
    pub fn new(candidates: Vec<Candidate>) -> Self {
        Self { candidates }
    }
}

impl Decoder for MockDecoder {
    fn n_best(&self, source: &str, count: usize) -> Result<Vec<Candidate>, DecodeError> {
        validate_request(source, count)?;
        Ok(self.candidates.iter().take(count).cloned().collect())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::decoder::FeatureVector;

    fn canned() -> Vec<Candidate> {
        let schema: Arc<[String]> = ["tm", "lm"].iter().map(|s| s.to_string()).collect();
        vec![
            Candidate {
                tokens: Vec::new(),
                features: FeatureVector::new(Arc::clone(&schema), vec![-0.1, -0.2]),
                total: -0.3,
            },
            Candidate {
                tokens: Vec::new(),
                features: FeatureVector::new(schema, vec![-0.4, -0.2]),
                total: -0.6,
            },
        ]
    }

    // Consumes the trait object only, as a training loop would.
    fn top_total(decoder: &dyn Decoder, source: &str) -> f64 {
        decoder.n_best(source, 1).unwrap()[0].total
    }

    #[test]
    fn test_truncates_to_count() {
        let mock = MockDecoder::new(canned());
        assert_eq!(mock.n_best("x", 1).unwrap().len(), 1);
        assert_eq!(mock.n_best("x", 10).unwrap().len(), 2);
    }

    #[test]
    fn test_validates_like_engine_decoder() {
        let mock = MockDecoder::new(canned());
        assert!(matches!(
            mock.n_best("", 1),
            Err(DecodeError::InvalidInput { .. })
        ));
        assert!(matches!(
            mock.n_best("x", 0),
            Err(DecodeError::InvalidInput { .. })
        ));
    }

    #[test]
    fn test_substitutable_for_trait() {
        let mock = MockDecoder::new(canned());
        assert_eq!(top_total(&mock, "anything"), -0.3);
    }
}
