use super::simple_argmax;
use crate::backends::TokenId;

pub trait LogitsSampler {
    fn sample(
        &self,
        logits: &[f32],
        vocabulary_size: usize,
    ) -> Option<TokenId>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ArgmaxSampler {}

impl LogitsSampler for ArgmaxSampler {
    fn sample(
        &self,
        logits: &[f32],
        vocabulary_size: usize,
    ) -> Option<TokenId> {
        let row = &logits[..vocabulary_size.min(logits.len())];
        simple_argmax(row).map(|index| index as TokenId)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sample_is_deterministic() {
        let sampler = ArgmaxSampler::default();
        let logits = vec![0.25, -3.0, 7.5, 7.5, 1.0];

        let first = sampler.sample(&logits, logits.len());
        let second = sampler.sample(&logits, logits.len());
        assert_eq!(first, Some(2));
        assert_eq!(first, second);
    }

    #[test]
    fn test_sample_respects_vocabulary_size() {
        let sampler = ArgmaxSampler::default();
        // padded rows may carry scores past the real vocabulary
        let logits = vec![1.0, 2.0, 0.5, 100.0];
        assert_eq!(sampler.sample(&logits, 3), Some(1));
    }

    #[test]
    fn test_sample_empty_row() {
        let sampler = ArgmaxSampler::default();
        assert_eq!(sampler.sample(&[], 32000), None);
    }
}
