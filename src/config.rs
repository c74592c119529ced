use crate::constants::sampling::{MIN_TARGET_SEQ_LENGTH, SPECIAL_TOKEN_BUDGET};
use crate::errors::PipelineError;

/// Top-level pipeline configuration.
#[derive(Clone, Debug)]
pub struct PipelineConfig {
    /// RNG seed that controls shuffling, sampling, and masking order.
    pub seed: u64,
    /// Hard limit on combined sequence length, markers included.
    pub max_seq_length: usize,
    /// Upper bound on masked positions per emitted sequence.
    pub max_predictions_per_seq: usize,
    /// Number of differently-masked passes generated per document.
    pub dupe_factor: usize,
    /// Probability that a token position is selected for masking.
    pub masked_lm_prob: f64,
    /// Probability of drawing a shorter target length for a document,
    /// simulating the fine-tuning length mismatch.
    pub short_seq_prob: f64,
    /// Mask all sub-word pieces of a word together instead of per piece.
    pub whole_word_mask: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            seed: 12345,
            max_seq_length: 64,
            max_predictions_per_seq: 20,
            dupe_factor: 10,
            masked_lm_prob: 0.15,
            short_seq_prob: 0.2,
            whole_word_mask: false,
        }
    }
}

impl PipelineConfig {
    /// Token budget left for segments A and B after marker slots.
    pub fn max_num_tokens(&self) -> usize {
        self.max_seq_length.saturating_sub(SPECIAL_TOKEN_BUDGET)
    }

    /// Reject configurations that cannot produce well-formed instances.
    pub fn validate(&self) -> Result<(), PipelineError> {
        if self.max_num_tokens() < MIN_TARGET_SEQ_LENGTH {
            return Err(PipelineError::Configuration(format!(
                "max_seq_length {} leaves no room for two non-empty segments after marker slots",
                self.max_seq_length
            )));
        }
        if !(0.0..=1.0).contains(&self.masked_lm_prob) {
            return Err(PipelineError::Configuration(format!(
                "masked_lm_prob {} is outside [0, 1]",
                self.masked_lm_prob
            )));
        }
        if !(0.0..=1.0).contains(&self.short_seq_prob) {
            return Err(PipelineError::Configuration(format!(
                "short_seq_prob {} is outside [0, 1]",
                self.short_seq_prob
            )));
        }
        if self.dupe_factor == 0 {
            return Err(PipelineError::Configuration(
                "dupe_factor must be at least 1".into(),
            ));
        }
        Ok(())
    }
}
