use serde::{Deserialize, Serialize};

use crate::corpus::Provenance;
use crate::types::{SegmentId, Token};

/// Position/original-label bookkeeping for one masked position.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MaskedLmCandidate {
    /// Index into the token sequence the mask was applied to.
    pub position: usize,
    /// The token that stood at `position` before substitution.
    pub label: Token,
}

/// One finished training instance: a masked sentence pair plus two
/// independently masked single-sentence views.
///
/// Constructed once by the segmenter and immutable afterwards; the
/// writer consumes it exactly once, emitting three fixed-width records.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrainingInstance {
    /// Combined `[CLS] A [SEP] B [SEP]` sequence after masking.
    pub tokens: Vec<Token>,
    /// Parallel segment markers: 0 through the first `[SEP]`, 1 after.
    pub segment_ids: Vec<SegmentId>,
    /// True when B was drawn from a random document rather than being
    /// the true continuation of A.
    pub is_random_next: bool,
    /// Provenance of the source document, propagated unchanged.
    pub provenance: Provenance,
    /// Masked positions in `tokens`, strictly ascending.
    pub masked_positions: Vec<usize>,
    /// Original tokens at `masked_positions`, in the same order.
    pub masked_labels: Vec<Token>,
    /// Masked `[CLS] A [SEP]` single-sentence view, built from the
    /// pre-pair-truncation A span.
    pub tokens_a: Vec<Token>,
    /// Masked positions of the A view.
    pub masked_positions_a: Vec<usize>,
    /// Original tokens at the A view's masked positions.
    pub masked_labels_a: Vec<Token>,
    /// Masked `[CLS] B [SEP]` single-sentence view, built from the
    /// pre-pair-truncation B span.
    pub tokens_b: Vec<Token>,
    /// Masked positions of the B view.
    pub masked_positions_b: Vec<usize>,
    /// Original tokens at the B view's masked positions.
    pub masked_labels_b: Vec<Token>,
}
