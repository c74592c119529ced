use std::collections::HashSet;

use rand::Rng;
use rand::seq::SliceRandom;

use crate::constants::markers::{CLS_TOKEN, CONTINUATION_PREFIX, MASK_TOKEN, SEP_TOKEN};
use crate::constants::sampling::{KEEP_ORIGINAL_PROB, MASK_REPLACE_PROB};
use crate::data::MaskedLmCandidate;
use crate::rng::DeterministicRng;
use crate::types::Token;

/// Result of one masking pass over a finished token sequence.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MaskedSequence {
    /// The sequence after substitution.
    pub tokens: Vec<Token>,
    /// Claimed positions, strictly ascending.
    pub positions: Vec<usize>,
    /// Original tokens at the claimed positions.
    pub labels: Vec<Token>,
}

/// Choose which positions of `tokens` to mask and how to replace them.
///
/// Candidate positions are grouped (one group per token, or one per
/// whole word when `whole_word_mask` is set and continuation pieces are
/// folded into the previous group), the group list is shuffled, and
/// groups are claimed until the prediction budget is met. Every claimed
/// position draws its own substitution branch: mask marker, original
/// token kept, or a uniform vocabulary replacement.
pub fn mask_sequence(
    tokens: &[Token],
    masked_lm_prob: f64,
    max_predictions: usize,
    whole_word_mask: bool,
    vocabulary: &[Token],
    rng: &mut DeterministicRng,
) -> MaskedSequence {
    let mut cand_groups: Vec<Vec<usize>> = Vec::new();
    for (index, token) in tokens.iter().enumerate() {
        if token == CLS_TOKEN || token == SEP_TOKEN {
            continue;
        }
        if whole_word_mask
            && !cand_groups.is_empty()
            && token.starts_with(CONTINUATION_PREFIX)
        {
            cand_groups
                .last_mut()
                .expect("group list checked non-empty")
                .push(index);
        } else {
            cand_groups.push(vec![index]);
        }
    }

    cand_groups.shuffle(rng);

    let mut output_tokens: Vec<Token> = tokens.to_vec();
    let num_to_predict = max_predictions.min(
        ((tokens.len() as f64 * masked_lm_prob).round() as usize).max(1),
    );

    let mut masked: Vec<MaskedLmCandidate> = Vec::new();
    let mut covered: HashSet<usize> = HashSet::new();
    for group in &cand_groups {
        if masked.len() >= num_to_predict {
            break;
        }
        // A whole-word group that would overflow the budget is skipped,
        // not split.
        if masked.len() + group.len() > num_to_predict {
            continue;
        }
        if group.iter().any(|index| covered.contains(index)) {
            continue;
        }
        for &index in group {
            covered.insert(index);
            let masked_token = if rng.random::<f64>() < MASK_REPLACE_PROB {
                MASK_TOKEN.to_string()
            } else if rng.random::<f64>() < KEEP_ORIGINAL_PROB {
                tokens[index].clone()
            } else {
                debug_assert!(!vocabulary.is_empty());
                vocabulary[rng.random_range(0..vocabulary.len())].clone()
            };
            output_tokens[index] = masked_token;
            masked.push(MaskedLmCandidate {
                position: index,
                label: tokens[index].clone(),
            });
        }
    }
    masked.sort_by_key(|candidate| candidate.position);

    let mut positions = Vec::with_capacity(masked.len());
    let mut labels = Vec::with_capacity(masked.len());
    for candidate in masked {
        positions.push(candidate.position);
        labels.push(candidate.label);
    }
    MaskedSequence {
        tokens: output_tokens,
        positions,
        labels,
    }
}
