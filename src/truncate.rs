use rand::Rng;

use crate::rng::DeterministicRng;
use crate::types::Token;

/// Trim a sentence pair in place until it fits `max_tokens` total.
///
/// Each step removes one token from the strictly-longer sequence (equal
/// lengths trim B) — from the front on heads, from the back on tails, so
/// no end of the text is systematically favored.
pub fn truncate_pair(
    tokens_a: &mut Vec<Token>,
    tokens_b: &mut Vec<Token>,
    max_tokens: usize,
    rng: &mut DeterministicRng,
) {
    while tokens_a.len() + tokens_b.len() > max_tokens {
        let trunc_tokens = if tokens_a.len() > tokens_b.len() {
            &mut *tokens_a
        } else {
            &mut *tokens_b
        };
        debug_assert!(!trunc_tokens.is_empty());
        if rng.random::<f64>() < 0.5 {
            trunc_tokens.remove(0);
        } else {
            trunc_tokens.pop();
        }
    }
}

/// Trim a single sequence to `max_tokens`, drawing the same per-removal
/// side coin as the pair form.
pub fn truncate_single(tokens: &mut Vec<Token>, max_tokens: usize, rng: &mut DeterministicRng) {
    let mut empty = Vec::new();
    truncate_pair(tokens, &mut empty, max_tokens, rng);
}
