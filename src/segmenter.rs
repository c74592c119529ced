use rand::Rng;
use tracing::warn;

use crate::config::PipelineConfig;
use crate::constants::markers::{CLS_TOKEN, SEP_TOKEN};
use crate::constants::sampling::{
    MIN_TARGET_SEQ_LENGTH, NEGATIVE_SAMPLE_RETRY_LIMIT, RANDOM_NEXT_PROB,
};
use crate::corpus::Corpus;
use crate::data::TrainingInstance;
use crate::errors::PipelineError;
use crate::masking::mask_sequence;
use crate::rng::DeterministicRng;
use crate::truncate::{truncate_pair, truncate_single};
use crate::types::{SegmentId, Sentence, Token};

/// Produce all training instances for one document.
///
/// Sentences are accumulated into chunks on real sentence boundaries
/// (an arbitrary token cut would make the next-sentence task trivial).
/// Each closed chunk is split into an A span and a continuation; with
/// probability one half, or whenever no continuation exists, segment B
/// is drawn from a random document instead and the unused trailing
/// sentences are put back by rewinding the cursor, so no content is
/// discarded merely because it was not chosen as the continuation.
///
/// Draw order against `rng` is the reproducibility contract; every
/// branch below consumes the stream in a fixed sequence.
pub fn instances_from_document(
    corpus: &Corpus,
    document_index: usize,
    config: &PipelineConfig,
    rng: &mut DeterministicRng,
) -> Result<Vec<TrainingInstance>, PipelineError> {
    let document = &corpus.documents()[document_index];
    let sentences = &document.sentences;
    let provenance = document.provenance;
    let max_num_tokens = config.max_num_tokens();

    // Usually fill the whole budget (padding is wasted computation), but
    // sometimes draw a shorter target to soften the pretraining /
    // fine-tuning length mismatch.
    let mut target_seq_length = max_num_tokens;
    if rng.random::<f64>() < config.short_seq_prob {
        target_seq_length = rng.random_range(MIN_TARGET_SEQ_LENGTH..=max_num_tokens);
    }

    let mut instances = Vec::new();
    let mut current_chunk: Vec<&Sentence> = Vec::new();
    let mut current_length = 0usize;
    let mut i = 0usize;
    while i < sentences.len() {
        let segment = &sentences[i];
        current_chunk.push(segment);
        current_length += segment.len();
        if i == sentences.len() - 1 || current_length >= target_seq_length {
            if !current_chunk.is_empty() {
                // `a_end` is how many leading chunk sentences go into A.
                let a_end = if current_chunk.len() >= 2 {
                    rng.random_range(1..=current_chunk.len() - 1)
                } else {
                    1
                };
                let mut tokens_a: Vec<Token> = current_chunk[..a_end]
                    .iter()
                    .flat_map(|sentence| sentence.iter().cloned())
                    .collect();
                let candidate_b: Vec<Token> = current_chunk[a_end..]
                    .iter()
                    .flat_map(|sentence| sentence.iter().cloned())
                    .collect();
                let no_next_sentence = candidate_b.is_empty();

                // The coin is not drawn for single-sentence chunks; the
                // short-circuit order is part of the rng contract.
                let is_random_next = current_chunk.len() == 1
                    || rng.random::<f64>() < RANDOM_NEXT_PROB
                    || no_next_sentence;

                let mut tokens_b: Vec<Token>;
                if is_random_next {
                    tokens_b = Vec::new();
                    let target_b_length = target_seq_length.saturating_sub(tokens_a.len());

                    // Prefer a different document with more than one
                    // sentence; after the retry budget the last sample is
                    // accepted as-is (soft degradation, not an error).
                    let mut random_document_index = document_index;
                    let mut qualified = false;
                    for _ in 0..NEGATIVE_SAMPLE_RETRY_LIMIT {
                        random_document_index = rng.random_range(0..corpus.len());
                        let candidate = &corpus.documents()[random_document_index];
                        if random_document_index != document_index
                            && candidate.sentences.len() > 1
                        {
                            qualified = true;
                            break;
                        }
                    }
                    if !qualified {
                        warn!(
                            document_index,
                            accepted = random_document_index,
                            "no qualifying random document within retry budget"
                        );
                    }

                    let random_document = &corpus.documents()[random_document_index].sentences;
                    let random_start = rng.random_range(0..random_document.len());
                    for sentence in &random_document[random_start..] {
                        tokens_b.extend(sentence.iter().cloned());
                        if tokens_b.len() >= target_b_length {
                            break;
                        }
                    }

                    // Put the unused trailing chunk sentences back so they
                    // seed the next chunk instead of being discarded.
                    let num_unused_segments = current_chunk.len() - a_end;
                    i -= num_unused_segments;
                } else {
                    tokens_b = candidate_b;
                }

                let mut tokens_first = tokens_a.clone();
                let mut tokens_second = tokens_b.clone();
                truncate_pair(&mut tokens_a, &mut tokens_b, max_num_tokens, rng);
                truncate_single(&mut tokens_first, max_num_tokens + 1, rng);
                truncate_single(&mut tokens_second, max_num_tokens + 1, rng);

                if tokens_a.is_empty()
                    || tokens_b.is_empty()
                    || tokens_first.is_empty()
                    || tokens_second.is_empty()
                {
                    return Err(PipelineError::Invariant(format!(
                        "truncation left an empty segment in document {document_index}; \
                         max_seq_length {} is too small for this corpus",
                        config.max_seq_length
                    )));
                }

                let mut tokens: Vec<Token> =
                    Vec::with_capacity(tokens_a.len() + tokens_b.len() + 3);
                let mut segment_ids: Vec<SegmentId> = Vec::with_capacity(tokens.capacity());
                tokens.push(CLS_TOKEN.to_string());
                segment_ids.push(0);
                for token in &tokens_a {
                    tokens.push(token.clone());
                    segment_ids.push(0);
                }
                tokens.push(SEP_TOKEN.to_string());
                segment_ids.push(0);
                for token in &tokens_b {
                    tokens.push(token.clone());
                    segment_ids.push(1);
                }
                tokens.push(SEP_TOKEN.to_string());
                segment_ids.push(1);

                let mut view_a: Vec<Token> = Vec::with_capacity(tokens_first.len() + 2);
                view_a.push(CLS_TOKEN.to_string());
                view_a.extend(tokens_first);
                view_a.push(SEP_TOKEN.to_string());

                let mut view_b: Vec<Token> = Vec::with_capacity(tokens_second.len() + 2);
                view_b.push(CLS_TOKEN.to_string());
                view_b.extend(tokens_second);
                view_b.push(SEP_TOKEN.to_string());

                // Three independent masking draws: combined, then A, then B.
                let masked = mask_sequence(
                    &tokens,
                    config.masked_lm_prob,
                    config.max_predictions_per_seq,
                    config.whole_word_mask,
                    corpus.vocabulary(),
                    rng,
                );
                let masked_a = mask_sequence(
                    &view_a,
                    config.masked_lm_prob,
                    config.max_predictions_per_seq,
                    config.whole_word_mask,
                    corpus.vocabulary(),
                    rng,
                );
                let masked_b = mask_sequence(
                    &view_b,
                    config.masked_lm_prob,
                    config.max_predictions_per_seq,
                    config.whole_word_mask,
                    corpus.vocabulary(),
                    rng,
                );

                instances.push(TrainingInstance {
                    tokens: masked.tokens,
                    segment_ids,
                    is_random_next,
                    provenance,
                    masked_positions: masked.positions,
                    masked_labels: masked.labels,
                    tokens_a: masked_a.tokens,
                    masked_positions_a: masked_a.positions,
                    masked_labels_a: masked_a.labels,
                    tokens_b: masked_b.tokens,
                    masked_positions_b: masked_b.positions,
                    masked_labels_b: masked_b.labels,
                });
            }
            current_chunk.clear();
            current_length = 0;
        }
        i += 1;
    }

    Ok(instances)
}
