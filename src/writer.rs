use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::config::PipelineConfig;
use crate::constants::writer::{
    PAIR_STREAM_SUFFIX, PREVIEW_RECORD_LIMIT, SINGLE_STREAM_SUFFIX, STREAM_EXTENSION,
};
use crate::corpus::Provenance;
use crate::data::TrainingInstance;
use crate::errors::PipelineError;
use crate::tokenizer::Tokenizer;
use crate::types::{SegmentId, Token, TokenId};

/// One fixed-width serialized record, zero-padded to the configured
/// sequence and prediction widths.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EncodedRecord {
    /// Token ids, zero-padded to `max_seq_length`.
    pub input_ids: Vec<TokenId>,
    /// 1 for real tokens, 0 for padding.
    pub input_mask: Vec<u8>,
    /// Segment markers, zero-padded.
    pub segment_ids: Vec<SegmentId>,
    /// Masked positions, zero-padded to `max_predictions_per_seq`.
    pub masked_lm_positions: Vec<usize>,
    /// Ids of the original tokens at the masked positions, zero-padded.
    pub masked_lm_ids: Vec<TokenId>,
    /// 1.0 for real predictions, 0.0 for padding.
    pub masked_lm_weights: Vec<f32>,
    /// 1 when segment B was randomly paired.
    pub next_sentence_label: u8,
    /// 1 when the source document is synthetic.
    pub synthetic_text_label: u8,
}

fn encode_view(
    tokens: &[Token],
    segment_ids: Option<&[SegmentId]>,
    positions: &[usize],
    labels: &[Token],
    next_sentence_label: u8,
    provenance: Provenance,
    tokenizer: &dyn Tokenizer,
    max_seq_length: usize,
    max_predictions: usize,
) -> Result<EncodedRecord, PipelineError> {
    if tokens.len() > max_seq_length {
        return Err(PipelineError::Invariant(format!(
            "sequence of {} tokens exceeds max_seq_length {max_seq_length} at serialization",
            tokens.len()
        )));
    }
    if positions.len() > max_predictions || positions.len() != labels.len() {
        return Err(PipelineError::Invariant(format!(
            "{} masked positions with {} labels against budget {max_predictions}",
            positions.len(),
            labels.len()
        )));
    }
    if let Some(segments) = segment_ids
        && segments.len() != tokens.len()
    {
        return Err(PipelineError::Invariant(format!(
            "{} segment ids for {} tokens at serialization",
            segments.len(),
            tokens.len()
        )));
    }

    let mut input_ids = tokenizer.token_ids(tokens);
    let mut input_mask = vec![1u8; tokens.len()];
    let mut segments: Vec<SegmentId> = segment_ids
        .map(<[SegmentId]>::to_vec)
        .unwrap_or_else(|| vec![0; tokens.len()]);
    input_ids.resize(max_seq_length, 0);
    input_mask.resize(max_seq_length, 0);
    segments.resize(max_seq_length, 0);

    let mut masked_lm_positions = positions.to_vec();
    let mut masked_lm_ids = tokenizer.token_ids(labels);
    let mut masked_lm_weights = vec![1.0f32; labels.len()];
    masked_lm_positions.resize(max_predictions, 0);
    masked_lm_ids.resize(max_predictions, 0);
    masked_lm_weights.resize(max_predictions, 0.0);

    Ok(EncodedRecord {
        input_ids,
        input_mask,
        segment_ids: segments,
        masked_lm_positions,
        masked_lm_ids,
        masked_lm_weights,
        next_sentence_label,
        synthetic_text_label: provenance.as_label(),
    })
}

/// Encode one instance into its three output records: the combined
/// sentence-pair view, then the A and B single-sentence views (which
/// always carry `next_sentence_label = 0`).
pub fn encode_instance(
    instance: &TrainingInstance,
    tokenizer: &dyn Tokenizer,
    config: &PipelineConfig,
) -> Result<[EncodedRecord; 3], PipelineError> {
    let combined = encode_view(
        &instance.tokens,
        Some(&instance.segment_ids),
        &instance.masked_positions,
        &instance.masked_labels,
        instance.is_random_next as u8,
        instance.provenance,
        tokenizer,
        config.max_seq_length,
        config.max_predictions_per_seq,
    )?;
    let view_a = encode_view(
        &instance.tokens_a,
        None,
        &instance.masked_positions_a,
        &instance.masked_labels_a,
        0,
        instance.provenance,
        tokenizer,
        config.max_seq_length,
        config.max_predictions_per_seq,
    )?;
    let view_b = encode_view(
        &instance.tokens_b,
        None,
        &instance.masked_positions_b,
        &instance.masked_labels_b,
        0,
        instance.provenance,
        tokenizer,
        config.max_seq_length,
        config.max_predictions_per_seq,
    )?;
    Ok([combined, view_a, view_b])
}

/// Append the stream suffix and extension to an output stem.
pub fn stream_path(output_stem: &Path, suffix: &str) -> PathBuf {
    PathBuf::from(format!(
        "{}{suffix}{STREAM_EXTENSION}",
        output_stem.display()
    ))
}

/// Two-stream JSONL record writer: sentence-pair records go to the
/// `-task-nsp` stream, single-sentence records to `-task-nonsp`.
pub struct RecordWriter {
    pair_stream: BufWriter<File>,
    single_stream: BufWriter<File>,
    written: usize,
}

impl RecordWriter {
    /// Create both stream files under the given output stem.
    pub fn create(output_stem: &Path) -> Result<Self, PipelineError> {
        let pair_path = stream_path(output_stem, PAIR_STREAM_SUFFIX);
        let single_path = stream_path(output_stem, SINGLE_STREAM_SUFFIX);
        Ok(Self {
            pair_stream: BufWriter::new(File::create(&pair_path)?),
            single_stream: BufWriter::new(File::create(&single_path)?),
            written: 0,
        })
    }

    /// Encode and route one instance's three records.
    pub fn write_instance(
        &mut self,
        instance: &TrainingInstance,
        tokenizer: &dyn Tokenizer,
        config: &PipelineConfig,
    ) -> Result<(), PipelineError> {
        let [combined, view_a, view_b] = encode_instance(instance, tokenizer, config)?;
        if self.written < PREVIEW_RECORD_LIMIT {
            debug!(
                index = self.written,
                tokens = %instance.tokens.join(" "),
                next_sentence_label = combined.next_sentence_label,
                synthetic_text_label = combined.synthetic_text_label,
                "encoded instance"
            );
        }
        write_record(&mut self.pair_stream, &combined)?;
        write_record(&mut self.single_stream, &view_a)?;
        write_record(&mut self.single_stream, &view_b)?;
        self.written += 1;
        Ok(())
    }

    /// Flush both streams and return the instance count.
    pub fn finish(mut self) -> Result<usize, PipelineError> {
        self.pair_stream.flush()?;
        self.single_stream.flush()?;
        info!(instances = self.written, "wrote output streams");
        Ok(self.written)
    }
}

fn write_record(stream: &mut BufWriter<File>, record: &EncodedRecord) -> Result<(), PipelineError> {
    serde_json::to_writer(&mut *stream, record).map_err(io::Error::from)?;
    stream.write_all(b"\n")?;
    Ok(())
}
