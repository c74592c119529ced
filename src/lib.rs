#![doc = include_str!("../README.md")]
#![warn(missing_docs)]

/// Pipeline configuration types.
pub mod config;
/// Centralized constants used across sampling, masking, and the writer.
pub mod constants;
/// Corpus loading and document preparation.
pub mod corpus;
/// Training-instance and masked-candidate data types.
pub mod data;
mod errors;
/// Reusable CLI runners shared by downstream binaries.
pub mod example_apps;
/// Masked-token selection and substitution.
pub mod masking;
/// Aggregate metrics helpers.
pub mod metrics;
/// Pipeline orchestration over a prepared corpus.
pub mod pipeline;
/// Deterministic random source threaded through every randomized decision.
pub mod rng;
/// Per-document instance segmentation.
pub mod segmenter;
/// Sub-word tokenizer seam and WordPiece implementation.
pub mod tokenizer;
/// Input discovery and line reading for raw text sources.
pub mod transport;
/// Sequence-pair length-budget truncation.
pub mod truncate;
/// Shared type aliases.
pub mod types;
/// Fixed-width record encoding and output streams.
pub mod writer;

pub use config::PipelineConfig;
pub use corpus::{Corpus, CorpusBuilder, Document, Provenance};
pub use data::{MaskedLmCandidate, TrainingInstance};
pub use errors::PipelineError;
pub use masking::{MaskedSequence, mask_sequence};
pub use metrics::{InstanceMix, instance_mix};
pub use pipeline::generate_instances;
pub use rng::DeterministicRng;
pub use segmenter::instances_from_document;
pub use tokenizer::{Tokenizer, WordPieceTokenizer};
pub use truncate::{truncate_pair, truncate_single};
pub use types::{SegmentId, Sentence, Token, TokenId};
pub use writer::{EncodedRecord, RecordWriter, encode_instance};
