use tracing::debug;

use crate::config::PipelineConfig;
use crate::corpus::Corpus;
use crate::data::TrainingInstance;
use crate::errors::PipelineError;
use crate::rng::DeterministicRng;
use crate::segmenter::instances_from_document;

/// Generate all training instances for a prepared corpus.
///
/// Runs `dupe_factor` independent passes over the full document range,
/// feeding every randomized decision from the one shared `rng` stream —
/// passes differ only because the stream advances, never by re-seeding.
/// The result concatenates every (pass, document) combination with no
/// ordering guarantee; callers may reshuffle afterwards.
pub fn generate_instances(
    corpus: &Corpus,
    config: &PipelineConfig,
    rng: &mut DeterministicRng,
) -> Result<Vec<TrainingInstance>, PipelineError> {
    let mut instances = Vec::new();
    for pass in 0..config.dupe_factor {
        for document_index in 0..corpus.len() {
            instances.extend(instances_from_document(
                corpus,
                document_index,
                config,
                rng,
            )?);
        }
        debug!(pass, total = instances.len(), "completed duplication pass");
    }
    Ok(instances)
}
