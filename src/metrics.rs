use crate::corpus::Provenance;
use crate::data::TrainingInstance;

/// Aggregate composition metrics for a generated instance batch.
#[derive(Clone, Debug, PartialEq)]
pub struct InstanceMix {
    pub total: usize,
    pub random_next: usize,
    pub random_next_share: f64,
    pub synthetic: usize,
    pub synthetic_share: f64,
    pub mean_masked: f64,
    pub max_masked: usize,
}

/// Compute composition metrics over generated instances.
/// Returns `None` for an empty batch.
pub fn instance_mix(instances: &[TrainingInstance]) -> Option<InstanceMix> {
    if instances.is_empty() {
        return None;
    }
    let total = instances.len();
    let random_next = instances
        .iter()
        .filter(|instance| instance.is_random_next)
        .count();
    let synthetic = instances
        .iter()
        .filter(|instance| instance.provenance == Provenance::Synthetic)
        .count();
    let masked_total: usize = instances
        .iter()
        .map(|instance| instance.masked_positions.len())
        .sum();
    let max_masked = instances
        .iter()
        .map(|instance| instance.masked_positions.len())
        .max()
        .expect("instances non-empty");
    Some(InstanceMix {
        total,
        random_next,
        random_next_share: random_next as f64 / total as f64,
        synthetic,
        synthetic_share: synthetic as f64 / total as f64,
        mean_masked: masked_total as f64 / total as f64,
        max_masked,
    })
}
