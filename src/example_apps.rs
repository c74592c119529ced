use std::error::Error;
use std::path::PathBuf;

use clap::{Parser, error::ErrorKind};
use rand::seq::SliceRandom;
use tracing::{info, warn};

use crate::config::PipelineConfig;
use crate::constants::writer::{PAIR_STREAM_SUFFIX, SINGLE_STREAM_SUFFIX};
use crate::corpus::{CorpusBuilder, Provenance};
use crate::data::TrainingInstance;
use crate::metrics::instance_mix;
use crate::pipeline::generate_instances;
use crate::rng::DeterministicRng;
use crate::tokenizer::WordPieceTokenizer;
use crate::transport::collect_input_files;
use crate::writer::{RecordWriter, stream_path};

#[derive(Debug, Parser)]
#[command(
    name = "create_pretraining_data",
    disable_help_subcommand = true,
    about = "Generate masked-LM / next-sentence pretraining records",
    long_about = "Read line-oriented organic and synthetic text sources, build sentence-pair \
                  training instances with masked-token predictions, and write the fixed-width \
                  record streams consumed by the encoder's training loop.",
    after_help = "Each input may be a single file or a directory of .txt files. A blank line \
                  inside a source marks a document boundary."
)]
struct CreatePretrainingCli {
    #[arg(
        long = "organic-input",
        value_name = "PATH",
        required = true,
        help = "Organic (human-written) text source, repeat as needed"
    )]
    organic_inputs: Vec<PathBuf>,
    #[arg(
        long = "synthetic-input",
        value_name = "PATH",
        required = true,
        help = "Synthetic (machine-generated) text source, repeat as needed"
    )]
    synthetic_inputs: Vec<PathBuf>,
    #[arg(
        long,
        value_name = "PATH",
        help = "Output path stem for the two record streams"
    )]
    output: PathBuf,
    #[arg(long, value_name = "PATH", help = "Vocabulary file, one token per line")]
    vocab: PathBuf,
    #[arg(
        long = "no-lower-case",
        help = "Keep input casing (for cased vocabularies)"
    )]
    no_lower_case: bool,
    #[arg(
        long = "whole-word-mask",
        help = "Mask all sub-word pieces of a word together"
    )]
    whole_word_mask: bool,
    #[arg(long, value_name = "N", help = "Maximum combined sequence length")]
    max_seq_length: Option<usize>,
    #[arg(
        long,
        value_name = "N",
        help = "Maximum masked predictions per sequence"
    )]
    max_predictions_per_seq: Option<usize>,
    #[arg(
        long,
        value_name = "SEED",
        help = "Deterministic seed for shuffling, sampling, and masking"
    )]
    seed: Option<u64>,
    #[arg(
        long,
        value_name = "N",
        value_parser = parse_positive_usize,
        help = "Number of differently-masked passes per document"
    )]
    dupe_factor: Option<usize>,
    #[arg(long, value_name = "PROB", help = "Masked-LM probability")]
    masked_lm_prob: Option<f64>,
    #[arg(
        long,
        value_name = "PROB",
        help = "Probability of drawing a shorter target sequence length"
    )]
    short_seq_prob: Option<f64>,
}

/// Run the full generation pipeline from command-line arguments.
///
/// Each input file is loaded as its own corpus and processed with a
/// fresh rng seeded from the configured seed, so a file's instances do
/// not depend on how many files preceded it. All instances are shuffled
/// once at the end before writing.
pub fn run_create_pretraining<I>(args_iter: I) -> Result<(), Box<dyn Error>>
where
    I: Iterator<Item = String>,
{
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();

    let Some(cli) = parse_cli::<CreatePretrainingCli, _>(
        std::iter::once("create_pretraining_data".to_string()).chain(args_iter),
    )?
    else {
        return Ok(());
    };

    let mut config = PipelineConfig::default();
    if let Some(seed) = cli.seed {
        config.seed = seed;
    }
    if let Some(max_seq_length) = cli.max_seq_length {
        config.max_seq_length = max_seq_length;
    }
    if let Some(max_predictions) = cli.max_predictions_per_seq {
        config.max_predictions_per_seq = max_predictions;
    }
    if let Some(dupe_factor) = cli.dupe_factor {
        config.dupe_factor = dupe_factor;
    }
    if let Some(masked_lm_prob) = cli.masked_lm_prob {
        config.masked_lm_prob = masked_lm_prob;
    }
    if let Some(short_seq_prob) = cli.short_seq_prob {
        config.short_seq_prob = short_seq_prob;
    }
    config.whole_word_mask = cli.whole_word_mask;
    config.validate()?;

    let tokenizer = WordPieceTokenizer::from_vocab_file(&cli.vocab, !cli.no_lower_case)?;

    let mut instances: Vec<TrainingInstance> = Vec::new();
    let source_groups = [
        (Provenance::Organic, &cli.organic_inputs),
        (Provenance::Synthetic, &cli.synthetic_inputs),
    ];
    for (provenance, roots) in source_groups {
        for root in roots {
            for path in collect_input_files(root)? {
                info!(path = %path.display(), ?provenance, "reading input file");
                let mut rng = DeterministicRng::new(config.seed);
                let mut builder = CorpusBuilder::new();
                builder.read_source(&path, provenance, &tokenizer)?;
                let corpus = builder.finish(&tokenizer, &mut rng);
                if corpus.is_empty() {
                    warn!(path = %path.display(), "source produced no documents");
                    continue;
                }
                instances.extend(generate_instances(&corpus, &config, &mut rng)?);
            }
        }
    }

    let mut shuffle_rng = DeterministicRng::new(config.seed);
    instances.shuffle(&mut shuffle_rng);

    if let Some(mix) = instance_mix(&instances) {
        println!(
            "Generated {} instances ({:.1}% random-next, {:.1}% synthetic, {:.1} masked positions on average)",
            mix.total,
            100.0 * mix.random_next_share,
            100.0 * mix.synthetic_share,
            mix.mean_masked
        );
    }

    let mut writer = RecordWriter::create(&cli.output)?;
    for instance in &instances {
        writer.write_instance(instance, &tokenizer, &config)?;
    }
    let written = writer.finish()?;
    println!(
        "Wrote {written} instances to {} and {}",
        stream_path(&cli.output, PAIR_STREAM_SUFFIX).display(),
        stream_path(&cli.output, SINGLE_STREAM_SUFFIX).display()
    );
    Ok(())
}

fn parse_positive_usize(raw: &str) -> Result<usize, String> {
    let parsed = raw
        .parse::<usize>()
        .map_err(|_| format!("could not parse '{}' as a positive integer", raw))?;
    if parsed == 0 {
        return Err("value must be greater than zero".to_string());
    }
    Ok(parsed)
}

fn parse_cli<T, I>(args: I) -> Result<Option<T>, Box<dyn Error>>
where
    T: Parser,
    I: IntoIterator,
    I::Item: Into<std::ffi::OsString> + Clone,
{
    match T::try_parse_from(args) {
        Ok(cli) => Ok(Some(cli)),
        Err(err) => match err.kind() {
            ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => {
                err.print()?;
                Ok(None)
            }
            _ => Err(err.into()),
        },
    }
}
