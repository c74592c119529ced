/// Special marker tokens shared by the tokenizer, segmenter, and masking.
pub mod markers {
    /// Sequence-start classification marker.
    pub const CLS_TOKEN: &str = "[CLS]";
    /// Segment separator marker.
    pub const SEP_TOKEN: &str = "[SEP]";
    /// Masked-position substitution marker.
    pub const MASK_TOKEN: &str = "[MASK]";
    /// Unknown-word fallback token.
    pub const UNK_TOKEN: &str = "[UNK]";
    /// Prefix marking a sub-word continuation piece (for example `##ing`).
    pub const CONTINUATION_PREFIX: &str = "##";
}

/// Constants governing randomized sampling behavior.
pub mod sampling {
    /// Marker slots reserved in a combined sequence (`[CLS]` plus two `[SEP]`).
    pub const SPECIAL_TOKEN_BUDGET: usize = 3;
    /// Smallest target length drawn when the short-sequence branch fires.
    pub const MIN_TARGET_SEQ_LENGTH: usize = 2;
    /// Probability that segment B is drawn from a random document.
    pub const RANDOM_NEXT_PROB: f64 = 0.5;
    /// Attempts at finding a qualifying random document before accepting
    /// the last sample unconditionally.
    pub const NEGATIVE_SAMPLE_RETRY_LIMIT: usize = 100;
    /// Probability that a claimed position is replaced with the mask marker.
    pub const MASK_REPLACE_PROB: f64 = 0.8;
    /// Probability (within the non-mask remainder) that the original token
    /// is kept; the rest draw a random vocabulary token.
    pub const KEEP_ORIGINAL_PROB: f64 = 0.5;
}

/// Constants used by record encoding and the output streams.
pub mod writer {
    /// Filename suffix for the sentence-pair (NSP-task) record stream.
    pub const PAIR_STREAM_SUFFIX: &str = "-task-nsp";
    /// Filename suffix for the single-sentence record stream.
    pub const SINGLE_STREAM_SUFFIX: &str = "-task-nonsp";
    /// Extension appended to both stream files.
    pub const STREAM_EXTENSION: &str = ".jsonl";
    /// Number of leading records echoed at debug level for inspection.
    pub const PREVIEW_RECORD_LIMIT: usize = 20;
}
