/// A sub-word token or special marker, compared by exact string match.
/// Examples: `the`, `##ing`, `[CLS]`, `[MASK]`
pub type Token = String;
/// Numeric vocabulary id for a token.
/// Example: `1012`
pub type TokenId = u32;
/// One tokenized sentence (non-empty by the time it enters a corpus).
/// Example: `["the", "cat", "sat"]`
pub type Sentence = Vec<Token>;
/// Segment marker in a combined sequence: 0 for the `[CLS]`+A region, 1 for B.
pub type SegmentId = u8;
