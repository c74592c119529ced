use std::fs;
use std::path::Path;

use indexmap::IndexSet;

use crate::constants::markers::{CONTINUATION_PREFIX, UNK_TOKEN};
use crate::errors::PipelineError;
use crate::types::{Sentence, Token, TokenId};

/// Sub-word tokenizer seam used by corpus loading and record encoding.
///
/// The pipeline never inspects sub-word internals beyond the
/// continuation-marker prefix check performed during whole-word masking.
pub trait Tokenizer {
    /// Split one raw input line into sub-word tokens.
    fn tokenize(&self, line: &str) -> Sentence;
    /// Map tokens to numeric vocabulary ids (unknowns fall back to `[UNK]`).
    fn token_ids(&self, tokens: &[Token]) -> Vec<TokenId>;
    /// The full known-token set, in stable id order.
    fn vocab(&self) -> &IndexSet<Token>;
}

/// WordPiece tokenizer over a fixed vocabulary file.
///
/// Words are first split on whitespace and punctuation, then greedily
/// matched against the longest vocabulary prefix; continuation pieces
/// carry the `##` prefix. A word with no full sub-word cover collapses
/// to a single `[UNK]`.
#[derive(Debug, Clone)]
pub struct WordPieceTokenizer {
    vocab: IndexSet<Token>,
    lower_case: bool,
    max_word_chars: usize,
}

impl WordPieceTokenizer {
    /// Load a vocabulary file with one token per line.
    pub fn from_vocab_file(path: &Path, lower_case: bool) -> Result<Self, PipelineError> {
        let raw = fs::read_to_string(path).map_err(|err| PipelineError::SourceUnreadable {
            path: path.display().to_string(),
            reason: err.to_string(),
        })?;
        let vocab: IndexSet<Token> = raw
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(str::to_string)
            .collect();
        if vocab.is_empty() {
            return Err(PipelineError::Configuration(format!(
                "vocabulary file '{}' contains no tokens",
                path.display()
            )));
        }
        Ok(Self::from_vocab(vocab, lower_case))
    }

    /// Build a tokenizer from an in-memory token list (test fixtures).
    pub fn from_tokens<I, S>(tokens: I, lower_case: bool) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<Token>,
    {
        Self::from_vocab(tokens.into_iter().map(Into::into).collect(), lower_case)
    }

    fn from_vocab(vocab: IndexSet<Token>, lower_case: bool) -> Self {
        Self {
            vocab,
            lower_case,
            max_word_chars: 200,
        }
    }

    fn unk_id(&self) -> TokenId {
        self.vocab.get_index_of(UNK_TOKEN).unwrap_or(0) as TokenId
    }

    /// Whitespace split plus punctuation isolation, with optional
    /// lower-casing, ahead of sub-word matching.
    fn split_basic(&self, line: &str) -> Vec<String> {
        let mut words = Vec::new();
        let mut current = String::new();
        for ch in line.chars() {
            let ch = if self.lower_case {
                ch.to_lowercase().next().unwrap_or(ch)
            } else {
                ch
            };
            if ch.is_whitespace() {
                if !current.is_empty() {
                    words.push(std::mem::take(&mut current));
                }
            } else if ch.is_ascii_punctuation() {
                if !current.is_empty() {
                    words.push(std::mem::take(&mut current));
                }
                words.push(ch.to_string());
            } else {
                current.push(ch);
            }
        }
        if !current.is_empty() {
            words.push(current);
        }
        words
    }

    /// Greedy longest-prefix WordPiece match for one word.
    fn wordpiece(&self, word: &str, out: &mut Sentence) {
        if word.chars().count() > self.max_word_chars {
            out.push(UNK_TOKEN.to_string());
            return;
        }
        let chars: Vec<char> = word.chars().collect();
        let mut pieces: Sentence = Vec::new();
        let mut start = 0;
        while start < chars.len() {
            let mut end = chars.len();
            let mut matched = None;
            while start < end {
                let piece: String = chars[start..end].iter().collect();
                let candidate = if start == 0 {
                    piece
                } else {
                    format!("{CONTINUATION_PREFIX}{piece}")
                };
                if self.vocab.contains(&candidate) {
                    matched = Some(candidate);
                    break;
                }
                end -= 1;
            }
            match matched {
                Some(candidate) => {
                    pieces.push(candidate);
                    start = end;
                }
                None => {
                    // No cover for this word at all; emit one [UNK] for the
                    // whole word rather than partial pieces.
                    out.push(UNK_TOKEN.to_string());
                    return;
                }
            }
        }
        out.extend(pieces);
    }
}

impl Tokenizer for WordPieceTokenizer {
    fn tokenize(&self, line: &str) -> Sentence {
        let mut tokens = Vec::new();
        for word in self.split_basic(line) {
            self.wordpiece(&word, &mut tokens);
        }
        tokens
    }

    fn token_ids(&self, tokens: &[Token]) -> Vec<TokenId> {
        tokens
            .iter()
            .map(|token| {
                self.vocab
                    .get_index_of(token)
                    .map(|idx| idx as TokenId)
                    .unwrap_or_else(|| self.unk_id())
            })
            .collect()
    }

    fn vocab(&self) -> &IndexSet<Token> {
        &self.vocab
    }
}
