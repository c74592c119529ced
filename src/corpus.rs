use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};
use tracing::debug;

use std::path::Path;

use crate::errors::PipelineError;
use crate::rng::DeterministicRng;
use crate::tokenizer::Tokenizer;
use crate::transport::read_lines;
use crate::types::{Sentence, Token};

/// Provenance class of a source document.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Provenance {
    /// Human-written text.
    Organic,
    /// Machine-generated text.
    Synthetic,
}

impl Provenance {
    /// Binary label used by the serialized record format.
    pub fn as_label(self) -> u8 {
        match self {
            Provenance::Organic => 0,
            Provenance::Synthetic => 1,
        }
    }
}

/// One coherent unit of sentences within which next-sentence
/// relationships are meaningful, tagged with its provenance.
///
/// Owning the label keeps documents and labels permuted together by
/// construction; they can never fall out of sync.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Document {
    /// Ordered, non-empty tokenized sentences.
    pub sentences: Vec<Sentence>,
    /// Provenance tag propagated to every derived instance.
    pub provenance: Provenance,
}

/// Shuffled document collection plus the flat vocabulary used for
/// random-replacement sampling during masking.
#[derive(Clone, Debug)]
pub struct Corpus {
    documents: Vec<Document>,
    vocabulary: Vec<Token>,
}

impl Corpus {
    /// Assemble a corpus directly from prepared documents (no shuffle).
    pub fn from_documents(documents: Vec<Document>, vocabulary: Vec<Token>) -> Self {
        Self {
            documents,
            vocabulary,
        }
    }

    /// All documents, in sampling order.
    pub fn documents(&self) -> &[Document] {
        &self.documents
    }

    /// Known token strings in stable id order.
    pub fn vocabulary(&self) -> &[Token] {
        &self.vocabulary
    }

    /// Number of documents.
    pub fn len(&self) -> usize {
        self.documents.len()
    }

    /// True when no documents survived loading.
    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }
}

/// Incremental corpus builder over line-oriented sources.
///
/// A blank input line is a document boundary; documents left with zero
/// sentences are discarded together with their label slot.
#[derive(Default)]
pub struct CorpusBuilder {
    documents: Vec<Document>,
    current: Vec<Sentence>,
    current_provenance: Option<Provenance>,
}

impl CorpusBuilder {
    /// Create an empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed every line of one source file, closing the trailing document.
    pub fn read_source(
        &mut self,
        path: &Path,
        provenance: Provenance,
        tokenizer: &dyn Tokenizer,
    ) -> Result<(), PipelineError> {
        let before = self.documents.len();
        for line in read_lines(path)? {
            self.push_line(&line, provenance, tokenizer);
        }
        self.end_document();
        debug!(
            path = %path.display(),
            documents = self.documents.len() - before,
            "loaded source"
        );
        Ok(())
    }

    /// Feed one raw line: blank lines start a new document, anything
    /// with a non-empty tokenization becomes a sentence of the current one.
    pub fn push_line(&mut self, line: &str, provenance: Provenance, tokenizer: &dyn Tokenizer) {
        if line.trim().is_empty() {
            self.end_document();
            return;
        }
        let tokens = tokenizer.tokenize(line);
        if tokens.is_empty() {
            return;
        }
        self.current_provenance.get_or_insert(provenance);
        self.current.push(tokens);
    }

    /// Close the in-progress document; empty ones are dropped.
    pub fn end_document(&mut self) {
        let sentences = std::mem::take(&mut self.current);
        if let Some(provenance) = self.current_provenance.take()
            && !sentences.is_empty()
        {
            self.documents.push(Document {
                sentences,
                provenance,
            });
        }
    }

    /// Finish loading: capture the vocabulary and apply the single joint
    /// permutation of documents (labels travel with their documents).
    pub fn finish(mut self, tokenizer: &dyn Tokenizer, rng: &mut DeterministicRng) -> Corpus {
        self.end_document();
        self.documents.shuffle(rng);
        let vocabulary = tokenizer.vocab().iter().cloned().collect();
        Corpus {
            documents: self.documents,
            vocabulary,
        }
    }
}
