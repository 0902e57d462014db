use crate::codec::{BinaryReader, BinaryWriter};
use crate::error::Result;
use crate::tokenizer::Tokenizer;
use std::collections::BTreeSet;
use std::io::{Read, Write};

#[derive(Debug, Clone, PartialEq)]
pub struct Term {
    pub token: String,
    pub idf: f64,
}

/// Sorted term list with inverse document frequencies.
///
/// Term order is lexicographic and fixes the component order of every vector encoded
/// against this vocabulary. A vocabulary is never mutated after construction.
#[derive(Debug, Clone, PartialEq)]
pub struct Vocabulary {
    tokenizer: Tokenizer,
    terms: Vec<Term>,
}

impl Vocabulary {
    /// Build a vocabulary from an ordered corpus of descriptions.
    ///
    /// Document frequency counts lowercased descriptions that contain the term as a
    /// substring, and `idf = corpus_len / df`. Substring containment (rather than token
    /// equality) keeps scores compatible with artifacts built by earlier agents.
    pub fn build<S: AsRef<str>>(corpus: &[S], language: &str) -> Self {
        let tokenizer = Tokenizer::new(language);
        let lowered: Vec<String> = corpus.iter().map(|d| d.as_ref().to_lowercase()).collect();

        let mut unique = BTreeSet::new();
        for description in &lowered {
            unique.extend(tokenizer.tokenize(description));
        }

        let corpus_len = lowered.len() as f64;
        let terms = unique
            .into_iter()
            .map(|token| {
                let df = lowered.iter().filter(|d| d.contains(token.as_str())).count();
                let idf = if df > 0 { corpus_len / df as f64 } else { 0.0 };
                Term { token, idf }
            })
            .collect::<Vec<_>>();

        log::debug!(
            "Built vocabulary: {} terms from {} descriptions ({})",
            terms.len(),
            lowered.len(),
            language
        );

        Self { tokenizer, terms }
    }

    #[must_use]
    pub fn language(&self) -> &str {
        self.tokenizer.language()
    }

    #[must_use]
    pub fn tokenizer(&self) -> &Tokenizer {
        &self.tokenizer
    }

    #[must_use]
    pub fn terms(&self) -> &[Term] {
        &self.terms
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.terms.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    #[must_use]
    pub fn tokenize(&self, text: &str) -> Vec<String> {
        self.tokenizer.tokenize(text)
    }

    /// TF-IDF vector for a token sequence, one component per term in vocabulary order.
    ///
    /// Term frequency is the number of non-overlapping occurrences of the term inside the
    /// space-joined token string.
    #[must_use]
    pub fn encode<S: AsRef<str>>(&self, tokens: &[S]) -> Vec<f64> {
        let joined = tokens
            .iter()
            .map(AsRef::as_ref)
            .collect::<Vec<_>>()
            .join(" ")
            .to_lowercase();
        self.terms
            .iter()
            .map(|term| {
                if term.token.is_empty() {
                    return 0.0;
                }
                joined.matches(term.token.as_str()).count() as f64 * term.idf
            })
            .collect()
    }

    /// Tokenize then encode free text.
    #[must_use]
    pub fn encode_text(&self, text: &str) -> Vec<f64> {
        self.encode(&self.tokenize(text))
    }

    /// `termCount:i32` then `[tokenLen:i32][token][idf:f64]` per term.
    pub fn write_to<W: Write>(&self, writer: &mut BinaryWriter<W>) -> Result<()> {
        writer.write_len(self.terms.len())?;
        for term in &self.terms {
            writer.write_str(&term.token)?;
            writer.write_f64(term.idf)?;
        }
        Ok(())
    }

    pub fn read_from<R: Read>(reader: &mut BinaryReader<R>, language: &str) -> Result<Self> {
        let count = reader.read_len("term")?;
        let mut terms = Vec::with_capacity(count.min(4096));
        for _ in 0..count {
            let token = reader.read_string()?;
            let idf = reader.read_f64()?;
            terms.push(Term { token, idf });
        }
        Ok(Self {
            tokenizer: Tokenizer::new(language),
            terms,
        })
    }
}
