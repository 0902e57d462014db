use crate::codec::{BinaryReader, BinaryWriter};
use crate::error::{Result, VectorStoreError};
use crate::index::SimilarityIndex;
use crate::vocabulary::Vocabulary;
use std::io::Cursor;
use std::path::Path;

/// A vocabulary and the index encoded against it, persisted as one binary blob.
#[derive(Debug, Clone, PartialEq)]
pub struct Artifact {
    pub vocabulary: Vocabulary,
    pub index: SimilarityIndex,
}

impl Artifact {
    /// Build the vocabulary over the whole corpus and encode one vector per description.
    /// Entry ids are positions in `corpus`.
    pub fn build<S: AsRef<str>>(corpus: &[S], language: &str) -> Result<Self> {
        let vocabulary = Vocabulary::build(corpus, language);
        let mut index = SimilarityIndex::new(vocabulary.len());
        for (id, description) in corpus.iter().enumerate() {
            index.append(id, vocabulary.encode_text(description.as_ref()))?;
        }
        Ok(Self { vocabulary, index })
    }

    pub fn new(vocabulary: Vocabulary, index: SimilarityIndex) -> Result<Self> {
        if index.width() != vocabulary.len() {
            return Err(VectorStoreError::InvalidDimension {
                expected: vocabulary.len(),
                actual: index.width(),
            });
        }
        Ok(Self { vocabulary, index })
    }

    pub fn encode(&self) -> Result<Vec<u8>> {
        let mut writer = BinaryWriter::new(Vec::new());
        self.vocabulary.write_to(&mut writer)?;
        self.index.write_to(&mut writer)?;
        Ok(writer.into_inner())
    }

    pub fn decode(bytes: &[u8], language: &str) -> Result<Self> {
        let mut reader = BinaryReader::new(Cursor::new(bytes));
        let vocabulary = Vocabulary::read_from(&mut reader, language)?;
        let index = SimilarityIndex::read_from(&mut reader, vocabulary.len())?;
        reader.expect_end()?;
        Ok(Self { vocabulary, index })
    }

    /// Write through a temp file and rename so readers never observe a partial artifact.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let bytes = self.encode()?;
        let tmp = path.with_extension("vocabulary.tmp");
        std::fs::write(&tmp, &bytes)?;
        if let Err(err) = std::fs::rename(&tmp, path) {
            let _ = std::fs::remove_file(&tmp);
            return Err(err.into());
        }
        log::debug!("Saved artifact {:?} ({} bytes)", path, bytes.len());
        Ok(())
    }

    pub fn load(path: impl AsRef<Path>, language: &str) -> Result<Self> {
        let bytes = std::fs::read(path.as_ref())?;
        Self::decode(&bytes, language)
    }

    /// True when entry `i` is the stored vocabulary's encoding of `corpus[i]` for every
    /// description, i.e. the ids still map onto the same descriptions.
    pub fn describes<S: AsRef<str>>(&self, corpus: &[S]) -> bool {
        let entries = self.index.entries();
        entries.len() == corpus.len()
            && entries.iter().zip(corpus).enumerate().all(|(position, (entry, text))| {
                entry.id == position && entry.data == self.vocabulary.encode_text(text.as_ref())
            })
    }
}
