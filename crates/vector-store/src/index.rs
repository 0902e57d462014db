use crate::codec::{BinaryReader, BinaryWriter};
use crate::error::{Result, VectorStoreError};
use ndarray::ArrayView1;
use std::io::{Read, Write};

#[derive(Debug, Clone, PartialEq)]
pub struct EntryVector {
    pub id: usize,
    pub data: Vec<f64>,
}

/// Brute-force cosine similarity index over fixed-width vectors.
///
/// Entries keep insertion order; it is the tie-break for equal scores.
#[derive(Debug, Clone, PartialEq)]
pub struct SimilarityIndex {
    width: usize,
    entries: Vec<EntryVector>,
}

impl SimilarityIndex {
    pub fn new(width: usize) -> Self {
        Self {
            width,
            entries: Vec::new(),
        }
    }

    /// Add one entry. No deduplication by id.
    pub fn append(&mut self, id: usize, vector: Vec<f64>) -> Result<()> {
        if vector.len() != self.width {
            return Err(VectorStoreError::InvalidDimension {
                expected: self.width,
                actual: vector.len(),
            });
        }
        self.entries.push(EntryVector { id, data: vector });
        Ok(())
    }

    /// Ids whose cosine similarity to `query` is at least `minimum_score`, best first.
    pub fn query(&self, query: &[f64], minimum_score: f64) -> Result<Vec<usize>> {
        Ok(self
            .query_scored(query, minimum_score)?
            .into_iter()
            .map(|(id, _)| id)
            .collect())
    }

    /// Like [`query`](Self::query) but keeps the scores.
    pub fn query_scored(&self, query: &[f64], minimum_score: f64) -> Result<Vec<(usize, f64)>> {
        if query.len() != self.width {
            return Err(VectorStoreError::InvalidDimension {
                expected: self.width,
                actual: query.len(),
            });
        }

        let mut scored: Vec<(usize, f64)> = self
            .entries
            .iter()
            .map(|entry| (entry.id, cosine_similarity(query, &entry.data)))
            .filter(|(_, score)| *score >= minimum_score)
            .collect();

        // Stable: equal scores stay in insertion order.
        scored.sort_by(|a, b| b.1.total_cmp(&a.1));
        Ok(scored)
    }

    #[must_use]
    pub const fn width(&self) -> usize {
        self.width
    }

    #[must_use]
    pub fn entries(&self) -> &[EntryVector] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// `entryCount:i32` then `[id:i32][vectorLen:i32][vectorLen x f64]` per entry.
    pub fn write_to<W: Write>(&self, writer: &mut BinaryWriter<W>) -> Result<()> {
        writer.write_len(self.entries.len())?;
        for entry in &self.entries {
            writer.write_len(entry.id)?;
            writer.write_len(entry.data.len())?;
            for value in &entry.data {
                writer.write_f64(*value)?;
            }
        }
        Ok(())
    }

    /// Decode an index whose vectors must all be `width` wide.
    pub fn read_from<R: Read>(reader: &mut BinaryReader<R>, width: usize) -> Result<Self> {
        let count = reader.read_len("entry")?;
        let mut index = Self::new(width);
        for n in 0..count {
            let id = reader.read_len("entry id")?;
            let len = reader.read_len("vector")?;
            if len != width {
                return Err(VectorStoreError::corrupt(format!(
                    "entry {n} (id {id}) has width {len}, vocabulary has {width} terms"
                )));
            }
            let data = reader.read_f64_vec(len)?;
            index.entries.push(EntryVector { id, data });
        }
        Ok(index)
    }
}

/// `dot(a, b) / (|a| * |b|)`, or `0.0` when either vector has zero magnitude or the
/// widths differ.
#[must_use]
pub fn cosine_similarity(a: &[f64], b: &[f64]) -> f64 {
    if a.len() != b.len() {
        return 0.0;
    }
    let a = ArrayView1::from(a);
    let b = ArrayView1::from(b);

    let norm_a = a.dot(&a).sqrt();
    let norm_b = b.dot(&b).sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    a.dot(&b) / (norm_a * norm_b)
}
