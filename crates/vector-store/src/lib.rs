//! # Cobot Vector Store
//!
//! Lightweight, locally computed text similarity for mapping free-text requests onto a
//! catalog of named actions.
//!
//! ## Pipeline
//!
//! ```text
//! descriptions[]
//!     │
//!     ├──> Tokenizer (lowercase, whitespace split, Snowball stem)
//!     │
//!     ├──> Vocabulary (sorted terms + IDF)
//!     │      └─> TF-IDF vector per description
//!     │
//!     ├──> SimilarityIndex (cosine, threshold + stable ranking)
//!     │
//!     └──> Artifact (little-endian binary blob)
//! ```
//!
//! ## Example
//!
//! ```
//! use cobot_vector_store::Artifact;
//!
//! let corpus = ["restart the server", "list running processes"];
//! let artifact = Artifact::build(&corpus, "english").unwrap();
//!
//! let query = artifact.vocabulary.encode_text("restart server");
//! let ids = artifact.index.query(&query, 0.5).unwrap();
//! assert_eq!(ids, vec![0]);
//! ```

mod artifact;
pub mod codec;
mod error;
mod index;
mod tokenizer;
mod vocabulary;

pub use artifact::Artifact;
pub use codec::{BinaryReader, BinaryWriter};
pub use error::{Result, VectorStoreError};
pub use index::{cosine_similarity, EntryVector, SimilarityIndex};
pub use tokenizer::{tokenize, Tokenizer};
pub use vocabulary::{Term, Vocabulary};
