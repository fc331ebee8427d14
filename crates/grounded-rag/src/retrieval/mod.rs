//! Retrieval: in-memory vector index over embedded chunks

mod search;

pub use search::{cosine_similarity, SearchHit, VectorIndex};
