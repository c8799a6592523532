//! Feature extraction: sparse vectors and the TF-IDF vectorizer.

pub mod sparse;
pub mod vectorizer;

pub use sparse::SparseVector;
pub use vectorizer::{TfIdfVectorizer, Vocabulary};
