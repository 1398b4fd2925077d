/// Sentence embedding model used by the ingestion sink.
pub trait Embedder: Send + Sync {
    /// Stable identifier for the model, e.g. `paraphrase-multilingual-MiniLM-L12-v2`.
    fn model_id(&self) -> &str;
    fn dim(&self) -> usize;
    fn max_len(&self) -> usize;
    /// One vector of length `dim()` per input text, in input order.
    fn embed_batch(&self, texts: &[String]) -> anyhow::Result<Vec<Vec<f32>>>;
}

/// Content filter applied to normalized descriptions.
pub trait LanguageDetector: Send + Sync {
    fn is_english(&self, text: &str) -> bool;
}
