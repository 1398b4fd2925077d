//! squrrl-embed
//!
//! Sentence embeddings for book descriptions. `SentenceEmbedder` runs a
//! BERT-family sentence-transformer (mean pooling, L2-normalized) from local
//! model files; `FakeEmbedder` is a deterministic token-hash stand-in used in
//! tests and dry runs.

use anyhow::{anyhow, Context, Result};
use std::path::{Path, PathBuf};
use std::time::Instant;

use candle_core::{Device, Tensor};
use candle_nn::VarBuilder;
use candle_transformers::models::bert::{BertModel, Config as BertConfig, DTYPE};
use tokenizers::Tokenizer;
use tracing::{debug, info, warn};

pub use squrrl_core::traits::Embedder;

mod device;
mod pool;
mod tokenize;

pub use device::select_device;
pub use pool::masked_mean_l2;
pub use tokenize::tokenize_batch;

/// Descriptions embedded per forward pass.
const FORWARD_BATCH: usize = 32;

pub struct SentenceEmbedder {
    model: BertModel,
    tokenizer: Tokenizer,
    device: Device,
    model_id: String,
    dim: usize,
    max_len: usize,
    pad_id: u32,
}

impl SentenceEmbedder {
    /// Load tokenizer, config and weights from `model_dir`.
    pub fn load(model_id: &str, model_dir: &Path) -> Result<Self> {
        let device = select_device();
        info!(model = model_id, dir = %model_dir.display(), "loading sentence embedding model");
        let tokenizer_path = model_dir.join("tokenizer.json");
        let tokenizer = Tokenizer::from_file(&tokenizer_path)
            .map_err(|e| anyhow!("Failed to load tokenizer from {}: {}", tokenizer_path.display(), e))?;
        let config_path = model_dir.join("config.json");
        let config: BertConfig = serde_json::from_str(
            &std::fs::read_to_string(&config_path).with_context(|| format!("reading {}", config_path.display()))?,
        )?;
        let vb = load_weights(model_dir, &device)?;
        let model = BertModel::load(vb, &config)?;
        let pad_id = tokenizer.token_to_id("[PAD]").or_else(|| tokenizer.token_to_id("<pad>")).unwrap_or(0);
        let max_len = config.max_position_embeddings.min(128);
        info!(dim = config.hidden_size, max_len, "model loaded");
        Ok(Self { model, tokenizer, device, model_id: model_id.to_string(), dim: config.hidden_size, max_len, pad_id })
    }

    fn embed_chunk(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        let (input_ids, attention_mask) = tokenize_batch(&self.tokenizer, texts, self.max_len, self.pad_id, &self.device)?;
        let token_type_ids = input_ids.zeros_like()?;
        let hidden = self.model.forward(&input_ids, &token_type_ids, Some(&attention_mask))?;
        let pooled = masked_mean_l2(&hidden, &attention_mask)?;
        Ok(pooled.to_device(&Device::Cpu)?.to_vec2::<f32>()?)
    }
}

fn load_weights(model_dir: &Path, device: &Device) -> Result<VarBuilder<'static>> {
    let safetensors = model_dir.join("model.safetensors");
    if safetensors.exists() {
        debug!(path = %safetensors.display(), "loading safetensors weights");
        // SAFETY: the weights file is not modified while the model is alive.
        let vb = unsafe { VarBuilder::from_mmaped_safetensors(&[safetensors], DTYPE, device)? };
        return Ok(vb);
    }
    let weights_path = model_dir.join("pytorch_model.bin");
    debug!(path = %weights_path.display(), "loading pytorch weights");
    let weights = candle_core::pickle::read_all(&weights_path)
        .with_context(|| format!("reading {}", weights_path.display()))?;
    let weights_map: std::collections::HashMap<String, Tensor> = weights.into_iter().collect();
    Ok(VarBuilder::from_tensors(weights_map, DTYPE, device))
}

impl Embedder for SentenceEmbedder {
    fn model_id(&self) -> &str { &self.model_id }
    fn dim(&self) -> usize { self.dim }
    fn max_len(&self) -> usize { self.max_len }

    fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        let start = Instant::now();
        let mut out = Vec::with_capacity(texts.len());
        for chunk in texts.chunks(FORWARD_BATCH) {
            out.extend(self.embed_chunk(chunk)?);
        }
        debug!(count = texts.len(), elapsed_ms = start.elapsed().as_millis() as u64, "embedded batch");
        Ok(out)
    }
}

/// Deterministic bag-of-tokens embedder; no model files needed.
pub struct FakeEmbedder {
    dim: usize,
    model_id: String,
}

impl FakeEmbedder {
    pub fn new(dim: usize) -> Self { Self { dim, model_id: format!("fake:d{dim}") } }

    fn embed_text(&self, text: &str) -> Vec<f32> {
        use std::hash::{Hash, Hasher};
        use twox_hash::XxHash64;
        let mut v = vec![0f32; self.dim];
        for (i, token) in text.split_whitespace().enumerate() {
            let mut hasher = XxHash64::with_seed(0);
            token.hash(&mut hasher);
            let h = hasher.finish();
            let idx = (h as usize) % self.dim;
            let val = (((h >> 32) as u32) as f32) / (u32::MAX as f32);
            v[idx] += val + (i as f32 % 3.0) * 0.01;
        }
        let norm = (v.iter().map(|x| x * x).sum::<f32>()).sqrt().max(1e-6);
        for x in &mut v { *x /= norm; }
        v
    }
}

impl Embedder for FakeEmbedder {
    fn model_id(&self) -> &str { &self.model_id }
    fn dim(&self) -> usize { self.dim }
    fn max_len(&self) -> usize { usize::MAX }

    fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        Ok(texts.iter().map(|t| self.embed_text(t)).collect())
    }
}

/// Dimension of the fake embedder, matching MiniLM-L12.
pub const FAKE_DIM: usize = 384;

fn use_fake_embeddings() -> bool {
    std::env::var("SQURRL_USE_FAKE_EMBEDDINGS")
        .ok()
        .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
        .unwrap_or(false)
}

/// Load the embedder for `model`, honouring `SQURRL_USE_FAKE_EMBEDDINGS=1`.
pub fn load_embedder(model: &str, model_dir: Option<&Path>) -> Result<Box<dyn Embedder>> {
    if use_fake_embeddings() {
        warn!("Using FakeEmbedder (SQURRL_USE_FAKE_EMBEDDINGS is set)");
        return Ok(Box::new(FakeEmbedder::new(FAKE_DIM)));
    }
    let dir = resolve_model_dir(model, model_dir)?;
    Ok(Box::new(SentenceEmbedder::load(model, &dir)?))
}

/// Model files are looked up in, in order: the configured directory,
/// `SQURRL_MODEL_DIR`, `SQURRL_MODEL_DIR/<model>`, and `models/<model>`.
pub fn resolve_model_dir(model: &str, configured: Option<&Path>) -> Result<PathBuf> {
    if let Some(p) = configured {
        if p.exists() { debug!(dir = %p.display(), "using configured model dir"); return Ok(p.to_path_buf()); }
        return Err(anyhow!("Configured model directory {} does not exist", p.display()));
    }
    if let Ok(dir) = std::env::var("SQURRL_MODEL_DIR") {
        let root = PathBuf::from(&dir);
        let nested = root.join(model);
        if nested.join("config.json").exists() { return Ok(nested); }
        if root.join("config.json").exists() { return Ok(root); }
    }
    let local = Path::new("models").join(model);
    if local.exists() { debug!(dir = %local.display(), "using local model dir"); return Ok(local); }
    Err(anyhow!("Could not locate model directory for '{}'; set base.model_dir or SQURRL_MODEL_DIR", model))
}
