//! Pretrained transformer models loaded with Candle
//!
//! Sequence classifiers (BERT, XLM-RoBERTa) back the sentiment and
//! toxicity fallbacks; a BERT encoder with mean pooling backs the category
//! template embedder. Weights come from a local directory or the
//! HuggingFace Hub cache.

use crate::classifier::{ClassificationMetadata, ClassificationResult, Classifier, ClassifierKind};
use crate::config::{ModelSource, ModelSpec};
use crate::embedding::Embedder;
use async_trait::async_trait;
use candle_core::{DType, Device, IndexOp, Module, Tensor, D};
use candle_nn::{Linear, VarBuilder};
use candle_transformers::models::bert::{BertModel, Config as BertConfig};
use candle_transformers::models::xlm_roberta::{
    Config as XlmRobertaConfig, XLMRobertaForSequenceClassification,
};
use hinglish_core::{Error, Result};
use serde::de::DeserializeOwned;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tokenizers::{Encoding, Tokenizer, TruncationDirection};

/// How logits become label scores
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Activation {
    /// Single-label heads (sentiment)
    Softmax,
    /// Multi-label heads (toxic-bert)
    Sigmoid,
}

fn candle_err(context: &'static str) -> impl Fn(candle_core::Error) -> Error {
    move |e| Error::model(format!("{}: {}", context, e))
}

/// Select the inference device
pub fn get_device(device: &str) -> Result<Device> {
    match device.to_lowercase().as_str() {
        "cuda" | "cuda:0" => Device::new_cuda(0).map_err(candle_err("Failed to initialize CUDA")),
        "mps" | "metal" => Device::new_metal(0).map_err(candle_err("Failed to initialize Metal")),
        _ => Ok(Device::Cpu),
    }
}

/// Resolve a model source to a directory holding its files
pub async fn resolve_model_dir(source: &ModelSource) -> Result<PathBuf> {
    match source {
        ModelSource::Local { path } => {
            if !path.is_dir() {
                return Err(Error::model(format!(
                    "Model path does not exist: {}",
                    path.display()
                )));
            }
            Ok(path.clone())
        }
        ModelSource::HuggingFace { repo, revision } => {
            let (repo, revision) = (repo.clone(), revision.clone());
            tokio::task::spawn_blocking(move || download_from_huggingface(&repo, &revision))
                .await
                .map_err(|e| Error::internal(format!("Model download task failed: {}", e)))?
        }
    }
}

fn download_from_huggingface(repo: &str, revision: &str) -> Result<PathBuf> {
    tracing::info!(repo, revision, "Fetching model from HuggingFace");

    let api = hf_hub::api::sync::Api::new()
        .map_err(|e| Error::model(format!("Failed to initialize HuggingFace API: {}", e)))?;
    let repo_obj = api.repo(hf_hub::Repo::with_revision(
        repo.to_string(),
        hf_hub::RepoType::Model,
        revision.to_string(),
    ));

    let config_path = repo_obj
        .get("config.json")
        .map_err(|e| Error::model(format!("Failed to download config.json from {}: {}", repo, e)))?;
    repo_obj
        .get("model.safetensors")
        .map_err(|e| Error::model(format!("{} has no model.safetensors: {}", repo, e)))?;
    repo_obj
        .get("tokenizer.json")
        .map_err(|e| Error::model(format!("{} has no tokenizer.json: {}", repo, e)))?;

    let model_dir = config_path
        .parent()
        .ok_or_else(|| Error::model("Invalid HuggingFace cache path"))?;

    tracing::info!(path = %model_dir.display(), "Model available");
    Ok(model_dir.to_path_buf())
}

fn parse_json_config<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let raw = std::fs::read_to_string(path)
        .map_err(|e| Error::model(format!("Failed to read {}: {}", path.display(), e)))?;
    serde_json::from_str(&raw)
        .map_err(|e| Error::model(format!("Failed to parse {}: {}", path.display(), e)))
}

fn load_tokenizer(model_dir: &Path) -> Result<Tokenizer> {
    let path = model_dir.join("tokenizer.json");
    Tokenizer::from_file(&path)
        .map_err(|e| Error::model(format!("Failed to load {}: {}", path.display(), e)))
}

fn load_var_builder(model_dir: &Path, device: &Device) -> Result<VarBuilder<'static>> {
    let weights = model_dir.join("model.safetensors");
    if !weights.exists() {
        return Err(Error::model(format!(
            "model.safetensors not found in {}",
            model_dir.display()
        )));
    }

    // SAFETY: the weights file is memory-mapped read-only and not modified
    // while the model is alive.
    let vb = unsafe {
        VarBuilder::from_mmaped_safetensors(&[weights], DType::F32, device)
            .map_err(candle_err("Failed to load weights"))?
    };
    Ok(vb)
}

/// Fields of `config.json` shared by every architecture
#[derive(Debug, serde::Deserialize)]
struct ModelHeader {
    model_type: String,
    hidden_size: usize,
    #[serde(default)]
    id2label: BTreeMap<String, String>,
}

impl ModelHeader {
    /// Labels in logit order
    fn labels(&self) -> Vec<String> {
        let mut labels: Vec<(usize, &String)> = self
            .id2label
            .iter()
            .filter_map(|(id, label)| id.parse().ok().map(|id| (id, label)))
            .collect();
        labels.sort_by_key(|(id, _)| *id);
        labels.into_iter().map(|(_, label)| label.clone()).collect()
    }
}

/// Map generic `LABEL_n` names of a three-way sentiment head
pub fn sentiment_label(raw: &str) -> String {
    match raw.to_lowercase().as_str() {
        "label_0" => "negative".to_string(),
        "label_1" => "neutral".to_string(),
        "label_2" => "positive".to_string(),
        other => other.to_string(),
    }
}

fn encode(tokenizer: &Tokenizer, text: &str, max_length: usize) -> Result<Encoding> {
    let mut encoding = tokenizer
        .encode(text, true)
        .map_err(|e| Error::model(format!("Tokenization failed: {}", e)))?;
    encoding.truncate(max_length, 0, TruncationDirection::Right);
    Ok(encoding)
}

fn batch_tensor(values: &[u32], device: &Device) -> Result<Tensor> {
    Tensor::new(values, device)
        .and_then(|t| t.unsqueeze(0))
        .map_err(candle_err("Failed to build input tensor"))
}

enum Backbone {
    Bert {
        model: BertModel,
        pooler: Option<Linear>,
        head: Linear,
    },
    XlmRoberta(XLMRobertaForSequenceClassification),
}

/// Transformer sequence classifier
pub struct SequenceClassifier {
    name: String,
    tokenizer: Tokenizer,
    backbone: Backbone,
    device: Device,
    labels: Vec<String>,
    activation: Activation,
    max_length: usize,
}

impl SequenceClassifier {
    /// Load a BERT or XLM-RoBERTa sequence classifier
    pub async fn load(
        name: impl Into<String>,
        spec: &ModelSpec,
        activation: Activation,
        device: &Device,
    ) -> Result<Self> {
        let name = name.into();
        let model_dir = resolve_model_dir(&spec.source).await?;
        let config_path = model_dir.join("config.json");
        let header: ModelHeader = parse_json_config(&config_path)?;

        let labels = header.labels();
        if labels.is_empty() {
            return Err(Error::model(format!(
                "{} declares no id2label mapping",
                config_path.display()
            )));
        }

        let tokenizer = load_tokenizer(&model_dir)?;
        let vb = load_var_builder(&model_dir, device)?;

        let backbone = match header.model_type.as_str() {
            "bert" => {
                let config: BertConfig = parse_json_config(&config_path)?;
                let model = BertModel::load(vb.pp("bert"), &config)
                    .map_err(candle_err("Failed to load BERT backbone"))?;
                let pooler = candle_nn::linear(
                    header.hidden_size,
                    header.hidden_size,
                    vb.pp("bert").pp("pooler").pp("dense"),
                )
                .ok();
                let head = candle_nn::linear(header.hidden_size, labels.len(), vb.pp("classifier"))
                    .map_err(candle_err("Failed to load classification head"))?;
                Backbone::Bert {
                    model,
                    pooler,
                    head,
                }
            }
            "xlm-roberta" | "roberta" => {
                let config: XlmRobertaConfig = parse_json_config(&config_path)?;
                let model = XLMRobertaForSequenceClassification::new(labels.len(), &config, vb)
                    .map_err(candle_err("Failed to load XLM-RoBERTa model"))?;
                Backbone::XlmRoberta(model)
            }
            other => {
                return Err(Error::model(format!(
                    "Unsupported model type '{}' for {}",
                    other, name
                )))
            }
        };

        tracing::info!(
            model = %name,
            source = %spec.source.describe(),
            model_type = %header.model_type,
            ?labels,
            "Loaded sequence classifier"
        );

        Ok(Self {
            name,
            tokenizer,
            backbone,
            device: device.clone(),
            labels,
            activation,
            max_length: spec.max_length,
        })
    }

    /// Rename labels, e.g. with [`sentiment_label`]
    pub fn map_labels(mut self, f: impl Fn(&str) -> String) -> Self {
        self.labels = self.labels.iter().map(|l| f(l)).collect();
        self
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    fn logits(&self, text: &str) -> Result<Tensor> {
        let encoding = encode(&self.tokenizer, text, self.max_length)?;
        let input_ids = batch_tensor(encoding.get_ids(), &self.device)?;
        let type_ids = batch_tensor(encoding.get_type_ids(), &self.device)?;
        let attention_mask = batch_tensor(encoding.get_attention_mask(), &self.device)?;

        match &self.backbone {
            Backbone::Bert {
                model,
                pooler,
                head,
            } => {
                let hidden = model
                    .forward(&input_ids, &type_ids, Some(&attention_mask))
                    .map_err(candle_err("Model forward pass failed"))?;
                let cls = hidden
                    .i((.., 0, ..))
                    .map_err(candle_err("Failed to extract CLS token"))?;
                let pooled = match pooler {
                    Some(dense) => dense
                        .forward(&cls)
                        .and_then(|t| t.tanh())
                        .map_err(candle_err("Pooler failed"))?,
                    None => cls,
                };
                head.forward(&pooled)
                    .map_err(candle_err("Classification head failed"))
            }
            Backbone::XlmRoberta(model) => model
                .forward(&input_ids, &attention_mask, &type_ids)
                .map_err(candle_err("Model forward pass failed")),
        }
    }

    fn probabilities(&self, logits: &Tensor) -> Result<Vec<f32>> {
        let scores = match self.activation {
            Activation::Softmax => candle_nn::ops::softmax(logits, D::Minus1),
            Activation::Sigmoid => candle_nn::ops::sigmoid(logits),
        }
        .map_err(candle_err("Activation failed"))?;

        scores
            .squeeze(0)
            .and_then(|t| t.to_vec1::<f32>())
            .map_err(candle_err("Failed to read scores"))
    }
}

#[async_trait]
impl Classifier for SequenceClassifier {
    async fn classify(&self, text: &str) -> Result<ClassificationResult> {
        let start = Instant::now();

        let logits = self.logits(text)?;
        let probs = self.probabilities(&logits)?;

        let (best, score) = probs
            .iter()
            .copied()
            .enumerate()
            .max_by(|a, b| a.1.total_cmp(&b.1))
            .ok_or_else(|| Error::model("Model returned no scores"))?;

        let label = self
            .labels
            .get(best)
            .cloned()
            .unwrap_or_else(|| format!("label_{}", best));

        Ok(ClassificationResult {
            label,
            score,
            metadata: ClassificationMetadata {
                model: Some(self.name.clone()),
                all_scores: Some(self.labels.iter().cloned().zip(probs).collect()),
            },
            latency_us: start.elapsed().as_micros() as u64,
        })
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> ClassifierKind {
        ClassifierKind::Neural
    }
}

/// Mean of the token embeddings selected by the attention mask
pub fn mean_pool(token_embeddings: &[Vec<f32>], attention_mask: &[u32]) -> Vec<f32> {
    let Some(first) = token_embeddings.first() else {
        return Vec::new();
    };

    let mut pooled = vec![0.0f32; first.len()];
    let mut count = 0.0f32;

    for (embedding, _) in token_embeddings
        .iter()
        .zip(attention_mask)
        .filter(|(_, mask)| **mask > 0)
    {
        count += 1.0;
        pooled.iter_mut().zip(embedding).for_each(|(p, v)| *p += v);
    }

    if count > 0.0 {
        pooled.iter_mut().for_each(|p| *p /= count);
    }
    pooled
}

/// BERT sentence embedder with mean pooling (all-MiniLM-L6-v2 and friends)
pub struct BertEmbedder {
    name: String,
    tokenizer: Tokenizer,
    model: BertModel,
    device: Device,
    max_length: usize,
}

impl BertEmbedder {
    pub async fn load(name: impl Into<String>, spec: &ModelSpec, device: &Device) -> Result<Self> {
        let name = name.into();
        let model_dir = resolve_model_dir(&spec.source).await?;
        let config: BertConfig = parse_json_config(&model_dir.join("config.json"))?;
        let tokenizer = load_tokenizer(&model_dir)?;
        let vb = load_var_builder(&model_dir, device)?;

        // sentence-transformers checkpoints store the encoder at the root
        let model = BertModel::load(vb.clone(), &config)
            .or_else(|_| BertModel::load(vb.pp("bert"), &config))
            .map_err(candle_err("Failed to load BERT encoder"))?;

        tracing::info!(model = %name, source = %spec.source.describe(), "Loaded sentence embedder");

        Ok(Self {
            name,
            tokenizer,
            model,
            device: device.clone(),
            max_length: spec.max_length,
        })
    }

    fn embed_one(&self, text: &str) -> Result<Vec<f32>> {
        let encoding = encode(&self.tokenizer, text, self.max_length)?;
        let input_ids = batch_tensor(encoding.get_ids(), &self.device)?;
        let type_ids = batch_tensor(encoding.get_type_ids(), &self.device)?;
        let attention_mask = batch_tensor(encoding.get_attention_mask(), &self.device)?;

        let tokens: Vec<Vec<f32>> = self
            .model
            .forward(&input_ids, &type_ids, Some(&attention_mask))
            .and_then(|hidden| hidden.squeeze(0))
            .and_then(|hidden| hidden.to_vec2())
            .map_err(candle_err("Model forward pass failed"))?;

        Ok(mean_pool(&tokens, encoding.get_attention_mask()))
    }
}

#[async_trait]
impl Embedder for BertEmbedder {
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        texts.iter().map(|t| self.embed_one(t)).collect()
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> ClassifierKind {
        ClassifierKind::Neural
    }
}
