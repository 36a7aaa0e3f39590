//! Model loading for the Candle CNN + GRU classifier

use crate::cnn_gru::{CnnGruConfig, CnnGruModel};
use crate::tokenizer::DEFAULT_MAX_LEN;
use crate::vocab::Vocabulary;
use candle_core::{DType, Device};
use candle_nn::VarBuilder;
use hf_hub::{api::sync::Api, Repo, RepoType};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use toxigauge_core::{Error, Result};

/// Vocabulary file names tried next to the weights when none is configured
const VOCAB_FILENAMES: [&str; 2] = ["vocab.json", "vocab_onnx.json"];

/// Configuration for loading the classifier model
#[derive(Debug, Clone)]
pub struct ModelConfig {
    /// Source of the model weights
    pub source: ModelSource,

    /// Path to the vocabulary JSON (looked up next to the weights if unset)
    pub vocab_path: Option<PathBuf>,

    /// Device to run inference on
    pub device: DeviceType,

    /// Encoder sequence length
    pub max_len: usize,

    /// Architecture hyper-parameters
    pub architecture: CnnGruConfig,
}

/// Source location for model weights
#[derive(Debug, Clone)]
pub enum ModelSource {
    /// Load from local file system
    LocalPath(PathBuf),

    /// Download from Hugging Face Hub
    HuggingFace {
        repo_id: String,
        revision: Option<String>,
        filename: String,
    },
}

/// Device type for inference
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceType {
    /// CPU inference (always available)
    Cpu,
    /// CUDA GPU inference (if available)
    Cuda(usize), // GPU index
    /// Metal (Apple Silicon)
    Metal(usize),
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            source: ModelSource::LocalPath(PathBuf::new()),
            vocab_path: None,
            device: DeviceType::Cpu,
            max_len: DEFAULT_MAX_LEN,
            architecture: CnnGruConfig::default(),
        }
    }
}

impl ModelConfig {
    /// Create a new model configuration from local path
    pub fn from_local(path: impl Into<PathBuf>) -> Self {
        Self {
            source: ModelSource::LocalPath(path.into()),
            ..Default::default()
        }
    }

    /// Create a new model configuration from Hugging Face
    pub fn from_hf(repo_id: impl Into<String>, filename: impl Into<String>) -> Self {
        Self {
            source: ModelSource::HuggingFace {
                repo_id: repo_id.into(),
                revision: None,
                filename: filename.into(),
            },
            ..Default::default()
        }
    }

    /// Set vocabulary path
    pub fn with_vocab(mut self, path: impl Into<PathBuf>) -> Self {
        self.vocab_path = Some(path.into());
        self
    }

    /// Set device
    pub fn with_device(mut self, device: DeviceType) -> Self {
        self.device = device;
        self
    }

    /// Set sequence length
    pub fn with_max_len(mut self, max_len: usize) -> Self {
        self.max_len = max_len;
        self
    }

    /// Set architecture hyper-parameters
    pub fn with_architecture(mut self, architecture: CnnGruConfig) -> Self {
        self.architecture = architecture;
        self
    }

    /// Set Hugging Face revision
    pub fn with_revision(mut self, revision: impl Into<String>) -> Self {
        if let ModelSource::HuggingFace { repo_id, filename, .. } = self.source {
            self.source = ModelSource::HuggingFace {
                repo_id,
                revision: Some(revision.into()),
                filename,
            };
        }
        self
    }
}

/// Model weights and vocabulary, ready to be handed to the classifier
pub struct LoadedModel {
    model: CnnGruModel,
    vocabulary: Arc<Vocabulary>,
    weights_path: PathBuf,
    max_len: usize,
}

impl LoadedModel {
    /// Load a model from configuration
    pub fn load(config: ModelConfig) -> Result<Self> {
        let weights_path = resolve_model_path(&config)?;
        let vocab_path = resolve_vocab_path(&config, &weights_path)?;
        let vocabulary = Arc::new(Vocabulary::from_file(&vocab_path)?);

        let vocab_size = config
            .architecture
            .vocab_size
            .unwrap_or(vocabulary.max_id() as usize + 1);
        if vocabulary.max_id() as usize >= vocab_size {
            return Err(Error::config(format!(
                "vocabulary id {} does not fit an embedding of {} rows",
                vocabulary.max_id(),
                vocab_size
            )));
        }

        let device = create_device(config.device)?;

        // SAFETY: the weights file is memory-mapped read-only and must not be
        // modified while the model is alive.
        let var_builder = unsafe {
            VarBuilder::from_mmaped_safetensors(&[&weights_path], DType::F32, &device)
                .map_err(|e| Error::inference(format!("Failed to load SafeTensors: {}", e)))?
        };

        let name = weights_path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("toxic-cnn-gru")
            .to_string();

        let model = CnnGruModel::load(
            var_builder,
            &config.architecture,
            vocab_size,
            config.max_len,
            name,
        )?;

        tracing::info!(
            weights = %weights_path.display(),
            vocab = %vocab_path.display(),
            vocab_size,
            max_len = config.max_len,
            device = ?config.device,
            "Loaded toxic comment model"
        );

        Ok(Self {
            model,
            vocabulary,
            weights_path,
            max_len: config.max_len,
        })
    }

    pub fn model(&self) -> &CnnGruModel {
        &self.model
    }

    pub fn vocabulary(&self) -> &Arc<Vocabulary> {
        &self.vocabulary
    }

    pub fn weights_path(&self) -> &Path {
        &self.weights_path
    }

    pub fn max_len(&self) -> usize {
        self.max_len
    }

    /// Split into the model and its vocabulary
    pub fn into_parts(self) -> (CnnGruModel, Arc<Vocabulary>) {
        (self.model, self.vocabulary)
    }
}

/// Load only the vocabulary a model configuration points at.
///
/// For a local model the weights file does not have to exist; its directory
/// is only used to look for a vocabulary next to it.
pub fn load_vocabulary(config: &ModelConfig) -> Result<Vocabulary> {
    let weights_path = match &config.source {
        ModelSource::LocalPath(path) => path.clone(),
        ModelSource::HuggingFace { .. } => PathBuf::new(),
    };
    let vocab_path = resolve_vocab_path(config, &weights_path)?;
    Vocabulary::from_file(vocab_path)
}

/// Resolve model path from source
fn resolve_model_path(config: &ModelConfig) -> Result<PathBuf> {
    match &config.source {
        ModelSource::LocalPath(path) => {
            if !path.exists() {
                return Err(Error::config(format!("Model file not found: {:?}", path)));
            }
            Ok(path.clone())
        }
        ModelSource::HuggingFace {
            repo_id,
            revision,
            filename,
        } => hf_get(repo_id, revision.as_deref(), filename),
    }
}

/// Resolve the vocabulary: explicit path, then well-known names beside the
/// weights (or in the same Hub repository)
fn resolve_vocab_path(config: &ModelConfig, weights_path: &Path) -> Result<PathBuf> {
    if let Some(path) = &config.vocab_path {
        if !path.exists() {
            return Err(Error::config(format!("Vocabulary file not found: {:?}", path)));
        }
        return Ok(path.clone());
    }

    match &config.source {
        ModelSource::LocalPath(_) => {
            let dir = weights_path.parent().unwrap_or_else(|| Path::new("."));
            VOCAB_FILENAMES
                .iter()
                .map(|name| dir.join(name))
                .find(|candidate| candidate.exists())
                .ok_or_else(|| {
                    Error::config(format!(
                        "No vocabulary configured and none of {:?} found in {}",
                        VOCAB_FILENAMES,
                        dir.display()
                    ))
                })
        }
        ModelSource::HuggingFace {
            repo_id, revision, ..
        } => {
            for filename in VOCAB_FILENAMES {
                match hf_get(repo_id, revision.as_deref(), filename) {
                    Ok(path) => return Ok(path),
                    Err(e) => tracing::debug!(filename, error = %e, "Vocabulary candidate not available"),
                }
            }
            Err(Error::config(format!(
                "No vocabulary found in Hugging Face repo {}",
                repo_id
            )))
        }
    }
}

fn hf_get(repo_id: &str, revision: Option<&str>, filename: &str) -> Result<PathBuf> {
    let api = Api::new()
        .map_err(|e| Error::config(format!("Failed to initialize HF API: {}", e)))?;

    let repo = api.repo(Repo::with_revision(
        repo_id.to_string(),
        RepoType::Model,
        revision.unwrap_or("main").to_string(),
    ));

    repo.get(filename).map_err(|e| {
        Error::config(format!(
            "Failed to download {} from HF repo {}: {}",
            filename, repo_id, e
        ))
    })
}

/// Create Candle device from device type
fn create_device(device_type: DeviceType) -> Result<Device> {
    match device_type {
        DeviceType::Cpu => Ok(Device::Cpu),
        DeviceType::Cuda(idx) => Device::new_cuda(idx)
            .map_err(|e| Error::inference(format!("Failed to create CUDA device: {}", e))),
        DeviceType::Metal(idx) => Device::new_metal(idx)
            .map_err(|e| Error::inference(format!("Failed to create Metal device: {}", e))),
    }
}
