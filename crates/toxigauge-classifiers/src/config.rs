//! Configuration for the classifier and model loading

use crate::cnn_gru::CnnGruConfig;
use crate::predict::DEFAULT_THRESHOLD;
use crate::tokenizer::DEFAULT_MAX_LEN;
use crate::{DeviceType, ModelConfig, ModelSource};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use toxigauge_core::{Error, Result};

/// Top-level classifier configuration, usually read from `toxigauge.yaml`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassifierConfig {
    /// Where the model weights come from
    #[serde(default = "default_model")]
    pub model: ModelSourceSpec,

    /// Vocabulary JSON path (optional, discovered next to the weights)
    #[serde(default)]
    pub vocab: Option<PathBuf>,

    /// Device to use
    #[serde(default)]
    pub device: DeviceSpec,

    /// Encoded sequence length
    #[serde(default = "default_max_len")]
    pub max_len: usize,

    /// Default decision threshold for the "toxic" probability, in `[0, 1]`
    #[serde(default = "default_threshold")]
    pub threshold: f32,

    /// Architecture hyper-parameters
    #[serde(default)]
    pub architecture: CnnGruConfig,
}

/// Model source specification (for config files)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ModelSourceSpec {
    /// Local file path
    Local { path: PathBuf },

    /// Hugging Face Hub
    HuggingFace {
        repo_id: String,
        filename: String,
        revision: Option<String>,
    },
}

/// Device specification (for config files)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeviceSpec {
    #[default]
    Cpu,
    Cuda { index: Option<usize> },
    Metal { index: Option<usize> },
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            model: default_model(),
            vocab: None,
            device: DeviceSpec::Cpu,
            max_len: default_max_len(),
            threshold: default_threshold(),
            architecture: CnnGruConfig::default(),
        }
    }
}

impl ClassifierConfig {
    /// Load from YAML string
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(yaml)
            .map_err(|e| Error::config(format!("Failed to parse config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Load from file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::config(format!("Failed to read config {}: {}", path.display(), e))
        })?;
        Self::from_yaml(&content)
    }

    /// Reject values the pipeline cannot run with
    pub fn validate(&self) -> Result<()> {
        if self.max_len == 0 {
            return Err(Error::config("max_len must be > 0"));
        }
        validate_threshold(self.threshold)?;
        self.architecture.validate(self.max_len)
    }

    /// Convert to ModelConfig for loading
    pub fn to_model_config(&self) -> ModelConfig {
        let source = match &self.model {
            ModelSourceSpec::Local { path } => ModelSource::LocalPath(path.clone()),
            ModelSourceSpec::HuggingFace {
                repo_id,
                filename,
                revision,
            } => ModelSource::HuggingFace {
                repo_id: repo_id.clone(),
                revision: revision.clone(),
                filename: filename.clone(),
            },
        };

        ModelConfig {
            source,
            vocab_path: self.vocab.clone(),
            device: self.device.to_device_type(),
            max_len: self.max_len,
            architecture: self.architecture.clone(),
        }
    }
}

impl DeviceSpec {
    /// Convert to DeviceType
    pub fn to_device_type(&self) -> DeviceType {
        match self {
            DeviceSpec::Cpu => DeviceType::Cpu,
            DeviceSpec::Cuda { index } => DeviceType::Cuda(index.unwrap_or(0)),
            DeviceSpec::Metal { index } => DeviceType::Metal(index.unwrap_or(0)),
        }
    }
}

/// Check that a threshold is a finite value in `[0, 1]`
pub fn validate_threshold(threshold: f32) -> Result<f32> {
    if threshold.is_finite() && (0.0..=1.0).contains(&threshold) {
        Ok(threshold)
    } else {
        Err(Error::config(format!(
            "threshold must be within [0, 1], got {}",
            threshold
        )))
    }
}

fn default_model() -> ModelSourceSpec {
    ModelSourceSpec::Local {
        path: PathBuf::from("./model/model.safetensors"),
    }
}

fn default_max_len() -> usize {
    DEFAULT_MAX_LEN
}

fn default_threshold() -> f32 {
    DEFAULT_THRESHOLD
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classifier_config_yaml() {
        let yaml = r#"
model:
  path: ./models/toxic.safetensors
vocab: ./models/vocab_onnx.json
device: cpu
max_len: 120
threshold: 0.7
architecture:
  embedding_dim: 100
  hidden_dim: 64
"#;

        let config = ClassifierConfig::from_yaml(yaml).unwrap();

        assert!(matches!(config.model, ModelSourceSpec::Local { .. }));
        assert_eq!(config.vocab, Some(PathBuf::from("./models/vocab_onnx.json")));
        assert_eq!(config.max_len, 120);
        assert_eq!(config.threshold, 0.7);
        assert_eq!(config.architecture.embedding_dim, 100);
        assert_eq!(config.architecture.hidden_dim, 64);
        // Unset fields keep their defaults.
        assert_eq!(config.architecture.pooled_len, 50);
    }

    #[test]
    fn test_defaults() {
        let config = ClassifierConfig::from_yaml("{}").unwrap();
        assert_eq!(config.max_len, 150);
        assert_eq!(config.threshold, 0.5);
        assert!(config.vocab.is_none());
        assert!(matches!(config.device, DeviceSpec::Cpu));
    }

    #[test]
    fn test_to_model_config_hf() {
        let yaml = r#"
model:
  repo_id: someone/toxic-cnn-gru
  filename: model.safetensors
  revision: v2
device:
  cuda:
    index: 1
"#;

        let config = ClassifierConfig::from_yaml(yaml).unwrap();
        let model_config = config.to_model_config();

        assert!(matches!(model_config.source, ModelSource::HuggingFace { .. }));
        assert_eq!(model_config.device, DeviceType::Cuda(1));
        assert_eq!(model_config.max_len, 150);
    }

    #[test]
    fn test_device_spec() {
        let spec: DeviceSpec = serde_yaml::from_str("cpu").unwrap();
        assert!(matches!(spec, DeviceSpec::Cpu));

        assert_eq!(DeviceSpec::Cpu.to_device_type(), DeviceType::Cpu);
        assert_eq!(
            DeviceSpec::Cuda { index: Some(1) }.to_device_type(),
            DeviceType::Cuda(1)
        );
        assert_eq!(
            DeviceSpec::Metal { index: None }.to_device_type(),
            DeviceType::Metal(0)
        );
    }

    #[test]
    fn test_invalid_values_rejected() {
        assert!(ClassifierConfig::from_yaml("threshold: 1.5").is_err());
        assert!(ClassifierConfig::from_yaml("threshold: -0.1").is_err());
        assert!(ClassifierConfig::from_yaml("max_len: 0").is_err());
        assert!(ClassifierConfig::from_yaml("architecture:\n  num_classes: 3").is_err());
        assert!(ClassifierConfig::from_yaml("max_len: [1, 2]").is_err());
    }

    #[test]
    fn test_validate_threshold() {
        assert_eq!(validate_threshold(0.0).unwrap(), 0.0);
        assert_eq!(validate_threshold(1.0).unwrap(), 1.0);
        assert!(validate_threshold(f32::NAN).is_err());
        assert!(validate_threshold(f32::INFINITY).is_err());
    }

    #[test]
    fn test_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("toxigauge.yaml");
        std::fs::write(&path, "threshold: 0.3\n").unwrap();

        let config = ClassifierConfig::from_file(&path).unwrap();
        assert_eq!(config.threshold, 0.3);

        assert!(ClassifierConfig::from_file(dir.path().join("missing.yaml")).is_err());
    }
}
