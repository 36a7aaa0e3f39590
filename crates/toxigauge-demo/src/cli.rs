use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use toxigauge_classifiers::{ClassifierConfig, ModelSourceSpec};

#[derive(Parser, Debug)]
#[command(name = "toxigauge")]
#[command(
    author,
    version,
    about = "Classify text into six toxicity categories"
)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(flatten)]
    pub settings: Settings,

    #[command(subcommand)]
    pub command: Commands,
}

/// Options shared by every command
#[derive(Args, Debug, Clone, Default)]
pub struct Settings {
    /// Classifier config file (YAML)
    #[arg(short, long, global = true, env = "TOXIGAUGE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Model weights (safetensors), overrides the config
    #[arg(long, global = true, env = "TOXIGAUGE_MODEL")]
    pub model: Option<PathBuf>,

    /// Vocabulary JSON, overrides the config
    #[arg(long, global = true, env = "TOXIGAUGE_VOCAB")]
    pub vocab: Option<PathBuf>,

    /// Decision threshold for the toxic probability, between 0 and 1
    #[arg(short, long, global = true)]
    pub threshold: Option<f32>,

    /// Encoded sequence length
    #[arg(long, global = true)]
    pub max_len: Option<usize>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Classify a single text (read from stdin when omitted)
    Classify {
        /// Text to classify
        text: Option<String>,

        /// Print the result as JSON
        #[arg(long)]
        json: bool,
    },

    /// Classify each line read from stdin until EOF
    Interactive {
        /// Print each result as a JSON line
        #[arg(long)]
        json: bool,
    },

    /// Show normalized tokens and encoded ids without running the model
    Tokens {
        /// Text to encode (read from stdin when omitted)
        text: Option<String>,
    },

    /// Describe the toxicity categories
    Categories,
}

impl Settings {
    /// Config file (or defaults) with command-line overrides applied
    pub fn classifier_config(&self) -> anyhow::Result<ClassifierConfig> {
        let mut config = match &self.config {
            Some(path) => ClassifierConfig::from_file(path)?,
            None => ClassifierConfig::default(),
        };

        if let Some(model) = &self.model {
            config.model = ModelSourceSpec::Local {
                path: model.clone(),
            };
        }
        if let Some(vocab) = &self.vocab {
            config.vocab = Some(vocab.clone());
        }
        if let Some(threshold) = self.threshold {
            config.threshold = threshold;
        }
        if let Some(max_len) = self.max_len {
            config.max_len = max_len;
        }

        config.validate()?;
        Ok(config)
    }
}
