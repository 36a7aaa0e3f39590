//! Candle implementation of the CNN + bidirectional GRU toxic comment model
//!
//! Layout: embedding -> conv1d + relu -> adaptive max pool -> bi-GRU ->
//! last time step -> linear. Weight names follow the PyTorch module the
//! model was trained with, so an exported `model.safetensors` loads as is.

use crate::inference::InferenceBackend;
use candle_core::{Device, Module, Tensor, D};
use candle_nn::{Conv1d, Conv1dConfig, Embedding, Linear, VarBuilder};
use serde::{Deserialize, Serialize};
use toxigauge_core::{Category, EncodedSequence, Error, Result, ScoreVector};

/// Padding applied on both sides of the convolution input
const CONV_PADDING: usize = 1;

/// Architecture hyper-parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CnnGruConfig {
    /// Rows of the embedding matrix; derived from the vocabulary when unset
    pub vocab_size: Option<usize>,
    pub embedding_dim: usize,
    pub hidden_dim: usize,
    pub num_filters: usize,
    pub kernel_size: usize,
    /// Sequence length after adaptive max pooling
    pub pooled_len: usize,
    pub num_classes: usize,
}

impl Default for CnnGruConfig {
    fn default() -> Self {
        Self {
            vocab_size: None,
            embedding_dim: 300,
            hidden_dim: 128,
            num_filters: 128,
            kernel_size: 3,
            pooled_len: 50,
            num_classes: Category::COUNT,
        }
    }
}

impl CnnGruConfig {
    /// Length of the convolution output for an input of `seq_len` steps
    pub fn conv_output_len(&self, seq_len: usize) -> usize {
        (seq_len + 2 * CONV_PADDING + 1).saturating_sub(self.kernel_size)
    }

    /// Check the dimensions against the encoder sequence length
    pub fn validate(&self, seq_len: usize) -> Result<()> {
        let dims = [
            ("embedding_dim", self.embedding_dim),
            ("hidden_dim", self.hidden_dim),
            ("num_filters", self.num_filters),
            ("kernel_size", self.kernel_size),
            ("pooled_len", self.pooled_len),
        ];
        for (name, value) in dims {
            if value == 0 {
                return Err(Error::config(format!("architecture.{name} must be > 0")));
            }
        }

        if self.vocab_size == Some(0) {
            return Err(Error::config("architecture.vocab_size must be > 0"));
        }

        if self.num_classes != Category::COUNT {
            return Err(Error::config(format!(
                "architecture.num_classes must be {}, got {}",
                Category::COUNT,
                self.num_classes
            )));
        }

        if self.conv_output_len(seq_len) == 0 {
            return Err(Error::config(format!(
                "kernel_size {} is too large for sequences of {} tokens",
                self.kernel_size, seq_len
            )));
        }

        Ok(())
    }
}

/// Loaded CNN + GRU classifier
pub struct CnnGruModel {
    name: String,
    embedding: Embedding,
    conv: Conv1d,
    gru_forward: GruDirection,
    gru_backward: GruDirection,
    fc: Linear,
    pooled_len: usize,
    num_classes: usize,
    seq_len: usize,
    device: Device,
}

impl CnnGruModel {
    /// Build the model from weights in `vb`.
    ///
    /// `vocab_size` is the number of embedding rows and `seq_len` the
    /// encoder's fixed sequence length.
    pub fn load(
        vb: VarBuilder,
        config: &CnnGruConfig,
        vocab_size: usize,
        seq_len: usize,
        name: impl Into<String>,
    ) -> Result<Self> {
        config.validate(seq_len)?;
        let device = vb.device().clone();

        let embedding = candle_nn::embedding(vocab_size, config.embedding_dim, vb.pp("embedding"))
            .map_err(|e| Error::inference(format!("Failed to load embedding: {}", e)))?;

        let conv_config = Conv1dConfig {
            padding: CONV_PADDING,
            ..Default::default()
        };
        let conv = candle_nn::conv1d(
            config.embedding_dim,
            config.num_filters,
            config.kernel_size,
            conv_config,
            vb.pp("conv"),
        )
        .map_err(|e| Error::inference(format!("Failed to load conv layer: {}", e)))?;

        let gru_forward = GruDirection::load(&vb.pp("gru"), config, "")
            .map_err(|e| Error::inference(format!("Failed to load forward GRU: {}", e)))?;
        let gru_backward = GruDirection::load(&vb.pp("gru"), config, "_reverse")
            .map_err(|e| Error::inference(format!("Failed to load reverse GRU: {}", e)))?;

        let fc = candle_nn::linear(config.hidden_dim * 2, config.num_classes, vb.pp("fc"))
            .map_err(|e| Error::inference(format!("Failed to load output layer: {}", e)))?;

        Ok(Self {
            name: name.into(),
            embedding,
            conv,
            gru_forward,
            gru_backward,
            fc,
            pooled_len: config.pooled_len,
            num_classes: config.num_classes,
            seq_len,
            device,
        })
    }

    pub fn device(&self) -> &Device {
        &self.device
    }

    /// Forward pass over a `(batch, seq_len)` u32 tensor, returning logits
    /// of shape `(batch, num_classes)`
    pub fn forward(&self, ids: &Tensor) -> candle_core::Result<Tensor> {
        let x = self.embedding.forward(ids)?;
        let x = x.transpose(1, 2)?.contiguous()?;
        let x = self.conv.forward(&x)?.relu()?;
        let x = adaptive_max_pool1d(&x, self.pooled_len)?;
        let x = x.transpose(1, 2)?.contiguous()?;

        let (batch, steps, _) = x.dims3()?;

        let mut forward = self.gru_forward.zero_state(batch, &x)?;
        for t in 0..steps {
            let input = x.narrow(1, t, 1)?.squeeze(1)?.contiguous()?;
            forward = self.gru_forward.step(&input, &forward)?;
        }

        // The reverse direction's output at the last step has only seen
        // that one step.
        let last_step = x.narrow(1, steps - 1, 1)?.squeeze(1)?.contiguous()?;
        let backward = self
            .gru_backward
            .step(&last_step, &self.gru_backward.zero_state(batch, &x)?)?;

        let last = Tensor::cat(&[&forward, &backward], 1)?;
        self.fc.forward(&last)
    }
}

impl InferenceBackend for CnnGruModel {
    fn infer(&self, input: &EncodedSequence) -> Result<ScoreVector> {
        if input.len() != self.seq_len {
            return Err(Error::inference(format!(
                "expected a sequence of {} ids, got {}",
                self.seq_len,
                input.len()
            )));
        }

        let ids = Tensor::new(input.ids(), &self.device)
            .and_then(|t| t.unsqueeze(0))
            .map_err(|e| Error::inference(format!("Failed to build input tensor: {}", e)))?;

        let logits = self
            .forward(&ids)
            .and_then(|t| t.squeeze(0))
            .and_then(|t| t.to_vec1::<f32>())
            .map_err(|e| Error::inference(format!("Forward pass failed: {}", e)))?;

        Ok(ScoreVector::new(logits))
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn num_categories(&self) -> usize {
        self.num_classes
    }
}

/// One direction of a single-layer GRU, gate order `r, z, n` as in PyTorch
struct GruDirection {
    w_ih: Tensor,
    w_hh: Tensor,
    b_ih: Tensor,
    b_hh: Tensor,
    hidden_dim: usize,
}

impl GruDirection {
    fn load(vb: &VarBuilder, config: &CnnGruConfig, suffix: &str) -> candle_core::Result<Self> {
        let gates = 3 * config.hidden_dim;
        Ok(Self {
            w_ih: vb.get((gates, config.num_filters), &format!("weight_ih_l0{suffix}"))?,
            w_hh: vb.get((gates, config.hidden_dim), &format!("weight_hh_l0{suffix}"))?,
            b_ih: vb.get(gates, &format!("bias_ih_l0{suffix}"))?,
            b_hh: vb.get(gates, &format!("bias_hh_l0{suffix}"))?,
            hidden_dim: config.hidden_dim,
        })
    }

    fn zero_state(&self, batch: usize, like: &Tensor) -> candle_core::Result<Tensor> {
        Tensor::zeros((batch, self.hidden_dim), like.dtype(), like.device())
    }

    /// `input` is `(batch, in_dim)`, `h` is `(batch, hidden_dim)`
    fn step(&self, input: &Tensor, h: &Tensor) -> candle_core::Result<Tensor> {
        let gi = input.matmul(&self.w_ih.t()?)?.broadcast_add(&self.b_ih)?;
        let gh = h.matmul(&self.w_hh.t()?)?.broadcast_add(&self.b_hh)?;
        let gi = gi.chunk(3, 1)?;
        let gh = gh.chunk(3, 1)?;

        let r = candle_nn::ops::sigmoid(&gi[0].add(&gh[0])?)?;
        let z = candle_nn::ops::sigmoid(&gi[1].add(&gh[1])?)?;
        let n = gi[2].add(&r.mul(&gh[2])?)?.tanh()?;

        // h' = (1 - z) * n + z * h
        z.affine(-1.0, 1.0)?.mul(&n)?.add(&z.mul(h)?)
    }
}

/// Max pooling over the last dimension into exactly `output_len` windows.
///
/// Window `i` covers `[floor(i * n / out), ceil((i + 1) * n / out))`, so
/// windows may overlap when `n` is not a multiple of `out`.
pub fn adaptive_max_pool1d(x: &Tensor, output_len: usize) -> candle_core::Result<Tensor> {
    let input_len = x.dim(D::Minus1)?;
    let mut windows = Vec::with_capacity(output_len);

    for i in 0..output_len {
        let start = i * input_len / output_len;
        let end = ((i + 1) * input_len + output_len - 1) / output_len;
        windows.push(x.narrow(D::Minus1, start, end - start)?.max_keepdim(D::Minus1)?);
    }

    Tensor::cat(&windows, D::Minus1)
}
