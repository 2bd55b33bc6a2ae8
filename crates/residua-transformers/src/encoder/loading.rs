//! Non-strict assignment of checkpoint tensors into encoder parameters.

use std::fmt;

use anyhow::{anyhow, Result};
use ndarray::Array2;

use crate::linear_layer::LinearLayer;
use crate::normalization::LayerNorm;
use crate::tensor::{RawTensor, Shape};

/// Checkpoint entry whose shape disagrees with the encoder parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShapeMismatch {
    pub name: String,
    pub expected: Shape,
    pub found: Shape,
}

/// Outcome of a non-strict load.
///
/// Every checkpoint entry lands in exactly one of `loaded`, `unexpected` or
/// `mismatched`; `missing` lists encoder parameters the checkpoint lacked,
/// which keep their default initialization.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadReport {
    pub loaded: Vec<String>,
    pub missing: Vec<String>,
    pub unexpected: Vec<String>,
    pub mismatched: Vec<ShapeMismatch>,
}

impl LoadReport {
    /// True when every parameter was loaded and nothing was skipped.
    pub fn is_exact(&self) -> bool {
        self.missing.is_empty() && self.unexpected.is_empty() && self.mismatched.is_empty()
    }

    pub(crate) fn log(&self) {
        log::info!("{}", self);
        for name in &self.missing {
            log::debug!("missing parameter '{}' keeps its default init", name);
        }
        for name in &self.unexpected {
            log::debug!("unexpected checkpoint entry '{}' ignored", name);
        }
        for m in &self.mismatched {
            log::warn!(
                "shape mismatch for '{}': expected {}, found {}; skipped",
                m.name,
                m.expected,
                m.found
            );
        }
    }
}

impl fmt::Display for LoadReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "loaded {} parameters ({} missing, {} unexpected, {} mismatched)",
            self.loaded.len(),
            self.missing.len(),
            self.unexpected.len(),
            self.mismatched.len()
        )
    }
}

/// Mutable handle to one encoder parameter.
pub(crate) enum Slot<'a> {
    Matrix(&'a mut Array2<f32>),
    Linear(&'a mut LinearLayer),
    Norm(&'a mut LayerNorm),
}

impl Slot<'_> {
    pub fn expected_shape(&self) -> Shape {
        match self {
            Slot::Matrix(m) => Shape::from([m.nrows(), m.ncols()]),
            Slot::Linear(l) => Shape::from(l.shape()),
            Slot::Norm(n) => Shape::from([n.hidden_size()]),
        }
    }

    /// Copies `tensor` in; the caller has already checked the shape.
    pub fn assign(self, tensor: &RawTensor) -> Result<()> {
        match self {
            Slot::Matrix(m) => {
                let value = tensor.to_array2()?;
                if value.dim() != m.dim() {
                    return Err(anyhow!("expected {:?}, got {:?}", m.dim(), value.dim()));
                }
                *m = value;
                Ok(())
            }
            Slot::Linear(l) => l.set_weight(tensor.to_array2()?),
            Slot::Norm(n) => n.set_weight(tensor.to_array1()?),
        }
    }
}
