use std::path::Path;
use tch::{kind::Kind, CModule, Device, Tensor};

use super::Regressor;
use crate::error::ModelError;

/// TorchScript module taking `[1, in_dim]` floats and returning one value.
pub struct TorchRegressor {
    module: CModule,
    device: Device,
    in_dim: usize,
}

impl TorchRegressor {
    pub fn load(path: &Path, in_dim: usize) -> Result<Self, ModelError> {
        let device = Device::Cpu;
        let module = CModule::load_on_device(path, device).map_err(|e| {
            ModelError::Corrupt(format!("failed to load TorchScript {}: {}", path.display(), e))
        })?;

        Ok(Self {
            module,
            device,
            in_dim,
        })
    }
}

impl Regressor for TorchRegressor {
    fn n_features(&self) -> usize {
        self.in_dim
    }

    fn predict(&self, x: &[f32]) -> Result<f32, ModelError> {
        if x.len() != self.in_dim {
            return Err(ModelError::FeatureLength {
                expected: self.in_dim,
                got: x.len(),
            });
        }

        let input = Tensor::from_slice(x)
            .reshape([1, self.in_dim as i64])
            .to_device(self.device);

        // Accept [1] or [1, 1]
        let out = self
            .module
            .forward_ts(&[input])
            .map_err(|e| ModelError::Backend(e.to_string()))?
            .to_kind(Kind::Float)
            .flatten(0, -1);
        let sz = out.size();
        if sz != [1] {
            return Err(ModelError::Backend(format!("unexpected model output size: {:?}", sz)));
        }

        Ok(out.double_value(&[0]) as f32)
    }

    fn describe(&self) -> String {
        format!("torchscript ({} inputs)", self.in_dim)
    }
}
