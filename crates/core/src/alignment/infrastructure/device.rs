use std::fmt;
use std::str::FromStr;

use crate::alignment::domain::alignment_error::AlignmentError;

/// Compute target for the ONNX sessions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Device {
    Cpu,
    Cuda { device_id: i32 },
    CoreMl,
    DirectMl { device_id: i32 },
}

impl FromStr for Device {
    type Err = AlignmentError;

    /// Accepts `cpu`, `cuda`, `cuda:N`, `coreml` (alias `mps`), `directml`
    /// (alias `dml`) and `directml:N`. Matching is exact: no case folding,
    /// no whitespace trimming.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (name, index) = match s.split_once(':') {
            Some((name, index)) => (name, Some(index)),
            None => (s, None),
        };
        let parse_index = |index: Option<&str>| -> Result<i32, AlignmentError> {
            match index {
                None => Ok(0),
                Some(i) => i
                    .parse::<i32>()
                    .ok()
                    .filter(|id| *id >= 0)
                    .ok_or_else(|| AlignmentError::InvalidDevice(s.to_string())),
            }
        };

        match name {
            "cpu" if index.is_none() => Ok(Device::Cpu),
            "cuda" => Ok(Device::Cuda {
                device_id: parse_index(index)?,
            }),
            "coreml" | "mps" if index.is_none() => Ok(Device::CoreMl),
            "directml" | "dml" => Ok(Device::DirectMl {
                device_id: parse_index(index)?,
            }),
            _ => Err(AlignmentError::InvalidDevice(s.to_string())),
        }
    }
}

impl fmt::Display for Device {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Device::Cpu => write!(f, "cpu"),
            Device::Cuda { device_id } => write!(f, "cuda:{device_id}"),
            Device::CoreMl => write!(f, "coreml"),
            Device::DirectMl { device_id } => write!(f, "directml:{device_id}"),
        }
    }
}

impl Device {
    /// Whether this build can target the device at all.
    pub fn is_supported(&self) -> bool {
        match self {
            Device::Cpu | Device::Cuda { .. } => true,
            Device::CoreMl => cfg!(target_os = "macos"),
            Device::DirectMl { .. } => cfg!(target_os = "windows"),
        }
    }

    /// Execution providers to register, in priority order.
    ///
    /// Empty for CPU: ONNX Runtime always falls back to its CPU provider.
    /// Every other provider is marked `error_on_failure`, so a provider that
    /// cannot register fails session creation instead of silently running
    /// on CPU.
    pub fn execution_providers(
        &self,
    ) -> Result<Vec<ort::ep::ExecutionProviderDispatch>, AlignmentError> {
        if !self.is_supported() {
            return Err(AlignmentError::UnsupportedDevice(self.to_string()));
        }
        match *self {
            Device::Cpu => Ok(vec![]),
            Device::Cuda { device_id } => Ok(vec![
                ort::ep::CUDA::default()
                    .with_device_id(device_id)
                    .build()
                    .error_on_failure(),
            ]),
            Device::CoreMl => Ok(platform_providers()),
            Device::DirectMl { device_id } => Ok(directml_providers(device_id)),
        }
    }
}

#[cfg(target_os = "macos")]
fn platform_providers() -> Vec<ort::ep::ExecutionProviderDispatch> {
    vec![ort::ep::CoreML::default()
        .build()
        .error_on_failure()]
}

#[cfg(not(target_os = "macos"))]
fn platform_providers() -> Vec<ort::ep::ExecutionProviderDispatch> {
    vec![]
}

#[cfg(target_os = "windows")]
fn directml_providers(device_id: i32) -> Vec<ort::ep::ExecutionProviderDispatch> {
    vec![ort::ep::DirectML::default()
        .with_device_id(device_id)
        .build()
        .error_on_failure()]
}

#[cfg(not(target_os = "windows"))]
fn directml_providers(_device_id: i32) -> Vec<ort::ep::ExecutionProviderDispatch> {
    vec![]
}
