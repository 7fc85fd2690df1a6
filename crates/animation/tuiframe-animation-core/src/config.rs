//! Core configuration for tuiframe-animation-core.

use log::warn;
use serde::{de, Deserialize, Deserializer, Serialize};

use crate::data::EasingHandle;

/// Engine-wide settings. `Config::default()` reproduces the stock behaviour;
/// override only when a host needs a different default ease or solver budget.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Config {
    /// Handle assigned to both sides of a newly created keyframe.
    /// Must be finite and in range; deserialization rejects anything else.
    #[serde(deserialize_with = "deserialize_valid_handle")]
    pub default_handle: EasingHandle,
    pub solver: SolverConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_handle: EasingHandle::DEFAULT,
            solver: SolverConfig::default(),
        }
    }
}

impl Config {
    /// Bring `default_handle` into range. Out-of-range components are clamped;
    /// a non-finite component resets the handle to [`EasingHandle::DEFAULT`].
    pub fn normalized(mut self) -> Self {
        if !self.default_handle.is_valid() {
            let EasingHandle { tension, bias } = self.default_handle;
            let handle = EasingHandle::clamped(tension, bias).unwrap_or(EasingHandle::DEFAULT);
            warn!("default handle ({tension}, {bias}) out of range; using {handle:?}");
            self.default_handle = handle;
        }
        self
    }
}

fn deserialize_valid_handle<'de, D>(deserializer: D) -> Result<EasingHandle, D::Error>
where
    D: Deserializer<'de>,
{
    let handle = EasingHandle::deserialize(deserializer)?;
    if !handle.is_valid() {
        return Err(de::Error::custom(format!(
            "default handle out of range: tension={}, bias={}",
            handle.tension, handle.bias
        )));
    }
    Ok(handle)
}

/// Newton-Raphson budget and output band for the curve solver.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SolverConfig {
    /// Upper bound on refinement steps when inverting X(u) = t.
    pub max_iterations: u32,
    /// Stop once |X(u) - t| drops below this.
    pub tolerance: f64,
    /// Abort refinement when |X'(u)| falls below this.
    pub min_slope: f64,
    /// Eased output is clamped to [output_min, output_max].
    pub output_min: f64,
    pub output_max: f64,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            max_iterations: 8,
            tolerance: 1e-4,
            min_slope: 1e-6,
            output_min: -0.5,
            output_max: 1.5,
        }
    }
}
