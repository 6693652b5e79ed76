use serde::{Deserialize, Serialize};

use crate::error::FlowError;

/// Order in which the relaxation sweep visits the pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RelaxationOrder {
    /// Row-major Gauss-Seidel, one pixel at a time.
    #[default]
    Sequential,
    /// Four interleaved phases of pixels that share no 8-neighbour, each updated in parallel.
    ///
    /// Converges like [`RelaxationOrder::Sequential`] but is not bitwise identical to it.
    Checkerboard,
}

/// Parameters of the pyramidal Horn-Schunck solver.
///
/// Missing fields take their default value when deserialized.
///
/// # Example
///
/// ```
/// use hsflow_flow::{HornSchunckConfig, RelaxationOrder};
///
/// let config = HornSchunckConfig {
///     alpha: 10.0,
///     relaxation: RelaxationOrder::Checkerboard,
///     ..Default::default()
/// };
///
/// assert!(config.validate().is_ok());
/// assert_eq!(config.n_warps, 5);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HornSchunckConfig {
    /// Weight of the smoothness term.
    pub alpha: f32,
    /// Number of warps (linearizations) per pyramid level.
    pub n_warps: usize,
    /// The relaxation stops once the RMS flow update falls to this value.
    pub stop_criterion: f32,
    /// Maximum number of relaxation sweeps per warp.
    pub max_iterations: usize,
    /// Requested number of pyramid levels, reduced to what the image size admits.
    pub n_scales: usize,
    /// Size ratio between consecutive pyramid levels.
    pub downsample_factor: f32,
    /// Smooth the finest level before building the pyramid.
    pub presmoothing: bool,
    /// Pixel visiting order of the relaxation sweep.
    pub relaxation: RelaxationOrder,
    /// Round the frames of every level to this many decimal digits before solving it.
    pub intensity_decimals: Option<u32>,
}

impl Default for HornSchunckConfig {
    fn default() -> Self {
        Self {
            alpha: 15.0,
            n_warps: 5,
            stop_criterion: 1e-4,
            max_iterations: 150,
            n_scales: 5,
            downsample_factor: 0.65,
            presmoothing: true,
            relaxation: RelaxationOrder::Sequential,
            intensity_decimals: None,
        }
    }
}

impl HornSchunckConfig {
    /// Check that every parameter is in range.
    ///
    /// # Errors
    ///
    /// Returns [`FlowError::InvalidConfig`] naming the first offending parameter.
    pub fn validate(&self) -> Result<(), FlowError> {
        if !(self.alpha.is_finite() && self.alpha >= 0.0) {
            return Err(FlowError::InvalidConfig(format!(
                "alpha must be finite and non-negative, got {}",
                self.alpha
            )));
        }
        if !(self.stop_criterion.is_finite() && self.stop_criterion >= 0.0) {
            return Err(FlowError::InvalidConfig(format!(
                "stop_criterion must be finite and non-negative, got {}",
                self.stop_criterion
            )));
        }
        if !(self.downsample_factor > 0.0 && self.downsample_factor < 1.0) {
            return Err(FlowError::InvalidConfig(format!(
                "downsample_factor must be in (0, 1), got {}",
                self.downsample_factor
            )));
        }
        if self.n_scales == 0 {
            return Err(FlowError::InvalidConfig(
                "n_scales must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults() {
        let config = HornSchunckConfig::default();
        assert_eq!(config.alpha, 15.0);
        assert_eq!(config.n_warps, 5);
        assert_eq!(config.stop_criterion, 1e-4);
        assert_eq!(config.max_iterations, 150);
        assert_eq!(config.n_scales, 5);
        assert_eq!(config.downsample_factor, 0.65);
        assert!(config.presmoothing);
        assert_eq!(config.relaxation, RelaxationOrder::Sequential);
        assert_eq!(config.intensity_decimals, None);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_partial_json() -> Result<(), serde_json::Error> {
        let config: HornSchunckConfig =
            serde_json::from_str(r#"{ "alpha": 30.0, "relaxation": "checkerboard" }"#)?;
        assert_eq!(config.alpha, 30.0);
        assert_eq!(config.relaxation, RelaxationOrder::Checkerboard);
        assert_eq!(config.n_scales, 5);

        let config: HornSchunckConfig = serde_json::from_str(r#"{ "intensity_decimals": 3 }"#)?;
        assert_eq!(config.intensity_decimals, Some(3));
        Ok(())
    }

    #[test]
    fn test_config_validate() {
        let bad_factor = HornSchunckConfig {
            downsample_factor: 1.0,
            ..Default::default()
        };
        assert!(matches!(
            bad_factor.validate(),
            Err(FlowError::InvalidConfig(_))
        ));

        let bad_alpha = HornSchunckConfig {
            alpha: f32::NAN,
            ..Default::default()
        };
        assert!(bad_alpha.validate().is_err());

        let no_scales = HornSchunckConfig {
            n_scales: 0,
            ..Default::default()
        };
        assert!(no_scales.validate().is_err());

        let negative_stop = HornSchunckConfig {
            stop_criterion: -1.0,
            ..Default::default()
        };
        assert!(negative_stop.validate().is_err());
    }
}
