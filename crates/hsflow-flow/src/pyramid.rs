use hsflow_image::{Image, ImageSize};
use hsflow_imgproc::{
    filter::gaussian_blur,
    normalize::normalize_min_max_joint,
    pyramid::{build_pyramid, max_pyramid_levels, pyramid_sizes},
};

use crate::{config::HornSchunckConfig, error::FlowError};

/// Sigma of the smoothing applied to the finest level.
pub const PRESMOOTHING_SIGMA: f32 = 0.8;

/// Window radius, in sigmas, of the smoothing applied to the finest level.
pub const PRESMOOTHING_RADIUS: usize = 5;

/// Both frames of a flow problem at one resolution.
#[derive(Debug, Clone)]
pub struct PyramidLevel {
    /// The level index, 0 being the finest.
    pub index: usize,
    /// The reference frame.
    pub frame1: Image<f32>,
    /// The target frame.
    pub frame2: Image<f32>,
}

impl PyramidLevel {
    /// Get the size of the frames of this level.
    pub fn size(&self) -> ImageSize {
        self.frame1.size()
    }
}

/// A pair of gaussian pyramids sharing their geometry, finest level first.
#[derive(Debug, Clone)]
pub struct FramePyramid {
    levels: Vec<PyramidLevel>,
}

impl FramePyramid {
    /// Build the pyramid of a frame pair.
    ///
    /// Both frames are normalized to `[0, 255]` over their joint range and, if
    /// `presmoothing` is set, blurred with sigma [`PRESMOOTHING_SIGMA`]. The
    /// number of levels is `min(n_scales, max_pyramid_levels)`, further cut
    /// before the first level where a side would round down to zero.
    ///
    /// # Errors
    ///
    /// Returns an error if the frames differ in size or are empty.
    pub fn build(
        frame1: &Image<f32>,
        frame2: &Image<f32>,
        config: &HornSchunckConfig,
    ) -> Result<Self, FlowError> {
        let size = frame1.size();
        if frame2.size() != size {
            return Err(FlowError::FrameSizeMismatch(size, frame2.size()));
        }
        if frame1.is_empty() {
            return Err(FlowError::EmptyFrame(size));
        }

        let factor = config.downsample_factor;
        let requested = config.n_scales.min(max_pyramid_levels(size, factor));
        let n_levels = pyramid_sizes(size, requested, factor)
            .iter()
            .take_while(|level| level.area() > 0)
            .count();
        if n_levels < requested {
            log::debug!("{size} collapses after {n_levels} levels at factor {factor}");
        }

        let mut norm1 = Image::from_size_val(size, 0.0)?;
        let mut norm2 = Image::from_size_val(size, 0.0)?;
        normalize_min_max_joint(frame1, frame2, &mut norm1, &mut norm2, 0.0, 255.0)?;

        let (base1, base2) = if config.presmoothing {
            let mut smooth1 = Image::from_size_val(size, 0.0)?;
            let mut smooth2 = Image::from_size_val(size, 0.0)?;
            gaussian_blur(&norm1, &mut smooth1, PRESMOOTHING_RADIUS, PRESMOOTHING_SIGMA)?;
            gaussian_blur(&norm2, &mut smooth2, PRESMOOTHING_RADIUS, PRESMOOTHING_SIGMA)?;
            (smooth1, smooth2)
        } else {
            (norm1, norm2)
        };

        let pyramid1 = build_pyramid(&base1, n_levels, factor)?;
        let pyramid2 = build_pyramid(&base2, n_levels, factor)?;

        let levels = pyramid1
            .into_iter()
            .zip(pyramid2)
            .enumerate()
            .map(|(index, (mut frame1, mut frame2))| {
                if let Some(decimals) = config.intensity_decimals {
                    round_intensities(&mut frame1, decimals);
                    round_intensities(&mut frame2, decimals);
                }
                PyramidLevel {
                    index,
                    frame1,
                    frame2,
                }
            })
            .collect::<Vec<_>>();

        log::debug!(
            "built {} pyramid levels from {} (factor {})",
            levels.len(),
            size,
            factor
        );

        Ok(Self { levels })
    }

    /// Get the levels, finest first.
    pub fn levels(&self) -> &[PyramidLevel] {
        &self.levels
    }

    /// Get the number of levels.
    pub fn len(&self) -> usize {
        self.levels.len()
    }

    /// Whether the pyramid has no level.
    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }
}

/// Round every pixel to `decimals` decimal digits, half away from zero.
pub fn round_intensities(image: &mut Image<f32>, decimals: u32) {
    let scale = 10f64.powi(decimals as i32);
    image
        .as_slice_mut()
        .iter_mut()
        .for_each(|p| *p = ((*p as f64 * scale).round() / scale) as f32);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ramp(size: ImageSize, offset: f32) -> Image<f32> {
        Image::from_fn(size, |x, y| x as f32 + 2.0 * y as f32 + offset)
    }

    #[test]
    fn test_pyramid_levels_clamped() -> Result<(), FlowError> {
        let frame = ramp([80, 64].into(), 0.0);
        let config = HornSchunckConfig {
            n_scales: 12,
            ..Default::default()
        };
        let pyramid = FramePyramid::build(&frame, &frame, &config)?;
        assert_eq!(pyramid.len(), 5);

        let sizes = pyramid.levels().iter().map(|l| l.size()).collect::<Vec<_>>();
        assert_eq!(sizes[0], [80, 64].into());
        assert_eq!(sizes[1], [52, 42].into());
        assert_eq!(sizes[4], [14, 12].into());
        for (i, level) in pyramid.levels().iter().enumerate() {
            assert_eq!(level.index, i);
            assert_eq!(level.frame2.size(), level.size());
        }
        Ok(())
    }

    #[test]
    fn test_pyramid_thin_frame() -> Result<(), FlowError> {
        let frame = ramp([400, 2].into(), 0.0);
        let config = HornSchunckConfig {
            downsample_factor: 0.3,
            n_scales: 10,
            ..Default::default()
        };
        let pyramid = FramePyramid::build(&frame, &frame, &config)?;

        let sizes = pyramid.levels().iter().map(|l| l.size()).collect::<Vec<_>>();
        assert_eq!(sizes, vec![[400, 2].into(), [120, 1].into()]);
        Ok(())
    }

    #[test]
    fn test_pyramid_normalized_finest_level() -> Result<(), FlowError> {
        let frame1 = ramp([20, 20].into(), 100.0);
        let frame2 = ramp([20, 20].into(), 110.0);
        let config = HornSchunckConfig {
            presmoothing: false,
            n_scales: 1,
            ..Default::default()
        };
        let pyramid = FramePyramid::build(&frame1, &frame2, &config)?;
        let level = &pyramid.levels()[0];

        // joint range is [100, 167]
        let scale = 255.0 / 67.0;
        approx::assert_relative_eq!(level.frame1.get_pixel(0, 0)?, 0.0);
        approx::assert_relative_eq!(level.frame2.get_pixel(19, 19)?, 255.0, epsilon = 1e-3);
        approx::assert_relative_eq!(
            level.frame2.get_pixel(0, 0)?,
            10.0 * scale,
            epsilon = 1e-3
        );
        Ok(())
    }

    #[test]
    fn test_pyramid_rejects_bad_frames() -> Result<(), FlowError> {
        let config = HornSchunckConfig::default();
        let frame1 = ramp([10, 10].into(), 0.0);
        let frame2 = ramp([10, 9].into(), 0.0);
        assert!(matches!(
            FramePyramid::build(&frame1, &frame2, &config),
            Err(FlowError::FrameSizeMismatch(_, _))
        ));

        let empty = Image::<f32>::from_fn([0, 0].into(), |_, _| 0.0);
        assert_eq!(
            FramePyramid::build(&empty, &empty, &config).err(),
            Some(FlowError::EmptyFrame([0, 0].into()))
        );
        Ok(())
    }

    #[test]
    fn test_round_intensities() -> Result<(), FlowError> {
        let mut image = Image::new([3, 1].into(), vec![1.23456f32, -0.5, 254.99996])?;
        round_intensities(&mut image, 2);
        approx::assert_relative_eq!(image.get_pixel(0, 0)?, 1.23, epsilon = 1e-6);
        approx::assert_relative_eq!(image.get_pixel(1, 0)?, -0.5, epsilon = 1e-6);
        approx::assert_relative_eq!(image.get_pixel(2, 0)?, 255.0, epsilon = 1e-4);
        Ok(())
    }

    #[test]
    fn test_pyramid_rounds_levels() -> Result<(), FlowError> {
        let frame1 = Image::from_fn([16, 16].into(), |x, y| ((x * 7 + y * 3) % 11) as f32);
        let frame2 = Image::from_fn([16, 16].into(), |x, y| ((x * 5 + y * 2) % 13) as f32);
        let config = HornSchunckConfig {
            intensity_decimals: Some(0),
            n_scales: 1,
            ..Default::default()
        };
        let pyramid = FramePyramid::build(&frame1, &frame2, &config)?;
        for level in pyramid.levels() {
            for &p in level.frame1.as_slice().iter().chain(level.frame2.as_slice()) {
                assert_eq!(p, p.round());
            }
        }
        Ok(())
    }
}
