use hsflow_image::{Image, ImageSize};
use hsflow_imgproc::resize;

use crate::error::FlowError;

/// A dense displacement field.
///
/// `u` holds the horizontal and `v` the vertical displacement of every pixel,
/// in pixels of the grid the field belongs to. Both components always share one size.
#[derive(Clone, Debug, PartialEq)]
pub struct FlowField {
    u: Image<f32>,
    v: Image<f32>,
}

impl FlowField {
    /// Create a zero flow field.
    ///
    /// # Example
    ///
    /// ```
    /// use hsflow_flow::FlowField;
    ///
    /// let flow = FlowField::new([4, 3].into()).unwrap();
    ///
    /// assert_eq!(flow.width(), 4);
    /// assert!(flow.u().as_slice().iter().all(|&v| v == 0.0));
    /// ```
    pub fn new(size: ImageSize) -> Result<Self, FlowError> {
        Ok(Self {
            u: Image::from_size_val(size, 0.0)?,
            v: Image::from_size_val(size, 0.0)?,
        })
    }

    /// Create a flow field from its two components.
    ///
    /// # Errors
    ///
    /// Returns an error if `u` and `v` differ in size.
    pub fn from_components(u: Image<f32>, v: Image<f32>) -> Result<Self, FlowError> {
        if u.size() != v.size() {
            return Err(FlowError::FlowSizeMismatch(v.size(), u.size()));
        }
        Ok(Self { u, v })
    }

    /// Get the size of the field.
    pub fn size(&self) -> ImageSize {
        self.u.size()
    }

    /// Get the width of the field.
    pub fn width(&self) -> usize {
        self.u.width()
    }

    /// Get the height of the field.
    pub fn height(&self) -> usize {
        self.u.height()
    }

    /// The horizontal component.
    pub fn u(&self) -> &Image<f32> {
        &self.u
    }

    /// The vertical component.
    pub fn v(&self) -> &Image<f32> {
        &self.v
    }

    /// Mutable access to both components at once.
    pub fn components_mut(&mut self) -> (&mut Image<f32>, &mut Image<f32>) {
        (&mut self.u, &mut self.v)
    }

    /// Get the displacement vector at column `x` and row `y`.
    pub fn vector_at(&self, x: usize, y: usize) -> Result<(f32, f32), FlowError> {
        Ok((self.u.get_pixel(x, y)?, self.v.get_pixel(x, y)?))
    }

    /// Get the length of the displacement vector at column `x` and row `y`.
    pub fn magnitude_at(&self, x: usize, y: usize) -> Result<f32, FlowError> {
        let (u, v) = self.vector_at(x, y)?;
        Ok(u.hypot(v))
    }

    /// Multiply both components by `factor` in place.
    pub fn scale(&mut self, factor: f32) {
        self.u.as_slice_mut().iter_mut().for_each(|p| *p *= factor);
        self.v.as_slice_mut().iter_mut().for_each(|p| *p *= factor);
    }

    /// Resample both components onto a grid of `size` with bicubic interpolation.
    ///
    /// The vector values are not rescaled; combine with [`FlowField::scale`] to
    /// express them in the units of the new grid.
    pub fn upsample(&self, size: ImageSize) -> Result<Self, FlowError> {
        Ok(Self {
            u: resize::upsample(&self.u, size)?,
            v: resize::upsample(&self.v, size)?,
        })
    }
}
