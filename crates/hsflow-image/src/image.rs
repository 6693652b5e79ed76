use crate::error::ImageError;

/// Image size in pixels
///
/// A struct to represent the size of an image in pixels.
///
/// # Examples
///
/// ```
/// use hsflow_image::ImageSize;
///
/// let image_size = ImageSize {
///   width: 10,
///   height: 20,
/// };
///
/// assert_eq!(image_size.width, 10);
/// assert_eq!(image_size.height, 20);
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ImageSize {
    /// Width of the image in pixels
    pub width: usize,
    /// Height of the image in pixels
    pub height: usize,
}

impl ImageSize {
    /// Total number of pixels.
    pub fn area(&self) -> usize {
        self.width * self.height
    }

    /// Length of the image diagonal in pixels.
    pub fn diagonal(&self) -> f32 {
        (self.width as f32).hypot(self.height as f32)
    }
}

impl std::fmt::Display for ImageSize {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(
            f,
            "ImageSize {{ width: {}, height: {} }}",
            self.width, self.height
        )
    }
}

impl From<[usize; 2]> for ImageSize {
    fn from(size: [usize; 2]) -> Self {
        ImageSize {
            width: size[0],
            height: size[1],
        }
    }
}

/// Represents a single-channel image with pixel data stored in row-major order.
///
/// The pixel at column `x` and row `y` lives at index `y * width + x`.
#[derive(Clone, Debug, PartialEq)]
pub struct Image<T> {
    size: ImageSize,
    data: Vec<T>,
}

impl<T> Image<T> {
    /// Create a new image from pixel data.
    ///
    /// # Arguments
    ///
    /// * `size` - The size of the image in pixels.
    /// * `data` - The pixel data of the image in row-major order.
    ///
    /// # Errors
    ///
    /// If the length of the pixel data does not match the image size, an error is returned.
    ///
    /// # Examples
    ///
    /// ```
    /// use hsflow_image::{Image, ImageSize};
    ///
    /// let image = Image::<f32>::new(
    ///    ImageSize {
    ///       width: 10,
    ///       height: 20,
    ///    },
    ///    vec![0f32; 10 * 20],
    /// ).unwrap();
    ///
    /// assert_eq!(image.width(), 10);
    /// assert_eq!(image.height(), 20);
    /// ```
    pub fn new(size: ImageSize, data: Vec<T>) -> Result<Self, ImageError> {
        if data.len() != size.area() {
            return Err(ImageError::InvalidDataLength(data.len(), size.area()));
        }

        Ok(Self { size, data })
    }

    /// Create a new image with the given size and a constant pixel value.
    ///
    /// # Examples
    ///
    /// ```
    /// use hsflow_image::{Image, ImageSize};
    ///
    /// let image = Image::from_size_val([4, 3].into(), 1.5f32).unwrap();
    ///
    /// assert_eq!(image.size(), ImageSize { width: 4, height: 3 });
    /// assert!(image.as_slice().iter().all(|&v| v == 1.5));
    /// ```
    pub fn from_size_val(size: ImageSize, val: T) -> Result<Self, ImageError>
    where
        T: Clone,
    {
        Self::new(size, vec![val; size.area()])
    }

    /// Create a new image by evaluating `f(x, y)` at every pixel.
    ///
    /// # Examples
    ///
    /// ```
    /// use hsflow_image::Image;
    ///
    /// let image = Image::from_fn([3, 2].into(), |x, y| (x + 10 * y) as f32);
    ///
    /// assert_eq!(image.get_pixel(2, 1).unwrap(), 12.0);
    /// ```
    pub fn from_fn(size: ImageSize, mut f: impl FnMut(usize, usize) -> T) -> Self {
        let mut data = Vec::with_capacity(size.area());
        for y in 0..size.height {
            for x in 0..size.width {
                data.push(f(x, y));
            }
        }
        Self { size, data }
    }

    /// Get the size of the image in pixels.
    pub fn size(&self) -> ImageSize {
        self.size
    }

    /// Get the width of the image in pixels.
    pub fn width(&self) -> usize {
        self.size.width
    }

    /// Get the height of the image in pixels.
    pub fn height(&self) -> usize {
        self.size.height
    }

    /// Get the number of columns of the image.
    pub fn cols(&self) -> usize {
        self.size.width
    }

    /// Get the number of rows of the image.
    pub fn rows(&self) -> usize {
        self.size.height
    }

    /// Whether the image holds no pixels.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Get the pixel data as a row-major slice.
    pub fn as_slice(&self) -> &[T] {
        &self.data
    }

    /// Get the pixel data as a mutable row-major slice.
    pub fn as_slice_mut(&mut self) -> &mut [T] {
        &mut self.data
    }

    /// Consume the image and return its pixel data.
    pub fn into_vec(self) -> Vec<T> {
        self.data
    }

    /// Get a reference to the pixel at `[row, col]`, or `None` when out of bounds.
    pub fn get(&self, index: [usize; 2]) -> Option<&T> {
        let [row, col] = index;
        if row >= self.rows() || col >= self.cols() {
            return None;
        }
        self.data.get(row * self.cols() + col)
    }

    /// Get the value of the pixel at column `x` and row `y`.
    ///
    /// # Errors
    ///
    /// If the pixel is out of bounds, an error is returned.
    pub fn get_pixel(&self, x: usize, y: usize) -> Result<T, ImageError>
    where
        T: Copy,
    {
        self.get([y, x]).copied().ok_or(ImageError::PixelIndexOutOfBounds(
            x,
            y,
            self.width(),
            self.height(),
        ))
    }

    /// Set the value of the pixel at column `x` and row `y`.
    ///
    /// # Errors
    ///
    /// If the pixel is out of bounds, an error is returned.
    pub fn set_pixel(&mut self, x: usize, y: usize, val: T) -> Result<(), ImageError> {
        if x >= self.width() || y >= self.height() {
            return Err(ImageError::PixelIndexOutOfBounds(
                x,
                y,
                self.width(),
                self.height(),
            ));
        }
        let cols = self.cols();
        self.data[y * cols + x] = val;
        Ok(())
    }

    /// Apply `f` to every pixel, producing a new image of the same size.
    pub fn map<U>(&self, f: impl FnMut(&T) -> U) -> Image<U> {
        Image {
            size: self.size,
            data: self.data.iter().map(f).collect(),
        }
    }

    /// Cast the pixel data of the image to a different type.
    ///
    /// # Errors
    ///
    /// If a pixel value cannot be represented in the target type, an error is returned.
    pub fn cast<U>(&self) -> Result<Image<U>, ImageError>
    where
        T: num_traits::NumCast + Copy,
        U: num_traits::NumCast,
    {
        let data = self
            .data
            .iter()
            .map(|&x| U::from(x).ok_or(ImageError::CastError))
            .collect::<Result<Vec<U>, ImageError>>()?;

        Image::new(self.size, data)
    }
}
