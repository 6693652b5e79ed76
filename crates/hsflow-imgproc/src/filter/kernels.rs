/// Create the non-negative half of a symmetric gaussian kernel.
///
/// The kernel has `floor(radius * sigma) + 1` taps: `kernel[0]` is the centre
/// weight and `kernel[i]` the weight applied at offsets `±i`. The weights are
/// normalized so that the full mirrored kernel sums to one. A non-positive or
/// non-finite sigma yields the identity kernel `[1.0]`.
///
/// # Arguments
///
/// * `radius` - The window radius in units of sigma.
/// * `sigma` - The sigma of the gaussian kernel.
///
/// # Returns
///
/// A vector with the half kernel.
pub fn gaussian_kernel_half(radius: usize, sigma: f64) -> Vec<f64> {
    if !(sigma.is_finite() && sigma > 0.0) {
        return vec![1.0];
    }

    let size = (radius as f64 * sigma) as usize + 1;
    let sigma_sq = sigma * sigma;
    let constant = sigma * (2.0 * std::f64::consts::PI).sqrt();

    let mut kernel = (0..size)
        .map(|i| {
            let x = i as f64;
            (-(x * x) / (2.0 * sigma_sq)).exp() / constant
        })
        .collect::<Vec<_>>();

    // the centre tap is counted once, every other tap twice
    let norm = 2.0 * kernel.iter().sum::<f64>() - kernel[0];
    kernel.iter_mut().for_each(|k| *k /= norm);
    kernel
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_gaussian_kernel_half_size() {
        assert_eq!(gaussian_kernel_half(5, 0.8).len(), 5);
        assert_eq!(gaussian_kernel_half(5, 1.0).len(), 6);
        assert_eq!(gaussian_kernel_half(5, 0.0), vec![1.0]);
    }

    #[test]
    fn test_gaussian_kernel_half_normalized() {
        let kernel = gaussian_kernel_half(5, 0.8);
        let total = 2.0 * kernel.iter().sum::<f64>() - kernel[0];
        assert_relative_eq!(total, 1.0, epsilon = 1e-12);
        assert!(kernel.windows(2).all(|w| w[0] > w[1]));
    }
}
