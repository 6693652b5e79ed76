use num_traits::Float;

/// Catmull-Rom cubic interpolation between `p[1]` and `p[2]`.
///
/// `t` is the fractional position in `[0, 1]`; the curve passes through `p[1]`
/// at `t = 0` and through `p[2]` at `t = 1`.
///
/// # Example
///
/// ```
/// use hsflow_imgproc::interpolation::cubic_1d;
///
/// assert_eq!(cubic_1d(&[1.0f64, 2.0, 3.0, 4.0], 0.5), 2.5);
/// ```
pub fn cubic_1d<T: Float>(p: &[T; 4], t: T) -> T {
    let two = T::one() + T::one();
    let half = two.recip();
    let three = two + T::one();
    let four = two + two;
    let five = four + T::one();

    p[1] + half
        * t
        * (p[2] - p[0]
            + t * (two * p[0] - five * p[1] + four * p[2] - p[3]
                + t * (three * (p[1] - p[2]) + p[3] - p[0])))
}

/// Bicubic interpolation over a 4x4 neighbourhood.
///
/// `k[i]` holds the four samples of the `i`-th column of the neighbourhood
/// (top to bottom). Each column is interpolated at `ty` and the four results
/// are interpolated at `tx`. No boundary handling happens here.
pub fn bicubic<T: Float>(k: &[[T; 4]; 4], tx: T, ty: T) -> T {
    let cols = [
        cubic_1d(&k[0], ty),
        cubic_1d(&k[1], ty),
        cubic_1d(&k[2], ty),
        cubic_1d(&k[3], ty),
    ];
    cubic_1d(&cols, tx)
}
