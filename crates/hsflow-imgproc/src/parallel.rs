use rayon::prelude::*;

use hsflow_image::Image;

/// Fill every row of an image in parallel.
///
/// The closure receives the row index and the mutable row slice.
pub fn par_iter_rows_indexed<T>(dst: &mut Image<T>, f: impl Fn(usize, &mut [T]) + Send + Sync)
where
    T: Send,
{
    let cols = dst.cols();
    if cols == 0 {
        return;
    }

    dst.as_slice_mut()
        .par_chunks_exact_mut(cols)
        .enumerate()
        .for_each(|(row, dst_row)| f(row, dst_row));
}

/// Apply a function to each pixel of the source image in parallel, writing into `dst`.
///
/// PRECONDITION: `src` and `dst` must have the same size.
pub fn par_iter_rows_val<T1, T2>(
    src: &Image<T1>,
    dst: &mut Image<T2>,
    f: impl Fn(&T1, &mut T2) + Send + Sync,
) where
    T1: Sync,
    T2: Send,
{
    let cols = src.cols();
    if cols == 0 {
        return;
    }

    src.as_slice()
        .par_chunks_exact(cols)
        .zip(dst.as_slice_mut().par_chunks_exact_mut(cols))
        .for_each(|(src_chunk, dst_chunk)| {
            src_chunk
                .iter()
                .zip(dst_chunk.iter_mut())
                .for_each(|(src_pixel, dst_pixel)| f(src_pixel, dst_pixel));
        });
}

#[cfg(test)]
mod tests {
    use super::*;
    use hsflow_image::ImageError;

    #[test]
    fn rows_indexed() -> Result<(), ImageError> {
        let mut image = Image::from_size_val([3, 2].into(), 0usize)?;
        par_iter_rows_indexed(&mut image, |row, dst| {
            dst.iter_mut().enumerate().for_each(|(col, v)| *v = row * 10 + col);
        });
        assert_eq!(image.as_slice(), &[0, 1, 2, 10, 11, 12]);
        Ok(())
    }

    #[test]
    fn rows_val() -> Result<(), ImageError> {
        let src = Image::new([2, 2].into(), vec![1.0f32, 2.0, 3.0, 4.0])?;
        let mut dst = Image::from_size_val(src.size(), 0.0f32)?;
        par_iter_rows_val(&src, &mut dst, |s, d| *d = s * 2.0);
        assert_eq!(dst.as_slice(), &[2.0, 4.0, 6.0, 8.0]);
        Ok(())
    }
}
