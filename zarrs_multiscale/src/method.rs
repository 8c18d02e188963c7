//! Aggregation methods that reduce one resolution level to the next.

use std::str::FromStr;

use derive_more::Display;
use ndarray::{ArrayD, IxDyn, Zip};

use crate::{Coordinate, ImageElement, MultiscaleError, SpatialImage};

/// The method used to reduce an image to the next resolution level.
#[non_exhaustive]
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default, Display)]
pub enum Methods {
    /// The mean of each non-overlapping window of `factor` elements along each axis.
    ///
    /// Incomplete windows on the trailing side of an axis are dropped, so the extent of an axis
    /// becomes `floor(extent / factor)`.
    #[default]
    #[display("block_mean")]
    BlockMean,
}

impl FromStr for Methods {
    type Err = MultiscaleError;

    /// Parse a method name.
    ///
    /// `block_mean` is also accepted under its `xarray.DataArray.coarsen` alias.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "block_mean" | "xarray.DataArray.coarsen" => Ok(Self::BlockMean),
            _ => Err(MultiscaleError::UnsupportedMethod(s.to_string())),
        }
    }
}

/// How coordinate values are coarsened along a downsampled axis.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default, Display)]
pub enum CoordinateAlignment {
    /// Keep the first coordinate of each window.
    ///
    /// The translation of every level equals the translation of the full resolution image.
    #[default]
    #[display("leading")]
    Leading,
    /// Use the mean coordinate of each window, the centre of the aggregated samples.
    ///
    /// The translation of a level moves by half of the spacing times `factor - 1`.
    #[display("centre")]
    Centre,
}

impl CoordinateAlignment {
    /// Coarsen `values` by `factor`, dropping an incomplete trailing window.
    #[must_use]
    pub fn coarsen(self, values: &[f64], factor: usize) -> Vec<f64> {
        if factor <= 1 {
            return values.to_vec();
        }
        match self {
            Self::Leading => values
                .chunks_exact(factor)
                .map(|window| window[0])
                .collect(),
            Self::Centre => {
                #[allow(clippy::cast_precision_loss)]
                let factor_f64 = factor as f64;
                values
                    .chunks_exact(factor)
                    .map(|window| window.iter().sum::<f64>() / factor_f64)
                    .collect()
            }
        }
    }
}

impl Methods {
    /// Reduce `image` by `factors`, one per dimension.
    ///
    /// The name, dimension labels, attributes and coordinate attributes of `image` are retained.
    ///
    /// # Errors
    /// Returns a [`MultiscaleError`] if the reduced image is inconsistent.
    pub(crate) fn downsample<T: ImageElement>(
        self,
        image: &SpatialImage<T>,
        factors: &[usize],
        alignment: CoordinateAlignment,
    ) -> Result<SpatialImage<T>, MultiscaleError> {
        let data = match self {
            Self::BlockMean => block_mean(image.data(), factors),
        };
        let coords = image
            .coords()
            .iter()
            .zip(factors)
            .map(|(coord, &factor)| {
                Coordinate::new(coord.name(), alignment.coarsen(coord.values(), factor))
                    .with_attributes(coord.attributes().clone())
            })
            .collect();
        Ok(SpatialImage::new_with_coordinates(image.name(), data, image.dims(), coords)?
            .with_attributes(image.attributes().clone()))
    }
}

/// The mean of each non-overlapping `factors` window of `data`, evaluated in parallel.
///
/// `factors` must be non-zero and have an element per dimension of `data`.
fn block_mean<T: ImageElement>(data: &ArrayD<T>, factors: &[usize]) -> ArrayD<T> {
    let shape: Vec<usize> = data
        .shape()
        .iter()
        .zip(factors)
        .map(|(&len, &factor)| len / factor)
        .collect();
    let mut reduced = ArrayD::<T>::zeros(IxDyn(&shape));
    Zip::from(&mut reduced)
        .and(data.exact_chunks(IxDyn(factors)))
        .par_for_each(|reduced, window| *reduced = window.mean().unwrap_or_else(T::zero));
    reduced
}

#[cfg(test)]
mod tests {
    use ndarray::{Array, ArrayD, IxDyn};

    use super::*;

    #[test]
    fn methods_from_str() {
        assert_eq!("block_mean".parse::<Methods>().unwrap(), Methods::BlockMean);
        assert_eq!(
            "xarray.DataArray.coarsen".parse::<Methods>().unwrap(),
            Methods::BlockMean
        );
        assert!(matches!(
            "itk.bin_shrink_image_filter".parse::<Methods>(),
            Err(MultiscaleError::UnsupportedMethod(name)) if name == "itk.bin_shrink_image_filter"
        ));
        assert_eq!(Methods::default().to_string(), "block_mean");
    }

    #[test]
    fn block_mean_trim() {
        // 0 1 2 3 4
        // 5 6 7 8 9
        // ...
        let data = Array::from_iter((0..25).map(f64::from))
            .into_shape_with_order(IxDyn(&[5, 5]))
            .unwrap();
        let reduced = block_mean(&data, &[2, 2]);
        assert_eq!(reduced.shape(), &[2, 2]);
        assert_eq!(reduced.as_slice().unwrap(), &[3.0, 5.0, 13.0, 15.0]);
    }

    #[test]
    fn block_mean_per_axis() {
        let data = ArrayD::<f32>::from_elem(IxDyn(&[3, 8, 6]), 2.0);
        let reduced = block_mean(&data, &[1, 4, 3]);
        assert_eq!(reduced.shape(), &[3, 2, 2]);
        assert!(reduced.iter().all(|&v| v == 2.0));

        let reduced = block_mean(&data, &[1, 16, 1]);
        assert_eq!(reduced.shape(), &[3, 0, 6]);
    }

    #[test]
    fn coordinate_alignment_coarsen() {
        let values = [0.0, 1.0, 2.0, 3.0, 4.0];
        assert_eq!(CoordinateAlignment::Leading.coarsen(&values, 2), vec![0.0, 2.0]);
        assert_eq!(CoordinateAlignment::Centre.coarsen(&values, 2), vec![0.5, 2.5]);
        assert_eq!(CoordinateAlignment::Centre.coarsen(&values, 1), values.to_vec());
        assert!(CoordinateAlignment::Leading.coarsen(&values, 8).is_empty());
    }

    #[test]
    fn methods_downsample() {
        let data = ArrayD::<f64>::from_elem(IxDyn(&[2, 4, 4]), 1.0);
        let mut image = SpatialImage::new("image", data, ["c", "y", "x"]).unwrap();
        image.set_unit("x", "units", "micrometer").unwrap();
        let reduced = Methods::BlockMean
            .downsample(&image, &[1, 2, 2], CoordinateAlignment::Leading)
            .unwrap();
        assert_eq!(reduced.name(), "image");
        assert_eq!(reduced.shape(), vec![2, 2, 2]);
        assert_eq!(reduced.coord("c").unwrap().values(), &[0.0, 1.0]);
        assert_eq!(reduced.coord("x").unwrap().values(), &[0.0, 2.0]);
        assert_eq!(reduced.coord("x").unwrap().attributes()["units"], "micrometer");
    }
}
