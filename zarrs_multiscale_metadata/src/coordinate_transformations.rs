//! Coordinate transformations of a multiscale dataset.
//!
//! See <https://ngff.openmicroscopy.org/0.4/#trafo-md>.

use serde::{Deserialize, Serialize};

/// A coordinate transformation mapping array indices to physical coordinates.
///
/// For example:
/// ```json
/// {"type": "scale", "scale": [2.0, 2.0]}
/// ```
#[derive(Serialize, Deserialize, Clone, PartialEq, Debug)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum CoordinateTransformation {
    /// A per-axis scale.
    Scale {
        /// The scale of each axis.
        scale: Vec<f64>,
    },
    /// A per-axis translation.
    Translation {
        /// The translation of each axis.
        translation: Vec<f64>,
    },
}

impl CoordinateTransformation {
    /// The per-axis values of the transformation.
    #[must_use]
    pub fn values(&self) -> &[f64] {
        match self {
            Self::Scale { scale } => scale,
            Self::Translation { translation } => translation,
        }
    }
}

/// Derive the per-axis `scale` and `translation` of a dataset from its coordinates.
///
/// `coordinates` holds the coordinate values of each dimension, in dimension order.
///  - The scale of an axis is the difference between its first two coordinates, or `1.0` if there are fewer than two.
///  - The translation of an axis is its first coordinate, or `0.0` if there are none.
///
/// Coordinates are assumed to be uniformly spaced.
/// Only the first interval is inspected, so the scale of a non-uniformly spaced axis reflects its first interval only.
#[must_use]
pub fn coordinate_transformations<'a>(
    coordinates: impl IntoIterator<Item = &'a [f64]>,
) -> (Vec<f64>, Vec<f64>) {
    coordinates
        .into_iter()
        .map(|values| {
            let scale = match values {
                [first, second, ..] => second - first,
                _ => 1.0,
            };
            let translation = values.first().copied().unwrap_or(0.0);
            (scale, translation)
        })
        .unzip()
}
