use derive_more::From;
use zarrs_multiscale_metadata::AxisVocabulary;

use crate::MultiscaleError;

/// The downsampling factors of one resolution level transition.
///
/// ```rust
/// # use zarrs_multiscale::ScaleFactor;
/// let uniform = ScaleFactor::from(2);
/// let anisotropic = ScaleFactor::from(vec![("x".to_string(), 2), ("y".to_string(), 4)]);
/// # assert_eq!(uniform, ScaleFactor::Uniform(2));
/// # assert!(matches!(anisotropic, ScaleFactor::PerAxis(_)));
/// ```
#[derive(Clone, PartialEq, Eq, Debug, From)]
pub enum ScaleFactor {
    /// A factor applied to every spatial axis.
    ///
    /// Time, channel and other non-spatial axes are never downsampled.
    Uniform(usize),
    /// A factor per named axis. Axes that are not named use a factor of `1`.
    PerAxis(Vec<(String, usize)>),
}

impl ScaleFactor {
    /// Create a per-axis scale factor.
    #[must_use]
    pub fn per_axis<A: Into<String>>(factors: impl IntoIterator<Item = (A, usize)>) -> Self {
        Self::PerAxis(
            factors
                .into_iter()
                .map(|(axis, factor)| (axis.into(), factor))
                .collect(),
        )
    }

    /// Resolve the factor of each dimension of an image with dimension labels `dims`.
    ///
    /// `index` identifies the transition in error messages.
    ///
    /// # Errors
    /// Returns
    ///  - [`MultiscaleError::UnknownAxis`] if a per-axis factor names an axis that is not in `dims`, or
    ///  - [`MultiscaleError::ZeroScaleFactor`] if an applied factor is zero.
    pub fn resolve(
        &self,
        index: usize,
        dims: &[String],
        vocabulary: &AxisVocabulary,
    ) -> Result<Vec<usize>, MultiscaleError> {
        match self {
            Self::Uniform(factor) => dims
                .iter()
                .map(|dim| {
                    if !vocabulary.is_spatial(dim) {
                        Ok(1)
                    } else if *factor == 0 {
                        Err(MultiscaleError::ZeroScaleFactor {
                            index,
                            axis: dim.clone(),
                        })
                    } else {
                        Ok(*factor)
                    }
                })
                .collect(),
            Self::PerAxis(factors) => {
                let mut resolved = vec![1; dims.len()];
                for (axis, factor) in factors {
                    let dim_index = dims
                        .iter()
                        .position(|dim| dim == axis)
                        .ok_or_else(|| MultiscaleError::UnknownAxis(axis.clone()))?;
                    if *factor == 0 {
                        return Err(MultiscaleError::ZeroScaleFactor {
                            index,
                            axis: axis.clone(),
                        });
                    }
                    resolved[dim_index] = *factor;
                }
                Ok(resolved)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dims(labels: &[&str]) -> Vec<String> {
        labels.iter().map(ToString::to_string).collect()
    }

    #[test]
    fn scale_factor_uniform() {
        let vocabulary = AxisVocabulary::default();
        let factors = ScaleFactor::Uniform(2)
            .resolve(0, &dims(&["t", "c", "z", "y", "x"]), &vocabulary)
            .unwrap();
        assert_eq!(factors, vec![1, 1, 2, 2, 2]);

        let factors = ScaleFactor::Uniform(3)
            .resolve(0, &dims(&["angle", "y"]), &vocabulary)
            .unwrap();
        assert_eq!(factors, vec![1, 3]);
    }

    #[test]
    fn scale_factor_per_axis() {
        let vocabulary = AxisVocabulary::default();
        let factors = ScaleFactor::per_axis([("x", 2), ("y", 4)])
            .resolve(0, &dims(&["c", "y", "x"]), &vocabulary)
            .unwrap();
        assert_eq!(factors, vec![1, 4, 2]);

        let factors = ScaleFactor::per_axis([("c", 2)])
            .resolve(0, &dims(&["c", "y", "x"]), &vocabulary)
            .unwrap();
        assert_eq!(factors, vec![2, 1, 1]);
    }

    #[test]
    fn scale_factor_invalid() {
        let vocabulary = AxisVocabulary::default();
        let dims = dims(&["y", "x"]);
        assert!(matches!(
            ScaleFactor::per_axis([("z", 2)]).resolve(0, &dims, &vocabulary),
            Err(MultiscaleError::UnknownAxis(axis)) if axis == "z"
        ));
        assert!(matches!(
            ScaleFactor::per_axis([("x", 0)]).resolve(3, &dims, &vocabulary),
            Err(MultiscaleError::ZeroScaleFactor { index: 3, .. })
        ));
        assert!(matches!(
            ScaleFactor::Uniform(0).resolve(1, &dims, &vocabulary),
            Err(MultiscaleError::ZeroScaleFactor { index: 1, .. })
        ));
    }
}
