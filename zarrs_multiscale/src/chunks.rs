use derive_more::From;
use zarrs::array::ArrayShape;
use zarrs_multiscale_metadata::AxisVocabulary;

use crate::{MultiscaleError, config::Config};

/// The chunking of every resolution level when it is stored.
#[derive(Clone, PartialEq, Eq, Debug, From)]
pub enum Chunks {
    /// The same chunk extent along every axis.
    Uniform(u64),
    /// A chunk extent per named axis. Axes that are not named are not chunked.
    PerAxis(Vec<(String, u64)>),
    /// A chunk extent per axis, in dimension order.
    Shape(ArrayShape),
}

/// The chunk extent of each axis, resolved once from the dimension labels of the full resolution image.
///
/// [`None`] means the full extent of the axis.
#[derive(Clone, PartialEq, Eq, Debug)]
pub(crate) struct ResolvedChunks(Vec<Option<u64>>);

impl Chunks {
    /// Create per-axis chunks.
    #[must_use]
    pub fn per_axis<A: Into<String>>(chunks: impl IntoIterator<Item = (A, u64)>) -> Self {
        Self::PerAxis(
            chunks
                .into_iter()
                .map(|(axis, chunk)| (axis.into(), chunk))
                .collect(),
        )
    }

    pub(crate) fn resolve(&self, dims: &[String]) -> Result<ResolvedChunks, MultiscaleError> {
        match self {
            Self::Uniform(0) => Err(MultiscaleError::InvalidChunks(
                "chunk extents must be non-zero".to_string(),
            )),
            Self::Uniform(extent) => Ok(ResolvedChunks(vec![Some(*extent); dims.len()])),
            Self::PerAxis(chunks) => {
                let mut resolved = vec![None; dims.len()];
                for (axis, extent) in chunks {
                    let dim_index = dims
                        .iter()
                        .position(|dim| dim == axis)
                        .ok_or_else(|| MultiscaleError::UnknownAxis(axis.clone()))?;
                    if *extent == 0 {
                        return Err(MultiscaleError::InvalidChunks(format!(
                            "chunk extent of axis `{axis}` must be non-zero"
                        )));
                    }
                    resolved[dim_index] = Some(*extent);
                }
                Ok(ResolvedChunks(resolved))
            }
            Self::Shape(shape) => {
                if shape.len() != dims.len() {
                    Err(MultiscaleError::InvalidChunks(format!(
                        "chunk shape {shape:?} does not have an element per dimension of {dims:?}"
                    )))
                } else if shape.contains(&0) {
                    Err(MultiscaleError::InvalidChunks(format!(
                        "chunk shape {shape:?} must be non-zero"
                    )))
                } else {
                    Ok(ResolvedChunks(shape.iter().copied().map(Some).collect()))
                }
            }
        }
    }
}

impl ResolvedChunks {
    /// The default chunking of an image with dimension labels `dims`.
    ///
    /// Every axis gets the volumetric extent if the depth axis is present and the planar extent otherwise.
    /// The time axis gets the time extent.
    pub(crate) fn default_for(dims: &[String], vocabulary: &AxisVocabulary, config: &Config) -> Self {
        let extent = if dims.iter().any(|dim| vocabulary.is_depth(dim)) {
            config.default_chunk_extent_volumetric()
        } else {
            config.default_chunk_extent_planar()
        };
        Self(
            dims.iter()
                .map(|dim| {
                    if vocabulary.is_time(dim) {
                        Some(config.default_chunk_extent_time())
                    } else {
                        Some(extent)
                    }
                })
                .collect(),
        )
    }

    /// The chunk shape of a level with `shape`, clamped to `[1, extent]` along each axis.
    pub(crate) fn chunk_shape(&self, shape: &[usize]) -> ArrayShape {
        self.0
            .iter()
            .zip(shape)
            .map(|(chunk, &len)| {
                let len = len as u64;
                chunk.map_or(len, |chunk| chunk.min(len)).max(1)
            })
            .collect()
    }
}
