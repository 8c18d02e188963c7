//! Resolution pyramid construction.

use zarrs_multiscale_metadata::AxisVocabulary;

use crate::{
    Chunks, CoordinateAlignment, Dataset, ImageElement, Methods, MultiscaleError, ScaleFactor,
    SpatialImage,
    chunks::ResolvedChunks,
    config::global_config,
};

/// Options for [`to_multiscale_opt`](crate::to_multiscale_opt).
#[derive(Clone, Debug)]
pub struct ToMultiscaleOptions {
    name: String,
    method: Methods,
    chunks: Option<Chunks>,
    coordinate_alignment: CoordinateAlignment,
    axis_vocabulary: Option<AxisVocabulary>,
}

impl Default for ToMultiscaleOptions {
    fn default() -> Self {
        Self {
            name: crate::DEFAULT_MULTISCALE_NAME.to_string(),
            method: Methods::default(),
            chunks: None,
            coordinate_alignment: CoordinateAlignment::default(),
            axis_vocabulary: None,
        }
    }
}

impl ToMultiscaleOptions {
    /// Return the root name of the multiscale image. Defaults to `multiscales`.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Set the root name of the multiscale image.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Return the aggregation method.
    #[must_use]
    pub const fn method(&self) -> Methods {
        self.method
    }

    /// Set the aggregation method.
    #[must_use]
    pub const fn with_method(mut self, method: Methods) -> Self {
        self.method = method;
        self
    }

    /// Return the chunking of every level, if set.
    #[must_use]
    pub const fn chunks(&self) -> Option<&Chunks> {
        self.chunks.as_ref()
    }

    /// Set the chunking of every level.
    ///
    /// If [`None`], chunking is chosen from the dimension labels of the full resolution image, see [`Config`](crate::config::Config).
    #[must_use]
    pub fn with_chunks(mut self, chunks: Option<Chunks>) -> Self {
        self.chunks = chunks;
        self
    }

    /// Return the coordinate alignment.
    #[must_use]
    pub const fn coordinate_alignment(&self) -> CoordinateAlignment {
        self.coordinate_alignment
    }

    /// Set the coordinate alignment.
    #[must_use]
    pub const fn with_coordinate_alignment(
        mut self,
        coordinate_alignment: CoordinateAlignment,
    ) -> Self {
        self.coordinate_alignment = coordinate_alignment;
        self
    }

    /// Return the axis vocabulary, if set.
    #[must_use]
    pub const fn axis_vocabulary(&self) -> Option<&AxisVocabulary> {
        self.axis_vocabulary.as_ref()
    }

    /// Set the axis vocabulary.
    ///
    /// If [`None`], the vocabulary of the global [`Config`](crate::config::Config) is used.
    #[must_use]
    pub fn with_axis_vocabulary(mut self, axis_vocabulary: Option<AxisVocabulary>) -> Self {
        self.axis_vocabulary = axis_vocabulary;
        self
    }
}

/// Build the resolution levels of `image`.
///
/// Level 0 is `image` chunked, with identical values.
/// Level `i + 1` is level `i` reduced by `scale_factors[i]`, so factors compose across levels.
/// Each level is a single variable dataset named after `image`.
///
/// Every scale factor and the chunk specification are validated before any reduction.
///
/// # Errors
/// Returns a [`MultiscaleError`] if a scale factor or the chunk specification is invalid.
pub fn build<T: ImageElement>(
    image: &SpatialImage<T>,
    scale_factors: &[ScaleFactor],
    options: &ToMultiscaleOptions,
) -> Result<Vec<Dataset<T>>, MultiscaleError> {
    let dims = image.dims();
    let (factors, chunks) = {
        let config = global_config();
        let vocabulary = options
            .axis_vocabulary()
            .unwrap_or_else(|| config.axis_vocabulary());
        let factors = scale_factors
            .iter()
            .enumerate()
            .map(|(index, scale_factor)| scale_factor.resolve(index, dims, vocabulary))
            .collect::<Result<Vec<_>, _>>()?;
        let chunks = match options.chunks() {
            Some(chunks) => chunks.resolve(dims)?,
            None => ResolvedChunks::default_for(dims, vocabulary, &config),
        };
        (factors, chunks)
    };

    let mut level_0 = image.clone();
    level_0.set_chunks(Some(chunks.chunk_shape(image.data().shape())))?;
    log::debug!(
        "multiscale `{}` level 0: shape {:?}, chunks {:?}",
        image.name(),
        level_0.shape(),
        level_0.chunks()
    );
    let mut levels = Vec::with_capacity(factors.len() + 1);
    levels.push(Dataset::from(level_0));

    for (index, factors) in factors.iter().enumerate() {
        let previous = levels[index].first();
        let mut reduced = options.method().downsample(
            previous,
            factors,
            options.coordinate_alignment(),
        )?;
        reduced.set_chunks(Some(chunks.chunk_shape(reduced.data().shape())))?;
        log::debug!(
            "multiscale `{}` level {}: factors {factors:?}, shape {:?}, chunks {:?}",
            image.name(),
            index + 1,
            reduced.shape(),
            reduced.chunks()
        );
        levels.push(Dataset::from(reduced));
    }
    Ok(levels)
}
