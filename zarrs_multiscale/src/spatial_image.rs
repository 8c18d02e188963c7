//! Labelled N-dimensional images with per-dimension coordinates.

use std::collections::HashSet;

use ndarray::ArrayD;
use serde_json::{Map, Value};
use zarrs::array::ArrayShape;

use crate::{ImageElement, SpatialImageCreateError};

/// The attribute key of the human readable name of a coordinate.
pub const LONG_NAME_KEY: &str = "long_name";

/// The coordinate values of a dimension.
#[derive(Clone, PartialEq, Debug)]
pub struct Coordinate {
    name: String,
    values: Vec<f64>,
    attributes: Map<String, Value>,
}

impl Coordinate {
    /// Create a new coordinate with `values`.
    #[must_use]
    pub fn new(name: impl Into<String>, values: Vec<f64>) -> Self {
        Self {
            name: name.into(),
            values,
            attributes: Map::default(),
        }
    }

    /// Create a new uniformly spaced coordinate `translation + scale * i` for `i` in `0..len`.
    #[must_use]
    pub fn regular(name: impl Into<String>, len: usize, scale: f64, translation: f64) -> Self {
        #[allow(clippy::cast_precision_loss)]
        let values = (0..len).map(|i| translation + scale * i as f64).collect();
        Self::new(name, values)
    }

    /// Get the coordinate name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Get the coordinate values.
    #[must_use]
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Get the coordinate attributes.
    #[must_use]
    pub const fn attributes(&self) -> &Map<String, Value> {
        &self.attributes
    }

    /// Mutably borrow the coordinate attributes.
    #[must_use]
    pub fn attributes_mut(&mut self) -> &mut Map<String, Value> {
        &mut self.attributes
    }

    /// Set the coordinate attributes.
    #[must_use]
    pub fn with_attributes(mut self, attributes: Map<String, Value>) -> Self {
        self.attributes = attributes;
        self
    }
}

/// A named N-dimensional image with labelled dimensions and per-dimension coordinates.
///
/// Coordinates map array indices to physical positions. Uniformly spaced coordinates define the
/// `scale` (spacing) and `translation` (origin) of each axis in multiscale metadata.
#[derive(Clone, PartialEq, Debug)]
pub struct SpatialImage<T> {
    name: String,
    dims: Vec<String>,
    coords: Vec<Coordinate>,
    data: ArrayD<T>,
    attributes: Map<String, Value>,
    chunks: Option<ArrayShape>,
}

impl<T: ImageElement> SpatialImage<T> {
    /// Create a new spatial image with default coordinates `0, 1, 2, ...` along each dimension.
    ///
    /// # Errors
    /// Returns a [`SpatialImageCreateError`] if the number of `dims` does not match the dimensionality of `data` or a dimension is repeated.
    pub fn new<D: Into<String>>(
        name: impl Into<String>,
        data: ArrayD<T>,
        dims: impl IntoIterator<Item = D>,
    ) -> Result<Self, SpatialImageCreateError> {
        let dims: Vec<String> = dims.into_iter().map(Into::into).collect();
        let coords = dims
            .iter()
            .zip(data.shape())
            .map(|(dim, &len)| Coordinate::regular(dim.clone(), len, 1.0, 0.0))
            .collect();
        Self::new_with_coordinates(name, data, dims, coords)
    }

    /// Create a new spatial image with explicit coordinates.
    ///
    /// `coords` must hold a coordinate per dimension, in dimension order, named after its dimension.
    ///
    /// # Errors
    /// Returns a [`SpatialImageCreateError`] if
    ///  - the number of `dims` does not match the dimensionality of `data`,
    ///  - a dimension is repeated,
    ///  - a coordinate is missing or does not match its dimension name, or
    ///  - a coordinate does not have a value per element along its dimension.
    pub fn new_with_coordinates<D: Into<String>>(
        name: impl Into<String>,
        data: ArrayD<T>,
        dims: impl IntoIterator<Item = D>,
        coords: Vec<Coordinate>,
    ) -> Result<Self, SpatialImageCreateError> {
        let dims: Vec<String> = dims.into_iter().map(Into::into).collect();
        if dims.len() != data.ndim() {
            return Err(SpatialImageCreateError::InvalidDimensionality(
                dims.len(),
                data.ndim(),
            ));
        }
        let mut seen = HashSet::with_capacity(dims.len());
        if let Some(dim) = dims.iter().find(|dim| !seen.insert(dim.as_str())) {
            return Err(SpatialImageCreateError::DuplicateDimension(dim.clone()));
        }
        if coords.len() != dims.len() {
            return Err(SpatialImageCreateError::InvalidDimensionality(
                coords.len(),
                data.ndim(),
            ));
        }
        for ((dim, coord), &extent) in dims.iter().zip(&coords).zip(data.shape()) {
            if coord.name() != dim {
                return Err(SpatialImageCreateError::CoordinateNameMismatch {
                    dim: dim.clone(),
                    coordinate: coord.name().to_string(),
                });
            }
            if coord.values().len() != extent {
                return Err(SpatialImageCreateError::CoordinateLengthMismatch {
                    dim: dim.clone(),
                    length: coord.values().len(),
                    extent,
                });
            }
        }
        Ok(Self {
            name: name.into(),
            dims,
            coords,
            data,
            attributes: Map::default(),
            chunks: None,
        })
    }

    /// Get the image name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Get the dimension labels.
    #[must_use]
    pub fn dims(&self) -> &[String] {
        &self.dims
    }

    /// Get the coordinates, in dimension order.
    #[must_use]
    pub fn coords(&self) -> &[Coordinate] {
        &self.coords
    }

    /// Get the coordinate of dimension `dim`.
    #[must_use]
    pub fn coord(&self, dim: &str) -> Option<&Coordinate> {
        self.dim_index(dim).map(|index| &self.coords[index])
    }

    /// Get the image data.
    #[must_use]
    pub const fn data(&self) -> &ArrayD<T> {
        &self.data
    }

    /// Consume the image and return its data.
    #[must_use]
    pub fn into_data(self) -> ArrayD<T> {
        self.data
    }

    /// Get the image shape.
    #[must_use]
    pub fn shape(&self) -> ArrayShape {
        self.data.shape().iter().map(|&len| len as u64).collect()
    }

    /// Get the image dimensionality.
    #[must_use]
    pub fn ndim(&self) -> usize {
        self.data.ndim()
    }

    /// Get the image attributes.
    #[must_use]
    pub const fn attributes(&self) -> &Map<String, Value> {
        &self.attributes
    }

    /// Mutably borrow the image attributes.
    #[must_use]
    pub fn attributes_mut(&mut self) -> &mut Map<String, Value> {
        &mut self.attributes
    }

    /// Set the image attributes.
    #[must_use]
    pub fn with_attributes(mut self, attributes: Map<String, Value>) -> Self {
        self.attributes = attributes;
        self
    }

    /// Get the chunk shape used when the image is stored, if set.
    #[must_use]
    pub fn chunks(&self) -> Option<&[u64]> {
        self.chunks.as_deref()
    }

    /// Set the chunk shape used when the image is stored.
    ///
    /// Chunking does not alter the image values.
    ///
    /// # Errors
    /// Returns [`SpatialImageCreateError::InvalidChunkShape`] if `chunks` does not have an element per dimension or contains zero.
    pub fn set_chunks(
        &mut self,
        chunks: Option<ArrayShape>,
    ) -> Result<&mut Self, SpatialImageCreateError> {
        if let Some(chunks) = &chunks
            && (chunks.len() != self.ndim() || chunks.contains(&0))
        {
            return Err(SpatialImageCreateError::InvalidChunkShape(chunks.clone()));
        }
        self.chunks = chunks;
        Ok(self)
    }

    /// Set the `scale` and `translation` of dimension `dim`, replacing its coordinate values.
    ///
    /// Coordinate attributes are retained.
    ///
    /// # Errors
    /// Returns [`SpatialImageCreateError::UnknownDimension`] if `dim` is not a dimension of the image.
    pub fn set_scale_translation(
        &mut self,
        dim: &str,
        scale: f64,
        translation: f64,
    ) -> Result<&mut Self, SpatialImageCreateError> {
        let index = self.require_dim_index(dim)?;
        let len = self.data.shape()[index];
        let attributes = std::mem::take(&mut self.coords[index].attributes);
        self.coords[index] =
            Coordinate::regular(dim, len, scale, translation).with_attributes(attributes);
        Ok(self)
    }

    /// Set the physical unit of dimension `dim`, stored under `unit_key` of its coordinate attributes.
    ///
    /// The default unit key is `units`, see [`AxisVocabulary`](zarrs_multiscale_metadata::AxisVocabulary).
    ///
    /// # Errors
    /// Returns [`SpatialImageCreateError::UnknownDimension`] if `dim` is not a dimension of the image.
    pub fn set_unit(
        &mut self,
        dim: &str,
        unit_key: &str,
        unit: impl Into<String>,
    ) -> Result<&mut Self, SpatialImageCreateError> {
        let index = self.require_dim_index(dim)?;
        self.coords[index]
            .attributes
            .insert(unit_key.to_string(), Value::String(unit.into()));
        Ok(self)
    }

    /// Set the human readable name of dimension `dim`, stored under [`LONG_NAME_KEY`] of its coordinate attributes.
    ///
    /// # Errors
    /// Returns [`SpatialImageCreateError::UnknownDimension`] if `dim` is not a dimension of the image.
    pub fn set_long_name(
        &mut self,
        dim: &str,
        long_name: impl Into<String>,
    ) -> Result<&mut Self, SpatialImageCreateError> {
        let index = self.require_dim_index(dim)?;
        self.coords[index]
            .attributes
            .insert(LONG_NAME_KEY.to_string(), Value::String(long_name.into()));
        Ok(self)
    }

    /// Return the index of dimension `dim`.
    #[must_use]
    pub fn dim_index(&self, dim: &str) -> Option<usize> {
        self.dims.iter().position(|d| d == dim)
    }

    fn require_dim_index(&self, dim: &str) -> Result<usize, SpatialImageCreateError> {
        self.dim_index(dim)
            .ok_or_else(|| SpatialImageCreateError::UnknownDimension(dim.to_string()))
    }
}
