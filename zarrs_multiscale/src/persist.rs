//! Storing a multiscale spatial image as an OME-NGFF Zarr hierarchy.

use std::collections::BTreeMap;
use std::str::FromStr;
use std::sync::Arc;

use derive_more::Display;
use ndarray::{Array1, CowArray, IxDyn};
use serde_json::{Map, Value};
use thiserror::Error;
use zarrs::array::{
    Array, ArrayBuilder, ArrayCreateError, ArrayMetadataOptions, ArrayShape, codec::GzipCodec,
};
use zarrs::group::{Group, GroupBuilder};
use zarrs::node::{NodePath, node_exists};
use zarrs::storage::{ReadableWritableListableStorageTraits, StorageError, StorePrefix};

use crate::{ImageElement, MultiscaleSpatialImage, PersistError, config::global_config};

/// How [`MultiscaleSpatialImage::to_zarr`] treats existing content of the store.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default, Display)]
pub enum PersistMode {
    /// Create, erasing any existing content of the store (`w`).
    #[default]
    #[display("w")]
    Create,
    /// Create, failing if the root node already exists (`w-`).
    #[display("w-")]
    CreateExclusive,
    /// Replace existing arrays and create missing ones (`a`).
    #[display("a")]
    Append,
    /// Write the values of existing arrays only (`r+`).
    ///
    /// Fails if an array is missing, an array shape would change, or the root attributes would change.
    #[display("r+")]
    Modify,
}

/// An invalid [`PersistMode`] string.
#[derive(Clone, Debug, Error)]
#[error("invalid persist mode `{_0}`, expected `w`, `w-`, `a` or `r+`")]
pub struct PersistModeParseError(String);

impl FromStr for PersistMode {
    type Err = PersistModeParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "w" => Ok(Self::Create),
            "w-" => Ok(Self::CreateExclusive),
            "a" => Ok(Self::Append),
            "r+" => Ok(Self::Modify),
            _ => Err(PersistModeParseError(s.to_string())),
        }
    }
}

/// The encoding of a stored array.
#[derive(Clone, PartialEq, Eq, Debug, Default)]
pub struct VariableEncoding {
    chunks: Option<ArrayShape>,
    compression_level: Option<u32>,
}

impl VariableEncoding {
    /// Create a new variable encoding that keeps the chunking of the image and does not compress.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the chunk shape, if set.
    #[must_use]
    pub fn chunks(&self) -> Option<&[u64]> {
        self.chunks.as_deref()
    }

    /// Set the chunk shape, overriding the chunking of the image.
    #[must_use]
    pub fn with_chunks(mut self, chunks: ArrayShape) -> Self {
        self.chunks = Some(chunks);
        self
    }

    /// Return the `gzip` compression level, if set.
    #[must_use]
    pub const fn compression_level(&self) -> Option<u32> {
        self.compression_level
    }

    /// Compress chunks with `gzip` at `compression_level` (0-9).
    #[must_use]
    pub const fn with_compression_level(mut self, compression_level: u32) -> Self {
        self.compression_level = Some(compression_level);
        self
    }
}

/// Variable encodings keyed by array path relative to the root, e.g. `0/image` or `1/x`.
pub type Encoding = BTreeMap<String, VariableEncoding>;

/// Options for [`MultiscaleSpatialImage::to_zarr`].
#[derive(Clone, PartialEq, Eq, Debug, Default)]
pub struct WriteOptions {
    mode: PersistMode,
    encoding: Encoding,
}

impl WriteOptions {
    /// Return the persist mode.
    #[must_use]
    pub const fn mode(&self) -> PersistMode {
        self.mode
    }

    /// Set the persist mode.
    #[must_use]
    pub const fn with_mode(mut self, mode: PersistMode) -> Self {
        self.mode = mode;
        self
    }

    /// Return the variable encodings.
    #[must_use]
    pub const fn encoding(&self) -> &Encoding {
        &self.encoding
    }

    /// Set the variable encodings.
    #[must_use]
    pub fn with_encoding(mut self, encoding: Encoding) -> Self {
        self.encoding = encoding;
        self
    }
}

/// An array to be stored at `path` (relative to the root).
struct StoredArray<'a, E> {
    path: String,
    data: CowArray<'a, E, IxDyn>,
    dims: &'a [String],
    attributes: &'a Map<String, Value>,
    chunks: ArrayShape,
}

impl<E: ImageElement> StoredArray<'_, E> {
    fn shape(&self) -> ArrayShape {
        self.data.shape().iter().map(|&len| len as u64).collect()
    }

    fn node_path(&self) -> String {
        format!("/{}", self.path)
    }

    fn exists<TStorage: ?Sized + ReadableWritableListableStorageTraits + 'static>(
        &self,
        storage: &Arc<TStorage>,
    ) -> Result<bool, PersistError> {
        let node_path = NodePath::new(&self.node_path()).map_err(ArrayCreateError::from)?;
        Ok(node_exists(storage, &node_path)?)
    }

    /// Store the array metadata and values, replacing any existing array at the same path.
    ///
    /// The encoding must have been checked with [`VariableEncoding::validate`].
    fn store<TStorage: ?Sized + ReadableWritableListableStorageTraits + 'static>(
        self,
        storage: &Arc<TStorage>,
        options: &WriteOptions,
    ) -> Result<(), PersistError> {
        let shape = self.shape();
        let node_path = self.node_path();
        if options.mode() == PersistMode::Append && self.exists(storage)? {
            let existing = Array::open(storage.clone(), &node_path)?;
            if existing.shape() != shape.as_slice() {
                log::warn!(
                    "replacing array `{}` of shape {:?} with shape {shape:?}",
                    self.path,
                    existing.shape()
                );
            }
            let prefix = StorePrefix::new(format!("{}/", self.path)).map_err(StorageError::from)?;
            storage.erase_prefix(&prefix)?;
        }

        let encoding = options.encoding().get(&self.path);
        let chunks = encoding
            .and_then(VariableEncoding::chunks)
            .map_or(self.chunks, <[u64]>::to_vec);
        let mut builder = ArrayBuilder::new(shape, chunks, E::data_type(), E::fill_value());
        builder
            .dimension_names(Some(self.dims.iter().map(String::as_str)))
            .attributes(self.attributes.clone());
        if let Some(compression_level) = encoding.and_then(VariableEncoding::compression_level) {
            let gzip = GzipCodec::new(compression_level).map_err(|err| {
                PersistError::InvalidEncoding {
                    path: self.path.clone(),
                    reason: err.to_string(),
                }
            })?;
            builder.bytes_to_bytes_codecs(vec![Arc::new(gzip)]);
        }
        let array = builder.build(storage.clone(), &node_path)?;
        array.store_metadata_opt(
            &ArrayMetadataOptions::default().with_include_zarrs_metadata(false),
        )?;
        log::debug!("storing array `{}` with shape {:?}", self.path, array.shape());
        array.store_array_subset(&array.subset_all(), self.data.into_owned())?;
        Ok(())
    }

    /// Open the existing array at the same path, checking that it has the same shape.
    fn open_existing<TStorage: ?Sized + ReadableWritableListableStorageTraits + 'static>(
        &self,
        storage: &Arc<TStorage>,
    ) -> Result<Array<TStorage>, PersistError> {
        if !self.exists(storage)? {
            return Err(PersistError::MissingNode(self.path.clone()));
        }
        let array = Array::open(storage.clone(), &self.node_path())?;
        let shape = self.shape();
        if array.shape() != shape.as_slice() {
            return Err(PersistError::ShapeMismatch {
                path: self.path.clone(),
                expected: shape,
                found: array.shape().to_vec(),
            });
        }
        Ok(array)
    }
}

impl VariableEncoding {
    /// Check the encoding of the array at `path` with `shape`.
    fn validate(&self, path: &str, shape: &[u64]) -> Result<(), PersistError> {
        if let Some(chunks) = self.chunks()
            && (chunks.len() != shape.len() || chunks.contains(&0))
        {
            return Err(PersistError::InvalidEncoding {
                path: path.to_string(),
                reason: format!(
                    "chunk shape {chunks:?} must be non-zero with an element per dimension of {shape:?}"
                ),
            });
        }
        if let Some(compression_level) = self.compression_level() {
            GzipCodec::new(compression_level).map_err(|err| PersistError::InvalidEncoding {
                path: path.to_string(),
                reason: err.to_string(),
            })?;
        }
        Ok(())
    }
}

/// Every array of a multiscale image, in the order they are stored.
struct StoredArrays<'a, T> {
    variables: Vec<StoredArray<'a, T>>,
    coordinates: Vec<StoredArray<'a, f64>>,
}

impl<T: ImageElement> StoredArrays<'_, T> {
    /// Check every entry of `encoding` against the array it names.
    fn validate_encoding(&self, encoding: &Encoding) -> Result<(), PersistError> {
        for (path, variable_encoding) in encoding {
            let shape = self
                .variables
                .iter()
                .find(|array| &array.path == path)
                .map(StoredArray::shape)
                .or_else(|| {
                    self.coordinates
                        .iter()
                        .find(|array| &array.path == path)
                        .map(StoredArray::shape)
                })
                .ok_or_else(|| PersistError::InvalidEncoding {
                    path: path.clone(),
                    reason: "no array is stored at this path".to_string(),
                })?;
            variable_encoding.validate(path, &shape)?;
        }
        Ok(())
    }

    fn store<TStorage: ?Sized + ReadableWritableListableStorageTraits + 'static>(
        self,
        storage: &Arc<TStorage>,
        options: &WriteOptions,
    ) -> Result<(), PersistError> {
        for array in self.variables {
            array.store(storage, options)?;
        }
        for array in self.coordinates {
            array.store(storage, options)?;
        }
        Ok(())
    }
}

impl<T: ImageElement> MultiscaleSpatialImage<T> {
    /// Store the multiscale image in `storage` with OME-NGFF multiscale metadata.
    ///
    /// The root attributes are replaced with the derived `multiscales` metadata before anything is written.
    /// Axes are classified with the [axis vocabulary](MultiscaleSpatialImage::axis_vocabulary) of the image, or the global one if unset.
    ///
    /// The store layout is:
    ///  - `/`: a group with the `multiscales` attribute,
    ///  - `/<level>`: a group per resolution level,
    ///  - `/<level>/<variable>`: an array per variable with dimension names and the variable attributes, and
    ///  - `/<level>/<dim>`: a `float64` coordinate array per dimension with the coordinate attributes.
    ///
    /// The arrays and encodings are checked before the store is modified.
    ///
    /// # Errors
    /// Returns a [`PersistError`] if
    ///  - a variable is named like a dimension of its level, or variables of a level have different coordinates for a shared dimension,
    ///  - an encoding names no stored array or is invalid,
    ///  - the mode is [`PersistMode::CreateExclusive`] and the root node exists,
    ///  - the mode is [`PersistMode::Modify`] and an array is missing, has a different shape, or the root attributes differ, or
    ///  - there is an underlying store error.
    pub fn to_zarr<TStorage: ?Sized + ReadableWritableListableStorageTraits + 'static>(
        &mut self,
        storage: &Arc<TStorage>,
        options: &WriteOptions,
    ) -> Result<(), PersistError> {
        let metadata = match self.axis_vocabulary() {
            Some(vocabulary) => self.ngff_metadata(vocabulary),
            None => self.ngff_metadata(global_config().axis_vocabulary()),
        };
        metadata.validate()?;
        self.attributes = metadata.to_attributes()?;

        let arrays = self.stored_arrays()?;
        arrays.validate_encoding(options.encoding())?;

        match options.mode() {
            PersistMode::Create => storage.erase_prefix(&StorePrefix::root())?,
            PersistMode::CreateExclusive => {
                if node_exists(storage, &NodePath::root())? {
                    return Err(PersistError::NodeExists("/".to_string()));
                }
            }
            PersistMode::Append => {}
            PersistMode::Modify => return modify(storage, &self.attributes, arrays),
        }

        GroupBuilder::new()
            .attributes(self.attributes.clone())
            .build(storage.clone(), "/")?
            .store_metadata()?;
        for child in self.children() {
            GroupBuilder::new()
                .build(storage.clone(), &format!("/{}", child.name()))?
                .store_metadata()?;
        }
        arrays.store(storage, options)
    }

    /// Collect the variable and coordinate arrays of every level.
    ///
    /// A coordinate shared by several variables of a level is stored once.
    fn stored_arrays(&self) -> Result<StoredArrays<'_, T>, PersistError> {
        let mut variables = Vec::new();
        let mut coordinates: Vec<StoredArray<'_, f64>> = Vec::new();
        for child in self.children() {
            let level_coordinates = coordinates.len();
            for variable in child.dataset().variables() {
                variables.push(StoredArray {
                    path: format!("{}/{}", child.name(), variable.name()),
                    data: CowArray::from(variable.data().view()),
                    dims: variable.dims(),
                    attributes: variable.attributes(),
                    chunks: variable
                        .chunks()
                        .map_or_else(|| variable.shape(), <[u64]>::to_vec),
                });
                for (dim, coord) in variable.dims().iter().zip(variable.coords()) {
                    let path = format!("{}/{}", child.name(), dim);
                    if let Some(stored) = coordinates[level_coordinates..]
                        .iter()
                        .find(|stored| stored.path == path)
                    {
                        if stored.data.iter().ne(coord.values())
                            || stored.attributes != coord.attributes()
                        {
                            return Err(PersistError::CoordinateConflict(path));
                        }
                        continue;
                    }
                    let values = Array1::from(coord.values().to_vec()).into_dyn();
                    let len = (values.len() as u64).max(1);
                    coordinates.push(StoredArray {
                        path,
                        data: CowArray::from(values),
                        dims: std::slice::from_ref(dim),
                        attributes: coord.attributes(),
                        chunks: vec![len],
                    });
                }
            }
        }
        if let Some(variable) = variables
            .iter()
            .find(|variable| coordinates.iter().any(|coord| coord.path == variable.path))
        {
            return Err(PersistError::PathConflict(variable.path.clone()));
        }
        Ok(StoredArrays {
            variables,
            coordinates,
        })
    }
}

/// Write the values of existing arrays, checking every array before any value is written.
fn modify<T: ImageElement, TStorage: ?Sized + ReadableWritableListableStorageTraits + 'static>(
    storage: &Arc<TStorage>,
    attributes: &Map<String, Value>,
    arrays: StoredArrays<'_, T>,
) -> Result<(), PersistError> {
    if !node_exists(storage, &NodePath::root())? {
        return Err(PersistError::MissingNode("/".to_string()));
    }
    let root = Group::open(storage.clone(), "/")?;
    if root.attributes() != attributes {
        return Err(PersistError::MetadataMismatch);
    }

    let StoredArrays {
        variables,
        coordinates,
    } = arrays;
    let variables = variables
        .into_iter()
        .map(|array| Ok((array.open_existing(storage)?, array)))
        .collect::<Result<Vec<_>, PersistError>>()?;
    let coordinates = coordinates
        .into_iter()
        .map(|array| Ok((array.open_existing(storage)?, array)))
        .collect::<Result<Vec<_>, PersistError>>()?;
    for (existing, array) in variables {
        log::debug!("modifying array `{}`", array.path);
        existing.store_array_subset(&existing.subset_all(), array.data.into_owned())?;
    }
    for (existing, array) in coordinates {
        log::debug!("modifying array `{}`", array.path);
        existing.store_array_subset(&existing.subset_all(), array.data.into_owned())?;
    }
    Ok(())
}
