use thiserror::Error;
use zarrs::array::{ArrayCreateError, ArrayError, ArrayShape};
use zarrs::group::GroupCreateError;
use zarrs::storage::StorageError;
use zarrs_multiscale_metadata::MultiscaleMetadataError;

/// A spatial image creation error.
#[derive(Clone, Debug, Error)]
pub enum SpatialImageCreateError {
    /// The number of dimension labels does not match the data dimensionality.
    #[error("the number of dimension labels {_0} does not match data dimensionality {_1}")]
    InvalidDimensionality(usize, usize),
    /// A dimension label is repeated.
    #[error("dimension `{_0}` is repeated")]
    DuplicateDimension(String),
    /// A coordinate is not named after its dimension.
    #[error("coordinate `{coordinate}` does not match dimension `{dim}`")]
    CoordinateNameMismatch {
        /// The dimension label.
        dim: String,
        /// The coordinate name.
        coordinate: String,
    },
    /// A coordinate does not have a value per element along its dimension.
    #[error("coordinate `{dim}` has {length} values, expected {extent}")]
    CoordinateLengthMismatch {
        /// The dimension label.
        dim: String,
        /// The number of coordinate values.
        length: usize,
        /// The extent of the dimension.
        extent: usize,
    },
    /// A dimension label is not a dimension of the image.
    #[error("`{_0}` is not a dimension of the image")]
    UnknownDimension(String),
    /// A chunk shape does not match the data dimensionality or contains zero.
    #[error("invalid chunk shape {_0:?}: must have an element per dimension and all elements must be non-zero")]
    InvalidChunkShape(ArrayShape),
}

/// A dataset creation error.
#[derive(Clone, Debug, Error)]
pub enum DatasetCreateError {
    /// A dataset must have at least one variable.
    #[error("a dataset must have at least one variable")]
    Empty,
    /// A variable name is repeated.
    #[error("variable `{_0}` is repeated")]
    DuplicateVariable(String),
}

/// A multiscale construction error.
///
/// Configuration errors are raised before any aggregation is performed.
#[derive(Clone, Debug, Error)]
pub enum MultiscaleError {
    /// A scale factor or chunk entry refers to an axis that is not a dimension of the image.
    #[error("`{_0}` is not an axis of the image")]
    UnknownAxis(String),
    /// A scale factor is zero.
    #[error("scale factor {index} has a zero factor for axis `{axis}`")]
    ZeroScaleFactor {
        /// The index of the scale factor.
        index: usize,
        /// The axis label.
        axis: String,
    },
    /// An invalid chunk specification.
    #[error("invalid chunks: {_0}")]
    InvalidChunks(String),
    /// An unsupported aggregation method.
    #[error("unsupported aggregation method `{_0}`")]
    UnsupportedMethod(String),
    /// Resolution levels are missing or inconsistent.
    #[error("invalid resolution levels: {_0}")]
    InvalidLevels(String),
    /// A spatial image creation error.
    #[error(transparent)]
    SpatialImageCreateError(#[from] SpatialImageCreateError),
}

/// A multiscale persistence error.
#[derive(Debug, Error)]
pub enum PersistError {
    /// A storage error.
    #[error(transparent)]
    StorageError(#[from] StorageError),
    /// An array creation error.
    #[error(transparent)]
    ArrayCreateError(#[from] ArrayCreateError),
    /// An array error.
    #[error(transparent)]
    ArrayError(#[from] ArrayError),
    /// A group creation error.
    #[error(transparent)]
    GroupCreateError(#[from] GroupCreateError),
    /// A multiscale metadata error.
    #[error(transparent)]
    MultiscaleMetadataError(#[from] MultiscaleMetadataError),
    /// The root node already exists.
    #[error("a node already exists at `{_0}`")]
    NodeExists(String),
    /// A node expected to exist does not.
    #[error("no node exists at `{_0}`")]
    MissingNode(String),
    /// An existing array has a different shape.
    #[error("array `{path}` has shape {found:?}, expected {expected:?}")]
    ShapeMismatch {
        /// The array path.
        path: String,
        /// The shape being written.
        expected: ArrayShape,
        /// The stored shape.
        found: ArrayShape,
    },
    /// The stored root attributes differ from the attributes being written.
    #[error("the stored root attributes differ from the multiscale metadata being written")]
    MetadataMismatch,
    /// An invalid variable encoding.
    #[error("invalid encoding for `{path}`: {reason}")]
    InvalidEncoding {
        /// The array path.
        path: String,
        /// The reason the encoding is invalid.
        reason: String,
    },
    /// A variable and a coordinate would be stored at the same path.
    #[error("variable `{_0}` has the same path as a coordinate")]
    PathConflict(String),
    /// Variables of a level have different coordinates for a shared dimension.
    #[error("coordinate `{_0}` differs between variables of the same level")]
    CoordinateConflict(String),
}

/// A multiscale open error.
#[derive(Debug, Error)]
pub enum OpenError {
    /// A storage error.
    #[error(transparent)]
    StorageError(#[from] StorageError),
    /// An array creation error.
    #[error(transparent)]
    ArrayCreateError(#[from] ArrayCreateError),
    /// An array error.
    #[error(transparent)]
    ArrayError(#[from] ArrayError),
    /// A group creation error.
    #[error(transparent)]
    GroupCreateError(#[from] GroupCreateError),
    /// The `multiscales` attribute is missing or invalid.
    #[error(transparent)]
    MultiscaleMetadataError(#[from] MultiscaleMetadataError),
    /// A spatial image could not be created from the stored arrays.
    #[error(transparent)]
    SpatialImageCreateError(#[from] SpatialImageCreateError),
    /// A dataset could not be created from the stored arrays.
    #[error(transparent)]
    DatasetCreateError(#[from] DatasetCreateError),
    /// The stored levels are inconsistent.
    #[error(transparent)]
    MultiscaleError(#[from] MultiscaleError),
    /// A dataset path is not of the form `<level>/<variable>`.
    #[error("invalid dataset path `{_0}`")]
    InvalidDatasetPath(String),
    /// The stored array dimensionality does not match the number of axes.
    #[error("array `{path}` has {dimensionality} dimensions, expected {num_axes}")]
    InvalidDimensionality {
        /// The array path.
        path: String,
        /// The array dimensionality.
        dimensionality: usize,
        /// The number of axes.
        num_axes: usize,
    },
}
