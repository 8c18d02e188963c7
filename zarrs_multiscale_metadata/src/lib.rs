//! [OME-NGFF](https://ngff.openmicroscopy.org/0.4/) multiscale metadata support for the [`zarrs_multiscale`](https://docs.rs/zarrs_multiscale/latest/zarrs_multiscale/) crate.
//!
//! This crate provides:
//!  - the serialisable `multiscales` attribute of an image group ([`MultiscalesAttributes`]),
//!  - axis classification against a configurable [`AxisVocabulary`], and
//!  - derivation of per-level `scale` and `translation` [coordinate transformations](coordinate_transformations) from coordinate values.
//!
//! Only version `0.4` of the specification is supported.
//!
//! ## Example
//! ```rust
//! # use zarrs_multiscale_metadata::{AxisVocabulary, DatasetMetadata, MultiscaleMetadata, MultiscalesAttributes};
//! let vocabulary = AxisVocabulary::default();
//! let axes = vec![
//!     vocabulary.axis_metadata("y", &serde_json::Map::default()),
//!     vocabulary.axis_metadata("x", &serde_json::Map::default()),
//! ];
//! let datasets = vec![
//!     DatasetMetadata::new("0/image", vec![1.0, 1.0], vec![0.0, 0.0]),
//!     DatasetMetadata::new("1/image", vec![2.0, 2.0], vec![0.0, 0.0]),
//! ];
//! let attributes = MultiscalesAttributes::new(vec![MultiscaleMetadata::new("image", axes, datasets)]);
//! attributes.validate()?;
//! # Ok::<_, zarrs_multiscale_metadata::MultiscaleMetadataError>(())
//! ```

pub mod axis;
pub mod coordinate_transformations;
pub mod multiscales;

pub use axis::{AxisMetadata, AxisType, AxisVocabulary};
pub use coordinate_transformations::{coordinate_transformations, CoordinateTransformation};
pub use multiscales::{
    DatasetMetadata, MultiscaleMetadata, MultiscaleMetadataError, MultiscalesAttributes,
    MULTISCALES_KEY,
};
