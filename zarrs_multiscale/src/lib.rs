//! `zarrs_multiscale` builds multi-resolution (pyramid) representations of N-dimensional spatial images and stores them as [OME-NGFF](https://ngff.openmicroscopy.org/0.4/) v0.4 [Zarr](https://zarr.dev) hierarchies with [`zarrs`].
//!
//! A [`SpatialImage`] is a named array with labelled dimensions (e.g. `t`, `c`, `z`, `y`, `x`) and a coordinate per dimension.
//! [`to_multiscale`] reduces it level by level with [`ScaleFactor`]s, producing a [`MultiscaleSpatialImage`] with a child per resolution level:
//!  - level `0` is the input image, unchanged apart from its chunking,
//!  - level `i + 1` is level `i` reduced by the `i`th scale factor, with the block mean over non-overlapping windows, and
//!  - every level is chunked by [`Chunks`] when stored.
//!
//! [`MultiscaleSpatialImage::to_zarr`] derives the `multiscales` metadata (axes, and per-level `scale` and `translation` coordinate transformations) from the level coordinates, and writes it with every level to a store.
//! [`MultiscaleSpatialImage::open`] reads it back.
//!
//! ## Example
//! ```rust
//! # use std::sync::Arc;
//! # use ndarray::{ArrayD, IxDyn};
//! use zarrs_multiscale::{to_multiscale, Methods, ScaleFactor, SpatialImage, WriteOptions};
//!
//! let data = ArrayD::<f32>::from_elem(IxDyn(&[256, 256]), 1.0);
//! let image = SpatialImage::new("image", data, ["y", "x"])?;
//! let mut multiscale = to_multiscale(
//!     &image,
//!     &[ScaleFactor::Uniform(2), ScaleFactor::Uniform(2)],
//!     Methods::BlockMean,
//!     None,
//! )?;
//! assert_eq!(multiscale["2"].dataset()["image"].shape(), vec![64, 64]);
//!
//! let store = Arc::new(zarrs::storage::store::MemoryStore::new());
//! multiscale.to_zarr(&store, &WriteOptions::default())?;
//! # Ok::<_, Box<dyn std::error::Error>>(())
//! ```
//!
//! ## Configuration
//! Default chunking and the axis vocabulary used to classify dimension labels are set in the global [`Config`](config::Config).
//!
//! ## Licence
//! `zarrs_multiscale` is licensed under either of
//!  - the Apache License, Version 2.0 <http://www.apache.org/licenses/LICENSE-2.0> or
//!  - the MIT license <http://opensource.org/licenses/MIT>, at your option.
#![warn(clippy::wildcard_enum_match_arm)]

mod chunks;
pub mod config;
mod dataset;
mod element;
mod errors;
pub mod method;
mod multiscale;
mod open;
pub mod persist;
pub mod pyramid;
mod scale_factor;
pub mod spatial_image;

pub use chunks::Chunks;
pub use dataset::Dataset;
pub use element::ImageElement;
pub use errors::{
    DatasetCreateError, MultiscaleError, OpenError, PersistError, SpatialImageCreateError,
};
pub use method::{CoordinateAlignment, Methods};
pub use multiscale::{DEFAULT_MULTISCALE_NAME, MultiscaleSpatialImage, ScaleNode};
pub use persist::{Encoding, PersistMode, PersistModeParseError, VariableEncoding, WriteOptions};
pub use pyramid::ToMultiscaleOptions;
pub use scale_factor::ScaleFactor;
pub use spatial_image::{Coordinate, SpatialImage};

pub use zarrs_multiscale_metadata as metadata;

/// Generate a multiscale representation of `image`.
///
/// Each element of `scale_factors` reduces the previous level to the next, see [`pyramid::build`].
/// If `chunks` is [`None`], every axis is chunked by 64 if the image has a depth axis and by 256 otherwise, with the time axis chunked by 1.
///
/// # Errors
/// Returns a [`MultiscaleError`] if a scale factor or `chunks` is invalid.
pub fn to_multiscale<T: ImageElement>(
    image: &SpatialImage<T>,
    scale_factors: &[ScaleFactor],
    method: Methods,
    chunks: Option<Chunks>,
) -> Result<MultiscaleSpatialImage<T>, MultiscaleError> {
    to_multiscale_opt(
        image,
        scale_factors,
        &ToMultiscaleOptions::default()
            .with_method(method)
            .with_chunks(chunks),
    )
}

/// Generate a multiscale representation of `image` with non-default [`ToMultiscaleOptions`].
///
/// # Errors
/// Returns a [`MultiscaleError`] if a scale factor or the chunk specification is invalid.
pub fn to_multiscale_opt<T: ImageElement>(
    image: &SpatialImage<T>,
    scale_factors: &[ScaleFactor],
    options: &ToMultiscaleOptions,
) -> Result<MultiscaleSpatialImage<T>, MultiscaleError> {
    let levels = pyramid::build(image, scale_factors, options)?;
    Ok(MultiscaleSpatialImage::from_levels(options.name(), levels)?
        .with_axis_vocabulary(options.axis_vocabulary().cloned()))
}
