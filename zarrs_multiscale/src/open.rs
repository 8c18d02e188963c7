use std::sync::Arc;

use ndarray::ArrayD;
use serde_json::{Map, Value};
use zarrs::array::{Array, ArrayCreateError};
use zarrs::group::Group;
use zarrs::node::{NodePath, node_exists};
use zarrs::storage::ReadableListableStorageTraits;
use zarrs_multiscale_metadata::{
    AxisMetadata, AxisVocabulary, DatasetMetadata, MultiscaleMetadataError, MultiscalesAttributes,
};

use crate::{
    Coordinate, DEFAULT_MULTISCALE_NAME, Dataset, ImageElement, MultiscaleSpatialImage,
    OpenError, SpatialImage, config::global_config,
};

impl<T: ImageElement> MultiscaleSpatialImage<T> {
    /// Open a multiscale image stored by [`MultiscaleSpatialImage::to_zarr`].
    ///
    /// Levels, variables and dimension labels are read from the `multiscales` attribute of the root group.
    /// Coordinates are read from the coordinate arrays of each level, or derived from the `scale` and `translation` of the level if a coordinate array is absent.
    /// The chunk shape of each variable is retained.
    ///
    /// # Errors
    /// Returns an [`OpenError`] if
    ///  - the `multiscales` attribute is missing or invalid,
    ///  - a dataset path is not of the form `<level>/<variable>`,
    ///  - a stored array does not have an element type of `T` or a dimension per axis, or
    ///  - there is an underlying store error.
    pub fn open<TStorage: ?Sized + ReadableListableStorageTraits + 'static>(
        storage: &Arc<TStorage>,
    ) -> Result<Self, OpenError> {
        Self::open_opt(storage, None)
    }

    /// Open a multiscale image stored by [`MultiscaleSpatialImage::to_zarr`] with an explicit axis vocabulary.
    ///
    /// The unit key of `axis_vocabulary` names the unit attribute of derived coordinates.
    /// If `axis_vocabulary` is [`None`], the axis vocabulary of the global configuration is used.
    /// The axis vocabulary is retained by the opened image.
    ///
    /// # Errors
    /// See [`MultiscaleSpatialImage::open`].
    pub fn open_opt<TStorage: ?Sized + ReadableListableStorageTraits + 'static>(
        storage: &Arc<TStorage>,
        axis_vocabulary: Option<AxisVocabulary>,
    ) -> Result<Self, OpenError> {
        let unit_key = axis_vocabulary.as_ref().map_or_else(
            || global_config().axis_vocabulary().unit_key().to_string(),
            |vocabulary| vocabulary.unit_key().to_string(),
        );
        let root = Group::open(storage.clone(), "/")?;
        let metadata = MultiscalesAttributes::from_attributes(root.attributes())?;
        let Some(first) = metadata.multiscales.first() else {
            return Err(MultiscaleMetadataError::Missing.into());
        };

        let mut levels = Vec::with_capacity(first.datasets.len());
        for (index, dataset) in first.datasets.iter().enumerate() {
            let (level, _) = split_dataset_path(&dataset.path)?;
            let variables = metadata
                .multiscales
                .iter()
                .map(|multiscale| {
                    let dataset = multiscale.datasets.get(index).ok_or_else(|| {
                        OpenError::InvalidDatasetPath(format!("{level}/{}", multiscale.name))
                    })?;
                    let (variable_level, variable) = split_dataset_path(&dataset.path)?;
                    if variable_level != level {
                        return Err(OpenError::InvalidDatasetPath(dataset.path.clone()));
                    }
                    open_variable(storage, level, variable, &multiscale.axes, dataset, &unit_key)
                })
                .collect::<Result<Vec<_>, _>>()?;
            levels.push(Dataset::new(variables)?);
        }

        let mut multiscale = Self::from_levels(DEFAULT_MULTISCALE_NAME, levels)?
            .with_axis_vocabulary(axis_vocabulary);
        multiscale.attributes = root.attributes().clone();
        Ok(multiscale)
    }
}

/// Split a dataset path into its level and variable.
fn split_dataset_path(path: &str) -> Result<(&str, &str), OpenError> {
    match path.split_once('/') {
        Some((level, variable))
            if !level.is_empty() && !variable.is_empty() && !variable.contains('/') =>
        {
            Ok((level, variable))
        }
        Some(_) | None => Err(OpenError::InvalidDatasetPath(path.to_string())),
    }
}

fn open_variable<T: ImageElement, TStorage: ?Sized + ReadableListableStorageTraits + 'static>(
    storage: &Arc<TStorage>,
    level: &str,
    variable: &str,
    axes: &[AxisMetadata],
    dataset: &DatasetMetadata,
    unit_key: &str,
) -> Result<SpatialImage<T>, OpenError> {
    let array = Array::open(storage.clone(), &format!("/{}", dataset.path))?;
    if array.dimensionality() != axes.len() {
        return Err(OpenError::InvalidDimensionality {
            path: dataset.path.clone(),
            dimensionality: array.dimensionality(),
            num_axes: axes.len(),
        });
    }
    let data: ArrayD<T> = array.retrieve_array_subset(&array.subset_all())?;

    let scale = dataset.scale().unwrap_or_default();
    let translation = dataset.translation().unwrap_or_default();
    let coords = axes
        .iter()
        .enumerate()
        .map(|(index, axis)| {
            let coordinate_path = format!("/{level}/{}", axis.name);
            let node_path = NodePath::new(&coordinate_path).map_err(ArrayCreateError::from)?;
            if node_exists(storage, &node_path)? {
                let coordinate = Array::open(storage.clone(), &coordinate_path)?;
                let values: ArrayD<f64> =
                    coordinate.retrieve_array_subset(&coordinate.subset_all())?;
                Ok(Coordinate::new(&axis.name, values.iter().copied().collect())
                    .with_attributes(coordinate.attributes().clone()))
            } else {
                log::debug!("deriving coordinate `{coordinate_path}` from coordinate transformations");
                let mut attributes = Map::default();
                if let Some(unit) = &axis.unit {
                    attributes.insert(unit_key.to_string(), Value::String(unit.clone()));
                }
                Ok(Coordinate::regular(
                    &axis.name,
                    data.shape()[index],
                    scale.get(index).copied().unwrap_or(1.0),
                    translation.get(index).copied().unwrap_or(0.0),
                )
                .with_attributes(attributes))
            }
        })
        .collect::<Result<Vec<_>, OpenError>>()?;

    let dims = axes.iter().map(|axis| axis.name.as_str());
    let mut image = SpatialImage::new_with_coordinates(variable, data, dims, coords)?
        .with_attributes(array.attributes().clone());
    if let Ok(chunk_shape) = array.chunk_shape(&vec![0; array.dimensionality()]) {
        image.set_chunks(Some(chunk_shape.iter().map(|chunk| chunk.get()).collect()))?;
    }
    Ok(image)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dataset_path() {
        assert_eq!(split_dataset_path("0/image").unwrap(), ("0", "image"));
        assert!(split_dataset_path("image").is_err());
        assert!(split_dataset_path("0/").is_err());
        assert!(split_dataset_path("/image").is_err());
        assert!(split_dataset_path("0/image/x").is_err());
    }
}
