//! The `multiscales` attribute of an image group.
//!
//! See <https://ngff.openmicroscopy.org/0.4/#multiscale-md>.

use monostate::MustBe;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

use crate::{AxisMetadata, CoordinateTransformation};

/// The attribute key of multiscale metadata.
pub const MULTISCALES_KEY: &str = "multiscales";

/// An element of the `datasets` field of multiscale metadata.
///
/// For example:
/// ```json
/// {
///     "path": "1/image",
///     "coordinateTransformations": [
///         {"type": "scale", "scale": [2.0, 2.0]},
///         {"type": "translation", "translation": [0.0, 0.0]}
///     ]
/// }
/// ```
#[derive(Serialize, Deserialize, Clone, PartialEq, Debug)]
pub struct DatasetMetadata {
    /// The path of the dataset array relative to the image group.
    pub path: String,
    /// The coordinate transformations: a scale followed by a translation.
    #[serde(rename = "coordinateTransformations")]
    pub coordinate_transformations: Vec<CoordinateTransformation>,
}

impl DatasetMetadata {
    /// Create new dataset metadata with a `scale` and `translation` transformation.
    #[must_use]
    pub fn new(path: impl Into<String>, scale: Vec<f64>, translation: Vec<f64>) -> Self {
        Self {
            path: path.into(),
            coordinate_transformations: vec![
                CoordinateTransformation::Scale { scale },
                CoordinateTransformation::Translation { translation },
            ],
        }
    }

    /// Return the scale transformation values, if present.
    #[must_use]
    pub fn scale(&self) -> Option<&[f64]> {
        self.coordinate_transformations
            .iter()
            .find_map(|transformation| match transformation {
                CoordinateTransformation::Scale { scale } => Some(scale.as_slice()),
                CoordinateTransformation::Translation { .. } => None,
            })
    }

    /// Return the translation transformation values, if present.
    #[must_use]
    pub fn translation(&self) -> Option<&[f64]> {
        self.coordinate_transformations
            .iter()
            .find_map(|transformation| match transformation {
                CoordinateTransformation::Translation { translation } => {
                    Some(translation.as_slice())
                }
                CoordinateTransformation::Scale { .. } => None,
            })
    }
}

/// Multiscale metadata of a single image variable.
#[derive(Serialize, Deserialize, Clone, PartialEq, Debug)]
pub struct MultiscaleMetadata {
    /// The metadata version. Must be `0.4`.
    pub version: MustBe!("0.4"),
    /// The name of the image variable.
    pub name: String,
    /// The axes, in dimension order.
    pub axes: Vec<AxisMetadata>,
    /// The datasets, from the highest to the lowest resolution.
    pub datasets: Vec<DatasetMetadata>,
}

impl MultiscaleMetadata {
    /// Create new multiscale metadata.
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        axes: Vec<AxisMetadata>,
        datasets: Vec<DatasetMetadata>,
    ) -> Self {
        Self {
            version: Default::default(),
            name: name.into(),
            axes,
            datasets,
        }
    }

    /// Validate the metadata.
    ///
    /// # Errors
    /// Returns a [`MultiscaleMetadataError`] if there are no datasets or a dataset does not have exactly one scale followed by one translation with a value per axis.
    pub fn validate(&self) -> Result<(), MultiscaleMetadataError> {
        if self.datasets.is_empty() {
            return Err(MultiscaleMetadataError::NoDatasets(self.name.clone()));
        }
        let num_axes = self.axes.len();
        for dataset in &self.datasets {
            match dataset.coordinate_transformations.as_slice() {
                [CoordinateTransformation::Scale { .. }, CoordinateTransformation::Translation { .. }] => {}
                _ => {
                    return Err(MultiscaleMetadataError::InvalidTransformations(
                        dataset.path.clone(),
                    ))
                }
            }
            for transformation in &dataset.coordinate_transformations {
                let len = transformation.values().len();
                if len != num_axes {
                    return Err(MultiscaleMetadataError::InvalidTransformationLength {
                        path: dataset.path.clone(),
                        length: len,
                        num_axes,
                    });
                }
            }
        }
        Ok(())
    }
}

/// The multiscale attributes of an image group.
///
/// Serialised under the [`MULTISCALES_KEY`] key of the group attributes:
/// ```json
/// {"multiscales": [{"version": "0.4", "name": "image", "axes": [...], "datasets": [...]}]}
/// ```
#[derive(Serialize, Deserialize, Clone, PartialEq, Debug, Default)]
pub struct MultiscalesAttributes {
    /// Multiscale metadata for each image variable.
    pub multiscales: Vec<MultiscaleMetadata>,
}

impl MultiscalesAttributes {
    /// Create new multiscale attributes.
    #[must_use]
    pub fn new(multiscales: Vec<MultiscaleMetadata>) -> Self {
        Self { multiscales }
    }

    /// Validate every multiscale.
    ///
    /// # Errors
    /// Returns a [`MultiscaleMetadataError`] if any multiscale is invalid.
    pub fn validate(&self) -> Result<(), MultiscaleMetadataError> {
        self.multiscales
            .iter()
            .try_for_each(MultiscaleMetadata::validate)
    }

    /// Return the multiscale metadata of the image variable `name`.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&MultiscaleMetadata> {
        self.multiscales
            .iter()
            .find(|multiscale| multiscale.name == name)
    }

    /// Convert to group attributes.
    ///
    /// # Errors
    /// Returns [`MultiscaleMetadataError::Serde`] if the metadata cannot be serialised.
    pub fn to_attributes(&self) -> Result<Map<String, Value>, MultiscaleMetadataError> {
        let value = serde_json::to_value(self)
            .map_err(|err| MultiscaleMetadataError::Serde(err.to_string()))?;
        match value {
            Value::Object(attributes) => Ok(attributes),
            _ => Err(MultiscaleMetadataError::Serde(
                "multiscale attributes must serialise to an object".to_string(),
            )),
        }
    }

    /// Parse and validate the multiscale attributes of group `attributes`.
    ///
    /// Attributes other than [`MULTISCALES_KEY`] are ignored.
    ///
    /// # Errors
    /// Returns a [`MultiscaleMetadataError`] if the attribute is missing, cannot be parsed, or is invalid.
    pub fn from_attributes(
        attributes: &Map<String, Value>,
    ) -> Result<Self, MultiscaleMetadataError> {
        let multiscales = attributes
            .get(MULTISCALES_KEY)
            .ok_or(MultiscaleMetadataError::Missing)?;
        let multiscales: Vec<MultiscaleMetadata> = serde_json::from_value(multiscales.clone())
            .map_err(|err| MultiscaleMetadataError::Serde(err.to_string()))?;
        let attributes = Self::new(multiscales);
        attributes.validate()?;
        Ok(attributes)
    }
}

/// A multiscale metadata error.
#[derive(Clone, Debug, Error)]
pub enum MultiscaleMetadataError {
    /// The `multiscales` attribute is missing.
    #[error("the `multiscales` attribute is missing")]
    Missing,
    /// The metadata could not be serialised or deserialised.
    #[error("invalid multiscale metadata: {_0}")]
    Serde(String),
    /// A multiscale has no datasets.
    #[error("multiscale `{_0}` has no datasets")]
    NoDatasets(String),
    /// A dataset does not have a scale followed by a translation.
    #[error("dataset `{_0}` must have a scale transformation followed by a translation transformation")]
    InvalidTransformations(String),
    /// A transformation does not have a value per axis.
    #[error("dataset `{path}` has a transformation with {length} values, expected {num_axes}")]
    InvalidTransformationLength {
        /// The dataset path.
        path: String,
        /// The number of transformation values.
        length: usize,
        /// The number of axes.
        num_axes: usize,
    },
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::{AxisType, AxisVocabulary};

    fn example() -> MultiscalesAttributes {
        let vocabulary = AxisVocabulary::default();
        let units = json!({"units": "micrometer"}).as_object().unwrap().clone();
        MultiscalesAttributes::new(vec![MultiscaleMetadata::new(
            "image",
            vec![
                vocabulary.axis_metadata("t", &Map::default()),
                vocabulary.axis_metadata("y", &units),
                vocabulary.axis_metadata("x", &units),
            ],
            vec![
                DatasetMetadata::new("0/image", vec![1.0, 1.0, 1.0], vec![0.0, 0.0, 0.0]),
                DatasetMetadata::new("1/image", vec![1.0, 2.0, 2.0], vec![0.0, 0.0, 0.0]),
            ],
        )])
    }

    #[test]
    fn multiscales_attributes_layout() {
        let attributes = example().to_attributes().unwrap();
        let expected = json!({
            "multiscales": [{
                "version": "0.4",
                "name": "image",
                "axes": [
                    {"name": "t", "type": "time"},
                    {"name": "y", "type": "space", "unit": "micrometer"},
                    {"name": "x", "type": "space", "unit": "micrometer"}
                ],
                "datasets": [
                    {
                        "path": "0/image",
                        "coordinateTransformations": [
                            {"type": "scale", "scale": [1.0, 1.0, 1.0]},
                            {"type": "translation", "translation": [0.0, 0.0, 0.0]}
                        ]
                    },
                    {
                        "path": "1/image",
                        "coordinateTransformations": [
                            {"type": "scale", "scale": [1.0, 2.0, 2.0]},
                            {"type": "translation", "translation": [0.0, 0.0, 0.0]}
                        ]
                    }
                ]
            }]
        });
        assert_eq!(Value::Object(attributes), expected);
    }

    #[test]
    fn multiscales_attributes_from_attributes() {
        let attributes = example().to_attributes().unwrap();
        let parsed = MultiscalesAttributes::from_attributes(&attributes).unwrap();
        assert_eq!(parsed, example());
        let image = parsed.get("image").unwrap();
        assert_eq!(image.axes[0].axis_type, AxisType::Time);
        assert_eq!(image.datasets[1].scale(), Some([1.0, 2.0, 2.0].as_slice()));
        assert_eq!(image.datasets[1].translation(), Some([0.0; 3].as_slice()));
        assert!(parsed.get("labels").is_none());
    }

    #[test]
    fn multiscales_attributes_missing() {
        assert!(matches!(
            MultiscalesAttributes::from_attributes(&Map::default()),
            Err(MultiscaleMetadataError::Missing)
        ));
    }

    #[test]
    fn multiscales_attributes_invalid_version() {
        let mut attributes = example().to_attributes().unwrap();
        attributes["multiscales"][0]["version"] = json!("0.5");
        assert!(matches!(
            MultiscalesAttributes::from_attributes(&attributes),
            Err(MultiscaleMetadataError::Serde(_))
        ));
    }

    #[test]
    fn multiscale_metadata_validate() {
        let mut attributes = example();
        attributes.multiscales[0].datasets[1] =
            DatasetMetadata::new("1/image", vec![1.0, 2.0], vec![0.0, 0.0, 0.0]);
        assert!(matches!(
            attributes.validate(),
            Err(MultiscaleMetadataError::InvalidTransformationLength {
                length: 2,
                num_axes: 3,
                ..
            })
        ));

        attributes.multiscales[0].datasets[1]
            .coordinate_transformations
            .reverse();
        assert!(matches!(
            attributes.validate(),
            Err(MultiscaleMetadataError::InvalidTransformations(_))
        ));

        attributes.multiscales[0].datasets.clear();
        assert!(matches!(
            attributes.validate(),
            Err(MultiscaleMetadataError::NoDatasets(_))
        ));
    }
}
