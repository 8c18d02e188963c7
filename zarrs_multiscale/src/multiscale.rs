//! The multiscale spatial image container.

use std::ops::Index;

use serde_json::{Map, Value};
use zarrs_multiscale_metadata::{
    AxisVocabulary, DatasetMetadata, MultiscaleMetadata, MultiscalesAttributes,
    coordinate_transformations,
};

use crate::{Dataset, ImageElement, MultiscaleError};

/// The default name of the root of a [`MultiscaleSpatialImage`].
pub const DEFAULT_MULTISCALE_NAME: &str = "multiscales";

/// A resolution level of a [`MultiscaleSpatialImage`].
#[derive(Clone, PartialEq, Debug)]
pub struct ScaleNode<T> {
    name: String,
    dataset: Dataset<T>,
}

impl<T> ScaleNode<T> {
    /// The level name, its index as a string.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The level dataset.
    #[must_use]
    pub const fn dataset(&self) -> &Dataset<T> {
        &self.dataset
    }
}

/// A multi-resolution representation of a spatial image.
///
/// The root has a child per resolution level, named by its index (`"0"`, `"1"`, ...) from the highest to the lowest resolution.
/// Every level holds a dataset with the same variable names and dimension labels.
///
/// A three level pyramid of an `image` variable has the layout:
/// ```text
/// multiscales/0/image
/// multiscales/1/image
/// multiscales/2/image
/// ```
#[derive(Clone, PartialEq, Debug)]
pub struct MultiscaleSpatialImage<T> {
    name: String,
    pub(crate) attributes: Map<String, Value>,
    children: Vec<ScaleNode<T>>,
    axis_vocabulary: Option<AxisVocabulary>,
}

impl<T: ImageElement> MultiscaleSpatialImage<T> {
    /// Create a multiscale spatial image from resolution `levels`, ordered from the highest to the lowest resolution.
    ///
    /// # Errors
    /// Returns [`MultiscaleError::InvalidLevels`] if `levels` is empty or a level does not have the variable names and dimension labels of the first level.
    pub fn from_levels(
        name: impl Into<String>,
        levels: Vec<Dataset<T>>,
    ) -> Result<Self, MultiscaleError> {
        let Some(first) = levels.first() else {
            return Err(MultiscaleError::InvalidLevels(
                "a multiscale image must have at least one level".to_string(),
            ));
        };
        for (index, level) in levels.iter().enumerate().skip(1) {
            let consistent = level.len() == first.len()
                && level.variables().iter().zip(first.variables()).all(
                    |(variable, expected)| {
                        variable.name() == expected.name() && variable.dims() == expected.dims()
                    },
                );
            if !consistent {
                return Err(MultiscaleError::InvalidLevels(format!(
                    "level {index} does not have the variables and dimensions of level 0"
                )));
            }
        }
        let children = levels
            .into_iter()
            .enumerate()
            .map(|(index, dataset)| ScaleNode {
                name: index.to_string(),
                dataset,
            })
            .collect();
        Ok(Self {
            name: name.into(),
            attributes: Map::default(),
            children,
            axis_vocabulary: None,
        })
    }

    /// The root name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The resolution levels, from the highest to the lowest resolution.
    #[must_use]
    pub fn children(&self) -> &[ScaleNode<T>] {
        &self.children
    }

    /// The resolution level `name`.
    #[must_use]
    pub fn child(&self, name: &str) -> Option<&ScaleNode<T>> {
        self.children.iter().find(|child| child.name == name)
    }

    /// The number of resolution levels.
    #[must_use]
    pub fn len(&self) -> usize {
        self.children.len()
    }

    /// Always false, there is at least one resolution level.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    /// The root attributes.
    ///
    /// These are replaced with multiscale metadata when the image is stored.
    #[must_use]
    pub const fn attributes(&self) -> &Map<String, Value> {
        &self.attributes
    }

    /// Mutably borrow the root attributes.
    #[must_use]
    pub fn attributes_mut(&mut self) -> &mut Map<String, Value> {
        &mut self.attributes
    }

    /// The axis vocabulary used to classify axes when the image is stored.
    ///
    /// If [`None`], the axis vocabulary of the global configuration is used.
    #[must_use]
    pub const fn axis_vocabulary(&self) -> Option<&AxisVocabulary> {
        self.axis_vocabulary.as_ref()
    }

    /// Set the axis vocabulary used to classify axes when the image is stored.
    pub fn set_axis_vocabulary(&mut self, axis_vocabulary: Option<AxisVocabulary>) -> &mut Self {
        self.axis_vocabulary = axis_vocabulary;
        self
    }

    /// Set the axis vocabulary used to classify axes when the image is stored.
    #[must_use]
    pub fn with_axis_vocabulary(mut self, axis_vocabulary: Option<AxisVocabulary>) -> Self {
        self.axis_vocabulary = axis_vocabulary;
        self
    }

    /// Derive the OME-NGFF multiscale metadata of every variable.
    ///
    /// Axes are taken from the dimension labels of the first level and classified with `vocabulary`.
    /// The scale and translation of each level are derived from its coordinates.
    #[must_use]
    pub fn ngff_metadata(&self, vocabulary: &AxisVocabulary) -> MultiscalesAttributes {
        let first = &self.children[0].dataset;
        let multiscales = first
            .variables()
            .iter()
            .map(|variable| {
                let axes = variable
                    .coords()
                    .iter()
                    .map(|coord| vocabulary.axis_metadata(coord.name(), coord.attributes()))
                    .collect();
                let datasets = self
                    .children
                    .iter()
                    .filter_map(|child| {
                        let image = child.dataset.variable(variable.name())?;
                        let (scale, translation) = coordinate_transformations(
                            image.coords().iter().map(crate::Coordinate::values),
                        );
                        Some(DatasetMetadata::new(
                            format!("{}/{}", child.name, variable.name()),
                            scale,
                            translation,
                        ))
                    })
                    .collect();
                MultiscaleMetadata::new(variable.name(), axes, datasets)
            })
            .collect();
        MultiscalesAttributes::new(multiscales)
    }
}

impl<T: ImageElement> Index<&str> for MultiscaleSpatialImage<T> {
    type Output = ScaleNode<T>;

    fn index(&self, name: &str) -> &Self::Output {
        self.child(name)
            .unwrap_or_else(|| panic!("multiscale image has no level `{name}`"))
    }
}

#[cfg(test)]
mod tests {
    use ndarray::{ArrayD, IxDyn};
    use serde_json::json;
    use zarrs_multiscale_metadata::AxisType;

    use super::*;
    use crate::SpatialImage;

    fn level(name: &str, len: usize, scale: f64) -> Dataset<f64> {
        let mut image =
            SpatialImage::new(name, ArrayD::zeros(IxDyn(&[2, len, len])), ["c", "y", "x"]).unwrap();
        image
            .set_scale_translation("y", scale, 0.5)
            .unwrap()
            .set_scale_translation("x", scale, 0.0)
            .unwrap()
            .set_unit("x", "units", "micrometer")
            .unwrap();
        Dataset::from(image)
    }

    #[test]
    fn multiscale_from_levels() {
        let multiscale = MultiscaleSpatialImage::from_levels(
            DEFAULT_MULTISCALE_NAME,
            vec![level("image", 8, 1.0), level("image", 4, 2.0)],
        )
        .unwrap();
        assert_eq!(multiscale.name(), "multiscales");
        assert_eq!(multiscale.len(), 2);
        assert!(!multiscale.is_empty());
        assert_eq!(
            multiscale
                .children()
                .iter()
                .map(ScaleNode::name)
                .collect::<Vec<_>>(),
            vec!["0", "1"]
        );
        assert_eq!(multiscale["1"].dataset()["image"].shape(), vec![2, 4, 4]);
        assert!(multiscale.child("2").is_none());
        assert!(multiscale.axis_vocabulary().is_none());
    }

    #[test]
    fn multiscale_from_levels_invalid() {
        assert!(matches!(
            MultiscaleSpatialImage::<f64>::from_levels("multiscales", vec![]),
            Err(MultiscaleError::InvalidLevels(_))
        ));
        assert!(matches!(
            MultiscaleSpatialImage::from_levels(
                "multiscales",
                vec![level("image", 8, 1.0), level("labels", 4, 2.0)]
            ),
            Err(MultiscaleError::InvalidLevels(_))
        ));
    }

    #[test]
    fn multiscale_ngff_metadata() {
        let mut multiscale = MultiscaleSpatialImage::from_levels(
            "multiscales",
            vec![level("image", 8, 1.0), level("image", 4, 2.0)],
        )
        .unwrap();
        multiscale
            .attributes_mut()
            .insert("foo".to_string(), json!("bar"));
        let metadata = multiscale.ngff_metadata(&AxisVocabulary::default());
        metadata.validate().unwrap();
        let image = metadata.get("image").unwrap();
        assert_eq!(image.axes[0].axis_type, AxisType::Channel);
        assert_eq!(image.axes[2].unit.as_deref(), Some("micrometer"));
        assert!(image.axes[1].unit.is_none());
        assert_eq!(image.datasets.len(), 2);
        assert_eq!(image.datasets[1].path, "1/image");
        assert_eq!(image.datasets[1].scale(), Some([1.0, 2.0, 2.0].as_slice()));
        assert_eq!(
            image.datasets[1].translation(),
            Some([0.0, 0.5, 0.0].as_slice())
        );
    }
}
