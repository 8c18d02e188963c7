use std::collections::HashSet;
use std::ops::Index;

use crate::{DatasetCreateError, ImageElement, SpatialImage};

/// An ordered collection of spatial image variables, addressed by name.
///
/// Each resolution level of a multiscale image holds a dataset with a single variable named after the image.
#[derive(Clone, PartialEq, Debug)]
pub struct Dataset<T> {
    variables: Vec<SpatialImage<T>>,
}

impl<T: ImageElement> Dataset<T> {
    /// Create a new dataset from `variables`.
    ///
    /// # Errors
    /// Returns a [`DatasetCreateError`] if `variables` is empty or a variable name is repeated.
    pub fn new(variables: Vec<SpatialImage<T>>) -> Result<Self, DatasetCreateError> {
        if variables.is_empty() {
            return Err(DatasetCreateError::Empty);
        }
        let mut seen = HashSet::with_capacity(variables.len());
        if let Some(variable) = variables.iter().find(|v| !seen.insert(v.name())) {
            return Err(DatasetCreateError::DuplicateVariable(
                variable.name().to_string(),
            ));
        }
        Ok(Self { variables })
    }

    /// Get the variables.
    #[must_use]
    pub fn variables(&self) -> &[SpatialImage<T>] {
        &self.variables
    }

    /// Get the variable `name`.
    #[must_use]
    pub fn variable(&self, name: &str) -> Option<&SpatialImage<T>> {
        self.variables.iter().find(|v| v.name() == name)
    }

    /// Mutably borrow the variable `name`.
    #[must_use]
    pub fn variable_mut(&mut self, name: &str) -> Option<&mut SpatialImage<T>> {
        self.variables.iter_mut().find(|v| v.name() == name)
    }

    /// Return an iterator over the variable names.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.variables.iter().map(SpatialImage::name)
    }

    /// The first variable. A dataset always has at least one.
    #[must_use]
    pub fn first(&self) -> &SpatialImage<T> {
        &self.variables[0]
    }

    /// Get the number of variables.
    #[must_use]
    pub fn len(&self) -> usize {
        self.variables.len()
    }

    /// Always false, a dataset has at least one variable.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.variables.is_empty()
    }
}

impl<T> From<SpatialImage<T>> for Dataset<T> {
    fn from(image: SpatialImage<T>) -> Self {
        Self {
            variables: vec![image],
        }
    }
}

impl<T: ImageElement> Index<&str> for Dataset<T> {
    type Output = SpatialImage<T>;

    fn index(&self, name: &str) -> &Self::Output {
        self.variable(name)
            .unwrap_or_else(|| panic!("dataset has no variable `{name}`"))
    }
}
