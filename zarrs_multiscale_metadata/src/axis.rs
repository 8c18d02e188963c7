//! Axis metadata and axis classification.
//!
//! See <https://ngff.openmicroscopy.org/0.4/#axes-md>.

use derive_more::Display;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// The type of an axis.
#[derive(Serialize, Deserialize, Clone, Copy, Eq, PartialEq, Hash, Debug, Display)]
#[serde(rename_all = "lowercase")]
pub enum AxisType {
    /// A spatial axis.
    #[display("space")]
    Space,
    /// A time axis.
    #[display("time")]
    Time,
    /// A channel axis.
    #[display("channel")]
    Channel,
}

/// An element of the `axes` field of multiscale metadata.
///
/// For example:
/// ```json
/// {"name": "x", "type": "space", "unit": "micrometer"}
/// ```
#[derive(Serialize, Deserialize, Clone, Eq, PartialEq, Debug)]
pub struct AxisMetadata {
    /// The axis name.
    pub name: String,
    /// The axis type.
    #[serde(rename = "type")]
    pub axis_type: AxisType,
    /// The physical unit of the axis, if known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
}

impl AxisMetadata {
    /// Create new axis metadata.
    #[must_use]
    pub fn new(name: impl Into<String>, axis_type: AxisType, unit: Option<String>) -> Self {
        Self {
            name: name.into(),
            axis_type,
            unit,
        }
    }
}

/// The reserved axis labels used to classify dimensions.
///
/// The default vocabulary is `x`, `y`, `z` (spatial, with `z` as the depth axis), `t` (time) and `c` (channel), with physical units read from the `units` coordinate attribute.
/// Substitute a vocabulary to support other axis naming conventions.
#[derive(Clone, Eq, PartialEq, Debug)]
pub struct AxisVocabulary {
    spatial: Vec<String>,
    depth: String,
    time: String,
    channel: String,
    unit_key: String,
}

impl Default for AxisVocabulary {
    fn default() -> Self {
        Self {
            spatial: vec!["x".to_string(), "y".to_string(), "z".to_string()],
            depth: "z".to_string(),
            time: "t".to_string(),
            channel: "c".to_string(),
            unit_key: "units".to_string(),
        }
    }
}

impl AxisVocabulary {
    /// Classify an axis label.
    ///
    /// Labels equal to the time or channel token are [`AxisType::Time`] and [`AxisType::Channel`] respectively.
    /// Every other label, recognised or not, is [`AxisType::Space`].
    #[must_use]
    pub fn classify(&self, label: &str) -> AxisType {
        if label == self.time {
            AxisType::Time
        } else if label == self.channel {
            AxisType::Channel
        } else {
            AxisType::Space
        }
    }

    /// Return the unit annotation in coordinate `attributes`, if present.
    ///
    /// Empty strings and non-string values are not units.
    #[must_use]
    pub fn unit(&self, attributes: &Map<String, Value>) -> Option<String> {
        match attributes.get(&self.unit_key) {
            Some(Value::String(unit)) if !unit.is_empty() => Some(unit.clone()),
            _ => None,
        }
    }

    /// Create the [`AxisMetadata`] of an axis with coordinate `attributes`.
    #[must_use]
    pub fn axis_metadata(&self, label: &str, attributes: &Map<String, Value>) -> AxisMetadata {
        AxisMetadata::new(label, self.classify(label), self.unit(attributes))
    }

    /// Returns true if `label` is a spatial token.
    ///
    /// Uniform scale factors only apply to dimensions with a spatial token.
    #[must_use]
    pub fn is_spatial(&self, label: &str) -> bool {
        self.spatial.iter().any(|spatial| spatial == label)
    }

    /// Returns true if `label` is the depth token.
    #[must_use]
    pub fn is_depth(&self, label: &str) -> bool {
        label == self.depth
    }

    /// Returns true if `label` is the time token.
    #[must_use]
    pub fn is_time(&self, label: &str) -> bool {
        label == self.time
    }

    /// Get the spatial tokens.
    #[must_use]
    pub fn spatial(&self) -> &[String] {
        &self.spatial
    }

    /// Set the spatial tokens.
    pub fn set_spatial(&mut self, spatial: Vec<String>) -> &mut Self {
        self.spatial = spatial;
        self
    }

    /// Get the depth token.
    #[must_use]
    pub fn depth(&self) -> &str {
        &self.depth
    }

    /// Set the depth token.
    pub fn set_depth(&mut self, depth: impl Into<String>) -> &mut Self {
        self.depth = depth.into();
        self
    }

    /// Get the time token.
    #[must_use]
    pub fn time(&self) -> &str {
        &self.time
    }

    /// Set the time token.
    pub fn set_time(&mut self, time: impl Into<String>) -> &mut Self {
        self.time = time.into();
        self
    }

    /// Get the channel token.
    #[must_use]
    pub fn channel(&self) -> &str {
        &self.channel
    }

    /// Set the channel token.
    pub fn set_channel(&mut self, channel: impl Into<String>) -> &mut Self {
        self.channel = channel.into();
        self
    }

    /// Get the coordinate attribute key holding the physical unit.
    #[must_use]
    pub fn unit_key(&self) -> &str {
        &self.unit_key
    }

    /// Set the coordinate attribute key holding the physical unit.
    pub fn set_unit_key(&mut self, unit_key: impl Into<String>) -> &mut Self {
        self.unit_key = unit_key.into();
        self
    }
}
