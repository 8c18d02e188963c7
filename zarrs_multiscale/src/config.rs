//! `zarrs_multiscale` global configuration options.
//!
//! See [`Config`] for the list of options.

use std::sync::{OnceLock, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use zarrs_multiscale_metadata::AxisVocabulary;

/// Global configuration options for the `zarrs_multiscale` crate.
///
/// Retrieve the global [`Config`] with [`global_config`] and modify it with [`global_config_mut`].
///
/// ## Axis Vocabulary
/// > default: [`AxisVocabulary::default`] (`x`, `y`, `z`, `t`, `c`, unit key `units`)
///
/// The vocabulary used to classify dimension labels when a call does not supply its own.
///
/// ## Default Chunk Extent (Volumetric)
/// > default: `64`
///
/// The default chunk extent of every axis of an image with a depth axis.
///
/// ## Default Chunk Extent (Planar)
/// > default: `256`
///
/// The default chunk extent of every axis of an image without a depth axis.
///
/// ## Default Chunk Extent (Time)
/// > default: `1`
///
/// The default chunk extent of the time axis.
#[derive(Debug, Clone)]
pub struct Config {
    axis_vocabulary: AxisVocabulary,
    default_chunk_extent_volumetric: u64,
    default_chunk_extent_planar: u64,
    default_chunk_extent_time: u64,
}

#[allow(clippy::derivable_impls)]
impl Default for Config {
    fn default() -> Self {
        Self {
            axis_vocabulary: AxisVocabulary::default(),
            default_chunk_extent_volumetric: 64,
            default_chunk_extent_planar: 256,
            default_chunk_extent_time: 1,
        }
    }
}

impl Config {
    /// Get the [axis vocabulary](#axis-vocabulary) configuration.
    #[must_use]
    pub fn axis_vocabulary(&self) -> &AxisVocabulary {
        &self.axis_vocabulary
    }

    /// Set the [axis vocabulary](#axis-vocabulary) configuration.
    pub fn set_axis_vocabulary(&mut self, axis_vocabulary: AxisVocabulary) -> &mut Self {
        self.axis_vocabulary = axis_vocabulary;
        self
    }

    /// Get the [default chunk extent (volumetric)](#default-chunk-extent-volumetric) configuration.
    #[must_use]
    pub fn default_chunk_extent_volumetric(&self) -> u64 {
        self.default_chunk_extent_volumetric
    }

    /// Set the [default chunk extent (volumetric)](#default-chunk-extent-volumetric) configuration.
    pub fn set_default_chunk_extent_volumetric(&mut self, extent: u64) -> &mut Self {
        self.default_chunk_extent_volumetric = extent;
        self
    }

    /// Get the [default chunk extent (planar)](#default-chunk-extent-planar) configuration.
    #[must_use]
    pub fn default_chunk_extent_planar(&self) -> u64 {
        self.default_chunk_extent_planar
    }

    /// Set the [default chunk extent (planar)](#default-chunk-extent-planar) configuration.
    pub fn set_default_chunk_extent_planar(&mut self, extent: u64) -> &mut Self {
        self.default_chunk_extent_planar = extent;
        self
    }

    /// Get the [default chunk extent (time)](#default-chunk-extent-time) configuration.
    #[must_use]
    pub fn default_chunk_extent_time(&self) -> u64 {
        self.default_chunk_extent_time
    }

    /// Set the [default chunk extent (time)](#default-chunk-extent-time) configuration.
    pub fn set_default_chunk_extent_time(&mut self, extent: u64) -> &mut Self {
        self.default_chunk_extent_time = extent;
        self
    }
}

static CONFIG: OnceLock<RwLock<Config>> = OnceLock::new();

/// Returns a reference to the global `zarrs_multiscale` configuration.
///
/// A poisoned lock is recovered, the configuration has no invariants spanning fields.
pub fn global_config() -> RwLockReadGuard<'static, Config> {
    CONFIG
        .get_or_init(|| RwLock::new(Config::default()))
        .read()
        .unwrap_or_else(PoisonError::into_inner)
}

/// Returns a mutable reference to the global `zarrs_multiscale` configuration.
pub fn global_config_mut() -> RwLockWriteGuard<'static, Config> {
    CONFIG
        .get_or_init(|| RwLock::new(Config::default()))
        .write()
        .unwrap_or_else(PoisonError::into_inner)
}

#[cfg(test)]
mod tests {
    use serial_test::serial;

    use super::*;

    #[test]
    #[serial]
    fn config_default_chunk_extents() {
        assert_eq!(global_config().default_chunk_extent_volumetric(), 64);
        global_config_mut().set_default_chunk_extent_volumetric(32);
        assert_eq!(global_config().default_chunk_extent_volumetric(), 32);
        global_config_mut().set_default_chunk_extent_volumetric(64);
        assert_eq!(global_config().default_chunk_extent_planar(), 256);
        assert_eq!(global_config().default_chunk_extent_time(), 1);
    }

    #[test]
    #[serial]
    fn config_axis_vocabulary() {
        let mut vocabulary = AxisVocabulary::default();
        vocabulary.set_channel("channel");
        global_config_mut().set_axis_vocabulary(vocabulary.clone());
        assert_eq!(global_config().axis_vocabulary(), &vocabulary);
        global_config_mut().set_axis_vocabulary(AxisVocabulary::default());
        assert_eq!(global_config().axis_vocabulary().channel(), "c");
    }
}
