#![allow(missing_docs)]

use std::sync::Arc;

use ndarray::{ArrayD, IxDyn};
use serial_test::serial;
use zarrs::group::Group;
use zarrs::storage::{StorePrefix, WritableStorageTraits};
use zarrs::storage::store::MemoryStore;

use zarrs_multiscale::config::{Config, global_config_mut};
use zarrs_multiscale::metadata::{AxisType, AxisVocabulary, MultiscalesAttributes};
use zarrs_multiscale::{
    Methods, MultiscaleSpatialImage, ScaleFactor, SpatialImage, ToMultiscaleOptions,
    WriteOptions, to_multiscale, to_multiscale_opt,
};

fn vocabulary() -> AxisVocabulary {
    let mut vocabulary = AxisVocabulary::default();
    vocabulary
        .set_spatial(vec!["plane".to_string(), "row".to_string(), "col".to_string()])
        .set_depth("plane")
        .set_time("time")
        .set_channel("channel")
        .set_unit_key("unit");
    vocabulary
}

fn image() -> SpatialImage<f32> {
    let mut image = SpatialImage::new(
        "image",
        ArrayD::<f32>::zeros(IxDyn(&[2, 3, 16, 16])),
        ["time", "channel", "row", "col"],
    )
    .unwrap();
    image
        .set_unit("row", "unit", "micrometer")
        .unwrap()
        .set_unit("col", "unit", "micrometer")
        .unwrap();
    image
}

#[test]
#[serial]
fn config_axis_vocabulary() -> Result<(), Box<dyn std::error::Error>> {
    global_config_mut().set_axis_vocabulary(vocabulary());

    let multiscale = to_multiscale(
        &image(),
        &[ScaleFactor::Uniform(2)],
        Methods::BlockMean,
        None,
    );
    global_config_mut().set_axis_vocabulary(AxisVocabulary::default());
    let mut multiscale = multiscale?;
    assert_eq!(
        multiscale["1"].dataset()["image"].shape(),
        vec![2, 3, 8, 8]
    );

    let store = Arc::new(MemoryStore::new());
    global_config_mut().set_axis_vocabulary(vocabulary());
    let stored = multiscale.to_zarr(&store, &WriteOptions::default());
    global_config_mut().set_axis_vocabulary(AxisVocabulary::default());
    stored?;

    let root = Group::open(store.clone(), "/")?;
    let metadata = MultiscalesAttributes::from_attributes(root.attributes())?;
    let axes = &metadata.get("image").unwrap().axes;
    let axis_types: Vec<_> = axes.iter().map(|axis| axis.axis_type).collect();
    assert_eq!(
        axis_types,
        [
            AxisType::Time,
            AxisType::Channel,
            AxisType::Space,
            AxisType::Space
        ]
    );
    assert_eq!(axes[0].unit, None);
    assert_eq!(axes[3].unit.as_deref(), Some("micrometer"));

    let reopened = MultiscaleSpatialImage::<f32>::open(&store)?;
    assert_eq!(
        reopened["1"].dataset()["image"].dims(),
        multiscale["1"].dataset()["image"].dims()
    );
    Ok(())
}

#[test]
#[serial]
fn config_axis_vocabulary_option() -> Result<(), Box<dyn std::error::Error>> {
    // The default vocabulary does not know `row` and `col`, so neither are reduced
    let multiscale = to_multiscale(
        &image(),
        &[ScaleFactor::Uniform(2)],
        Methods::BlockMean,
        None,
    )?;
    assert_eq!(
        multiscale["1"].dataset()["image"].shape(),
        vec![2, 3, 16, 16]
    );

    let options = ToMultiscaleOptions::default().with_axis_vocabulary(Some(vocabulary()));
    let multiscale = to_multiscale_opt(&image(), &[ScaleFactor::Uniform(2)], &options)?;
    assert_eq!(
        multiscale["1"].dataset()["image"].shape(),
        vec![2, 3, 8, 8]
    );
    Ok(())
}

#[test]
#[serial]
fn config_axis_vocabulary_option_persisted() -> Result<(), Box<dyn std::error::Error>> {
    let options = ToMultiscaleOptions::default().with_axis_vocabulary(Some(vocabulary()));
    let mut multiscale = to_multiscale_opt(&image(), &[ScaleFactor::Uniform(2)], &options)?;
    assert_eq!(multiscale.axis_vocabulary(), Some(&vocabulary()));

    // The global vocabulary is the default and is not used
    let store = Arc::new(MemoryStore::new());
    multiscale.to_zarr(&store, &WriteOptions::default())?;
    let root = Group::open(store.clone(), "/")?;
    let metadata = MultiscalesAttributes::from_attributes(root.attributes())?;
    let axes = &metadata.get("image").unwrap().axes;
    let axis_types: Vec<_> = axes.iter().map(|axis| axis.axis_type).collect();
    assert_eq!(
        axis_types,
        [
            AxisType::Time,
            AxisType::Channel,
            AxisType::Space,
            AxisType::Space
        ]
    );
    assert_eq!(axes[2].unit.as_deref(), Some("micrometer"));

    // Coordinates without a stored array are derived with the unit key of the vocabulary
    for level in ["0", "1"] {
        store.erase_prefix(&StorePrefix::new(format!("{level}/col/"))?)?;
    }
    let reopened = MultiscaleSpatialImage::<f32>::open_opt(&store, Some(vocabulary()))?;
    assert_eq!(reopened.axis_vocabulary(), Some(&vocabulary()));
    let col = reopened["1"].dataset()["image"].coord("col").unwrap();
    assert_eq!(
        col.values(),
        multiscale["1"].dataset()["image"].coord("col").unwrap().values()
    );
    assert_eq!(col.attributes()["unit"], "micrometer");

    let reopened = MultiscaleSpatialImage::<f32>::open(&store)?;
    assert!(reopened.axis_vocabulary().is_none());
    let col = reopened["1"].dataset()["image"].coord("col").unwrap();
    assert_eq!(col.attributes()["units"], "micrometer");
    Ok(())
}

#[test]
#[serial]
fn config_default_chunk_extent() -> Result<(), Box<dyn std::error::Error>> {
    global_config_mut()
        .set_default_chunk_extent_planar(4)
        .set_default_chunk_extent_time(2);
    let options = ToMultiscaleOptions::default().with_axis_vocabulary(Some(vocabulary()));
    let multiscale = to_multiscale_opt(&image(), &[ScaleFactor::Uniform(2)], &options);
    *global_config_mut() = Config::default();

    let multiscale = multiscale?;
    assert_eq!(
        multiscale["0"].dataset()["image"].chunks(),
        Some([2, 3, 4, 4].as_slice())
    );
    assert_eq!(
        multiscale["1"].dataset()["image"].chunks(),
        Some([2, 3, 4, 4].as_slice())
    );
    Ok(())
}
