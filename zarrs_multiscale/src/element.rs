use zarrs::array::{DataType, Element, ElementOwned, FillValue, data_type};

/// A floating point element of a spatial image.
///
/// Block means are computed in the element type, so only floating point elements are supported.
/// Implemented for [`f32`] and [`f64`].
pub trait ImageElement:
    Element
    + ElementOwned
    + num::Float
    + num::FromPrimitive
    + std::fmt::Debug
    + Send
    + Sync
    + 'static
{
    /// The Zarr data type of the element.
    fn data_type() -> DataType;

    /// The fill value of stored arrays.
    fn fill_value() -> FillValue;
}

impl ImageElement for f32 {
    fn data_type() -> DataType {
        data_type::float32()
    }

    fn fill_value() -> FillValue {
        FillValue::from(0.0f32)
    }
}

impl ImageElement for f64 {
    fn data_type() -> DataType {
        data_type::float64()
    }

    fn fill_value() -> FillValue {
        FillValue::from(0.0f64)
    }
}
