//! Conversion between geographic locations and Altitude-Adjusted Corrected
//! Geomagnetic (AACGM) coordinates, and between magnetic longitude and
//! magnetic local time.
//!
//! The field model itself lives behind [`engine::FieldEngine`]; this crate
//! decides whether an input is sensible, encodes the conversion options,
//! lines up scalar and array inputs, and turns engine failures into either
//! errors or missing values.
pub mod conversion;
pub mod engine;
pub mod error;
pub mod utils;

#[cfg(feature = "python")]
mod python;

pub use conversion::{
    Aacgm, BatchConversion, Conversion, ConverterConfig, DecodeMode, Field, MagneticCoord,
    MagneticCoords, MethodCode, MethodSpec, MltDirection,
};
pub use engine::{EpochClock, FieldEngine};
pub use error::{AacgmError, EngineError};
pub use utils::time::{normalize_time, TimeInput, Timestamp};
