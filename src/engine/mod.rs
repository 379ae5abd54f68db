//! The field-model engine as this crate sees it.
//!
//! Field-line tracing and the coefficient expansion are done elsewhere; all
//! the conversion layer needs is the handful of primitives below. The engine
//! keeps its epoch in a single register that every call overwrites, so the
//! traits take `&mut self`: whoever sets the epoch holds the engine until the
//! matching conversions are done.
use crate::conversion::method::MethodCode;
use crate::conversion::point::Conversion;
use crate::error::EngineError;
use crate::utils::time::Timestamp;

#[cfg(feature = "native")]
pub mod native;

/// Owner of the engine's epoch register
pub trait EpochClock {
    /// Points the engine at `epoch` for every conversion until the next call.
    fn set_epoch(&mut self, epoch: &Timestamp) -> Result<(), EngineError>;
}

/// Conversion primitives of the engine
pub trait FieldEngine: EpochClock {
    /// Converts one location at the current epoch. `height` is in km; the
    /// third output is an altitude in km or a geocentric radius in Earth
    /// radii, depending on the direction.
    fn convert_point(
        &mut self,
        lat: f64,
        lon: f64,
        height: f64,
        code: MethodCode,
    ) -> Result<Conversion, EngineError>;

    /// Magnetic local time in hours of magnetic longitude `mlon` at `time`
    fn magnetic_to_mlt(&mut self, time: &Timestamp, mlon: f64) -> f64;

    /// Magnetic longitude in degrees of magnetic local time `mlt` at `time`
    fn mlt_to_magnetic(&mut self, time: &Timestamp, mlt: f64) -> f64;
}

impl<E: EpochClock + ?Sized> EpochClock for &mut E {
    fn set_epoch(&mut self, epoch: &Timestamp) -> Result<(), EngineError> {
        (**self).set_epoch(epoch)
    }
}

impl<E: FieldEngine + ?Sized> FieldEngine for &mut E {
    fn convert_point(
        &mut self,
        lat: f64,
        lon: f64,
        height: f64,
        code: MethodCode,
    ) -> Result<Conversion, EngineError> {
        (**self).convert_point(lat, lon, height, code)
    }

    fn magnetic_to_mlt(&mut self, time: &Timestamp, mlon: f64) -> f64 {
        (**self).magnetic_to_mlt(time, mlon)
    }

    fn mlt_to_magnetic(&mut self, time: &Timestamp, mlt: f64) -> f64 {
        (**self).mlt_to_magnetic(time, mlt)
    }
}
