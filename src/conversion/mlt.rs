//! Magnetic local time.
//!
//! MLT follows from the magnetic longitude and the time alone, so none of the
//! location policies apply here. The calculation is the AACGM-V2.4 one rather
//! than the older Laundal et al. (2016) formulation.
use crate::conversion::broadcast::Field;
use crate::engine::FieldEngine;
use crate::error::AacgmError;
use crate::utils::time::{normalize_time, TimeInput};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MltDirection {
    /// Magnetic longitude (degrees E) to MLT (hours)
    #[default]
    MagneticToMlt,
    /// MLT (hours) to magnetic longitude (degrees E)
    MltToMagnetic,
}

pub struct MltConverter<'a, E: FieldEngine> {
    engine: &'a mut E,
}

impl<'a, E: FieldEngine> MltConverter<'a, E> {
    pub fn new(engine: &'a mut E) -> MltConverter<'a, E> {
        MltConverter { engine }
    }

    /// Converts every value of `values` in the given direction. A scalar (or
    /// zero-dimensional array) comes back as a scalar, an array keeps its shape.
    ///
    /// # Errors
    /// Will return `Err` if the time cannot be understood.
    pub fn convert(
        &mut self,
        values: impl Into<Field>,
        time: impl Into<TimeInput>,
        direction: MltDirection,
    ) -> Result<Field, AacgmError> {
        let time = normalize_time(time)?;
        let values: Field = values.into();
        let engine = &mut *self.engine;
        let out = values.mapv(|v| match direction {
            MltDirection::MagneticToMlt => engine.magnetic_to_mlt(&time, v),
            MltDirection::MltToMagnetic => engine.mlt_to_magnetic(&time, v),
        });
        Ok(match out.as_scalar() {
            Some(v) => Field::Scalar(v),
            None => out,
        })
    }

    /// # Errors
    /// Will return `Err` if the time cannot be understood.
    pub fn magnetic_to_mlt(
        &mut self,
        mlon: impl Into<Field>,
        time: impl Into<TimeInput>,
    ) -> Result<Field, AacgmError> {
        self.convert(mlon, time, MltDirection::MagneticToMlt)
    }

    /// # Errors
    /// Will return `Err` if the time cannot be understood.
    pub fn mlt_to_magnetic(
        &mut self,
        mlt: impl Into<Field>,
        time: impl Into<TimeInput>,
    ) -> Result<Field, AacgmError> {
        self.convert(mlt, time, MltDirection::MltToMagnetic)
    }
}
