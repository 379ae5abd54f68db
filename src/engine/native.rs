//! Binding to the AACGM-v2 C library.
//!
//! The library keeps its epoch in process-wide state, so there is exactly
//! one [`NativeEngine`] and it lives behind the mutex returned by [`engine`].
use crate::conversion::method::MethodCode;
use crate::conversion::point::Conversion;
use crate::conversion::{Aacgm, ConverterConfig};
use crate::engine::{EpochClock, FieldEngine};
use crate::error::EngineError;
use crate::utils::time::Timestamp;
use std::ffi::{c_double, c_int};
use std::sync::{Mutex, MutexGuard, PoisonError};

extern "C" {
    fn AACGM_v2_SetDateTime(
        year: c_int,
        month: c_int,
        day: c_int,
        hour: c_int,
        minute: c_int,
        second: c_int,
    ) -> c_int;

    fn AACGM_v2_Convert(
        in_lat: c_double,
        in_lon: c_double,
        height: c_double,
        out_lat: *mut c_double,
        out_lon: *mut c_double,
        r: *mut c_double,
        code: c_int,
    ) -> c_int;

    fn MLTConvertYMDHMS_v2(
        yr: c_int,
        mo: c_int,
        dy: c_int,
        hr: c_int,
        mt: c_int,
        sc: c_int,
        mlon: c_double,
    ) -> c_double;

    fn inv_MLTConvertYMDHMS_v2(
        yr: c_int,
        mo: c_int,
        dy: c_int,
        hr: c_int,
        mt: c_int,
        sc: c_int,
        mlt: c_double,
    ) -> c_double;
}

static ENGINE: Mutex<Aacgm<NativeEngine>> = Mutex::new(Aacgm::new(
    NativeEngine { _private: () },
    ConverterConfig::DEFAULT,
));

/// Locks the process-wide engine. Hold the guard across an epoch change and
/// the conversions that depend on it.
pub fn engine() -> MutexGuard<'static, Aacgm<NativeEngine>> {
    // the engine holds no invariants a panicking caller could have broken
    ENGINE.lock().unwrap_or_else(PoisonError::into_inner)
}

/// The C library's conversion routines
#[derive(Debug)]
pub struct NativeEngine {
    _private: (),
}

type Calendar = [c_int; 6];

fn calendar(time: &Timestamp) -> Result<Calendar, EngineError> {
    let field = |value: u32, name: &str| {
        c_int::try_from(value)
            .map_err(|_| EngineError::Calendar(format!("{name} {value} out of range")))
    };
    Ok([
        time.year(),
        field(time.month(), "month")?,
        field(time.day(), "day")?,
        field(time.hour(), "hour")?,
        field(time.minute(), "minute")?,
        field(time.second(), "second")?,
    ])
}

impl EpochClock for NativeEngine {
    fn set_epoch(&mut self, epoch: &Timestamp) -> Result<(), EngineError> {
        let [yr, mo, dy, hr, mt, sc] = calendar(epoch)?;
        // SAFETY: plain integer arguments; the library copies them into its own state
        let status = unsafe { AACGM_v2_SetDateTime(yr, mo, dy, hr, mt, sc) };
        if status != 0 {
            Err(EngineError::State(format!(
                "AACGM_v2_SetDateTime returned error code {status}"
            )))?
        }
        Ok(())
    }
}

impl FieldEngine for NativeEngine {
    fn convert_point(
        &mut self,
        lat: f64,
        lon: f64,
        height: f64,
        code: MethodCode,
    ) -> Result<Conversion, EngineError> {
        let mut out = Conversion::missing();
        // SAFETY: the output pointers refer to live, exclusively borrowed f64s
        let status = unsafe {
            AACGM_v2_Convert(
                lat,
                lon,
                height,
                &mut out.lat,
                &mut out.lon,
                &mut out.r,
                code.bits(),
            )
        };
        if status != 0 {
            Err(EngineError::Conversion(format!(
                "AACGM_v2_Convert returned error code {status}"
            )))?
        }
        Ok(out)
    }

    fn magnetic_to_mlt(&mut self, time: &Timestamp, mlon: f64) -> f64 {
        match calendar(time) {
            // SAFETY: plain value arguments
            Ok([yr, mo, dy, hr, mt, sc]) => unsafe {
                MLTConvertYMDHMS_v2(yr, mo, dy, hr, mt, sc, mlon)
            },
            Err(_) => f64::NAN,
        }
    }

    fn mlt_to_magnetic(&mut self, time: &Timestamp, mlt: f64) -> f64 {
        match calendar(time) {
            // SAFETY: plain value arguments
            Ok([yr, mo, dy, hr, mt, sc]) => unsafe {
                inv_MLTConvertYMDHMS_v2(yr, mo, dy, hr, mt, sc, mlt)
            },
            Err(_) => f64::NAN,
        }
    }
}
