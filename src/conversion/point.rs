//! Validated conversion of single locations and batches of locations.
use crate::conversion::broadcast::{broadcast, Field, PointArrays};
use crate::conversion::method::{MethodCode, MethodSpec};
use crate::conversion::validation::{
    nan_max, normalize_longitude, normalize_longitude_arr, validate_height, validate_latitude,
    validate_latitude_arr,
};
use crate::conversion::ConverterConfig;
use crate::engine::FieldEngine;
use crate::error::{AacgmError, EngineError};
use crate::utils::time::{normalize_time, TimeInput, Timestamp};
use ndarray::{ArrayD, IxDyn, Zip};

type Result<T> = std::result::Result<T, AacgmError>;

/// Outcome of handing one point to the engine
pub type PointResult = std::result::Result<Conversion, EngineError>;

/// One converted location. Points that could not be converted hold NaN.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Conversion {
    /// Latitude, degrees N
    pub lat: f64,
    /// Longitude, degrees E
    pub lon: f64,
    /// Altitude in km, or geocentric distance in Earth radii
    pub r: f64,
}

impl Conversion {
    pub const fn missing() -> Conversion {
        Conversion {
            lat: f64::NAN,
            lon: f64::NAN,
            r: f64::NAN,
        }
    }

    pub fn is_missing(&self) -> bool {
        self.lat.is_nan() && self.lon.is_nan() && self.r.is_nan()
    }
}

/// Converted locations, each array shaped like the broadcast input
#[derive(Debug, Clone, PartialEq)]
pub struct BatchConversion {
    pub lat: ArrayD<f64>,
    pub lon: ArrayD<f64>,
    pub r: ArrayD<f64>,
}

impl BatchConversion {
    pub fn missing(shape: &[usize]) -> BatchConversion {
        BatchConversion {
            lat: ArrayD::from_elem(IxDyn(shape), f64::NAN),
            lon: ArrayD::from_elem(IxDyn(shape), f64::NAN),
            r: ArrayD::from_elem(IxDyn(shape), f64::NAN),
        }
    }

    /// Splits per-point outcomes into output arrays, substituting NaN for
    /// every point the engine could not convert.
    pub fn merge(results: &ArrayD<PointResult>) -> BatchConversion {
        let mut failed = 0;
        let points = results.map(|res| match res {
            Ok(point) => *point,
            Err(e) => {
                failed += 1;
                log::debug!("point dropped from batch: {e}");
                Conversion::missing()
            }
        });
        if failed > 0 {
            log::warn!(
                "unable to perform conversion for {failed} of {} points",
                results.len()
            );
        }
        BatchConversion {
            lat: points.map(|p| p.lat),
            lon: points.map(|p| p.lon),
            r: points.map(|p| p.r),
        }
    }

    pub fn shape(&self) -> &[usize] {
        self.lat.shape()
    }
}

/// Validated, same-shaped locations sharing one epoch and one method
#[derive(Debug, Clone, PartialEq)]
pub struct PointBatch {
    pub points: PointArrays,
    pub epoch: Timestamp,
    pub code: MethodCode,
}

/// Runs conversions against an engine, one epoch setting per call.
pub struct PointConverter<'a, E: FieldEngine> {
    engine: &'a mut E,
    config: &'a ConverterConfig,
}

impl<'a, E: FieldEngine> PointConverter<'a, E> {
    pub fn new(engine: &'a mut E, config: &'a ConverterConfig) -> PointConverter<'a, E> {
        PointConverter { engine, config }
    }

    fn set_epoch(&mut self, time: Timestamp) -> Result<()> {
        self.engine
            .set_epoch(&time)
            .map_err(|source| AacgmError::Epoch { time, source })
    }

    /// Converts a single location.
    ///
    /// A height the method is not fit for yields an all-NaN result without
    /// touching the engine, and so does an engine failure on the point itself.
    ///
    /// # Errors
    /// Will return `Err` if the time or method cannot be understood, if the
    /// latitude is more than 0.1 degrees past a pole, or if the engine rejects
    /// the epoch.
    pub fn convert_one(
        &mut self,
        lat: f64,
        lon: f64,
        height: f64,
        time: impl Into<TimeInput>,
        method: impl Into<MethodSpec>,
    ) -> Result<Conversion> {
        let time = normalize_time(time)?;
        let method: MethodSpec = method.into();
        let code = method.resolve(self.config.decode_mode)?;

        if !validate_height(height, code, &self.config.limits).is_ok() {
            return Ok(Conversion::missing());
        }

        let lat = validate_latitude(lat)?;
        let lon = normalize_longitude(lon);

        self.set_epoch(time)?;
        match self.engine.convert_point(lat, lon, height, code) {
            Ok(point) => Ok(point),
            Err(e) => {
                log::warn!(
                    "unable to perform conversion at {lat:.1},{lon:.1} {height:.1} km, {time} \
                     using method {code}: {e}"
                );
                Ok(Conversion::missing())
            }
        }
    }

    /// Converts every point of `batch` after a single epoch setting. A point
    /// the engine fails on only affects its own entry.
    ///
    /// # Errors
    /// Will return `Err` if the engine rejects the epoch.
    pub fn convert_batch(&mut self, batch: &PointBatch) -> Result<ArrayD<PointResult>> {
        self.set_epoch(batch.epoch)?;

        let engine = &mut *self.engine;
        let code = batch.code;
        let points = &batch.points;
        Ok(Zip::from(&points.lat)
            .and(&points.lon)
            .and(&points.height)
            .map_collect(|&lat, &lon, &height| engine.convert_point(lat, lon, height, code)))
    }

    /// Converts scalar or array locations, broadcast to a common shape.
    ///
    /// The height policy is decided once for the whole batch from its largest
    /// height; a blocked batch comes back all NaN.
    ///
    /// # Errors
    /// Will return `Err` if the inputs cannot be broadcast together, if the
    /// time or method cannot be understood, if any latitude is more than 0.1
    /// degrees past a pole, or if the engine rejects the epoch.
    pub fn convert_many(
        &mut self,
        lat: impl Into<Field>,
        lon: impl Into<Field>,
        height: impl Into<Field>,
        time: impl Into<TimeInput>,
        method: impl Into<MethodSpec>,
    ) -> Result<BatchConversion> {
        let points = broadcast(lat, lon, height)?;
        let epoch = normalize_time(time)?;
        let method: MethodSpec = method.into();
        let code = method.resolve(self.config.decode_mode)?;

        if let Some(max_height) = nan_max(points.height.iter().copied()) {
            if !validate_height(max_height, code, &self.config.limits).is_ok() {
                return Ok(BatchConversion::missing(points.shape()));
            }
        }

        let batch = PointBatch {
            points: PointArrays {
                lat: validate_latitude_arr(points.lat)?,
                lon: normalize_longitude_arr(points.lon),
                height: points.height,
            },
            epoch,
            code,
        };
        let results = self.convert_batch(&batch)?;
        Ok(BatchConversion::merge(&results))
    }
}
