//! One-call access to AACGM latitude, longitude and magnetic local time.
use crate::conversion::broadcast::Field;
use crate::conversion::method::{DecodeMode, Direction, MethodCode, MethodSpec};
use crate::conversion::mlt::{MltConverter, MltDirection};
use crate::conversion::point::{BatchConversion, Conversion, PointConverter};
use crate::conversion::ConverterConfig;
use crate::engine::FieldEngine;
use crate::error::AacgmError;
use crate::utils::time::TimeInput;
use ndarray::{ArrayD, IxDyn};

type Result<T> = std::result::Result<T, AacgmError>;

/// Options used by the coordinate getters when the caller has no preference
pub const DEFAULT_COORD_METHOD: &str = "TRACE";

/// Magnetic position of a single location
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MagneticCoord {
    /// AACGM latitude, degrees N
    pub mlat: f64,
    /// AACGM longitude, degrees E
    pub mlon: f64,
    /// Magnetic local time, hours
    pub mlt: f64,
}

/// Magnetic positions of many locations, all arrays of one shape
#[derive(Debug, Clone, PartialEq)]
pub struct MagneticCoords {
    pub mlat: ArrayD<f64>,
    pub mlon: ArrayD<f64>,
    pub mlt: ArrayD<f64>,
}

/// An engine together with the configuration its conversions run under.
#[derive(Debug)]
pub struct Aacgm<E> {
    engine: E,
    config: ConverterConfig,
}

impl<E> Aacgm<E> {
    pub const fn new(engine: E, config: ConverterConfig) -> Aacgm<E> {
        Aacgm { engine, config }
    }

    pub fn config(&self) -> &ConverterConfig {
        &self.config
    }

    pub fn set_config(&mut self, config: ConverterConfig) {
        self.config = config;
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    pub fn into_engine(self) -> E {
        self.engine
    }
}

impl<E: FieldEngine> Aacgm<E> {
    pub fn points(&mut self) -> PointConverter<'_, E> {
        PointConverter::new(&mut self.engine, &self.config)
    }

    pub fn mlt(&mut self) -> MltConverter<'_, E> {
        MltConverter::new(&mut self.engine)
    }

    /// See [`PointConverter::convert_one`].
    ///
    /// # Errors
    /// Will return `Err` on invalid input or a rejected epoch.
    pub fn convert_latlon(
        &mut self,
        lat: f64,
        lon: f64,
        height: f64,
        time: impl Into<TimeInput>,
        method: impl Into<MethodSpec>,
    ) -> Result<Conversion> {
        self.points().convert_one(lat, lon, height, time, method)
    }

    /// See [`PointConverter::convert_many`].
    ///
    /// # Errors
    /// Will return `Err` on invalid or mismatched input, or a rejected epoch.
    pub fn convert_latlon_arr(
        &mut self,
        lat: impl Into<Field>,
        lon: impl Into<Field>,
        height: impl Into<Field>,
        time: impl Into<TimeInput>,
        method: impl Into<MethodSpec>,
    ) -> Result<BatchConversion> {
        self.points().convert_many(lat, lon, height, time, method)
    }

    /// See [`MltConverter::convert`].
    ///
    /// # Errors
    /// Will return `Err` if the time cannot be understood.
    pub fn convert_mlt(
        &mut self,
        values: impl Into<Field>,
        time: impl Into<TimeInput>,
        direction: MltDirection,
    ) -> Result<Field> {
        self.mlt().convert(values, time, direction)
    }

    /// Gets AACGM latitude, longitude and MLT of a geographic location.
    /// `options` may name any flags; the conversion always runs geographic
    /// to AACGM. No MLT is computed for a location without a longitude.
    ///
    /// # Errors
    /// Will return `Err` on invalid input or a rejected epoch.
    pub fn get_aacgm_coord(
        &mut self,
        glat: f64,
        glon: f64,
        height: f64,
        time: impl Into<TimeInput>,
        options: impl Into<MethodSpec>,
    ) -> Result<MagneticCoord> {
        let time: TimeInput = time.into();
        let code = geo_to_aacgm(options.into(), self.config.decode_mode)?;
        let Conversion { lat, lon, .. } =
            self.convert_latlon(glat, glon, height, time, code)?;

        let mlt = if lon.is_nan() {
            f64::NAN
        } else {
            self.mlt()
                .magnetic_to_mlt(lon, time)?
                .as_scalar()
                .unwrap_or(f64::NAN)
        };
        Ok(MagneticCoord {
            mlat: lat,
            mlon: lon,
            mlt,
        })
    }

    /// Array form of [`Aacgm::get_aacgm_coord`]. MLT is skipped altogether
    /// when no location could be converted.
    ///
    /// # Errors
    /// Will return `Err` on invalid or mismatched input, or a rejected epoch.
    pub fn get_aacgm_coord_arr(
        &mut self,
        glat: impl Into<Field>,
        glon: impl Into<Field>,
        height: impl Into<Field>,
        time: impl Into<TimeInput>,
        options: impl Into<MethodSpec>,
    ) -> Result<MagneticCoords> {
        let time: TimeInput = time.into();
        let code = geo_to_aacgm(options.into(), self.config.decode_mode)?;
        let BatchConversion { lat, lon, .. } =
            self.convert_latlon_arr(glat, glon, height, time, code)?;

        let mlt = if lon.iter().all(|v| v.is_nan()) {
            ArrayD::from_elem(IxDyn(lat.shape()), f64::NAN)
        } else {
            self.mlt()
                .magnetic_to_mlt(lon.clone(), time)?
                .into_array()
        };
        Ok(MagneticCoords {
            mlat: lat,
            mlon: lon,
            mlt,
        })
    }
}

/// Resolves coordinate-getter options with the direction pinned to G2A.
fn geo_to_aacgm(options: MethodSpec, mode: DecodeMode) -> Result<MethodCode> {
    let code = match options {
        MethodSpec::Text(flags) => MethodCode::decode(&format!("G2A|{flags}"), mode)?,
        MethodSpec::Code(bits) => MethodCode::from_bits(bits),
    };
    Ok(code.with_direction(Direction::GeoToAacgm))
}
