//! Physical sanity checks applied before anything reaches the engine.
//!
//! Appropriate altitude ranges for the different methods are explored in
//! Shepherd (2014). Summarized, coefficients are valid from 0 to 2000 km and
//! field-line tracing from 0 to one Earth radius. Altitudes below zero work,
//! but go beyond the intended scope of the coordinate system. `BADIDEA`
//! bypasses every altitude constraint.
use crate::conversion::method::MethodCode;
use crate::error::AacgmError;
use crate::utils::constants::{
    ALLOWTRACE, BADIDEA, HIGH_ALT_COEFF, HIGH_ALT_TRACE, POLE_TOLERANCE, TRACE,
};
use ndarray::{Array, Dimension};

type Result<T> = std::result::Result<T, AacgmError>;

/// Altitude ceilings (km) past which a method must opt in to keep going
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AltitudeLimits {
    /// Ceiling for the coefficient expansion
    pub coeff: f64,
    /// Ceiling for field-line tracing
    pub trace: f64,
}

impl AltitudeLimits {
    pub const DEFAULT: AltitudeLimits = AltitudeLimits {
        coeff: HIGH_ALT_COEFF,
        trace: HIGH_ALT_TRACE,
    };
}

impl Default for AltitudeLimits {
    fn default() -> Self {
        AltitudeLimits::DEFAULT
    }
}

/// Why a conversion was refused before reaching the engine
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BlockReason {
    /// Coefficients requested above their fitted range
    CoefficientCeiling { height: f64, limit: f64 },
    /// Inside the magnetosphere, where the engine may hang
    TraceCeiling { height: f64, limit: f64 },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum HeightCheck {
    Ok,
    Blocked(BlockReason),
}

impl HeightCheck {
    pub fn is_ok(&self) -> bool {
        matches!(self, HeightCheck::Ok)
    }
}

/// Tests whether `height` (km) is appropriate for the method in `code`.
///
/// Sub-surface heights only raise an advisory. A blocked height is logged at
/// error level and reported through the returned [`HeightCheck`]; it is not an
/// `Err`, callers are expected to hand back missing values instead.
pub fn validate_height(height: f64, code: MethodCode, limits: &AltitudeLimits) -> HeightCheck {
    if height < 0.0 {
        log::warn!("conversion not intended for altitudes < 0 km");
    }

    if height > limits.coeff && !code.intersects(TRACE | ALLOWTRACE | BADIDEA) {
        log::error!(
            "coefficients are not valid for altitudes above {:.0} km. You must either use \
             field-line tracing (TRACE or ALLOWTRACE) or indicate you know this is a bad idea",
            limits.coeff
        );
        return HeightCheck::Blocked(BlockReason::CoefficientCeiling {
            height,
            limit: limits.coeff,
        });
    }

    if height > limits.trace && !code.intersects(BADIDEA) {
        log::error!(
            "these coordinates are not intended for the magnetosphere! You must indicate that \
             you know this is a bad idea. If you continue, it is possible that the code will hang"
        );
        return HeightCheck::Blocked(BlockReason::TraceCeiling {
            height,
            limit: limits.trace,
        });
    }

    HeightCheck::Ok
}

/// Clamps a latitude that overshoots a pole by no more than 0.1 degrees.
///
/// # Errors
/// Will return `Err` if the latitude lies further than that from the valid range.
pub fn validate_latitude(lat: f64) -> Result<f64> {
    if lat.abs() <= 90.0 {
        return Ok(lat);
    }
    if lat.abs() > 90.0 + POLE_TOLERANCE {
        Err(AacgmError::InvalidInput(format!(
            "unrealistic latitude {lat}"
        )))?
    }
    Ok(lat.signum() * 90.0)
}

/// Array form of [`validate_latitude`]. The array is rejected as a whole when
/// its largest magnitude is out of tolerance; otherwise every element is
/// clipped to [-90, 90].
///
/// # Errors
/// Will return `Err` if any latitude lies more than 0.1 degrees past a pole.
pub fn validate_latitude_arr<D: Dimension>(mut lat: Array<f64, D>) -> Result<Array<f64, D>> {
    let Some(max_abs) = nan_max(lat.iter().map(|v| v.abs())) else {
        return Ok(lat);
    };
    if max_abs > 90.0 {
        if max_abs > 90.0 + POLE_TOLERANCE {
            Err(AacgmError::InvalidInput(format!(
                "unrealistic latitude {max_abs}"
            )))?
        }
        lat.mapv_inplace(|v| v.clamp(-90.0, 90.0));
    }
    Ok(lat)
}

/// Wraps a longitude into [-180, 180).
pub fn normalize_longitude(lon: f64) -> f64 {
    let wrapped = (lon + 180.0).rem_euclid(360.0) - 180.0;
    // rem_euclid may round up to the modulus itself
    if wrapped >= 180.0 {
        wrapped - 360.0
    } else {
        wrapped
    }
}

pub fn normalize_longitude_arr<D: Dimension>(mut lon: Array<f64, D>) -> Array<f64, D> {
    lon.mapv_inplace(normalize_longitude);
    lon
}

/// Largest non-NaN value, if there is one
pub(crate) fn nan_max(values: impl IntoIterator<Item = f64>) -> Option<f64> {
    values
        .into_iter()
        .filter(|v| !v.is_nan())
        .fold(None, |max, v| match max {
            Some(m) if m >= v => Some(m),
            _ => Some(v),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::constants::{A2G, G2A, GEOCENTRIC};
    use log::Level;
    use ndarray::array;
    use proptest::prelude::*;

    const LIMITS: AltitudeLimits = AltitudeLimits::DEFAULT;

    #[test]
    fn surface_heights_pass() {
        let code = MethodCode::from_bits(G2A);
        assert!(validate_height(0.0, code, &LIMITS).is_ok());
        assert!(validate_height(300.0, code, &LIMITS).is_ok());
        assert!(validate_height(2000.0, code, &LIMITS).is_ok());
    }

    #[test]
    fn negative_heights_are_only_advisory() {
        testing_logger::setup();
        assert!(validate_height(-10.0, MethodCode::default(), &LIMITS).is_ok());
        testing_logger::validate(|logs| {
            assert_eq!(logs.len(), 1);
            assert_eq!(logs[0].level, Level::Warn);
            assert!(logs[0].body.contains("altitudes < 0 km"));
        });
    }

    #[test]
    fn blocked_heights_are_logged_as_errors() {
        testing_logger::setup();
        validate_height(2500.0, MethodCode::default(), &LIMITS);
        validate_height(7000.0, MethodCode::from_bits(TRACE), &LIMITS);
        testing_logger::validate(|logs| {
            assert_eq!(logs.len(), 2);
            assert!(logs.iter().all(|l| l.level == Level::Error));
            assert!(logs[0].body.contains("not valid for altitudes above 2000 km"));
            assert!(logs[1].body.contains("not intended for the magnetosphere"));
        });
    }

    #[test]
    fn accepted_heights_log_nothing() {
        testing_logger::setup();
        validate_height(300.0, MethodCode::default(), &LIMITS);
        validate_height(7000.0, MethodCode::from_bits(BADIDEA), &LIMITS);
        testing_logger::validate(|logs| assert!(logs.is_empty()));
    }

    #[test]
    fn coefficients_blocked_above_ceiling() {
        let check = validate_height(2500.0, MethodCode::from_bits(A2G | GEOCENTRIC), &LIMITS);
        assert_eq!(
            check,
            HeightCheck::Blocked(BlockReason::CoefficientCeiling {
                height: 2500.0,
                limit: 2000.0
            })
        );
    }

    #[test]
    fn tracing_allows_high_altitudes() {
        for flag in [TRACE, ALLOWTRACE, BADIDEA] {
            assert!(validate_height(2500.0, MethodCode::from_bits(flag), &LIMITS).is_ok());
        }
    }

    #[test]
    fn tracing_blocked_in_magnetosphere() {
        for flag in [TRACE, ALLOWTRACE] {
            let check = validate_height(7000.0, MethodCode::from_bits(flag), &LIMITS);
            assert!(matches!(
                check,
                HeightCheck::Blocked(BlockReason::TraceCeiling { .. })
            ));
        }
        assert!(validate_height(1.0e5, MethodCode::from_bits(BADIDEA), &LIMITS).is_ok());
    }

    #[test]
    fn custom_limits_are_honoured() {
        let limits = AltitudeLimits {
            coeff: 500.0,
            trace: 1000.0,
        };
        assert!(!validate_height(600.0, MethodCode::default(), &limits).is_ok());
        assert!(!validate_height(1100.0, MethodCode::from_bits(TRACE), &limits).is_ok());
    }

    #[test]
    fn latitude_near_pole_is_clamped() {
        assert_eq!(validate_latitude(90.05).unwrap(), 90.0);
        assert_eq!(validate_latitude(-90.1).unwrap(), -90.0);
        assert_eq!(validate_latitude(45.0).unwrap(), 45.0);
    }

    #[test]
    fn latitude_past_pole_is_rejected() {
        assert!(matches!(
            validate_latitude(90.2),
            Err(AacgmError::InvalidInput(_))
        ));
        assert!(validate_latitude(-135.0).is_err());
    }

    #[test]
    fn latitude_array_checked_as_a_whole() {
        let lat = validate_latitude_arr(array![10.0, 90.05, -90.08]).unwrap();
        assert_eq!(lat, array![10.0, 90.0, -90.0]);
        assert!(validate_latitude_arr(array![10.0, 90.05, 91.0]).is_err());
    }

    #[test]
    fn latitude_array_ignores_nan() {
        let lat = validate_latitude_arr(array![f64::NAN, 45.0]).unwrap();
        assert!(lat[0].is_nan());
        assert_eq!(lat[1], 45.0);
    }

    #[test]
    fn longitude_wraps() {
        assert_eq!(normalize_longitude(180.0), -180.0);
        assert_eq!(normalize_longitude(190.0), -170.0);
        assert_eq!(normalize_longitude(-190.0), 170.0);
        assert_eq!(normalize_longitude(720.0), 0.0);
        assert_eq!(
            normalize_longitude_arr(array![[370.0, -540.0]]),
            array![[10.0, -180.0]]
        );
    }

    #[test]
    fn nan_max_skips_nan() {
        assert_eq!(nan_max([f64::NAN, 3.0, 1.0]), Some(3.0));
        assert_eq!(nan_max([f64::NAN]), None);
        assert_eq!(nan_max(Vec::new()), None);
    }

    proptest! {
        #[test]
        fn prop_latitude_idempotent(lat in -90.1..=90.1f64) {
            let once = validate_latitude(lat).unwrap();
            prop_assert_eq!(validate_latitude(once).unwrap(), once);
            prop_assert!(once.abs() <= 90.0);
        }

        #[test]
        fn prop_longitude_idempotent(lon in -1e6..1e6f64) {
            let once = normalize_longitude(lon);
            prop_assert!(once >= -180.0);
            prop_assert!(once < 180.0);
            prop_assert_eq!(normalize_longitude(once), once);
        }
    }
}
