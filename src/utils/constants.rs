//! Flag values and altitude ceilings shared with the AACGM-v2 C library.

// Method flags, as defined in aacgmlib_v2.h
pub const G2A: i32 = 0;
pub const A2G: i32 = 1;
pub const TRACE: i32 = 2;
pub const ALLOWTRACE: i32 = 4;
pub const BADIDEA: i32 = 8;
pub const GEOCENTRIC: i32 = 16;

/// Highest altitude the published coefficients were fitted for, in km
pub const HIGH_ALT_COEFF: f64 = 2000.0;
/// One Earth radius in km; field-line tracing is not meant for the magnetosphere
pub const HIGH_ALT_TRACE: f64 = 6378.0;

/// Latitudes within this distance of a pole (degrees) are clamped rather than rejected
pub(crate) const POLE_TOLERANCE: f64 = 0.1;
