pub mod broadcast;
pub mod facade;
pub mod method;
pub mod mlt;
pub mod point;
pub mod validation;

pub use broadcast::{broadcast, Field, PointArrays};
pub use facade::{Aacgm, MagneticCoord, MagneticCoords, DEFAULT_COORD_METHOD};
pub use method::{DecodeMode, Direction, MethodCode, MethodSpec};
pub use mlt::{MltConverter, MltDirection};
pub use point::{BatchConversion, Conversion, PointBatch, PointConverter, PointResult};
pub use validation::{AltitudeLimits, BlockReason, HeightCheck};

/// Knobs shared by every conversion
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConverterConfig {
    /// Altitude ceilings for the height policy
    pub limits: AltitudeLimits,
    /// Treatment of unknown tokens in textual method codes
    pub decode_mode: DecodeMode,
}

impl ConverterConfig {
    pub const DEFAULT: ConverterConfig = ConverterConfig {
        limits: AltitudeLimits::DEFAULT,
        decode_mode: DecodeMode::Lenient,
    };

    pub fn with_limits(mut self, limits: AltitudeLimits) -> Self {
        self.limits = limits;
        self
    }

    pub fn with_decode_mode(mut self, decode_mode: DecodeMode) -> Self {
        self.decode_mode = decode_mode;
        self
    }
}

impl Default for ConverterConfig {
    fn default() -> Self {
        ConverterConfig::DEFAULT
    }
}
