use aacgm::{
    Aacgm, Conversion, ConverterConfig, EngineError, EpochClock, FieldEngine, MethodCode,
    Timestamp,
};
use chrono::NaiveDate;
use criterion::{black_box, criterion_group, criterion_main, Criterion};
use ndarray::Array1;

/// Stand-in engine with a trivial rotation, so only the conversion layer is timed
struct TiltedDipole;

impl EpochClock for TiltedDipole {
    fn set_epoch(&mut self, _epoch: &Timestamp) -> Result<(), EngineError> {
        Ok(())
    }
}

impl FieldEngine for TiltedDipole {
    fn convert_point(
        &mut self,
        lat: f64,
        lon: f64,
        height: f64,
        _code: MethodCode,
    ) -> Result<Conversion, EngineError> {
        Ok(Conversion {
            lat: (lat + 9.0).min(90.0),
            lon: lon - 72.0,
            r: height,
        })
    }

    fn magnetic_to_mlt(&mut self, _time: &Timestamp, mlon: f64) -> f64 {
        (mlon / 15.0).rem_euclid(24.0)
    }

    fn mlt_to_magnetic(&mut self, _time: &Timestamp, mlt: f64) -> f64 {
        mlt * 15.0
    }
}

fn criterion_benchmark(c: &mut Criterion) {
    let time = NaiveDate::from_ymd_opt(2015, 1, 1).unwrap();
    let lat = Array1::linspace(-89.0, 89.0, 10_000);
    let lon = Array1::linspace(-360.0, 360.0, 10_000);

    c.bench_function("convert_latlon", |b| {
        let mut aacgm = Aacgm::new(TiltedDipole, ConverterConfig::default());
        b.iter(|| aacgm.convert_latlon(black_box(45.0), black_box(-70.0), 300.0, time, "G2A"))
    });
    c.bench_function("convert_latlon_arr", |b| {
        let mut aacgm = Aacgm::new(TiltedDipole, ConverterConfig::default());
        b.iter(|| aacgm.convert_latlon_arr(lat.clone(), lon.clone(), 300.0, time, "G2A|TRACE"))
    });
    c.bench_function("get_aacgm_coord_arr", |b| {
        let mut aacgm = Aacgm::new(TiltedDipole, ConverterConfig::default());
        b.iter(|| aacgm.get_aacgm_coord_arr(lat.clone(), lon.clone(), 300.0, time, "TRACE"))
    });
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
