//! Python bindings, backed by the process-wide native engine.
use crate::conversion::validation::validate_height;
use crate::conversion::{
    ConverterConfig, Field, MethodCode, MethodSpec, MltDirection, DEFAULT_COORD_METHOD,
};
use crate::engine::native::engine;
use crate::error::AacgmError;
use crate::utils::constants::{
    A2G, ALLOWTRACE, BADIDEA, G2A, GEOCENTRIC, HIGH_ALT_COEFF, HIGH_ALT_TRACE, TRACE,
};
use crate::utils::time::{normalize_time, TimeInput};
use numpy::{AllowTypeChange, IntoPyArray, PyArrayDyn, PyArrayLikeDyn};
use pyo3::prelude::*;

type PyTriple<'py> = (
    Bound<'py, PyArrayDyn<f64>>,
    Bound<'py, PyArrayDyn<f64>>,
    Bound<'py, PyArrayDyn<f64>>,
);

/// Location input: anything `numpy.asarray` turns into floats, so a number,
/// a nested sequence, or an array of any rank and dtype
type PyField<'py> = PyArrayLikeDyn<'py, f64, AllowTypeChange>;

fn field(values: PyField<'_>) -> Field {
    Field::from(values.as_array())
}

/// Accepts `datetime.datetime` (naive ones are taken as UTC) or `datetime.date`.
fn time_input(dtime: &Bound<'_, PyAny>) -> PyResult<TimeInput> {
    let datetime = dtime.py().import_bound("datetime")?;

    if dtime.is_instance(&datetime.getattr("datetime")?)? {
        let utc = if dtime.getattr("tzinfo")?.is_none() {
            dtime.clone()
        } else {
            let tz = datetime.getattr("timezone")?.getattr("utc")?;
            dtime.call_method1("astimezone", (tz,))?
        };
        let field = |name: &str| -> PyResult<u32> { utc.getattr(name)?.extract() };
        return Ok(TimeInput::Calendar {
            year: utc.getattr("year")?.extract()?,
            month: field("month")?,
            day: field("day")?,
            hour: field("hour")?,
            minute: field("minute")?,
            second: field("second")?,
        });
    }

    if dtime.is_instance(&datetime.getattr("date")?)? {
        let field = |name: &str| -> PyResult<u32> { dtime.getattr(name)?.extract() };
        return Ok(TimeInput::Calendar {
            year: dtime.getattr("year")?.extract()?,
            month: field("month")?,
            day: field("day")?,
            hour: 0,
            minute: 0,
            second: 0,
        });
    }

    Err(AacgmError::InvalidInput(
        "time variable (dtime) must be a datetime object".to_string(),
    ))?
}

/// Accepts a flag string such as "G2A|TRACE" or an integer bit code.
fn method_spec(
    method: Option<&Bound<'_, PyAny>>,
    default: &str,
) -> Result<MethodSpec, AacgmError> {
    let Some(method) = method else {
        return Ok(MethodSpec::from(default));
    };
    if let Ok(text) = method.extract::<String>() {
        return Ok(MethodSpec::Text(text));
    }
    if let Ok(bits) = method.extract::<i32>() {
        return Ok(MethodSpec::Code(bits));
    }
    Err(AacgmError::InvalidMethod(method.to_string()))
}

/// Converts a location between geographic and AACGM coordinates.
#[pyfunction]
#[pyo3(name = "convert_latlon")]
#[pyo3(signature = (in_lat, in_lon, height, dtime, method_code = None))]
fn convert_latlon_py(
    py: Python<'_>,
    in_lat: f64,
    in_lon: f64,
    height: f64,
    dtime: &Bound<'_, PyAny>,
    method_code: Option<&Bound<'_, PyAny>>,
) -> PyResult<(f64, f64, f64)> {
    let time = time_input(dtime)?;
    let method = method_spec(method_code, "G2A")?;
    let out =
        py.allow_threads(|| engine().convert_latlon(in_lat, in_lon, height, time, method))?;
    Ok((out.lat, out.lon, out.r))
}

/// Converts arrays of locations between geographic and AACGM coordinates.
/// At least one of in_lat, in_lon and height should be an array.
#[pyfunction]
#[pyo3(name = "convert_latlon_arr")]
#[pyo3(signature = (in_lat, in_lon, height, dtime, method_code = None))]
fn convert_latlon_arr_py<'py>(
    py: Python<'py>,
    in_lat: PyField<'py>,
    in_lon: PyField<'py>,
    height: PyField<'py>,
    dtime: &Bound<'py, PyAny>,
    method_code: Option<&Bound<'py, PyAny>>,
) -> PyResult<PyTriple<'py>> {
    let (lat, lon, height) = (field(in_lat), field(in_lon), field(height));
    let time = time_input(dtime)?;
    let method = method_spec(method_code, "G2A")?;
    let out =
        py.allow_threads(|| engine().convert_latlon_arr(lat, lon, height, time, method))?;
    Ok((
        out.lat.into_pyarray_bound(py),
        out.lon.into_pyarray_bound(py),
        out.r.into_pyarray_bound(py),
    ))
}

/// Gets AACGM latitude, longitude and magnetic local time of a geographic location.
#[pyfunction]
#[pyo3(name = "get_aacgm_coord")]
#[pyo3(signature = (glat, glon, height, dtime, method = None))]
fn get_aacgm_coord_py(
    py: Python<'_>,
    glat: f64,
    glon: f64,
    height: f64,
    dtime: &Bound<'_, PyAny>,
    method: Option<&Bound<'_, PyAny>>,
) -> PyResult<(f64, f64, f64)> {
    let time = time_input(dtime)?;
    let method = method_spec(method, DEFAULT_COORD_METHOD)?;
    let coord =
        py.allow_threads(|| engine().get_aacgm_coord(glat, glon, height, time, method))?;
    Ok((coord.mlat, coord.mlon, coord.mlt))
}

/// Array form of get_aacgm_coord.
#[pyfunction]
#[pyo3(name = "get_aacgm_coord_arr")]
#[pyo3(signature = (glat, glon, height, dtime, method = None))]
fn get_aacgm_coord_arr_py<'py>(
    py: Python<'py>,
    glat: PyField<'py>,
    glon: PyField<'py>,
    height: PyField<'py>,
    dtime: &Bound<'py, PyAny>,
    method: Option<&Bound<'py, PyAny>>,
) -> PyResult<PyTriple<'py>> {
    let (lat, lon, height) = (field(glat), field(glon), field(height));
    let time = time_input(dtime)?;
    let method = method_spec(method, DEFAULT_COORD_METHOD)?;
    let coords =
        py.allow_threads(|| engine().get_aacgm_coord_arr(lat, lon, height, time, method))?;
    Ok((
        coords.mlat.into_pyarray_bound(py),
        coords.mlon.into_pyarray_bound(py),
        coords.mlt.into_pyarray_bound(py),
    ))
}

/// Converts magnetic longitudes to MLT, or MLT to magnetic longitudes with m2a=True.
#[pyfunction]
#[pyo3(name = "convert_mlt")]
#[pyo3(signature = (arr, dtime, m2a = false))]
fn convert_mlt_py<'py>(
    py: Python<'py>,
    arr: PyField<'py>,
    dtime: &Bound<'py, PyAny>,
    m2a: bool,
) -> PyResult<PyObject> {
    let values = field(arr);
    let time = time_input(dtime)?;
    let direction = if m2a {
        MltDirection::MltToMagnetic
    } else {
        MltDirection::MagneticToMlt
    };
    let out = py.allow_threads(|| engine().convert_mlt(values, time, direction))?;
    Ok(match out {
        Field::Scalar(v) => v.into_py(py),
        Field::Array(a) => a.into_pyarray_bound(py).into_any().unbind(),
    })
}

/// Converts a human readable method such as "A2G|TRACE" to its bit code.
#[pyfunction]
#[pyo3(name = "convert_str_to_bit")]
#[pyo3(text_signature = "(method_code: str, /)")]
fn convert_str_to_bit_py(method_code: &str) -> PyResult<i32> {
    Ok(MethodCode::decode(method_code, ConverterConfig::DEFAULT.decode_mode)?.bits())
}

/// Converts boolean option flags to a bit code.
#[pyfunction]
#[pyo3(name = "convert_bool_to_bit")]
#[pyo3(signature = (
    a2g = false,
    trace = false,
    allowtrace = false,
    badidea = false,
    geocentric = false
))]
fn convert_bool_to_bit_py(
    a2g: bool,
    trace: bool,
    allowtrace: bool,
    badidea: bool,
    geocentric: bool,
) -> i32 {
    MethodCode::from_flags(a2g, trace, allowtrace, badidea, geocentric).bits()
}

/// Checks a time input. Datetimes come back unchanged, dates are promoted to
/// midnight.
#[pyfunction]
#[pyo3(name = "test_time")]
#[pyo3(text_signature = "(dtime, /)")]
fn test_time_py<'py>(dtime: &Bound<'py, PyAny>) -> PyResult<Bound<'py, PyAny>> {
    let stamp = normalize_time(time_input(dtime)?)?;
    let datetime = dtime.py().import_bound("datetime")?.getattr("datetime")?;
    if dtime.is_instance(&datetime)? {
        return Ok(dtime.clone());
    }
    datetime.call1((
        stamp.year(),
        stamp.month(),
        stamp.day(),
        stamp.hour(),
        stamp.minute(),
        stamp.second(),
    ))
}

/// True if the height in km is appropriate for the method in bit_code.
#[pyfunction]
#[pyo3(name = "test_height")]
#[pyo3(text_signature = "(height: float, bit_code: int, /)")]
fn test_height_py(height: f64, bit_code: i32) -> bool {
    let limits = ConverterConfig::DEFAULT.limits;
    validate_height(height, MethodCode::from_bits(bit_code), &limits).is_ok()
}

/// Conversions between geographic and AACGM-v2 coordinates.
#[pymodule]
fn aacgm(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_function(wrap_pyfunction!(convert_latlon_py, m)?)?;
    m.add_function(wrap_pyfunction!(convert_latlon_arr_py, m)?)?;
    m.add_function(wrap_pyfunction!(get_aacgm_coord_py, m)?)?;
    m.add_function(wrap_pyfunction!(get_aacgm_coord_arr_py, m)?)?;
    m.add_function(wrap_pyfunction!(convert_mlt_py, m)?)?;
    m.add_function(wrap_pyfunction!(convert_str_to_bit_py, m)?)?;
    m.add_function(wrap_pyfunction!(convert_bool_to_bit_py, m)?)?;
    m.add_function(wrap_pyfunction!(test_time_py, m)?)?;
    m.add_function(wrap_pyfunction!(test_height_py, m)?)?;

    m.add("G2A", G2A)?;
    m.add("A2G", A2G)?;
    m.add("TRACE", TRACE)?;
    m.add("ALLOWTRACE", ALLOWTRACE)?;
    m.add("BADIDEA", BADIDEA)?;
    m.add("GEOCENTRIC", GEOCENTRIC)?;
    m.add("high_alt_coeff", HIGH_ALT_COEFF)?;
    m.add("high_alt_trace", HIGH_ALT_TRACE)?;
    Ok(())
}
