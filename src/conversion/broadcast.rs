//! Brings latitude, longitude and height inputs, each of which may be a
//! scalar or an array, onto one common shape.
use crate::error::AacgmError;
use ndarray::{Array, ArrayD, ArrayViewD, Dimension, IxDyn};

type Result<T> = std::result::Result<T, AacgmError>;

const INPUT_NAMES: [&str; 3] = ["lat", "lon", "height"];

/// A scalar or an array of any rank
#[derive(Debug, Clone, PartialEq)]
pub enum Field {
    Scalar(f64),
    Array(ArrayD<f64>),
}

impl Field {
    /// Number of axes; scalars and zero-dimensional arrays have rank 0
    pub fn rank(&self) -> usize {
        match self {
            Field::Scalar(_) => 0,
            Field::Array(arr) => arr.ndim(),
        }
    }

    pub fn shape(&self) -> &[usize] {
        match self {
            Field::Scalar(_) => &[],
            Field::Array(arr) => arr.shape(),
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Field::Scalar(_) => 1,
            Field::Array(arr) => arr.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_scalar(&self) -> bool {
        self.rank() == 0
    }

    /// The value of a scalar or zero-dimensional array
    pub fn as_scalar(&self) -> Option<f64> {
        match self {
            Field::Scalar(v) => Some(*v),
            Field::Array(arr) if arr.ndim() == 0 => arr.first().copied(),
            Field::Array(_) => None,
        }
    }

    /// The lone value of a single-element field
    fn single_value(&self) -> Option<f64> {
        match self {
            Field::Scalar(v) => Some(*v),
            Field::Array(arr) if arr.len() == 1 => arr.iter().next().copied(),
            Field::Array(_) => None,
        }
    }

    /// Element-wise map that keeps scalars scalar
    pub fn mapv(&self, mut f: impl FnMut(f64) -> f64) -> Field {
        match self {
            Field::Scalar(v) => Field::Scalar(f(*v)),
            Field::Array(arr) => Field::Array(arr.mapv(f)),
        }
    }

    pub fn into_array(self) -> ArrayD<f64> {
        match self {
            Field::Scalar(v) => ArrayD::from_elem(IxDyn(&[]), v),
            Field::Array(arr) => arr,
        }
    }

    /// Fills `shape` with the value of a single-element field, or hands back
    /// an array that already has that shape.
    fn fill_to(self, shape: &[usize]) -> ArrayD<f64> {
        if self.shape() == shape {
            return self.into_array();
        }
        match self.single_value() {
            Some(v) => ArrayD::from_elem(IxDyn(shape), v),
            None => self.into_array(),
        }
    }
}

impl From<f64> for Field {
    fn from(value: f64) -> Self {
        Field::Scalar(value)
    }
}

impl From<Vec<f64>> for Field {
    fn from(value: Vec<f64>) -> Self {
        Field::Array(Array::from(value).into_dyn())
    }
}

impl From<&[f64]> for Field {
    fn from(value: &[f64]) -> Self {
        Field::from(value.to_vec())
    }
}

impl<D: Dimension> From<Array<f64, D>> for Field {
    fn from(value: Array<f64, D>) -> Self {
        Field::Array(value.into_dyn())
    }
}

/// Copies a borrowed array; a zero-dimensional view becomes a scalar.
impl From<ArrayViewD<'_, f64>> for Field {
    fn from(value: ArrayViewD<'_, f64>) -> Self {
        match value.first() {
            Some(&v) if value.ndim() == 0 => Field::Scalar(v),
            _ => Field::Array(value.to_owned()),
        }
    }
}

/// Three arrays of identical shape, matched index by index
#[derive(Debug, Clone, PartialEq)]
pub struct PointArrays {
    pub lat: ArrayD<f64>,
    pub lon: ArrayD<f64>,
    pub height: ArrayD<f64>,
}

impl PointArrays {
    pub fn shape(&self) -> &[usize] {
        self.lat.shape()
    }
}

/// Brings `lat`, `lon` and `height` onto a common shape.
///
/// Three scalars become three single-element arrays. Otherwise scalars are
/// filled out to the shape of the highest-rank input (the first one on a
/// tie), and single-element arrays are stretched to match the remaining
/// arrays when those agree with one another.
///
/// # Errors
/// Will return `Err` naming all three inputs when they all disagree, or the
/// two inputs at fault when only one of them is out of line.
pub fn broadcast(
    lat: impl Into<Field>,
    lon: impl Into<Field>,
    height: impl Into<Field>,
) -> Result<PointArrays> {
    let fields: [Field; 3] = [lat.into(), lon.into(), height.into()];
    let ranks = [fields[0].rank(), fields[1].rank(), fields[2].rank()];

    let [lat, lon, height] = if ranks.iter().all(|&r| r == 0) {
        log::warn!(
            "for a single location, consider using convert_latlon or get_aacgm_coord"
        );
        fields.map(|f| f.fill_to(&[1]))
    } else {
        // the highest rank wins, the first one on a tie
        let imax = (0..3).fold(0, |best, i| if ranks[i] > ranks[best] { i } else { best });
        let target = fields[imax].shape().to_vec();
        fields.map(|f| if f.is_scalar() { f.fill_to(&target) } else { f.into_array() })
    };

    let shapes = [lat.shape().to_vec(), lon.shape().to_vec(), height.shape().to_vec()];
    if shapes[0] == shapes[1] && shapes[0] == shapes[2] {
        return Ok(PointArrays { lat, lon, height });
    }

    let multi: Vec<usize> = (0..3)
        .filter(|&i| shapes[i].iter().product::<usize>() != 1)
        .collect();
    let stretch_to = match multi.as_slice() {
        // only single elements of differing rank, keep the deepest
        [] => {
            let deepest = (0..3).fold(0, |b, i| {
                if shapes[i].len() > shapes[b].len() {
                    i
                } else {
                    b
                }
            });
            Some(shapes[deepest].clone())
        }
        [first, rest @ ..] if rest.iter().all(|&i| shapes[i] == shapes[*first]) => {
            Some(shapes[*first].clone())
        }
        _ => None,
    };
    if let Some(target) = stretch_to {
        let [lat, lon, height] =
            [lat, lon, height].map(|arr| Field::Array(arr).fill_to(&target));
        return Ok(PointArrays { lat, lon, height });
    }

    Err(AacgmError::DimensionMismatch {
        inputs: mismatched_inputs(&shapes, &multi),
    })
}

/// Names the inputs to blame for a shape mismatch among the multi-element
/// inputs `multi`.
fn mismatched_inputs(shapes: &[Vec<usize>; 3], multi: &[usize]) -> Vec<&'static str> {
    if let [a, b, c] = *multi {
        let odd = if shapes[a] == shapes[b] {
            Some((a, c))
        } else if shapes[a] == shapes[c] {
            Some((a, b))
        } else if shapes[b] == shapes[c] {
            Some((b, a))
        } else {
            None
        };
        return match odd {
            Some((agreeing, odd)) => {
                let mut pair = [agreeing, odd];
                pair.sort_unstable();
                pair.iter().map(|&i| INPUT_NAMES[i]).collect()
            }
            None => INPUT_NAMES.to_vec(),
        };
    }
    multi.iter().map(|&i| INPUT_NAMES[i]).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{array, Array2};

    #[test]
    fn scalars_fill_out_to_the_array_shape() {
        let pts = broadcast(5.0, vec![10.0, 20.0, 30.0], 100.0).unwrap();
        assert_eq!(pts.shape(), &[3]);
        assert!(pts.lat.iter().all(|&v| v == 5.0));
        assert!(pts.height.iter().all(|&v| v == 100.0));
        assert_eq!(pts.lon, array![10.0, 20.0, 30.0].into_dyn());
    }

    #[test]
    fn three_scalars_become_single_element_arrays() {
        testing_logger::setup();
        let pts = broadcast(1.0, 2.0, 3.0).unwrap();
        assert_eq!(pts.shape(), &[1]);
        assert_eq!(pts.height[[0]], 3.0);
        testing_logger::validate(|logs| {
            assert_eq!(logs.len(), 1);
            assert_eq!(logs[0].level, log::Level::Warn);
            assert!(logs[0].body.contains("consider using convert_latlon"));
        });
    }

    #[test]
    fn array_input_raises_no_advisory() {
        testing_logger::setup();
        broadcast(1.0, vec![2.0, 3.0], 3.0).unwrap();
        testing_logger::validate(|logs| assert!(logs.is_empty()));
    }

    #[test]
    fn highest_rank_sets_the_shape() {
        let grid = Array2::from_elem((2, 3), 45.0);
        let pts = broadcast(grid, 0.0, 300.0).unwrap();
        assert_eq!(pts.shape(), &[2, 3]);
        assert_eq!(pts.lon.len(), 6);
    }

    #[test]
    fn matching_arrays_pass_through() {
        let pts = broadcast(vec![1.0, 2.0], vec![3.0, 4.0], vec![5.0, 6.0]).unwrap();
        assert_eq!(pts.lat, array![1.0, 2.0].into_dyn());
        assert_eq!(pts.height, array![5.0, 6.0].into_dyn());
    }

    #[test]
    fn single_element_arrays_are_stretched() {
        let pts = broadcast(vec![60.0], vec![1.0, 2.0, 3.0], vec![100.0, 200.0, 300.0]).unwrap();
        assert_eq!(pts.lat, array![60.0, 60.0, 60.0].into_dyn());
    }

    #[test]
    fn partial_mismatch_names_the_pair() {
        let err = broadcast(vec![1.0; 3], vec![2.0; 3], vec![3.0; 4]).unwrap_err();
        match err {
            AacgmError::DimensionMismatch { inputs } => {
                assert_eq!(inputs, vec!["lat", "height"]);
            }
            e => panic!("unexpected error {e}"),
        }
    }

    #[test]
    fn mismatch_beside_a_singleton_names_the_pair() {
        let err = broadcast(vec![1.0], vec![2.0; 3], vec![3.0; 4]).unwrap_err();
        assert_eq!(err.to_string(), "lon and height arrays are mismatched");
    }

    #[test]
    fn full_mismatch_names_all_three() {
        let err = broadcast(vec![1.0; 2], vec![2.0; 3], vec![3.0; 4]).unwrap_err();
        assert_eq!(err.to_string(), "lat, lon, and height arrays are mismatched");
    }

    #[test]
    fn borrowed_views_keep_rank_unless_zero_dimensional() {
        let zero_d = ArrayD::from_elem(IxDyn(&[]), 7.0);
        assert_eq!(Field::from(zero_d.view()), Field::Scalar(7.0));

        let grid = array![[10.0, 20.0], [30.0, 40.0]].into_dyn();
        let field = Field::from(grid.view());
        assert_eq!(field.shape(), &[2, 2]);
        assert_eq!(field, Field::Array(grid));

        let pts = broadcast(Field::from(zero_d.view()), field, 300.0).unwrap();
        assert_eq!(pts.shape(), &[2, 2]);
        assert!(pts.lat.iter().all(|&v| v == 7.0));
    }

    #[test]
    fn zero_dimensional_arrays_count_as_scalars() {
        let zero_d = ArrayD::from_elem(IxDyn(&[]), 7.0);
        let pts = broadcast(zero_d, vec![1.0, 2.0], 0.0).unwrap();
        assert_eq!(pts.lat, array![7.0, 7.0].into_dyn());
    }
}
