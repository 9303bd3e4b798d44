//! Linear rescaling of values between numeric ranges.
//!
//! Every transform maps `input_low` onto `output_low` and `input_high` onto `output_high`,
//! linearly and without clamping, so values outside the input range are extrapolated. The
//! `denormalize` family is the exact inverse of the `normalize` family for the same bounds.

use ndarray::{Array2, ArrayView2};
use serde::{Deserialize, Serialize};

use crate::error::{NetworkError, Result};

/// Number of features recorded for each lock pattern sample.
pub const LOCK_PATTERN_COLUMNS: usize = 17;

/// A closed numeric interval given by its bounds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Range {
    pub low: f64,
    pub high: f64,
}

impl Range {
    pub fn new(low: f64, high: f64) -> Self {
        Self { low, high }
    }

    pub fn span(&self) -> f64 {
        self.high - self.low
    }

    pub fn is_degenerate(&self) -> bool {
        self.high == self.low
    }

    fn finite_span(&self) -> Result<f64> {
        let span = self.span();
        if !span.is_finite() {
            return Err(NetworkError::RangeNotFinite {
                low: self.low,
                high: self.high,
            });
        }

        Ok(span)
    }

    fn nonzero_span(&self) -> Result<f64> {
        if self.is_degenerate() {
            return Err(NetworkError::RangeDegenerate {
                low: self.low,
                high: self.high,
            });
        }

        self.finite_span()
    }
}

/// Both spans must be finite and only `from` needs to be non-zero.
fn check_ranges(from: Range, to: Range) -> Result<()> {
    from.nonzero_span()?;
    to.finite_span()?;
    Ok(())
}

/// Maps `value` from `from` onto `to`.
fn rescale(from: Range, to: Range, value: f64) -> Result<f64> {
    check_ranges(from, to)?;
    Ok(affine(from, to, value))
}

fn affine(from: Range, to: Range, value: f64) -> f64 {
    (value - from.low) / from.span() * to.span() + to.low
}

#[derive(Debug, Clone, Copy)]
enum Direction {
    Normalize,
    Denormalize,
}

impl Direction {
    /// Orders an `(input, output)` pair of ranges as `(from, to)`.
    fn orient(self, input: Range, output: Range) -> (Range, Range) {
        match self {
            Self::Normalize => (input, output),
            Self::Denormalize => (output, input),
        }
    }
}

/// Rescales `value` from `[input_low, input_high]` onto `[output_low, output_high]`.
///
/// # Errors
/// `RangeDegenerate` if `input_low == input_high`, `RangeNotFinite` if either range has an
/// infinite or NaN span.
pub fn normalize(
    input_low: f64,
    input_high: f64,
    output_low: f64,
    output_high: f64,
    value: f64,
) -> Result<f64> {
    let (from, to) = Direction::Normalize.orient(
        Range::new(input_low, input_high),
        Range::new(output_low, output_high),
    );
    rescale(from, to, value)
}

/// Inverse of [`normalize`]: brings a value from `[output_low, output_high]` back onto
/// `[input_low, input_high]`.
///
/// # Errors
/// `RangeDegenerate` if `output_low == output_high`, `RangeNotFinite` if either range has an
/// infinite or NaN span.
pub fn denormalize(
    input_low: f64,
    input_high: f64,
    output_low: f64,
    output_high: f64,
    value: f64,
) -> Result<f64> {
    let (from, to) = Direction::Denormalize.orient(
        Range::new(input_low, input_high),
        Range::new(output_low, output_high),
    );
    rescale(from, to, value)
}

fn rescale_all(from: Range, to: Range, values: &[f64]) -> Result<Vec<f64>> {
    check_ranges(from, to)?;
    values.iter().map(|&v| rescale(from, to, v)).collect()
}

/// [`normalize`] applied to every value with the same bounds.
pub fn normalize_all(
    input_low: f64,
    input_high: f64,
    output_low: f64,
    output_high: f64,
    values: &[f64],
) -> Result<Vec<f64>> {
    let (from, to) = Direction::Normalize.orient(
        Range::new(input_low, input_high),
        Range::new(output_low, output_high),
    );
    rescale_all(from, to, values)
}

/// [`denormalize`] applied to every value with the same bounds.
pub fn denormalize_all(
    input_low: f64,
    input_high: f64,
    output_low: f64,
    output_high: f64,
    values: &[f64],
) -> Result<Vec<f64>> {
    let (from, to) = Direction::Denormalize.orient(
        Range::new(input_low, input_high),
        Range::new(output_low, output_high),
    );
    rescale_all(from, to, values)
}

/// Pairs up the per-column bounds as `(from, to)` ranges, checking that there's one bound of each
/// kind per column and that every pair passes `check_ranges`.
fn column_ranges(
    bounds: [(&'static str, &[f64]); 4],
    columns: usize,
    direction: Direction,
) -> Result<Vec<(Range, Range)>> {
    for (what, bound) in bounds {
        if bound.len() != columns {
            return Err(NetworkError::DimensionMismatch {
                what,
                got: bound.len(),
                expected: columns,
            });
        }
    }

    let [(_, il), (_, ih), (_, ol), (_, oh)] = bounds;
    (0..columns)
        .map(|j| {
            let (from, to) =
                direction.orient(Range::new(il[j], ih[j]), Range::new(ol[j], oh[j]));
            check_ranges(from, to)?;
            Ok((from, to))
        })
        .collect()
}

fn rescale_columns(ranges: &[(Range, Range)], values: &[f64]) -> Result<Vec<f64>> {
    ranges
        .iter()
        .zip(values)
        .map(|(&(from, to), &v)| rescale(from, to, v))
        .collect()
}

fn rescale_matrix(ranges: &[(Range, Range)], values: ArrayView2<f64>) -> Array2<f64> {
    let mut out = values.to_owned();
    for (mut column, &(from, to)) in out.columns_mut().into_iter().zip(ranges) {
        column.mapv_inplace(|v| affine(from, to, v));
    }

    out
}

fn bounds<'a>(
    input_low: &'a [f64],
    input_high: &'a [f64],
    output_low: &'a [f64],
    output_high: &'a [f64],
) -> [(&'static str, &'a [f64]); 4] {
    [
        ("input_low", input_low),
        ("input_high", input_high),
        ("output_low", output_low),
        ("output_high", output_high),
    ]
}

/// Normalizes each position `j` of `values` with its own bounds `(input_low[j], input_high[j],
/// output_low[j], output_high[j])`.
///
/// # Errors
/// `DimensionMismatch` if a bound sequence doesn't have one entry per value, `RangeDegenerate`
/// if any input range has a zero span, `RangeNotFinite` if any span isn't finite.
pub fn normalize_columns(
    input_low: &[f64],
    input_high: &[f64],
    output_low: &[f64],
    output_high: &[f64],
    values: &[f64],
) -> Result<Vec<f64>> {
    let ranges = column_ranges(
        bounds(input_low, input_high, output_low, output_high),
        values.len(),
        Direction::Normalize,
    )?;
    rescale_columns(&ranges, values)
}

/// Inverse of [`normalize_columns`].
pub fn denormalize_columns(
    input_low: &[f64],
    input_high: &[f64],
    output_low: &[f64],
    output_high: &[f64],
    values: &[f64],
) -> Result<Vec<f64>> {
    let ranges = column_ranges(
        bounds(input_low, input_high, output_low, output_high),
        values.len(),
        Direction::Denormalize,
    )?;
    rescale_columns(&ranges, values)
}

/// Normalizes every row of `values`, column `j` using the bounds at position `j`.
///
/// # Errors
/// `DimensionMismatch` if a bound sequence doesn't have one entry per column, `RangeDegenerate`
/// if any input range has a zero span, `RangeNotFinite` if any span isn't finite.
pub fn normalize_matrix(
    input_low: &[f64],
    input_high: &[f64],
    output_low: &[f64],
    output_high: &[f64],
    values: ArrayView2<f64>,
) -> Result<Array2<f64>> {
    let ranges = column_ranges(
        bounds(input_low, input_high, output_low, output_high),
        values.ncols(),
        Direction::Normalize,
    )?;
    Ok(rescale_matrix(&ranges, values))
}

/// Inverse of [`normalize_matrix`].
pub fn denormalize_matrix(
    input_low: &[f64],
    input_high: &[f64],
    output_low: &[f64],
    output_high: &[f64],
    values: ArrayView2<f64>,
) -> Result<Array2<f64>> {
    let ranges = column_ranges(
        bounds(input_low, input_high, output_low, output_high),
        values.ncols(),
        Direction::Denormalize,
    )?;
    Ok(rescale_matrix(&ranges, values))
}

/// Per-column bounds for rescaling samples, kept together so they can be stored next to a
/// network or read from a config file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnRanges {
    pub input_low: Vec<f64>,
    pub input_high: Vec<f64>,
    pub output_low: Vec<f64>,
    pub output_high: Vec<f64>,
}

impl ColumnRanges {
    /// Creates new `ColumnRanges`.
    ///
    /// # Errors
    /// `DimensionMismatch` if the four sequences don't have the same length.
    pub fn new(
        input_low: Vec<f64>,
        input_high: Vec<f64>,
        output_low: Vec<f64>,
        output_high: Vec<f64>,
    ) -> Result<Self> {
        let ranges = Self {
            input_low,
            input_high,
            output_low,
            output_high,
        };
        ranges.validate()?;
        Ok(ranges)
    }

    /// The same `input` and `output` ranges for `columns` columns.
    pub fn uniform(columns: usize, input: Range, output: Range) -> Self {
        Self {
            input_low: vec![input.low; columns],
            input_high: vec![input.high; columns],
            output_low: vec![output.low; columns],
            output_high: vec![output.high; columns],
        }
    }

    /// Bounds for the lock pattern features: every third column is a duration in `[0, 5000]`,
    /// the others already lie in `[0, 1]`. Everything is mapped onto `[0, 1]`.
    pub fn lock_pattern() -> Self {
        let input_high = (0..LOCK_PATTERN_COLUMNS)
            .map(|j| if j % 3 == 2 { 5000. } else { 1. })
            .collect();

        Self {
            input_low: vec![0.; LOCK_PATTERN_COLUMNS],
            input_high,
            output_low: vec![0.; LOCK_PATTERN_COLUMNS],
            output_high: vec![1.; LOCK_PATTERN_COLUMNS],
        }
    }

    /// The amount of columns described.
    pub fn len(&self) -> usize {
        self.input_low.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Checks that every sequence has one entry per column and that no range is degenerate in
    /// either direction.
    pub fn validate(&self) -> Result<()> {
        self.validate_normalize()?;
        column_ranges(self.bounds(), self.len(), Direction::Denormalize)?;
        Ok(())
    }

    /// Like `validate` but only for normalizing, so degenerate output ranges are accepted.
    pub fn validate_normalize(&self) -> Result<()> {
        column_ranges(self.bounds(), self.len(), Direction::Normalize)?;
        Ok(())
    }

    fn bounds(&self) -> [(&'static str, &[f64]); 4] {
        bounds(
            &self.input_low,
            &self.input_high,
            &self.output_low,
            &self.output_high,
        )
    }

    pub fn normalize_row(&self, row: &[f64]) -> Result<Vec<f64>> {
        normalize_columns(
            &self.input_low,
            &self.input_high,
            &self.output_low,
            &self.output_high,
            row,
        )
    }

    pub fn denormalize_row(&self, row: &[f64]) -> Result<Vec<f64>> {
        denormalize_columns(
            &self.input_low,
            &self.input_high,
            &self.output_low,
            &self.output_high,
            row,
        )
    }

    pub fn normalize_rows(&self, rows: ArrayView2<f64>) -> Result<Array2<f64>> {
        normalize_matrix(
            &self.input_low,
            &self.input_high,
            &self.output_low,
            &self.output_high,
            rows,
        )
    }

    pub fn denormalize_rows(&self, rows: ArrayView2<f64>) -> Result<Array2<f64>> {
        denormalize_matrix(
            &self.input_low,
            &self.input_high,
            &self.output_low,
            &self.output_high,
            rows,
        )
    }
}

#[cfg(test)]
mod tests {
    use ndarray::array;

    use super::*;

    const SAMPLES: [f64; 9] = [-7.5, -1., 0., 0.25, 1., 3., 2500., 4999.9, 1e6];

    const BOUNDS: [(f64, f64, f64, f64); 5] = [
        (0., 5000., 0., 1.),
        (0., 1., -1., 1.),
        (-3., 7., 10., 2.),
        (1e-3, 2e-3, 0., 100.),
        (5., -5., 0.5, 0.6),
    ];

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() <= 1e-9 * a.abs().max(b.abs()).max(1.)
    }

    #[test]
    fn end_to_end_example() {
        assert_eq!(normalize(0., 5000., 0., 1., 2500.).unwrap(), 0.5);
        assert_eq!(denormalize(0., 5000., 0., 1., 0.5).unwrap(), 2500.);
    }

    #[test]
    fn denormalize_inverts_normalize() {
        for (il, ih, ol, oh) in BOUNDS {
            for x in SAMPLES {
                let y = normalize(il, ih, ol, oh, x).unwrap();
                let back = denormalize(il, ih, ol, oh, y).unwrap();
                assert!(close(back, x), "{x} -> {y} -> {back} for {:?}", (il, ih, ol, oh));
            }
        }
    }

    #[test]
    fn bounds_map_onto_bounds() {
        for (il, ih, ol, oh) in BOUNDS {
            assert_eq!(normalize(il, ih, ol, oh, il).unwrap(), ol);
            assert!(close(normalize(il, ih, ol, oh, ih).unwrap(), oh));
        }
    }

    #[test]
    fn normalize_is_affine_and_does_not_clamp() {
        for (il, ih, ol, oh) in BOUNDS {
            let slope = (oh - ol) / (ih - il);
            for x in SAMPLES {
                let a = normalize(il, ih, ol, oh, x).unwrap();
                let b = normalize(il, ih, ol, oh, x + 1.).unwrap();
                assert!(close(b - a, slope) || (b - a - slope).abs() < 1e-6);
            }
        }

        assert_eq!(normalize(0., 1., 0., 10., 2.).unwrap(), 20.);
        assert_eq!(normalize(0., 1., 0., 10., -1.).unwrap(), -10.);
    }

    #[test]
    fn degenerate_ranges_are_rejected() {
        let err = normalize(5., 5., 0., 1., 3.).unwrap_err();
        assert!(matches!(
            err,
            NetworkError::RangeDegenerate { low, high } if low == 5. && high == 5.
        ));

        let err = denormalize(0., 1., 2., 2., 0.5).unwrap_err();
        assert!(matches!(err, NetworkError::RangeDegenerate { .. }));

        assert!(normalize_all(1., 1., 0., 1., &[]).is_err());
    }

    #[test]
    fn degenerate_columns_are_rejected() {
        let values = array![[1., 2.]];
        let err = normalize_matrix(&[0., 3.], &[1., 3.], &[0., 0.], &[1., 1.], values.view())
            .unwrap_err();
        assert!(matches!(
            err,
            NetworkError::RangeDegenerate { low, high } if low == 3. && high == 3.
        ));

        let err = normalize_columns(&[0., 3.], &[1., 3.], &[0., 0.], &[1., 1.], &[1., 2.])
            .unwrap_err();
        assert!(matches!(err, NetworkError::RangeDegenerate { .. }));

        let err = denormalize_columns(&[0., 0.], &[1., 1.], &[0., 2.], &[1., 2.], &[0.5, 2.])
            .unwrap_err();
        assert!(matches!(
            err,
            NetworkError::RangeDegenerate { low, high } if low == 2. && high == 2.
        ));

        let err = denormalize_matrix(&[0., 0.], &[1., 1.], &[0., 2.], &[1., 2.], values.view())
            .unwrap_err();
        assert!(matches!(err, NetworkError::RangeDegenerate { .. }));
    }

    #[test]
    fn degenerate_output_columns_are_fine_for_normalize() {
        let ranges = ColumnRanges {
            input_low: vec![0., 0.],
            input_high: vec![1., 10.],
            output_low: vec![0., 4.],
            output_high: vec![1., 4.],
        };

        ranges.validate_normalize().unwrap();
        assert_eq!(ranges.normalize_row(&[0.5, 7.]).unwrap(), vec![0.5, 4.]);
        assert!(matches!(
            ranges.validate(),
            Err(NetworkError::RangeDegenerate { low, high }) if low == 4. && high == 4.
        ));
    }

    #[test]
    fn non_finite_spans_are_rejected() {
        assert!(matches!(
            normalize(f64::NAN, 1., 0., 1., 0.5),
            Err(NetworkError::RangeNotFinite { .. })
        ));
        assert!(matches!(
            normalize(f64::NEG_INFINITY, f64::INFINITY, 0., 1., 0.5),
            Err(NetworkError::RangeNotFinite { .. })
        ));
        assert!(matches!(
            normalize(0., 1., -1e308, 1e308, 0.5),
            Err(NetworkError::RangeNotFinite { low, high }) if low == -1e308 && high == 1e308
        ));
        assert!(matches!(
            denormalize(0., 1., 0., f64::NAN, 0.5),
            Err(NetworkError::RangeNotFinite { .. })
        ));

        let values = array![[0.5]];
        assert!(matches!(
            normalize_matrix(&[0.], &[1.], &[0.], &[f64::INFINITY], values.view()),
            Err(NetworkError::RangeNotFinite { .. })
        ));
    }

    #[test]
    fn degenerate_output_range_is_fine_for_normalize() {
        assert_eq!(normalize(0., 1., 2., 2., 0.7).unwrap(), 2.);
    }

    #[test]
    fn vector_form_matches_scalar_form() {
        let values = [0., 1250., 2500., 6000.];
        let all = normalize_all(0., 5000., 0., 1., &values).unwrap();
        let scalar: Vec<f64> = values
            .iter()
            .map(|&v| normalize(0., 5000., 0., 1., v).unwrap())
            .collect();

        assert_eq!(all, scalar);
        assert_eq!(all, vec![0., 0.25, 0.5, 1.2]);
        assert_eq!(denormalize_all(0., 5000., 0., 1., &all).unwrap(), values);
    }

    #[test]
    fn column_form_uses_one_range_per_position() {
        let il = [0., 0., -1.];
        let ih = [1., 5000., 1.];
        let ol = [0., 0., 0.];
        let oh = [1., 1., 10.];
        let values = [0.5, 2500., 0.];

        let normalized = normalize_columns(&il, &ih, &ol, &oh, &values).unwrap();
        assert_eq!(normalized, vec![0.5, 0.5, 5.]);

        for (j, &v) in values.iter().enumerate() {
            assert_eq!(normalized[j], normalize(il[j], ih[j], ol[j], oh[j], v).unwrap());
        }

        let back = denormalize_columns(&il, &ih, &ol, &oh, &normalized).unwrap();
        assert_eq!(back, values);
    }

    #[test]
    fn column_form_rejects_mismatched_lengths() {
        let err = normalize_columns(&[0., 0.], &[1.], &[0.], &[1.], &[0.5]).unwrap_err();
        assert!(matches!(
            err,
            NetworkError::DimensionMismatch {
                what: "input_low",
                got: 2,
                expected: 1,
            }
        ));
    }

    #[test]
    fn matrix_form_is_column_wise() {
        let il = [0., 0.];
        let ih = [1., 5000.];
        let ol = [0., -1.];
        let oh = [1., 1.];
        let values = array![[0.25, 0.], [1., 2500.], [0., 5000.]];

        let normalized = normalize_matrix(&il, &ih, &ol, &oh, values.view()).unwrap();
        assert_eq!(normalized, array![[0.25, -1.], [1., 0.], [0., 1.]]);

        let back = denormalize_matrix(&il, &ih, &ol, &oh, normalized.view()).unwrap();
        assert_eq!(back, values);
    }

    #[test]
    fn denormalize_forms_reject_mismatched_lengths() {
        let err = denormalize_columns(&[0.], &[1.], &[0.], &[1., 1.], &[0.5]).unwrap_err();
        assert!(matches!(
            err,
            NetworkError::DimensionMismatch {
                what: "output_high",
                got: 2,
                expected: 1,
            }
        ));

        let values = array![[0.5, 0.5]];
        let err = denormalize_matrix(&[0.; 2], &[1.; 2], &[0.], &[1.; 2], values.view())
            .unwrap_err();
        assert!(matches!(
            err,
            NetworkError::DimensionMismatch {
                what: "output_low",
                got: 1,
                expected: 2,
            }
        ));
    }

    #[test]
    fn matrix_form_rejects_wrong_column_count() {
        let values = array![[0., 1., 2.]];
        let err = normalize_matrix(&[0.; 2], &[1.; 2], &[0.; 2], &[1.; 2], values.view())
            .unwrap_err();
        assert!(matches!(
            err,
            NetworkError::DimensionMismatch {
                got: 2,
                expected: 3,
                ..
            }
        ));
    }

    #[test]
    fn lock_pattern_ranges_scale_durations() {
        let ranges = ColumnRanges::lock_pattern();
        assert_eq!(ranges.len(), LOCK_PATTERN_COLUMNS);
        ranges.validate().unwrap();

        let row: Vec<f64> = (0..LOCK_PATTERN_COLUMNS)
            .map(|j| if j % 3 == 2 { 2500. } else { 1. })
            .collect();
        let normalized = ranges.normalize_row(&row).unwrap();

        assert_eq!(normalized[0], 1.);
        assert_eq!(normalized[2], 0.5);
        assert_eq!(ranges.denormalize_row(&normalized).unwrap(), row);
    }

    #[test]
    fn column_ranges_validate_lengths() {
        let err = ColumnRanges::new(vec![0.], vec![1., 1.], vec![0.], vec![1.]).unwrap_err();
        assert!(matches!(err, NetworkError::DimensionMismatch { what: "input_high", .. }));

        let ranges = ColumnRanges::uniform(2, Range::new(0., 10.), Range::new(0., 1.));
        let rows = array![[5., 10.]];
        assert_eq!(ranges.normalize_rows(rows.view()).unwrap(), array![[0.5, 1.]]);
    }
}
