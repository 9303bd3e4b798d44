use std::num::NonZeroUsize;

use ndarray::{Array2, ArrayView2, Axis};

use crate::{MlErr, Result};

/// Samples laid out row by row, each row holding the `x_size` inputs followed by the `y_size`
/// expected outputs.
#[derive(Debug, Clone)]
pub struct Dataset {
    x_size: usize,
    y_size: usize,
    data: Array2<f64>,
}

impl Dataset {
    /// Creates a new `Dataset` from a flat, row major buffer.
    ///
    /// # Errors
    /// `MlErr::InvalidDataset` if a row would be empty or `data` doesn't hold a whole number of
    /// rows.
    pub fn new(data: Vec<f64>, x_size: usize, y_size: usize) -> Result<Self> {
        let row_size = x_size + y_size;
        if x_size == 0 || y_size == 0 {
            return Err(MlErr::InvalidDataset(format!(
                "x_size ({x_size}) and y_size ({y_size}) must be greater than 0"
            )));
        }

        if data.len() % row_size != 0 {
            return Err(MlErr::InvalidDataset(format!(
                "dataset length ({}) is not divisible by x_size + y_size ({row_size})",
                data.len()
            )));
        }

        let rows = data.len() / row_size;
        let data = Array2::from_shape_vec((rows, row_size), data)
            .map_err(|e| MlErr::InvalidDataset(e.to_string()))?;

        Ok(Self {
            x_size,
            y_size,
            data,
        })
    }

    /// Creates a new `Dataset` pairing every input row with its expected output row.
    pub fn from_pairs<X, Y>(xs: &[X], ys: &[Y]) -> Result<Self>
    where
        X: AsRef<[f64]>,
        Y: AsRef<[f64]>,
    {
        if xs.len() != ys.len() {
            return Err(MlErr::SizeMismatch {
                what: "dataset targets",
                got: ys.len(),
                expected: xs.len(),
            });
        }

        let x_size = xs.first().map_or(0, |x| x.as_ref().len());
        let y_size = ys.first().map_or(0, |y| y.as_ref().len());

        let mut data = Vec::with_capacity(xs.len() * (x_size + y_size));
        for (x, y) in xs.iter().zip(ys) {
            let (x, y) = (x.as_ref(), y.as_ref());
            if x.len() != x_size || y.len() != y_size {
                return Err(MlErr::InvalidDataset(format!(
                    "every sample must have {x_size} inputs and {y_size} outputs"
                )));
            }

            data.extend_from_slice(x);
            data.extend_from_slice(y);
        }

        Self::new(data, x_size, y_size)
    }

    pub fn x_size(&self) -> usize {
        self.x_size
    }

    pub fn y_size(&self) -> usize {
        self.y_size
    }

    /// The amount of samples.
    pub fn len(&self) -> usize {
        self.data.nrows()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Splits the whole dataset into its inputs and expected outputs.
    pub fn view(&self) -> (ArrayView2<'_, f64>, ArrayView2<'_, f64>) {
        self.data.view().split_at(Axis(1), self.x_size)
    }

    /// Iterates the samples in consecutive batches of at most `batch_size` rows.
    pub fn batches(
        &self,
        batch_size: NonZeroUsize,
    ) -> impl Iterator<Item = (ArrayView2<'_, f64>, ArrayView2<'_, f64>)> {
        let x_size = self.x_size;
        self.data
            .axis_chunks_iter(Axis(0), batch_size.get())
            .map(move |rows| rows.split_at(Axis(1), x_size))
    }
}

#[cfg(test)]
mod tests {
    use ndarray::array;

    use super::*;

    #[test]
    fn new_rejects_partial_rows() {
        let err = Dataset::new(vec![0., 1., 2., 3.], 2, 1).unwrap_err();
        assert!(matches!(err, MlErr::InvalidDataset(_)));
    }

    #[test]
    fn batches_split_inputs_from_outputs() {
        let dataset = Dataset::new(vec![0., 0., 0., 0., 1., 1., 1., 0., 1.], 2, 1).unwrap();
        assert_eq!(dataset.len(), 3);

        let batches: Vec<_> = dataset.batches(NonZeroUsize::new(2).unwrap()).collect();
        assert_eq!(batches.len(), 2);

        let (x, y) = batches[0];
        assert_eq!(x, array![[0., 0.], [0., 1.]]);
        assert_eq!(y, array![[0.], [1.]]);

        let (x, y) = batches[1];
        assert_eq!(x, array![[1., 0.]]);
        assert_eq!(y, array![[1.]]);
    }

    #[test]
    fn from_pairs_rejects_ragged_samples() {
        let xs = [vec![0., 1.], vec![1.]];
        let ys = [vec![1.], vec![0.]];
        assert!(Dataset::from_pairs(&xs, &ys).is_err());
    }
}
