//! Grid shape, per-cell matrices and the validated grid description

use crate::error::{LayoutError, Result};
use serde::{Deserialize, Serialize};
use std::ops::Index;

/// Number of rows and columns of a subplot grid, both at least 1
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "(usize, usize)", into = "(usize, usize)")]
pub struct GridShape {
    rows: usize,
    cols: usize,
}

impl GridShape {
    pub fn new(rows: usize, cols: usize) -> Result<Self> {
        if rows == 0 || cols == 0 {
            return Err(LayoutError::InvalidShape { rows, cols });
        }
        Ok(Self { rows, cols })
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Number of cells
    pub fn len(&self) -> usize {
        self.rows * self.cols
    }

    pub fn is_empty(&self) -> bool {
        false
    }

    pub fn as_tuple(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    /// Cell positions in row-major order
    pub fn positions(&self) -> impl Iterator<Item = (usize, usize)> {
        let cols = self.cols;
        (0..self.len()).map(move |i| (i / cols, i % cols))
    }

    pub fn index_of(&self, (row, col): (usize, usize)) -> Option<usize> {
        (row < self.rows && col < self.cols).then(|| row * self.cols + col)
    }

    pub fn position_of(&self, index: usize) -> (usize, usize) {
        (index / self.cols, index % self.cols)
    }
}

impl TryFrom<(usize, usize)> for GridShape {
    type Error = LayoutError;

    fn try_from((rows, cols): (usize, usize)) -> Result<Self> {
        Self::new(rows, cols)
    }
}

impl From<GridShape> for (usize, usize) {
    fn from(shape: GridShape) -> Self {
        shape.as_tuple()
    }
}

/// Row-major `rows x cols` container holding one value per cell
#[derive(Debug, Clone, PartialEq)]
pub struct Matrix<T> {
    shape: GridShape,
    data: Vec<T>,
}

impl<T> Matrix<T> {
    /// Reshape a row-major list; `field` names the input in the error.
    pub fn from_vec(shape: GridShape, data: Vec<T>, field: &'static str) -> Result<Self> {
        if data.len() != shape.len() {
            return Err(LayoutError::shape_mismatch(
                field,
                shape.as_tuple(),
                data.len(),
            ));
        }
        Ok(Self { shape, data })
    }

    pub fn from_fn(shape: GridShape, mut f: impl FnMut((usize, usize)) -> T) -> Self {
        Self {
            shape,
            data: shape.positions().map(&mut f).collect(),
        }
    }

    pub fn shape(&self) -> GridShape {
        self.shape
    }

    pub fn get(&self, position: (usize, usize)) -> Option<&T> {
        self.shape.index_of(position).map(|i| &self.data[i])
    }

    pub fn get_mut(&mut self, position: (usize, usize)) -> Option<&mut T> {
        self.shape.index_of(position).map(move |i| &mut self.data[i])
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.data.iter()
    }

    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, T> {
        self.data.iter_mut()
    }

    /// `(position, value)` pairs in row-major order
    pub fn indexed(&self) -> impl Iterator<Item = ((usize, usize), &T)> {
        self.shape.positions().zip(self.data.iter())
    }

    /// Values grouped by row
    pub fn rows(&self) -> std::slice::Chunks<'_, T> {
        self.data.chunks(self.shape.cols)
    }

    pub fn as_slice(&self) -> &[T] {
        &self.data
    }

    pub fn into_vec(self) -> Vec<T> {
        self.data
    }

    pub fn map<U>(&self, f: impl FnMut(&T) -> U) -> Matrix<U> {
        Matrix {
            shape: self.shape,
            data: self.data.iter().map(f).collect(),
        }
    }
}

impl<T> Index<(usize, usize)> for Matrix<T> {
    type Output = T;

    fn index(&self, position: (usize, usize)) -> &T {
        match self.shape.index_of(position) {
            Some(i) => &self.data[i],
            None => panic!(
                "position {:?} out of range for {:?} matrix",
                position,
                self.shape.as_tuple()
            ),
        }
    }
}

impl<'a, T> IntoIterator for &'a Matrix<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.data.iter()
    }
}

/// A value for every cell: one value broadcast to all cells, or one per cell
#[derive(Debug, Clone, PartialEq)]
pub enum CellSpec<T> {
    All(T),
    /// Row-major values, one per cell
    Each(Vec<T>),
}

impl<T> CellSpec<T> {
    pub fn all(value: impl Into<T>) -> Self {
        CellSpec::All(value.into())
    }

    pub fn each<I>(values: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<T>,
    {
        CellSpec::Each(values.into_iter().map(Into::into).collect())
    }

    /// Flatten nested rows into row-major order
    pub fn rows<R, I>(rows: R) -> Self
    where
        R: IntoIterator<Item = I>,
        I: IntoIterator,
        I::Item: Into<T>,
    {
        CellSpec::Each(rows.into_iter().flatten().map(Into::into).collect())
    }

    /// Number of values supplied, `None` for a broadcast value
    pub fn count(&self) -> Option<usize> {
        match self {
            CellSpec::All(_) => None,
            CellSpec::Each(values) => Some(values.len()),
        }
    }

    pub fn into_matrix(self, shape: GridShape, field: &'static str) -> Result<Matrix<T>>
    where
        T: Clone,
    {
        match self {
            CellSpec::All(value) => Ok(Matrix::from_fn(shape, |_| value.clone())),
            CellSpec::Each(values) => Matrix::from_vec(shape, values, field),
        }
    }
}

/// Validated grid shape plus optional per-cell names
#[derive(Debug, Clone, PartialEq)]
pub struct GridSpec {
    shape: GridShape,
    names: Option<Matrix<String>>,
}

impl GridSpec {
    pub fn new(shape: GridShape, names: Option<Vec<String>>) -> Result<Self> {
        let names = names
            .map(|names| Matrix::from_vec(shape, names, "names"))
            .transpose()?;
        Ok(Self { shape, names })
    }

    pub fn shape(&self) -> GridShape {
        self.shape
    }

    pub fn names(&self) -> Option<&Matrix<String>> {
        self.names.as_ref()
    }

    pub fn name_at(&self, position: (usize, usize)) -> Option<&str> {
        self.names
            .as_ref()
            .and_then(|names| names.get(position))
            .map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn shape(rows: usize, cols: usize) -> GridShape {
        GridShape::new(rows, cols).unwrap()
    }

    #[test]
    fn zero_dimension_is_rejected() {
        assert_eq!(
            GridShape::new(0, 3),
            Err(LayoutError::InvalidShape { rows: 0, cols: 3 })
        );
    }

    #[test]
    fn positions_are_row_major() {
        let positions: Vec<_> = shape(2, 3).positions().collect();
        assert_eq!(
            positions,
            vec![(0, 0), (0, 1), (0, 2), (1, 0), (1, 1), (1, 2)]
        );
        assert_eq!(shape(2, 3).index_of((1, 2)), Some(5));
        assert_eq!(shape(2, 3).index_of((2, 0)), None);
    }

    #[test]
    fn nested_rows_flatten_in_order() {
        let spec: CellSpec<i64> = CellSpec::rows(vec![vec![0, 0, 1], vec![2, 3, 3]]);
        let matrix = spec.into_matrix(shape(2, 3), "controller_ids").unwrap();
        assert_eq!(matrix[(0, 2)], 1);
        assert_eq!(matrix[(1, 0)], 2);
        assert_eq!(matrix.rows().count(), 2);
    }

    #[test]
    fn nested_rows_may_use_any_shape_with_the_same_count() {
        let spec: CellSpec<i64> = CellSpec::rows(vec![vec![0, 1], vec![2, 3], vec![4, 5]]);
        let matrix = spec.into_matrix(shape(2, 3), "controller_ids").unwrap();
        assert_eq!(matrix[(1, 0)], 3);
    }

    #[test]
    fn broadcast_fills_every_cell() {
        let matrix = CellSpec::<String>::all("2d")
            .into_matrix(shape(2, 2), "cameras")
            .unwrap();
        assert!(matrix.iter().all(|v| v == "2d"));
    }

    #[test]
    fn count_mismatch_is_reported() {
        let err = CellSpec::<i64>::each([0, 1, 2])
            .into_matrix(shape(2, 2), "controller_ids")
            .unwrap_err();
        assert_eq!(err, LayoutError::shape_mismatch("controller_ids", (2, 2), 3));
    }

    #[test]
    fn grid_spec_validates_name_count() {
        let names = vec!["a".to_string(), "b".to_string()];
        let err = GridSpec::new(shape(1, 3), Some(names)).unwrap_err();
        assert!(matches!(
            err,
            LayoutError::ShapeMismatch {
                field: "names",
                expected: 3,
                actual: 2,
                ..
            }
        ));
    }

    #[test]
    fn grid_spec_names_lookup() {
        let names = ["a", "b", "c", "d"].map(String::from).to_vec();
        let spec = GridSpec::new(shape(2, 2), Some(names)).unwrap();
        assert_eq!(spec.name_at((1, 0)), Some("c"));
        assert!(GridSpec::new(shape(2, 2), None).unwrap().names().is_none());
    }
}
