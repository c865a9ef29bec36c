use rand::Rng;
use serde::{Serialize, Deserialize};
use std::ops::{Add, Sub};

use crate::loss::error::{LossError, Result};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Matrix{
    pub rows: usize,
    pub cols: usize,
    pub data: Vec<Vec<f64>>
}

impl Matrix{
    pub fn zeros(rows: usize, cols: usize) -> Matrix {
        Matrix{
            rows,
            cols,
            data: vec![vec![0.0; cols]; rows]
        }
    }

    /// Uniform samples in [-scale, scale).
    pub fn random<R: Rng + ?Sized>(rows: usize, cols: usize, scale: f64, rng: &mut R) -> Matrix {
        let mut res = Matrix::zeros(rows, cols);

        for i in 0..rows {
            for j in 0..cols {
                res.data[i][j] = (rng.gen::<f64>() * 2.0 - 1.0) * scale;
            }
        }

        res
    }

    /// Builds a matrix from row vectors, rejecting rows of unequal length.
    ///
    /// An empty `data` yields a 0×0 matrix.
    pub fn from_rows(data: Vec<Vec<f64>>) -> Result<Matrix> {
        let cols = data.first().map_or(0, |row| row.len());
        if let Some((row, bad)) = data.iter().enumerate().find(|(_, r)| r.len() != cols) {
            return Err(LossError::RaggedRows { row, expected: cols, found: bad.len() });
        }
        Ok(Matrix { rows: data.len(), cols, data })
    }

    /// Checks that `data` agrees with the `rows` and `cols` fields.
    ///
    /// The fields are public, so a hand-built matrix can disagree with its
    /// own storage.
    pub fn check_consistent(&self) -> Result<()> {
        if self.data.len() != self.rows {
            return Err(LossError::RowCount { expected: self.rows, found: self.data.len() });
        }
        if let Some((row, bad)) = self.data.iter().enumerate().find(|(_, r)| r.len() != self.cols) {
            return Err(LossError::RaggedRows { row, expected: self.cols, found: bad.len() });
        }
        Ok(())
    }

    pub fn shape(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    pub fn get(&self, row: usize, col: usize) -> f64 {
        self.data[row][col]
    }

    pub fn set(&mut self, row: usize, col: usize, value: f64) {
        self.data[row][col] = value;
    }

    pub fn row(&self, i: usize) -> &[f64] {
        &self.data[i]
    }

    pub fn transpose(&self) -> Matrix {
        let mut res = Matrix::zeros(self.cols, self.rows);

        for i in 0..res.rows {
            for j in 0..res.cols {
                res.data[i][j] = self.data[j][i];
            }
        }

        res
    }

    pub fn map<F>(&self, functor: F) -> Matrix
    where
        F: Fn(f64) -> f64,
    {
        Matrix {
            rows: self.rows,
            cols: self.cols,
            data: self.data
                .iter()
                .map(|row| row.iter().map(|&x| functor(x)).collect())
                .collect(),
        }
    }

    pub fn scale(&self, factor: f64) -> Matrix {
        self.map(|x| x * factor)
    }

    /// Σ of squared entries (squared Frobenius norm).
    pub fn sum_squares(&self) -> f64 {
        self.data.iter().flatten().map(|x| x * x).sum()
    }

    /// Largest absolute entry; 0.0 for an empty matrix.
    pub fn max_abs(&self) -> f64 {
        self.data.iter().flatten().fold(0.0, |acc: f64, x| acc.max(x.abs()))
    }

    /// Matrix product that reports incompatible shapes instead of panicking.
    pub fn matmul(&self, rhs: &Matrix) -> Result<Matrix> {
        if self.cols != rhs.rows {
            return Err(LossError::ShapeMismatch { weight_rows: rhs.rows, data_cols: self.cols });
        }
        self.check_consistent()?;
        rhs.check_consistent()?;

        let mut res = Matrix::zeros(self.rows, rhs.cols);

        for i in 0..res.rows {
            let lhs_row = &self.data[i];
            let out_row = &mut res.data[i];
            for (k, &a) in lhs_row.iter().enumerate() {
                for (out, &b) in out_row.iter_mut().zip(rhs.data[k].iter()) {
                    *out += a * b;
                }
            }
        }

        Ok(res)
    }

    /// Column index of the largest entry in each row.
    pub fn argmax_rows(&self) -> Vec<usize> {
        self.data.iter().map(|row| argmax(row)).collect()
    }
}

/// Index of the maximum element in a slice.
pub fn argmax(v: &[f64]) -> usize {
    v.iter()
        .enumerate()
        .max_by(|(_, a), (_, b)| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal))
        .map(|(i, _)| i)
        .unwrap_or(0)
}

impl Default for Matrix {
    fn default() -> Self {
        Matrix { rows: 0, cols: 0, data: vec![] }
    }
}

impl Add for Matrix {
    type Output = Matrix;

    fn add(self, rhs: Self) -> Self::Output {
        if self.rows != rhs.rows || self.cols != rhs.cols {
            panic!("Matrices are of incorrect sizes")
        }

        let mut res = self;

        for (row, rhs_row) in res.data.iter_mut().zip(rhs.data.iter()) {
            for (x, y) in row.iter_mut().zip(rhs_row.iter()) {
                *x += y;
            }
        }

        res
    }
}

impl Sub for Matrix {
    type Output = Matrix;

    fn sub(self, rhs: Self) -> Self::Output {
        if self.rows != rhs.rows || self.cols != rhs.cols {
            panic!("Matrices are of incorrect sizes")
        }

        let mut res = self;

        for (row, rhs_row) in res.data.iter_mut().zip(rhs.data.iter()) {
            for (x, y) in row.iter_mut().zip(rhs_row.iter()) {
                *x -= y;
            }
        }

        res
    }
}
