//! Encrypted weight matrices and bias vectors.
//!
//! Random matrices draw and encrypt once per cell. Constant builders encrypt
//! the fill value once and clone that ciphertext into every cell, so all cells
//! decrypt to the same value yet remain independent instances.

use std::ops::{Deref, DerefMut, Index, IndexMut};

use rand::Rng;

use crate::cipher::Ciphertext;
use crate::context::SchemeContext;
use crate::error::{HeError, Result};
use crate::scalar::{check_range, encrypt_constant, random_scalar};

/// Row-major `rows × cols` grid of ciphertexts.
#[derive(Clone, Debug)]
pub struct EncryptedMatrix {
    rows: usize,
    cols: usize,
    cells: Vec<Ciphertext>,
}

impl EncryptedMatrix {
    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Row `i` as a slice of `cols` ciphertexts.
    pub fn row(&self, i: usize) -> &[Ciphertext] {
        &self.cells[i * self.cols..(i + 1) * self.cols]
    }

    pub fn row_mut(&mut self, i: usize) -> &mut [Ciphertext] {
        &mut self.cells[i * self.cols..(i + 1) * self.cols]
    }

    /// Iterate rows in order. Yields `rows` slices even when `cols` is zero.
    pub fn iter_rows(&self) -> impl Iterator<Item = &[Ciphertext]> + '_ {
        (0..self.rows).map(move |i| self.row(i))
    }

    pub fn cells(&self) -> &[Ciphertext] {
        &self.cells
    }
}

impl Index<(usize, usize)> for EncryptedMatrix {
    type Output = Ciphertext;

    fn index(&self, (i, j): (usize, usize)) -> &Ciphertext {
        assert!(i < self.rows && j < self.cols, "index ({i}, {j}) out of bounds");
        &self.cells[i * self.cols + j]
    }
}

impl IndexMut<(usize, usize)> for EncryptedMatrix {
    fn index_mut(&mut self, (i, j): (usize, usize)) -> &mut Ciphertext {
        assert!(i < self.rows && j < self.cols, "index ({i}, {j}) out of bounds");
        &mut self.cells[i * self.cols + j]
    }
}

/// Ordered sequence of ciphertexts. Derefs to a slice.
#[derive(Clone, Debug, Default)]
pub struct EncryptedVector(Vec<Ciphertext>);

impl EncryptedVector {
    pub fn into_inner(self) -> Vec<Ciphertext> {
        self.0
    }
}

impl Deref for EncryptedVector {
    type Target = [Ciphertext];

    fn deref(&self) -> &[Ciphertext] {
        &self.0
    }
}

impl DerefMut for EncryptedVector {
    fn deref_mut(&mut self) -> &mut [Ciphertext] {
        &mut self.0
    }
}

impl From<Vec<Ciphertext>> for EncryptedVector {
    fn from(cells: Vec<Ciphertext>) -> Self {
        Self(cells)
    }
}

/// Weight initialization: every cell an independent uniform draw from
/// `[low, high)`, encrypted on its own.
pub fn build_random_matrix<R: Rng>(
    ctx: &SchemeContext,
    rows: usize,
    cols: usize,
    low: f64,
    high: f64,
    rng: &mut R,
) -> Result<EncryptedMatrix> {
    check_range(low, high)?;
    let cells = (0..cell_count(rows, cols)?)
        .map(|_| random_scalar(ctx, low, high, &mut *rng))
        .collect::<Result<Vec<_>>>()?;
    Ok(EncryptedMatrix { rows, cols, cells })
}

/// `len` clones of one encryption of `fill`.
pub fn build_constant_vector(
    ctx: &SchemeContext,
    len: usize,
    fill: f64,
) -> Result<EncryptedVector> {
    let template = encrypt_constant(ctx, fill)?;
    Ok(EncryptedVector(vec![template; len]))
}

/// `rows × cols` clones of one encryption of `fill`.
pub fn build_constant_matrix(
    ctx: &SchemeContext,
    rows: usize,
    cols: usize,
    fill: f64,
) -> Result<EncryptedMatrix> {
    let count = cell_count(rows, cols)?;
    let template = encrypt_constant(ctx, fill)?;
    Ok(EncryptedMatrix {
        rows,
        cols,
        cells: vec![template; count],
    })
}

fn cell_count(rows: usize, cols: usize) -> Result<usize> {
    rows.checked_mul(cols)
        .ok_or_else(|| HeError::ShapeMismatch(format!("{rows} x {cols} cells overflow usize")))
}
