use ndarray::Array2;
use rayon::prelude::*;

use std::fmt;

use tabled::{
    builder::Builder,
    object::{Columns, Rows},
    style::Border,
    Modify, Style, Table,
};

/// Dense row-major simplex tableau.
///
/// Row 0 is the reduced-cost row; rows `1..` are constraint rows. The last
/// column holds the right-hand sides. `basis[i]` names the column that is
/// basic in row `i`; `None` marks a row whose basis is an artificial
/// variable. Artificial columns are never materialized: an artificial has
/// `+1` in its own row and `-1` in the phase-1 objective row, so adding the
/// row into row 0 prices it out without the column ever existing. Entry 0 of
/// `basis` is unused and only keeps row indices aligned.
#[derive(Debug, Clone)]
pub struct Tableau {
    pub(crate) tbl: Array2<f64>,
    pub(crate) basis: Vec<Option<usize>>,
    parallel: bool,
}

impl Tableau {
    pub fn new(rows: usize, cols: usize, parallel: bool) -> Self {
        Self {
            tbl: Array2::zeros((rows, cols)),
            basis: vec![None; rows],
            parallel,
        }
    }

    pub fn rows(&self) -> usize {
        self.tbl.shape()[0]
    }

    pub fn cols(&self) -> usize {
        self.tbl.shape()[1]
    }

    #[inline(always)]
    pub fn get(&self, i: usize, j: usize) -> f64 {
        self.tbl[[i, j]]
    }

    #[inline(always)]
    pub fn set(&mut self, i: usize, j: usize, v: f64) {
        self.tbl[[i, j]] = v;
    }

    /// Right-hand side of row `i`.
    #[inline(always)]
    pub fn rhs(&self, i: usize) -> f64 {
        self.tbl[[i, self.cols() - 1]]
    }

    pub fn basis(&self, i: usize) -> Option<usize> {
        self.basis[i]
    }

    pub fn set_basis(&mut self, i: usize, col: usize) {
        self.basis[i] = Some(col);
    }

    /// Any constraint row still based on an artificial variable?
    pub fn has_artificial(&self) -> bool {
        self.basis[1..].iter().any(Option::is_none)
    }

    pub fn zero_row(&mut self, i: usize) {
        self.tbl.row_mut(i).fill(0.0);
    }

    /// Divide every entry of row `i` by `s`.
    #[inline(always)]
    pub fn scale_row(&mut self, i: usize, s: f64) {
        for k in 0..self.cols() {
            self.tbl[[i, k]] /= s;
        }
    }

    /// `row[dst] += k * row[src]`.
    #[inline(always)]
    pub fn add_row_to_row(&mut self, src: usize, dst: usize, k: f64) {
        for c in 0..self.cols() {
            let v = self.tbl[[src, c]] * k;
            self.tbl[[dst, c]] += v;
        }
    }

    /// Pivot on `A[i,j]`: clear column `j` in every other row, then scale
    /// row `i` so `A[i,j] = 1`. The cleared entries are written as exact
    /// zeros, not left to cancellation.
    pub fn eliminate(&mut self, i: usize, j: usize) {
        debug_assert!(i < self.rows() && j < self.cols());
        if self.parallel {
            self.eliminate_parallel(i, j);
        } else {
            self.eliminate_scalar(i, j);
        }
    }

    fn eliminate_scalar(&mut self, i: usize, j: usize) {
        let aij = self.tbl[[i, j]];
        for k in 0..self.rows() {
            if k != i {
                let ratio = self.tbl[[k, j]] / aij;
                self.add_row_to_row(i, k, -ratio);
            }
        }
        for k in 0..self.rows() {
            if k != i {
                self.tbl[[k, j]] = 0.0;
            }
        }
        self.scale_row(i, aij);
    }

    /// Row-parallel elimination. Each worker owns whole rows, so the only
    /// shared read is the pivot row snapshot; results match the scalar path
    /// bit for bit.
    fn eliminate_parallel(&mut self, i: usize, j: usize) {
        let cols = self.cols();
        let pivot_row = self.tbl.row(i).to_owned();
        let pivot = pivot_row
            .as_slice()
            .expect("pivot row snapshot is contiguous");
        let aij = pivot[j];

        let data = self
            .tbl
            .as_slice_mut()
            .expect("tableau is allocated row-major");
        data.par_chunks_mut(cols).enumerate().for_each(|(k, row)| {
            if k == i {
                return;
            }
            let ratio = row[j] / aij;
            for (dst, src) in row.iter_mut().zip(pivot) {
                *dst -= src * ratio;
            }
            row[j] = 0.0;
        });

        self.scale_row(i, aij);
    }

    fn as_table(&self) -> Table {
        let mut builder = Builder::default();

        let mut header = vec!["basis".to_string()];
        header.extend((0..self.cols() - 1).map(|j| format!("c{j}")));
        header.push("rhs".to_string());
        builder.add_record(header);

        for i in 0..self.rows() {
            let label = if i == 0 {
                "z".to_string()
            } else {
                match self.basis[i] {
                    Some(col) => format!("c{col}"),
                    None => "art".to_string(),
                }
            };
            let mut record = vec![label];
            record.extend((0..self.cols()).map(|j| format!("{:.2}", self.tbl[[i, j]])));
            builder.add_record(record);
        }

        builder
            .build()
            .with(Style::empty())
            .with(Modify::new(Rows::single(0)).with(Border::default().bottom('─')))
            .with(Modify::new(Columns::single(0)).with(Border::default().right('│')))
    }
}

impl fmt::Display for Tableau {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "{}", self.as_table())
    }
}
