// Copyright (C) 2026 The etalu developers

//! Sparse LU factorization of simplex basis matrices.
//!
//! A [`Factorization`] solves `B x = b` (FTRAN) and `B' y = c` (BTRAN) for a
//! square basis `B` that changes one column at a time. Column replacements
//! are absorbed either by Forrest-Tomlin updates of U or by product form
//! etas until the caller refactorizes. Vectors are passed as
//! [`IndexedVector`]s so that solves only touch nonzeros, and triangular
//! solves choose between dense, bitmask and depth first traversals from the
//! densities observed in recent solves.

mod error;
mod factorization;
mod indexed_vector;
mod lu;
mod sparse;
mod status;

pub use error::{Error, Result};
pub use factorization::Factorization;
pub use indexed_vector::IndexedVector;
pub use sparse::{CscMatrix, SparseMatrix};
pub use status::Status;
