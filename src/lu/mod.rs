pub(crate) mod def;
pub(crate) mod lu;

mod build_factors;
mod check_factors;
mod check_pivot;
mod dfs;
mod edit_u;
mod factorize;
mod file;
mod go_sparse;
mod list;
mod replace_column;
mod replace_column_pfi;
mod replace_row;
mod solve_l;
mod solve_pfi;
mod solve_r;
mod solve_transpose_l;
mod solve_transpose_r;
mod solve_transpose_u;
mod solve_u;
mod update_column;
mod update_column_transpose;

pub(crate) use lu::LU;

pub(crate) use factorize::factorize;
pub(crate) use go_sparse::go_sparse;
pub(crate) use replace_column::replace_column;
pub(crate) use replace_row::{empty_rows, replace_row};
pub(crate) use update_column::{update_column, update_column_ft, update_two_columns_ft};
pub(crate) use update_column_transpose::update_column_transpose;
