// Copyright (C) 2026 The etalu developers

use crate::indexed_vector::IndexedVector;
use crate::lu::def::*;
use crate::lu::lu::*;

// Apply the Forrest-Tomlin etas in creation order. Eta `t` computes
//
//     x[m+t] = x[r] - sum_j v_j * x[j],    x[r] = 0,
//
// with r = eta_row[t]. Inputs live in 0..m and position m+t is untouched
// before eta t, so every x[j] an eta reads is final once the etas before it
// were applied. This lets the two scatter methods push each final value
// through the column copy of R instead of gathering a dot product per eta.

/// Pick the cheapest way of applying R to a vector with `nnz` nonzeros.
pub(crate) fn choose_r_method(lu: &LU, nnz: usize) -> RMethod {
    let pivots = lu.num_eta as f64;
    let size_r = lu.r_elements() as f64;
    let average_r = size_r / usize::max(lu.rows_extra, 1) as f64;
    let nnz = nnz as f64;
    let m = usize::max(lu.m, 1) as f64;
    let final_nnz = nnz;

    let mut method1 =
        pivots * (COST_TEST_PIVOT + nnz / m * average_r) + nnz * (COST_TEST1 + average_r);
    let method0 = method1 + (nnz + pivots) * COST_SET_MARK;
    method1 += nnz * final_nnz;
    let method2 = size_r + pivots * COST_START_DOT + nnz * final_nnz;

    let use0 = lu.rt_valid && lu.sparse.is_some();
    let use1 = lu.rt_valid;
    if use0 && method0 <= method1 && method0 <= method2 {
        RMethod::MarkedScatter
    } else if use1 && method1 <= method2 {
        RMethod::Scatter
    } else {
        RMethod::DotProduct
    }
}

/// Apply R to `work` (full mode, pivot order) with the given method.
pub(crate) fn solve_r(lu: &mut LU, work: &mut IndexedVector, method: RMethod) {
    if lu.num_eta == 0 {
        return;
    }
    match method {
        RMethod::MarkedScatter => match lu.sparse.take() {
            Some(mut area) => {
                solve_r_marked(lu, &mut area, work);
                lu.sparse = Some(area);
            }
            None => solve_r_scatter(lu, work),
        },
        RMethod::Scatter => solve_r_scatter(lu, work),
        RMethod::DotProduct => solve_r_dot(lu, work),
    }
}

fn scatter_line(lu: &LU, line: usize, x: f64, lhs: &mut [f64]) {
    let m = lu.m;
    for pos in lu.rt_begin[line]..lu.rt_end[line] {
        lhs[m + lu.rt_index[pos]] -= lu.rt_value[pos] * x;
    }
}

fn solve_r_marked(lu: &LU, area: &mut SparseArea, work: &mut IndexedVector) {
    let m = lu.m;
    let droptol = lu.zero_tolerance;
    let marker = area.next_marker();
    let marked = &mut area.marked;
    let (lhs, pattern, nz) = work.parts_mut();

    for &i in pattern[..*nz].iter() {
        marked[i] = marker;
    }
    let ninput = *nz;
    for n in 0..ninput {
        let j = pattern[n];
        scatter_line(lu, j, lhs[j], lhs);
    }
    for t in 0..lu.num_eta {
        let e = m + t;
        let r = lu.eta_row[t];
        let x = lhs[e] + lhs[r];
        lhs[r] = 0.0;
        if x.abs() > droptol {
            lhs[e] = x;
            scatter_line(lu, e, x, lhs);
            if marked[e] != marker {
                marked[e] = marker;
                pattern[*nz] = e;
                *nz += 1;
            }
        } else {
            lhs[e] = 0.0;
        }
    }
    pack(lhs, pattern, nz);
}

fn solve_r_scatter(lu: &LU, work: &mut IndexedVector) {
    let m = lu.m;
    let droptol = lu.zero_tolerance;
    let (lhs, pattern, nz) = work.parts_mut();

    for n in 0..*nz {
        let j = pattern[n];
        scatter_line(lu, j, lhs[j], lhs);
    }
    for t in 0..lu.num_eta {
        let e = m + t;
        let r = lu.eta_row[t];
        let x = lhs[e] + lhs[r];
        lhs[r] = 0.0;
        if x.abs() > droptol {
            lhs[e] = x;
            scatter_line(lu, e, x, lhs);
        } else {
            lhs[e] = 0.0;
        }
    }
    pack(lhs, pattern, nz);
    append_etas(lu, lhs, pattern, nz);
}

fn solve_r_dot(lu: &LU, work: &mut IndexedVector) {
    let m = lu.m;
    let droptol = lu.zero_tolerance;
    let r_begin = &lu.r_begin;
    let r_index = &lu.r_index;
    let r_value = &lu.r_value;
    let (lhs, pattern, nz) = work.parts_mut();

    for t in 0..lu.num_eta {
        let r = lu.eta_row[t];
        let mut x = lhs[r];
        for pos in r_begin[t]..r_begin[t + 1] {
            x -= r_value[pos] * lhs[r_index[pos]];
        }
        lhs[r] = 0.0;
        if x.abs() > droptol {
            lhs[m + t] = x;
        }
    }
    pack(lhs, pattern, nz);
    append_etas(lu, lhs, pattern, nz);
}

/// Remove zeros from the nonzero list.
fn pack(lhs: &[f64], pattern: &mut [usize], nz: &mut usize) {
    let mut put = 0;
    for n in 0..*nz {
        let i = pattern[n];
        if lhs[i] != 0.0 {
            pattern[put] = i;
            put += 1;
        }
    }
    *nz = put;
}

/// List the nonzero eta positions. None of them was listed on input.
fn append_etas(lu: &LU, lhs: &[f64], pattern: &mut [usize], nz: &mut usize) {
    for e in lu.m..lu.m + lu.num_eta {
        if lhs[e] != 0.0 {
            pattern[*nz] = e;
            *nz += 1;
        }
    }
}
