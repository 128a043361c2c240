// Copyright (C) 2026 The etalu developers

use crate::lu::lu::LU;

// Removal of entries from the two views of U. Both views are unordered within
// a line, so an entry is removed by moving the last entry of its line into its
// slot. Row slots carry the column slot of their value, so moving an entry
// within a column requires fixing the row slot that points to it.

/// Remove column `j` from the row file and empty the column.
pub(crate) fn remove_column(lu: &mut LU, j: usize) {
    for pos in lu.u_begin[j]..lu.u_end[j] {
        let i = lu.u_index[pos];
        let (begin, end) = (lu.w_begin[i], lu.w_end[i]);
        if let Some(slot) = (begin..end).find(|&s| lu.w_index[s] == j) {
            let last = end - 1;
            lu.w_index[slot] = lu.w_index[last];
            lu.w_cross[slot] = lu.w_cross[last];
            lu.w_end[i] = last;
        }
    }
    lu.u_end[j] = lu.u_begin[j];
}

/// Remove row `i` from the column file and empty the row.
pub(crate) fn remove_row(lu: &mut LU, i: usize) {
    for slot in lu.w_begin[i]..lu.w_end[i] {
        let j = lu.w_index[slot];
        let pos = lu.w_cross[slot];
        remove_from_column(lu, j, pos);
    }
    lu.w_end[i] = lu.w_begin[i];
}

/// Remove the entry at slot `pos` from column `j`, keeping the row file
/// consistent for the entry moved into its place. The row file still lists
/// the removed entry.
pub(crate) fn remove_from_column(lu: &mut LU, j: usize, pos: usize) {
    let last = lu.u_end[j] - 1;
    if pos != last {
        let moved = lu.u_index[last];
        lu.u_index[pos] = moved;
        lu.u_value[pos] = lu.u_value[last];
        let (begin, end) = (lu.w_begin[moved], lu.w_end[moved]);
        if let Some(slot) = (begin..end).find(|&s| lu.w_cross[s] == last) {
            lu.w_cross[slot] = pos;
        }
    }
    lu.u_end[j] = last;
}
