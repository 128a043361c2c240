// Copyright (C) 2016-2018 ERGO-Code
// Copyright (C) 2022-2023 Richard Lincoln
// Copyright (C) 2026 The etalu developers

use crate::lu::def::{PAD, STRETCH};
use crate::lu::list::list_move;

// Data file implementation
//
// A data file stores lines of (index,value) pairs. Entries of each line are
// contiguous in memory. Lines can be in any order in memory and there can be
// gaps between consecutive lines.
//
// The data file implementation uses arrays
//
//     index[0:fmem-1], value[0:fmem-1],
//     begin[0:nlines], end[0:nlines],
//     next[0:nlines], prev[0:nlines]
//
//     index, value    storing (index,value) pairs
//     begin[k]        pointer to first element in line 0 <= k < nlines,
//     end[k]          pointer to one past the last element in line k.
//     begin[nlines]   pointer to the first element of unused space
//     end[nlines]     holds fmem
//
// `next`, `prev` hold the line numbers (`0..nlines-1`) in a double linked list in
// the order in which they appear in memory. `next[nlines]` and `prev[nlines]`
// are the first respectively last line in memory order.
//
// Values are generic: the column file of U stores f64 values, the row file
// stores the column file slot of each entry.

/// Initialize empty file with `fmem` memory space.
pub(crate) fn file_empty(
    nlines: usize,
    begin: &mut [usize],
    end: &mut [usize],
    next: &mut [usize],
    prev: &mut [usize],
    fmem: usize,
) {
    begin[nlines] = 0;
    end[nlines] = fmem;
    for i in 0..nlines {
        begin[i] = 0;
        end[i] = 0;
    }
    for i in 0..nlines {
        next[i] = i + 1;
        prev[i + 1] = i;
    }
    next[nlines] = 0;
    prev[0] = nlines;
}

/// Number of elements by which `line` can grow in place.
pub(crate) fn file_room(line: usize, begin: &[usize], end: &[usize], next: &[usize]) -> usize {
    begin[next[line]] - end[line]
}

/// Free elements at the end of the file.
pub(crate) fn file_tail(nlines: usize, begin: &[usize], end: &[usize]) -> usize {
    end[nlines] - begin[nlines]
}

/// Reappend line to file end and add `extra_space` elements room. The file must
/// have at least length(line) + `extra_space` elements free space.
pub(crate) fn file_reappend<T: Copy>(
    line: usize,
    nlines: usize,
    begin: &mut [usize],
    end: &mut [usize],
    next: &mut [usize],
    prev: &mut [usize],
    index: &mut [usize],
    value: &mut [T],
    extra_space: usize,
) {
    let fmem = end[nlines];
    let mut used = begin[nlines];
    let ibeg = begin[line]; // old beginning of line
    let iend = end[line];
    assert!(iend - ibeg + extra_space <= fmem - used);
    begin[line] = used; // new beginning of line
    for pos in ibeg..iend {
        index[used] = index[pos];
        value[used] = value[pos];
        used += 1;
    }
    end[line] = used;
    used += extra_space;
    begin[nlines] = used; // beginning of unused space
    list_move(line, 0, next, prev, nlines);
}

/// Compress file to reuse memory gaps. The ordering of lines in the file is
/// unchanged. To each line with `nz` entries add `stretch*nz+pad` elements extra
/// space. Chop extra space if it would overlap the following line in memory.
///
/// Return: number of entries in file
pub(crate) fn file_compress<T: Copy>(
    nlines: usize,
    begin: &mut [usize],
    end: &mut [usize],
    next: &[usize],
    index: &mut [usize],
    value: &mut [T],
    stretch: f64,
    pad: usize,
) -> usize {
    let mut nz = 0;
    let mut used = 0;
    let mut extra_space = 0;
    let mut i = next[nlines];
    while i < nlines {
        // move line i
        let ibeg = begin[i];
        let iend = end[i];
        debug_assert!(ibeg >= used);
        used += extra_space;
        if used > ibeg {
            used = ibeg; // chop extra space added before
        }
        begin[i] = used;
        for pos in ibeg..iend {
            index[used] = index[pos];
            value[used] = value[pos];
            used += 1;
        }
        end[i] = used;
        extra_space = (stretch * (iend - ibeg) as f64) as usize + pad;
        nz += iend - ibeg;

        i = next[i];
    }
    debug_assert!(used <= begin[nlines]);
    used += extra_space;
    if used > begin[nlines] {
        used = begin[nlines]; // never use more space than before
    }
    begin[nlines] = used;
    nz
}

/// Make room for `extra` more elements in `line`, re-appending the line at the
/// file end with `pad` further elements when it cannot grow in place. Returns
/// false, leaving the file untouched, when the free space at the end is too
/// small.
pub(crate) fn file_grow<T: Copy>(
    line: usize,
    nlines: usize,
    begin: &mut [usize],
    end: &mut [usize],
    next: &mut [usize],
    prev: &mut [usize],
    index: &mut [usize],
    value: &mut [T],
    extra: usize,
    pad: usize,
) -> bool {
    if file_room(line, begin, end, next) >= extra {
        return true;
    }
    let len = end[line] - begin[line];
    let tail = file_tail(nlines, begin, end);
    if len + extra > tail {
        return false;
    }
    let pad = usize::min(pad, tail - len - extra);
    file_reappend(line, nlines, begin, end, next, prev, index, value, extra + pad);
    true
}

/// Make room for `extra` more elements in each of `lines` except `skip`,
/// compressing the file if the free space at its end does not suffice.
/// Returns false when there is not enough memory; line contents are unchanged
/// in either case. `lines` must not contain duplicates.
pub(crate) fn file_reserve<T: Copy>(
    nlines: usize,
    begin: &mut [usize],
    end: &mut [usize],
    next: &mut [usize],
    prev: &mut [usize],
    index: &mut [usize],
    value: &mut [T],
    lines: &[usize],
    skip: usize,
    extra: usize,
) -> bool {
    let need = |begin: &[usize], end: &[usize], next: &[usize]| -> usize {
        lines
            .iter()
            .filter(|&&l| l != skip && file_room(l, begin, end, next) < extra)
            .map(|&l| end[l] - begin[l] + extra)
            .sum()
    };
    let mut required = need(begin, end, next);
    if required > file_tail(nlines, begin, end) {
        file_compress(nlines, begin, end, next, index, value, STRETCH, PAD);
        required = need(begin, end, next);
        if required > file_tail(nlines, begin, end) {
            return false;
        }
    }
    let nmoved = lines
        .iter()
        .filter(|&&l| l != skip && file_room(l, begin, end, next) < extra)
        .count();
    let pad = if required + nmoved * PAD <= file_tail(nlines, begin, end) {
        PAD
    } else {
        0
    };
    for &l in lines {
        if l != skip {
            let ok = file_grow(l, nlines, begin, end, next, prev, index, value, extra, pad);
            debug_assert!(ok);
        }
    }
    true
}

// file_diff (for debugging)
//
// `begin_row`, `end_row`, `begin_col`, `end_col` are pointer into `index`,
// defining lines of the "row file" and the "column file" (the column file
// holding the row indices in `col_index`).
//
// Counts row file entries that are missing in the column file. To check
// consistency of rowwise and columnwise storage, the method must be called
// twice with row pointers and column pointers swapped.
pub(crate) fn file_diff(
    nrow: usize,
    begin_row: &[usize],
    end_row: &[usize],
    row_index: &[usize],
    begin_col: &[usize],
    end_col: &[usize],
    col_index: &[usize],
) -> usize {
    let mut ndiff = 0;
    for i in 0..nrow {
        for pos in begin_row[i]..end_row[i] {
            let j = row_index[pos];
            let found = (begin_col[j]..end_col[j]).any(|where_| col_index[where_] == i);
            if !found {
                ndiff += 1;
            }
        }
    }
    ndiff
}

#[cfg(test)]
mod tests {
    use super::*;

    struct File {
        begin: Vec<usize>,
        end: Vec<usize>,
        next: Vec<usize>,
        prev: Vec<usize>,
        index: Vec<usize>,
        value: Vec<f64>,
    }

    fn file(nlines: usize, fmem: usize) -> File {
        let mut f = File {
            begin: vec![0; nlines + 1],
            end: vec![0; nlines + 1],
            next: vec![0; nlines + 1],
            prev: vec![0; nlines + 1],
            index: vec![0; fmem],
            value: vec![0.0; fmem],
        };
        file_empty(nlines, &mut f.begin, &mut f.end, &mut f.next, &mut f.prev, fmem);
        f
    }

    fn push(f: &mut File, nlines: usize, line: usize, i: usize, x: f64) -> bool {
        let ok = file_grow(
            line, nlines, &mut f.begin, &mut f.end, &mut f.next, &mut f.prev, &mut f.index,
            &mut f.value, 1, 4,
        );
        if ok {
            let pos = f.end[line];
            f.index[pos] = i;
            f.value[pos] = x;
            f.end[line] += 1;
        }
        ok
    }

    fn line(f: &File, k: usize) -> Vec<(usize, f64)> {
        (f.begin[k]..f.end[k]).map(|p| (f.index[p], f.value[p])).collect()
    }

    #[test]
    fn grow_and_compress() {
        let nlines = 3;
        let mut f = file(nlines, 16);
        assert!(push(&mut f, nlines, 0, 7, 1.0));
        assert!(push(&mut f, nlines, 1, 8, 2.0));
        assert!(push(&mut f, nlines, 0, 9, 3.0));
        assert_eq!(line(&f, 0), vec![(7, 1.0), (9, 3.0)]);
        assert_eq!(line(&f, 1), vec![(8, 2.0)]);

        let used_before = f.begin[nlines];
        let nz = file_compress(nlines, &mut f.begin, &mut f.end, &f.next, &mut f.index, &mut f.value, 0.0, 0);
        assert_eq!(nz, 3);
        assert!(f.begin[nlines] <= used_before);
        assert_eq!(line(&f, 0), vec![(7, 1.0), (9, 3.0)]);
        assert_eq!(line(&f, 1), vec![(8, 2.0)]);
    }

    #[test]
    fn grow_fails_without_space() {
        let nlines = 2;
        let mut f = file(nlines, 2);
        assert!(push(&mut f, nlines, 0, 0, 1.0));
        assert!(push(&mut f, nlines, 0, 1, 1.0));
        let snapshot = (f.begin.clone(), f.end.clone());
        assert!(!push(&mut f, nlines, 1, 0, 1.0));
        assert_eq!((f.begin, f.end), snapshot);
    }
}
