// Copyright (C) 2016-2018 ERGO-Code
// Copyright (C) 2022-2023 Richard Lincoln
// Copyright (C) 2026 The etalu developers

// Doubly linked lists (see [1] section 5.5)
//
// Maintain `nelem` elements in `nlist` doubly linked lists using arrays
// `flink[0..nelem+nlist]`, `blink[0..nelem+nlist]`. The leading `nelem`
// entries hold links, the trailing `nlist` entries hold list heads:
//
//     flink[i]        next element after element i
//     blink[i]        previous element before element i
//     flink[nelem+j]  first element in list j
//     blink[nelem+j]  last element in list j
//
// An element that is not in any list links to itself.
//
//    [1] Istvan Maros, Computational Techniques of the Simplex Method

/// Append `elem` to the end of list `list`. `elem` must not be in a list.
pub(crate) fn list_add(elem: usize, list: usize, flink: &mut [usize], blink: &mut [usize], nelem: usize) {
    debug_assert_eq!(flink[elem], elem);
    debug_assert_eq!(blink[elem], elem);
    let last = blink[nelem + list];
    blink[nelem + list] = elem;
    blink[elem] = last;
    flink[last] = elem;
    flink[elem] = nelem + list;
}

/// Remove `elem` from its list. Does nothing if `elem` is in no list.
pub(crate) fn list_remove(flink: &mut [usize], blink: &mut [usize], elem: usize) {
    flink[blink[elem]] = flink[elem];
    blink[flink[elem]] = blink[elem];
    flink[elem] = elem;
    blink[elem] = elem;
}

/// Move `elem` to the end of list `list`.
pub(crate) fn list_move(elem: usize, list: usize, flink: &mut [usize], blink: &mut [usize], nelem: usize) {
    list_remove(flink, blink, elem);
    list_add(elem, list, flink, blink, nelem);
}
