// Copyright (C) 2026 The etalu developers

/// A mostly-zero vector carried through the solves.
///
/// The vector owns a dense value array and a list of the positions that may be
/// nonzero. In *full* mode `values[p]` is the value at position `p` and
/// `indices[0..count]` lists the nonzero positions. In *packed* mode
/// `values[i]` is the value at position `indices[i]` for `i < count`.
///
/// Every position with a nonzero value is listed exactly once and unlisted
/// positions are exactly zero. Solves consume their input vectors, leaving
/// them zeroed and ready for reuse.
#[derive(Debug, Clone, Default)]
pub struct IndexedVector {
    values: Vec<f64>,
    indices: Vec<usize>,
    count: usize,
    packed: bool,
}

impl IndexedVector {
    /// Create an empty vector in full mode with room for `size` positions.
    pub fn new(size: usize) -> Self {
        Self {
            values: vec![0.0; size],
            indices: vec![0; size],
            count: 0,
            packed: false,
        }
    }

    /// Create a full mode vector from a dense slice.
    pub fn from_dense(dense: &[f64]) -> Self {
        let mut v = Self::new(dense.len());
        for (i, &x) in dense.iter().enumerate() {
            if x != 0.0 {
                v.insert(i, x);
            }
        }
        v
    }

    /// Create a packed mode vector from `(index, value)` pairs. `size` bounds
    /// the indices and the number of pairs.
    pub fn from_packed(size: usize, entries: &[(usize, f64)]) -> Self {
        let mut v = Self::new(size);
        v.packed = true;
        for &(i, x) in entries {
            if x != 0.0 {
                v.values[v.count] = x;
                v.indices[v.count] = i;
                v.count += 1;
            }
        }
        v
    }

    /// Capacity of the vector.
    pub fn size(&self) -> usize {
        self.values.len()
    }

    /// Number of listed positions.
    pub fn num_elements(&self) -> usize {
        self.count
    }

    /// Set the number of listed positions.
    pub fn set_num_elements(&mut self, n: usize) {
        assert!(n <= self.indices.len());
        self.count = n;
    }

    pub fn dense_vector(&self) -> &[f64] {
        &self.values
    }

    pub fn dense_vector_mut(&mut self) -> &mut [f64] {
        &mut self.values
    }

    pub fn indices(&self) -> &[usize] {
        &self.indices[..self.count]
    }

    pub fn indices_mut(&mut self) -> &mut [usize] {
        &mut self.indices
    }

    /// Both backing arrays at once.
    pub fn parts_mut(&mut self) -> (&mut [f64], &mut [usize], &mut usize) {
        (&mut self.values, &mut self.indices, &mut self.count)
    }

    pub fn packed_mode(&self) -> bool {
        self.packed
    }

    /// Switch between packed and full mode. The vector must be empty.
    pub fn set_packed_mode(&mut self, packed: bool) {
        assert_eq!(self.count, 0, "mode change on a vector holding values");
        self.packed = packed;
    }

    /// Add `value` at position `index` (full mode). The position must not be
    /// listed already.
    pub fn insert(&mut self, index: usize, value: f64) {
        debug_assert!(!self.packed);
        debug_assert_eq!(self.values[index], 0.0);
        self.values[index] = value;
        self.indices[self.count] = index;
        self.count += 1;
    }

    /// Add `value` to position `index` (full mode), listing it if needed.
    pub fn add(&mut self, index: usize, value: f64) {
        debug_assert!(!self.packed);
        if self.values[index] == 0.0 {
            if value != 0.0 {
                self.insert(index, value);
            }
        } else {
            self.values[index] += value;
        }
    }

    /// Value at natural position `index`. In packed mode this searches the
    /// list.
    pub fn get(&self, index: usize) -> f64 {
        if self.packed {
            self.indices[..self.count]
                .iter()
                .position(|&i| i == index)
                .map_or(0.0, |k| self.values[k])
        } else {
            self.values[index]
        }
    }

    /// Iterate over the listed `(index, value)` pairs in either mode.
    pub fn iter(&self) -> impl Iterator<Item = (usize, f64)> + '_ {
        self.indices[..self.count]
            .iter()
            .enumerate()
            .map(move |(k, &i)| {
                if self.packed {
                    (i, self.values[k])
                } else {
                    (i, self.values[i])
                }
            })
    }

    /// Dense copy of the vector with length `n`.
    pub fn to_dense(&self, n: usize) -> Vec<f64> {
        let mut x = vec![0.0; n];
        for (i, v) in self.iter() {
            x[i] = v;
        }
        x
    }

    /// Zero all listed values and empty the list.
    pub fn clear(&mut self) {
        if self.packed {
            for v in &mut self.values[..self.count] {
                *v = 0.0;
            }
        } else {
            for &i in &self.indices[..self.count] {
                self.values[i] = 0.0;
            }
        }
        self.count = 0;
    }

    /// Rebuild the list from the dense values in `start..end` (full mode).
    /// Values with magnitude at or below `tolerance` are zeroed.
    pub fn scan(&mut self, start: usize, end: usize, tolerance: f64) {
        debug_assert!(!self.packed);
        let mut n = self.count;
        for i in start..end {
            let v = self.values[i];
            if v != 0.0 {
                if v.abs() > tolerance {
                    self.indices[n] = i;
                    n += 1;
                } else {
                    self.values[i] = 0.0;
                }
            }
        }
        self.count = n;
    }

    /// True when the vector holds no values at all.
    pub fn is_clean(&self) -> bool {
        self.count == 0 && self.values.iter().all(|&v| v == 0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_mode_bookkeeping() {
        let mut v = IndexedVector::new(6);
        v.insert(4, 2.0);
        v.add(1, -1.0);
        v.add(4, 0.5);
        assert_eq!(v.num_elements(), 2);
        assert_eq!(v.get(4), 2.5);
        assert_eq!(v.to_dense(6), vec![0.0, -1.0, 0.0, 0.0, 2.5, 0.0]);
        v.clear();
        assert!(v.is_clean());
    }

    #[test]
    fn packed_mode_lookup() {
        let v = IndexedVector::from_packed(5, &[(3, 1.5), (0, -2.0), (2, 0.0)]);
        assert!(v.packed_mode());
        assert_eq!(v.num_elements(), 2);
        assert_eq!(v.get(3), 1.5);
        assert_eq!(v.get(2), 0.0);
        let pairs: Vec<_> = v.iter().collect();
        assert_eq!(pairs, vec![(3, 1.5), (0, -2.0)]);
    }

    #[test]
    fn scan_drops_small_values() {
        let mut v = IndexedVector::new(4);
        v.dense_vector_mut()[0] = 1e-20;
        v.dense_vector_mut()[2] = 3.0;
        v.scan(0, 4, 1e-13);
        assert_eq!(v.indices(), &[2]);
        assert_eq!(v.dense_vector()[0], 0.0);
    }
}
