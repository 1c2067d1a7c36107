//! Bump storage for node payloads.
//!
//! Composite nodes (reductions, solves, determinants) need variable-length
//! payloads: the indices of their operand nodes and flattened primal copies of
//! their matrix operands. Instead of owning a `Vec` per node, every payload is
//! appended to one of two flat pools and addressed by a `(start, len)` handle.
//! Nothing is freed individually; the pools are rolled back to an
//! [`ArenaMark`] when a computation scope ends.

/// Handle to a run of operand node indices in the [`Arena`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct IndexSlice {
    start: u32,
    len: u32,
}

/// Handle to a run of primal values in the [`Arena`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ValueSlice {
    start: u32,
    len: u32,
}

impl IndexSlice {
    /// Number of operand indices.
    #[inline]
    pub fn len(&self) -> usize {
        self.len as usize
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// A sub-range `[offset, offset + len)` of this allocation.
    ///
    /// Lets sibling nodes address part of an operand array that has already
    /// been materialized instead of copying it again.
    #[inline]
    pub fn sub(&self, offset: usize, len: usize) -> IndexSlice {
        debug_assert!(offset + len <= self.len as usize);
        IndexSlice {
            start: self.start + offset as u32,
            len: len as u32,
        }
    }
}

impl ValueSlice {
    /// Number of values.
    #[inline]
    pub fn len(&self) -> usize {
        self.len as usize
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

/// `(start, len)` of the pool range `[start, end)` as `u32` handle fields.
#[inline]
fn span(start: usize, end: usize) -> (u32, u32) {
    assert!(end <= u32::MAX as usize, "arena index space exhausted");
    (start as u32, (end - start) as u32)
}

/// Snapshot of both pool lengths.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ArenaMark {
    indices: usize,
    values: usize,
}

/// Two flat pools: operand indices and primal values.
#[derive(Debug, Default)]
pub struct Arena {
    indices: Vec<u32>,
    values: Vec<f64>,
}

impl Arena {
    /// Create an empty arena.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an arena with pre-allocated pools.
    pub fn with_capacity(indices: usize, values: usize) -> Self {
        Arena {
            indices: Vec::with_capacity(indices),
            values: Vec::with_capacity(values),
        }
    }

    /// Append operand indices and return a handle to them.
    #[inline]
    pub fn alloc_indices(&mut self, iter: impl IntoIterator<Item = u32>) -> IndexSlice {
        let start = self.indices.len();
        self.indices.extend(iter);
        let (start, len) = span(start, self.indices.len());
        IndexSlice { start, len }
    }

    /// Append primal values and return a handle to them.
    #[inline]
    pub fn alloc_values(&mut self, iter: impl IntoIterator<Item = f64>) -> ValueSlice {
        let start = self.values.len();
        self.values.extend(iter);
        let (start, len) = span(start, self.values.len());
        ValueSlice { start, len }
    }

    #[inline]
    pub fn indices(&self, slice: IndexSlice) -> &[u32] {
        let start = slice.start as usize;
        &self.indices[start..start + slice.len as usize]
    }

    #[inline]
    pub fn values(&self, slice: ValueSlice) -> &[f64] {
        let start = slice.start as usize;
        &self.values[start..start + slice.len as usize]
    }

    /// Current position of both pools.
    #[inline]
    pub fn mark(&self) -> ArenaMark {
        ArenaMark {
            indices: self.indices.len(),
            values: self.values.len(),
        }
    }

    /// Drop everything allocated after `mark` (keeps capacity).
    ///
    /// Handles issued after `mark` are invalid afterwards.
    pub fn release_to(&mut self, mark: ArenaMark) {
        self.indices.truncate(mark.indices);
        self.values.truncate(mark.values);
    }

    /// Bytes currently in use across both pools.
    pub fn bytes_used(&self) -> usize {
        self.indices.len() * std::mem::size_of::<u32>()
            + self.values.len() * std::mem::size_of::<f64>()
    }
}
