//! Ordered, named tree of per-control-point arrays.
//!
//! Every leaf is an N×k matrix whose first dimension is the segment's
//! control point count. Lookup is by explicit path slice
//! (`["frames", "inertial", "velocity_vector"]`); insertion order is
//! preserved and defines the deterministic field order used by `pack` and
//! `unpack`. The same ordering MUST be used for both directions or the
//! solve silently corrupts state, which is why `unpack` checks the total
//! element count and fails loudly on a mismatch.

use crate::error::{MissionError, MissionResult};
use nalgebra::{DMatrix, DVector};

/// A tree node: either a nested group or a leaf matrix.
#[derive(Clone, Debug, PartialEq)]
pub enum Node {
    Group(Conditions),
    Field(DMatrix<f64>),
}

/// Ordered string-keyed container of groups and N×k fields.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Conditions {
    entries: Vec<(String, Node)>,
}

impl Conditions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Iterate entries in insertion order.
    pub fn entries(&self) -> impl Iterator<Item = (&str, &Node)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn find(&self, key: &str) -> Option<&Node> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v)
    }

    fn find_mut(&mut self, key: &str) -> Option<&mut Node> {
        self.entries
            .iter_mut()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v)
    }

    /// Get or create a nested group at `key`.
    pub fn group_mut(&mut self, key: &str) -> MissionResult<&mut Conditions> {
        if self.find(key).is_none() {
            self.entries
                .push((key.to_string(), Node::Group(Conditions::new())));
        }
        match self.find_mut(key) {
            Some(Node::Group(group)) => Ok(group),
            _ => Err(MissionError::MissingPath {
                path: format!("{key} (exists as a field, not a group)"),
            }),
        }
    }

    /// Create (or overwrite) a leaf field at a nested path.
    pub fn set_field(&mut self, path: &[&str], value: DMatrix<f64>) -> MissionResult<()> {
        let (last, groups) = path.split_last().ok_or_else(|| MissionError::MissingPath {
            path: "(empty path)".into(),
        })?;
        let mut current = self;
        for key in groups {
            current = current.group_mut(key)?;
        }
        if let Some(node) = current.find_mut(last) {
            *node = Node::Field(value);
        } else {
            current
                .entries
                .push((last.to_string(), Node::Field(value)));
        }
        Ok(())
    }

    /// Create a zero-filled leaf with `rows` x `cols` at a nested path.
    pub fn ensure_field(&mut self, path: &[&str], rows: usize, cols: usize) -> MissionResult<()> {
        self.set_field(path, DMatrix::zeros(rows, cols))
    }

    fn node(&self, path: &[&str]) -> MissionResult<&Node> {
        let mut current = self;
        let (last, groups) = path.split_last().ok_or_else(|| MissionError::MissingPath {
            path: "(empty path)".into(),
        })?;
        for key in groups {
            match current.find(key) {
                Some(Node::Group(group)) => current = group,
                _ => {
                    return Err(MissionError::MissingPath {
                        path: path.join("."),
                    })
                }
            }
        }
        current.find(last).ok_or_else(|| MissionError::MissingPath {
            path: path.join("."),
        })
    }

    /// Borrow a leaf field at a nested path.
    pub fn field(&self, path: &[&str]) -> MissionResult<&DMatrix<f64>> {
        match self.node(path)? {
            Node::Field(m) => Ok(m),
            Node::Group(_) => Err(MissionError::MissingPath {
                path: format!("{} (is a group, not a field)", path.join(".")),
            }),
        }
    }

    /// Mutably borrow a leaf field at a nested path.
    pub fn field_mut(&mut self, path: &[&str]) -> MissionResult<&mut DMatrix<f64>> {
        let (last, groups) = path.split_last().ok_or_else(|| MissionError::MissingPath {
            path: "(empty path)".into(),
        })?;
        let mut current = self;
        for key in groups {
            match current.find_mut(key) {
                Some(Node::Group(group)) => current = group,
                _ => {
                    return Err(MissionError::MissingPath {
                        path: path.join("."),
                    })
                }
            }
        }
        match current.find_mut(last) {
            Some(Node::Field(m)) => Ok(m),
            _ => Err(MissionError::MissingPath {
                path: path.join("."),
            }),
        }
    }

    /// Copy one column of a leaf field.
    pub fn column(&self, path: &[&str], col: usize) -> MissionResult<Vec<f64>> {
        let m = self.field(path)?;
        if col >= m.ncols() {
            return Err(MissionError::MissingPath {
                path: format!("{} column {col}", path.join(".")),
            });
        }
        Ok(m.column(col).iter().copied().collect())
    }

    /// Overwrite one column of a leaf field.
    pub fn set_column(&mut self, path: &[&str], col: usize, values: &[f64]) -> MissionResult<()> {
        let m = self.field_mut(path)?;
        if col >= m.ncols() || values.len() != m.nrows() {
            return Err(MissionError::SizeMismatch {
                what: "column assignment",
                expected: m.nrows(),
                got: values.len(),
            });
        }
        for (i, &v) in values.iter().enumerate() {
            m[(i, col)] = v;
        }
        Ok(())
    }

    /// Fill an entire leaf field with one value.
    pub fn fill(&mut self, path: &[&str], value: f64) -> MissionResult<()> {
        let m = self.field_mut(path)?;
        m.fill(value);
        Ok(())
    }

    /// Expand every leaf to `rows` rows.
    ///
    /// New rows repeat the last existing row; a leaf already at `rows` is
    /// left untouched (bit-identical), so expansion is idempotent. Leaves
    /// with more rows than requested are truncated.
    pub fn expand_rows(&mut self, rows: usize) {
        for (_, node) in self.entries.iter_mut() {
            match node {
                Node::Group(group) => group.expand_rows(rows),
                Node::Field(m) => {
                    if m.nrows() == rows {
                        continue;
                    }
                    let old_rows = m.nrows();
                    let cols = m.ncols();
                    let expanded = DMatrix::from_fn(rows, cols, |i, j| {
                        if old_rows == 0 {
                            0.0
                        } else {
                            m[(i.min(old_rows - 1), j)]
                        }
                    });
                    *m = expanded;
                }
            }
        }
    }

    /// Total number of scalar elements across all leaves.
    pub fn element_count(&self) -> usize {
        let mut count = 0;
        for (_, node) in &self.entries {
            match node {
                Node::Group(group) => count += group.element_count(),
                Node::Field(m) => count += m.len(),
            }
        }
        count
    }

    /// Leaf paths with their shapes, in deterministic pack order.
    pub fn leaves(&self) -> Vec<(String, usize, usize)> {
        let mut out = Vec::new();
        self.collect_leaves("", &mut out);
        out
    }

    fn collect_leaves(&self, prefix: &str, out: &mut Vec<(String, usize, usize)>) {
        for (key, node) in &self.entries {
            let path = if prefix.is_empty() {
                key.clone()
            } else {
                format!("{prefix}.{key}")
            };
            match node {
                Node::Group(group) => group.collect_leaves(&path, out),
                Node::Field(m) => out.push((path, m.nrows(), m.ncols())),
            }
        }
    }

    /// Flatten every leaf (row-major within a leaf, leaves in insertion
    /// order, depth-first) into one vector.
    pub fn pack(&self) -> DVector<f64> {
        let mut flat = Vec::with_capacity(self.element_count());
        self.pack_into(&mut flat);
        DVector::from_vec(flat)
    }

    fn pack_into(&self, flat: &mut Vec<f64>) {
        for (_, node) in &self.entries {
            match node {
                Node::Group(group) => group.pack_into(flat),
                Node::Field(m) => {
                    for i in 0..m.nrows() {
                        for j in 0..m.ncols() {
                            flat.push(m[(i, j)]);
                        }
                    }
                }
            }
        }
    }

    /// Write a flat vector back into the leaves, in the same order `pack`
    /// produced it. Fails on any length mismatch.
    pub fn unpack(&mut self, flat: &DVector<f64>) -> MissionResult<()> {
        let expected = self.element_count();
        if flat.len() != expected {
            return Err(MissionError::SizeMismatch {
                what: "state unpack",
                expected,
                got: flat.len(),
            });
        }
        let mut cursor = 0;
        self.unpack_from(flat, &mut cursor);
        Ok(())
    }

    fn unpack_from(&mut self, flat: &DVector<f64>, cursor: &mut usize) {
        for (_, node) in self.entries.iter_mut() {
            match node {
                Node::Group(group) => group.unpack_from(flat, cursor),
                Node::Field(m) => {
                    for i in 0..m.nrows() {
                        for j in 0..m.ncols() {
                            m[(i, j)] = flat[*cursor];
                            *cursor += 1;
                        }
                    }
                }
            }
        }
    }
}
