//! 三元组稀疏矩阵, 服务于 Max-Plus 线性系统的构造与导出。
use std::fmt;

/// Additive triplet store. Duplicate `(i, j)` entries are kept on purpose:
/// in the Max-Plus target they combine additively and the consumer decides.
/// Indices are zero-based in memory and rendered one-based for the
/// symbolic-algebra environment.
#[derive(Debug, Clone, Default)]
pub struct SparseMatrix {
    i: Vec<usize>,
    j: Vec<usize>,
    d: Vec<f64>,
    rows: usize,
    cols: usize,
}

impl SparseMatrix {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_dim(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            ..Self::default()
        }
    }

    /// Sets the logical shape without touching stored triplets.
    pub fn dim(&mut self, rows: usize, cols: usize) {
        self.rows = rows;
        self.cols = cols;
    }

    pub fn shape(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    /// Empties the triplets but keeps the shape.
    pub fn clear(&mut self) {
        self.i.clear();
        self.j.clear();
        self.d.clear();
    }

    pub fn add(&mut self, i: usize, j: usize, d: f64) {
        self.i.push(i);
        self.j.push(j);
        self.d.push(d);
    }

    pub fn len(&self) -> usize {
        self.d.len()
    }

    pub fn is_empty(&self) -> bool {
        self.d.is_empty()
    }

    pub fn entries(&self) -> impl Iterator<Item = (usize, usize, f64)> + '_ {
        (0..self.d.len()).map(|k| (self.i[k], self.j[k], self.d[k]))
    }

    /// First stored value at `(i, j)`, if any. Later duplicates are the
    /// consumer's business.
    pub fn get(&self, i: usize, j: usize) -> Option<f64> {
        self.entries()
            .find(|&(ei, ej, _)| ei == i && ej == j)
            .map(|(_, _, d)| d)
    }
}

/// Streams the triplets as three parallel one-based vectors plus the shape,
/// accepted verbatim by `sparse(...)` in the Max-Plus Julia package.
impl fmt::Display for SparseMatrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let join = |values: &mut dyn Iterator<Item = String>| -> String {
            values.collect::<Vec<_>>().join(", ")
        };
        write!(
            f,
            "[{}], [{}], MP([{}]), {}, {}",
            join(&mut self.i.iter().map(|v| (v + 1).to_string())),
            join(&mut self.j.iter().map(|v| (v + 1).to_string())),
            join(&mut self.d.iter().map(|v| v.to_string())),
            self.rows,
            self.cols
        )
    }
}
