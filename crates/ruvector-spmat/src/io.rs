//! Text persistence in `row col value` triplet form.
//!
//! ```text
//! 1  1  4
//! 3  1  -0.5
//! 2  2  1.25
//! 3  2  0
//! ```
//!
//! One explicit entry per line with 1-based indices, columns non-decreasing
//! and rows strictly increasing inside a column. The last line is the
//! sentinel `rows cols 0`. The writer skips entries whose value is zero, so
//! explicit zeros do not survive a round trip.

use std::fmt;
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;
use std::str::FromStr;

use tracing::debug;

use crate::column::Column;
use crate::error::{Result, SpMatError};
use crate::types::Element;
use crate::SpMat;

/// One output line. `precision` is the number of significant digits; `None`
/// prints the shortest text that parses back to the same value.
struct Triplet<T> {
    row: usize,
    col: usize,
    val: T,
    precision: Option<usize>,
}

impl<T: Element> fmt::Display for Triplet<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.precision {
            None => write!(f, "{}  {}  {}", self.row, self.col, self.val),
            Some(p) => write!(
                f,
                "{}  {}  {:.*e}",
                self.row,
                self.col,
                p.saturating_sub(1),
                self.val
            ),
        }
    }
}

impl<T: Element> SpMat<T> {
    fn triplets(&self, precision: Option<usize>) -> impl Iterator<Item = Triplet<T>> + '_ {
        self.data.iter().enumerate().flat_map(move |(c, col)| {
            col.iter()
                .filter(|&(_, v)| v != T::ZERO)
                .map(move |(r, v)| Triplet {
                    row: r + 1,
                    col: c + 1,
                    val: v,
                    precision,
                })
        })
    }
}

impl<T: Element> SpMat<T> {
    /// Write the triplet text to `w`.
    ///
    /// `precision` gives the number of significant digits in scientific
    /// notation; `None` writes values exactly.
    ///
    /// # Errors
    ///
    /// [`SpMatError::Io`] if writing fails.
    pub fn write_triplets<W: Write>(&self, mut w: W, precision: Option<usize>) -> Result<()> {
        for t in self.triplets(precision) {
            writeln!(w, "{t}")?;
        }
        writeln!(w, "{}  {}  0", self.rows, self.cols)?;
        w.flush()?;
        Ok(())
    }

    /// Save to `path` at full precision.
    ///
    /// # Errors
    ///
    /// [`SpMatError::Io`] if the file cannot be created or written.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        self.save_to(path.as_ref(), None)
    }

    /// Save to `path` with `digits` significant digits per value.
    ///
    /// # Errors
    ///
    /// [`SpMatError::Io`] if the file cannot be created or written.
    pub fn save_with_precision(&self, path: impl AsRef<Path>, digits: usize) -> Result<()> {
        self.save_to(path.as_ref(), Some(digits))
    }

    fn save_to(&self, path: &Path, precision: Option<usize>) -> Result<()> {
        let file = File::create(path)?;
        self.write_triplets(BufWriter::new(file), precision)?;
        debug!(path = %path.display(), nnz = self.nnz, "saved sparse matrix");
        Ok(())
    }
}

/// Same text as [`SpMat::save`].
impl<T: Element> fmt::Display for SpMat<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for t in self.triplets(None) {
            writeln!(f, "{t}")?;
        }
        writeln!(f, "{}  {}  0", self.rows, self.cols)
    }
}

// ---------------------------------------------------------------------------
// Reading
// ---------------------------------------------------------------------------

struct Line<T> {
    number: usize,
    row: usize,
    col: usize,
    val: T,
}

/// Largest index or dimension the reader accepts.
const MAX_INDEX: f64 = u32::MAX as f64;

fn parse_index(tok: &str, number: usize) -> Result<usize> {
    let x: f64 = tok
        .parse()
        .map_err(|_| SpMatError::Format(format!("line {number}: invalid index {tok:?}")))?;
    if !x.is_finite() || x < 0.0 {
        return Err(SpMatError::Format(format!(
            "line {number}: invalid index {tok:?}"
        )));
    }
    let x = (x + 0.5).floor();
    if x >= MAX_INDEX {
        return Err(SpMatError::Format(format!(
            "line {number}: index {tok} is too large"
        )));
    }
    Ok(x as usize)
}

/// `Vec` with room for exactly `n` elements, or a format error naming the
/// dimension that could not be allocated.
fn try_with_capacity<U>(n: usize, what: &str) -> Result<Vec<U>> {
    let mut v = Vec::new();
    v.try_reserve_exact(n)
        .map_err(|_| SpMatError::Format(format!("cannot allocate {what} of size {n}")))?;
    Ok(v)
}

fn parse_line<T: Element>(text: &str, number: usize) -> Result<Line<T>> {
    let toks: Vec<&str> = text.split_whitespace().collect();
    if toks.len() != 3 {
        return Err(SpMatError::Format(format!(
            "line {number}: expected `row col value`, found {} fields",
            toks.len(),
        )));
    }
    let val = T::from_str(toks[2]).map_err(|_| {
        SpMatError::Format(format!("line {number}: invalid value {:?}", toks[2]))
    })?;
    Ok(Line {
        number,
        row: parse_index(toks[0], number)?,
        col: parse_index(toks[1], number)?,
        val,
    })
}

impl<T: Element> SpMat<T> {
    /// Load a matrix written by [`save`](Self::save).
    ///
    /// # Errors
    ///
    /// [`SpMatError::Io`] if the file cannot be read, [`SpMatError::Format`]
    /// if its content is malformed (see [`from_reader`](Self::from_reader)).
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let m = Self::from_reader(BufReader::new(File::open(path)?))?;
        debug!(path = %path.display(), rows = m.rows, cols = m.cols, nnz = m.nnz, "loaded sparse matrix");
        Ok(m)
    }

    /// Parse triplet text. Blank lines are ignored.
    ///
    /// # Errors
    ///
    /// [`SpMatError::Format`] if the input is empty, a line is not three
    /// numbers, the last line has a non-zero value, column indices decrease,
    /// row indices do not strictly increase within a column, or an index is
    /// outside the dimensions given by the sentinel.
    ///
    /// # Example
    ///
    /// ```
    /// use ruvector_spmat::SpMat;
    ///
    /// let text = "1  1  2.5\n2  2  -1\n2  2  0\n";
    /// let a = SpMat::<f64>::from_reader(text.as_bytes()).unwrap();
    /// assert_eq!(a.peek(1, 1).unwrap(), -1.0);
    /// assert_eq!(a.to_string(), text);
    /// ```
    pub fn from_reader<R: BufRead>(reader: R) -> Result<Self> {
        let mut lines: Vec<Line<T>> = Vec::new();
        for (i, text) in reader.lines().enumerate() {
            let text = text?;
            if text.trim().is_empty() {
                continue;
            }
            lines.push(parse_line(&text, i + 1)?);
        }

        let Some(sentinel) = lines.pop() else {
            return Err(SpMatError::Format("empty input".into()));
        };
        if sentinel.val != T::ZERO {
            return Err(SpMatError::Format(format!(
                "line {}: last line must have zero value and give the matrix size",
                sentinel.number,
            )));
        }
        let (rows, cols) = (sentinel.row, sentinel.col);

        // Pass 1: entries per column.
        let mut counts: Vec<usize> = try_with_capacity(cols, "column table")?;
        counts.resize(cols, 0);
        let mut prev_col = 0usize;
        for l in &lines {
            if l.col < prev_col {
                return Err(SpMatError::Format(format!(
                    "line {}: column index {} follows {}; columns must not decrease",
                    l.number, l.col, prev_col,
                )));
            }
            if l.col < 1 || l.col > cols {
                return Err(SpMatError::Format(format!(
                    "line {}: column index {} outside 1..={cols}",
                    l.number, l.col,
                )));
            }
            prev_col = l.col;
            counts[l.col - 1] += 1;
        }

        // Pass 2: fill pre-sized columns.
        let mut data: Vec<Column<T>> = try_with_capacity(cols, "column table")?;
        data.extend(counts.iter().map(|&n| Column {
            rows: Vec::with_capacity(n),
            vals: Vec::with_capacity(n),
        }));
        let mut m = Self {
            rows,
            cols,
            nnz: 0,
            data,
            threads: 1,
            warnings: false,
        };
        for l in &lines {
            if l.row < 1 || l.row > rows {
                return Err(SpMatError::Format(format!(
                    "line {}: row index {} outside 1..={rows}",
                    l.number, l.row,
                )));
            }
            let col = &mut m.data[l.col - 1];
            let r = l.row - 1;
            if col.rows.last().is_some_and(|&last| last >= r) {
                return Err(SpMatError::Format(format!(
                    "line {}: row indices must increase within column {}",
                    l.number, l.col,
                )));
            }
            col.rows.push(r);
            col.vals.push(l.val);
        }
        m.nnz = lines.len();
        Ok(m)
    }
}

impl<T: Element> FromStr for SpMat<T> {
    type Err = SpMatError;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_reader(s.as_bytes())
    }
}
