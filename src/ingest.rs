use tracing::{debug, info, warn};

use std::{
    fmt::{self, Display},
    fs::{self, File},
    io::{self, BufRead, BufReader},
    path::{Path, PathBuf},
};

use crate::sale::{DateFormat, Sale};

/// A sales file that could not be read at all.
#[derive(Debug, thiserror::Error)]
pub enum IngestError {
    #[error("cannot read {}: {source}", .path.display())]
    FileUnreadable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl IngestError {
    fn unreadable(path: &Path, source: io::Error) -> Self {
        IngestError::FileUnreadable {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// How many lines of one file were accepted and rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileSummary {
    pub path: PathBuf,
    pub valid: usize,
    pub invalid: usize,
}

impl FileSummary {
    /// Returns `true` if the file had no lines at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.valid == 0 && self.invalid == 0
    }

    /// Returns `true` if every line of the file was a valid sale.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.invalid == 0
    }
}

impl Display for FileSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let path = self.path.display();
        if self.is_empty() {
            write!(f, "File {path} is empty.")
        } else if self.is_clean() {
            writeln!(f, "File {path} was processed without errors.")?;
            write!(f, "Number of sales in file {path}: {}", self.valid)
        } else {
            writeln!(
                f,
                "Warning: Some lines in file {path} could not be processed correctly."
            )?;
            write!(
                f,
                "File {path} was processed with {} invalid lines and {} valid sales.",
                self.invalid, self.valid
            )
        }
    }
}

/// The combined result of reading a set of sales files.
#[derive(Debug, Default)]
pub struct Ingestion {
    /// Every valid sale, in file-then-line order.
    pub sales: Vec<Sale>,
    /// One summary per file, in the order the files were given.
    pub summaries: Vec<FileSummary>,
}

/// Returns every path in `paths` that does not name an existing regular
/// file.
pub fn invalid_paths<P: AsRef<Path>>(paths: &[P]) -> Vec<PathBuf> {
    paths
        .iter()
        .map(|path| path.as_ref())
        .filter(|path| !path.is_file())
        .map(Path::to_path_buf)
        .collect()
}

/// Reads the sales in the file at `path`, dates laid out in `format`.
///
/// Lines end with `\n` or `\r\n`. Lines that are not valid sales are counted
/// in the summary and otherwise skipped. Bytes that are not UTF-8 are
/// replaced before parsing, so they make their line invalid rather than the
/// whole file unreadable.
///
/// # Errors
///
/// Returns [`IngestError::FileUnreadable`] if `path` is not a regular file,
/// or cannot be opened or read.
pub fn ingest_file(
    path: impl AsRef<Path>,
    format: DateFormat,
) -> Result<(Vec<Sale>, FileSummary), IngestError> {
    let path = path.as_ref();
    let metadata = fs::metadata(path).map_err(|e| IngestError::unreadable(path, e))?;
    if !metadata.is_file() {
        let e = io::Error::new(io::ErrorKind::InvalidInput, "not a regular file");
        return Err(IngestError::unreadable(path, e));
    }
    let file = BufReader::new(File::open(path).map_err(|e| IngestError::unreadable(path, e))?);
    let mut sales = Vec::new();
    let mut summary = FileSummary {
        path: path.to_path_buf(),
        valid: 0,
        invalid: 0,
    };
    for (number, line) in file.split(b'\n').enumerate() {
        let mut line = line.map_err(|e| IngestError::unreadable(path, e))?;
        if line.last() == Some(&b'\r') {
            line.pop();
        }
        match Sale::extract(&String::from_utf8_lossy(&line), format) {
            Ok(sale) => {
                sales.push(sale);
                summary.valid += 1;
            }
            Err(failure) => {
                debug!(path = %path.display(), line = number + 1, %failure, "skipping line");
                summary.invalid += 1;
            }
        }
    }
    if summary.is_clean() {
        info!(path = %path.display(), valid = summary.valid, "read sales file");
    } else {
        warn!(
            path = %path.display(),
            valid = summary.valid,
            invalid = summary.invalid,
            "sales file has invalid lines"
        );
    }
    Ok((sales, summary))
}

/// Reads the sales in every file in `paths`, in order, and merges them.
///
/// # Errors
///
/// Stops at the first file that cannot be read, returning
/// [`IngestError::FileUnreadable`]. Files after it are not read.
pub fn ingest<P: AsRef<Path>>(paths: &[P], format: DateFormat) -> Result<Ingestion, IngestError> {
    let mut ingestion = Ingestion::default();
    for path in paths {
        let (sales, summary) = ingest_file(path, format)?;
        ingestion.sales.extend(sales);
        ingestion.summaries.push(summary);
    }
    Ok(ingestion)
}
