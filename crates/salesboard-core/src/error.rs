use std::fmt;
use std::path::PathBuf;

/// Machine-readable error codes for scripted callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    SourceMissing,
    SourceUnreadable,
    MalformedRecord,
    MissingColumn,
    InvalidRevenue,
    ConfigParseError,
}

impl ErrorCode {
    /// Stable code identifier (`E####`) for machine parsing.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::SourceMissing => "E1001",
            Self::SourceUnreadable => "E1002",
            Self::MalformedRecord => "E2001",
            Self::MissingColumn => "E2002",
            Self::InvalidRevenue => "E2003",
            Self::ConfigParseError => "E3001",
        }
    }

    /// Short human-facing summary for logs and terminal output.
    #[must_use]
    pub const fn message(self) -> &'static str {
        match self {
            Self::SourceMissing => "Sales data source not found",
            Self::SourceUnreadable => "Sales data source could not be read",
            Self::MalformedRecord => "Malformed CSV record",
            Self::MissingColumn => "Required column missing",
            Self::InvalidRevenue => "Revenue value is not a number",
            Self::ConfigParseError => "Config file parse error",
        }
    }

    /// Optional remediation hint that can be surfaced to operators.
    #[must_use]
    pub const fn hint(self) -> Option<&'static str> {
        match self {
            Self::SourceMissing => {
                Some("Pass a CSV path or set `data.path` in salesboard.toml.")
            }
            Self::SourceUnreadable => Some("Check file permissions and retry."),
            Self::MalformedRecord => Some("Every row must have the same number of fields as the header."),
            Self::MissingColumn => {
                Some("The header must include `Product Name`, `Month Name` and `Revenue`.")
            }
            Self::InvalidRevenue => Some("Use plain decimal numbers in the `Revenue` column."),
            Self::ConfigParseError => Some("Fix syntax in salesboard.toml and retry."),
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Errors raised while loading sales data or configuration.
///
/// Every variant is fatal at startup: the store is loaded all-or-nothing.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("sales data source {} does not exist", path.display())]
    SourceMissing { path: PathBuf },

    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed CSV record{}: {source}", line_suffix(*line))]
    Csv {
        line: Option<u64>,
        #[source]
        source: csv::Error,
    },

    #[error("record {index} has {found} fields but the header has {expected}")]
    RecordWidth {
        index: usize,
        expected: usize,
        found: usize,
    },

    #[error("required column `{column}` is missing from the header")]
    MissingColumn { column: String },

    #[error("invalid revenue `{value}` on line {line}")]
    InvalidRevenue { line: u64, value: String },

    #[error("failed to parse {}: {source}", path.display())]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

fn line_suffix(line: Option<u64>) -> String {
    line.map_or_else(String::new, |line| format!(" on line {line}"))
}

impl Error {
    /// The stable code for this error.
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::SourceMissing { .. } => ErrorCode::SourceMissing,
            Self::Io { .. } => ErrorCode::SourceUnreadable,
            Self::Csv { .. } | Self::RecordWidth { .. } => ErrorCode::MalformedRecord,
            Self::MissingColumn { .. } => ErrorCode::MissingColumn,
            Self::InvalidRevenue { .. } => ErrorCode::InvalidRevenue,
            Self::ConfigParse { .. } => ErrorCode::ConfigParseError,
        }
    }

    pub(crate) fn from_csv(source: csv::Error) -> Self {
        let line = source.position().map(csv::Position::line);
        Self::Csv { line, source }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
