use std::io;

use thiserror::Error;

/// Failures surfaced while moving a document to or from storage.
///
/// Parsing itself never fails: malformed lines are skipped and missing lookups yield `""`.
#[derive(Debug, Error)]
pub enum Error {
    #[error("failed to read data")]
    ReadFailure {
        #[source]
        source: io::Error,
    },
    #[error("failed to write data")]
    WriteFailure {
        #[source]
        source: io::Error,
    },
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use std::error::Error as _;

    use super::*;

    #[test]
    fn source_is_chained() {
        let error = Error::ReadFailure {
            source: io::Error::new(io::ErrorKind::NotFound, "gone"),
        };

        assert_eq!(error.to_string(), "failed to read data");
        assert_eq!(
            error.source().map(ToString::to_string),
            Some("gone".to_owned())
        );
    }
}
