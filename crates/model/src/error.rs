use std::fmt::{self, Display};

/// The kind of error a gateway call failed with.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// The backend answered, but reported the operation as failed.
    SearchFailed,
    /// No response arrived, either because the connection failed or the
    /// request timed out.
    NetworkUnavailable,
    /// Any other errors.
    UnknownClientError,
}

impl Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorKind::SearchFailed => write!(f, "Search failed"),
            ErrorKind::NetworkUnavailable => write!(f, "Network unavailable"),
            ErrorKind::UnknownClientError => write!(f, "Unknown client error"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        assert_eq!(ErrorKind::SearchFailed.to_string(), "Search failed");
        assert_eq!(
            ErrorKind::NetworkUnavailable.to_string(),
            "Network unavailable"
        );
    }
}
