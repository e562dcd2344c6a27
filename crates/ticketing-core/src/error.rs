use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Errors shared by the store, the HTTP layer and the CLI.
///
/// The variant decides the HTTP status: `Validation` and `Conflict` are client
/// errors, `NotFound` is a 404, everything else is a server fault.
#[derive(Debug, Error)]
pub enum Error {
    #[error("{0}")]
    Validation(String),

    #[error("{kind} {id} not found.")]
    NotFound { kind: &'static str, id: i64 },

    #[error("{0}")]
    Conflict(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("storage error: {0}")]
    Storage(String),
}

impl Error {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::Conflict(msg.into())
    }

    pub fn event_not_found(id: i64) -> Self {
        Self::NotFound { kind: "Event", id }
    }

    pub fn ticket_not_found(id: i64) -> Self {
        Self::NotFound { kind: "Ticket", id }
    }

    /// True for errors caused by the caller's input rather than the service.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Self::Validation(_) | Self::Conflict(_) | Self::NotFound { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_message() {
        assert_eq!(Error::event_not_found(7).to_string(), "Event 7 not found.");
        assert_eq!(Error::ticket_not_found(3).to_string(), "Ticket 3 not found.");
    }

    #[test]
    fn test_client_error_classification() {
        assert!(Error::validation("bad").is_client_error());
        assert!(Error::conflict("sold out").is_client_error());
        assert!(!Error::Storage("disk".into()).is_client_error());
        assert!(!Error::Config("port".into()).is_client_error());
    }
}
