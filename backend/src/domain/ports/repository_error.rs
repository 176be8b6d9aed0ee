//! Error type shared by every persistence port.
//!
//! All repositories talk to the same database, so adapters report failures
//! through one enum and services map it onto [`crate::domain::Error`] in one
//! place.

use tracing::error;

use crate::domain::Error;

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by repository adapters.
    pub enum RepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } => "repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "repository query failed: {message}",
    }
}

impl From<RepositoryError> for Error {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::Connection { message } => {
                error!(%message, "repository connection failed");
                Error::service_unavailable("database unavailable")
            }
            RepositoryError::Query { message } => {
                error!(%message, "repository query failed");
                Error::internal("database query failed")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ErrorCode;
    use rstest::rstest;

    #[rstest]
    #[case(RepositoryError::connection("refused"), ErrorCode::ServiceUnavailable)]
    #[case(RepositoryError::query("syntax error"), ErrorCode::InternalError)]
    fn maps_onto_domain_codes(#[case] err: RepositoryError, #[case] expected: ErrorCode) {
        let mapped = Error::from(err);
        assert_eq!(mapped.code(), expected);
    }

    #[test]
    fn domain_message_hides_driver_detail() {
        let mapped = Error::from(RepositoryError::query("relation \"assets\" does not exist"));
        assert!(!mapped.message().contains("relation"));
    }
}
