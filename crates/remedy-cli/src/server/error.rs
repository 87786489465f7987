use std::io;

pub type ServerResult<T> = std::result::Result<T, ServerError>;

/// Failure to start or keep running the HTTP listener.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("cannot listen on {address}: {source}")]
    BindError {
        address: String,
        #[source]
        source: io::Error,
    },

    #[error("server stopped unexpectedly: {0}")]
    Runtime(#[source] io::Error),
}

impl ServerError {
    pub fn bind_error(address: &str, source: io::Error) -> Self {
        Self::BindError {
            address: address.to_owned(),
            source,
        }
    }

    fn io_error(&self) -> &io::Error {
        match self {
            Self::BindError { source, .. } | Self::Runtime(source) => source,
        }
    }

    /// Hint for the operator, logged next to the error on exit.
    pub fn suggestion(&self) -> Option<&'static str> {
        let bind = matches!(self, Self::BindError { .. });
        match self.io_error().kind() {
            io::ErrorKind::AddrInUse => Some("another process already uses this port; set PORT"),
            io::ErrorKind::PermissionDenied => Some("ports below 1024 need elevated privileges"),
            io::ErrorKind::AddrNotAvailable => Some("HOST is not an address of this machine"),
            _ if bind => Some("check HOST, PORT and firewall rules"),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bind_failures_carry_a_hint() {
        let in_use = ServerError::bind_error(
            "0.0.0.0:8080",
            io::Error::new(io::ErrorKind::AddrInUse, "address in use"),
        );
        assert!(in_use.to_string().contains("0.0.0.0:8080"));
        assert_eq!(
            in_use.suggestion(),
            Some("another process already uses this port; set PORT")
        );

        let other = ServerError::bind_error("0.0.0.0:8080", io::Error::other("boom"));
        assert!(other.suggestion().is_some());
    }

    #[test]
    fn runtime_failures_have_no_hint() {
        let error = ServerError::Runtime(io::Error::other("connection reset"));
        assert!(error.suggestion().is_none());
    }
}
