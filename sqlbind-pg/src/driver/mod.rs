//! Blocking driver layer: the TCP connection and its error type.
//!
//! One connection serves one generation run, single-threaded. There is no
//! pooling, no pipelining, no background reader; every suspension point is a
//! blocking read or write on the socket.

mod connection;

pub use connection::PgConnection;

/// Error type for PostgreSQL driver operations.
#[derive(Debug)]
pub enum PgError {
    /// I/O failure, including a refused connection.
    Io(std::io::Error),
    /// The server closed the stream mid-conversation.
    ConnectionClosed,
    /// Malformed frame or unknown message type.
    Protocol(String),
    /// The server asked for an authentication method this client does not
    /// speak.
    UnsupportedAuth(String),
    /// Authentication failed (bad credentials, SCRAM verification mismatch).
    Auth(String),
    /// The server reported an error outside introspection (startup, catalog
    /// queries).
    Server(String),
    /// The server rejected Parse/Describe for a query.
    Introspection { query: String, message: String },
}

impl std::fmt::Display for PgError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PgError::Io(e) => write!(f, "I/O error: {}", e),
            PgError::ConnectionClosed => write!(f, "connection closed by server"),
            PgError::Protocol(e) => write!(f, "protocol error: {}", e),
            PgError::UnsupportedAuth(e) => write!(f, "unsupported authentication method: {}", e),
            PgError::Auth(e) => write!(f, "authentication failed: {}", e),
            PgError::Server(e) => write!(f, "server error: {}", e),
            PgError::Introspection { query, message } => {
                write!(f, "introspection of `{}` failed: {}", query, message)
            }
        }
    }
}

impl std::error::Error for PgError {}

impl From<std::io::Error> for PgError {
    fn from(e: std::io::Error) -> Self {
        PgError::Io(e)
    }
}

/// Result type for PostgreSQL operations.
pub type PgResult<T> = Result<T, PgError>;
