//! Terminal status of a protocol exchange

use super::constants::status;
use super::transfer::Transfer;
use crate::error::DatabaseError;
use crate::Result;
use tokio::io::{AsyncRead, AsyncWrite};

/// Outcome of one exchange, as reported by the server.
///
/// The caller pattern-matches on this instead of branching on a raw status
/// integer; an unknown code is carried explicitly rather than dropped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Status {
    /// The exchange succeeded
    Ok,

    /// The exchange succeeded and mutated session state
    OkStateChanged,

    /// The server has unilaterally closed the session
    Closed,

    /// The server reported an error
    Error(DatabaseError),

    /// A status code this client does not understand
    Unrecognized(i32),
}

impl Status {
    /// Read one status response from the stream.
    ///
    /// On [`status::STATUS_ERROR`] the five diagnostic fields follow in wire
    /// order: sqlstate, message, sql, error code, stack trace.
    pub async fn read_from<S>(transfer: &mut Transfer<S>) -> Result<Self>
    where
        S: AsyncRead + AsyncWrite + Unpin,
    {
        let code = transfer.read_int().await?;
        match code {
            status::STATUS_OK => Ok(Status::Ok),
            status::STATUS_OK_STATE_CHANGED => Ok(Status::OkStateChanged),
            status::STATUS_CLOSED => Ok(Status::Closed),
            status::STATUS_ERROR => {
                let sqlstate = transfer.read_string().await?;
                let message = transfer.read_string().await?;
                let sql = transfer.read_string().await?;
                let error_code = transfer.read_int().await?;
                let stack_trace = transfer.read_string().await?;
                Ok(Status::Error(DatabaseError {
                    sqlstate,
                    message,
                    sql,
                    error_code,
                    stack_trace,
                }))
            }
            other => Ok(Status::Unrecognized(other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{duplex, DuplexStream};

    fn pair() -> (Transfer<DuplexStream>, Transfer<DuplexStream>) {
        let (a, b) = duplex(4096);
        (Transfer::new(a), Transfer::new(b))
    }

    #[tokio::test]
    async fn test_read_ok() {
        let (mut server, mut client) = pair();
        server.write_int(status::STATUS_OK);
        server.flush().await.unwrap();
        assert_eq!(Status::read_from(&mut client).await.unwrap(), Status::Ok);
    }

    #[tokio::test]
    async fn test_read_ok_state_changed() {
        let (mut server, mut client) = pair();
        server.write_int(status::STATUS_OK_STATE_CHANGED);
        server.flush().await.unwrap();
        assert_eq!(
            Status::read_from(&mut client).await.unwrap(),
            Status::OkStateChanged
        );
    }

    #[tokio::test]
    async fn test_read_closed() {
        let (mut server, mut client) = pair();
        server.write_int(status::STATUS_CLOSED);
        server.flush().await.unwrap();
        assert_eq!(
            Status::read_from(&mut client).await.unwrap(),
            Status::Closed
        );
    }

    #[tokio::test]
    async fn test_read_error_carries_all_fields_in_order() {
        let (mut server, mut client) = pair();
        server.write_int(status::STATUS_ERROR);
        server.write_string(Some("42S02"));
        server.write_string(Some("Table \"MISSING\" not found"));
        server.write_string(Some("SELECT * FROM missing"));
        server.write_int(42102);
        server.write_string(Some("org.h2.jdbc.JdbcSQLSyntaxErrorException: ..."));
        server.flush().await.unwrap();

        match Status::read_from(&mut client).await.unwrap() {
            Status::Error(e) => {
                assert_eq!(e.sqlstate.as_deref(), Some("42S02"));
                assert_eq!(e.message.as_deref(), Some("Table \"MISSING\" not found"));
                assert_eq!(e.sql.as_deref(), Some("SELECT * FROM missing"));
                assert_eq!(e.error_code, 42102);
                assert_eq!(
                    e.stack_trace.as_deref(),
                    Some("org.h2.jdbc.JdbcSQLSyntaxErrorException: ...")
                );
            }
            other => panic!("expected Status::Error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_read_unrecognized_code() {
        let (mut server, mut client) = pair();
        server.write_int(999);
        server.flush().await.unwrap();
        assert_eq!(
            Status::read_from(&mut client).await.unwrap(),
            Status::Unrecognized(999)
        );
    }
}
