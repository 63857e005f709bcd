//! Blocking PostgreSQL connection.
//!
//! Owns the TCP stream, a fixed 16 KiB receive window with `(start, end)`
//! cursors, and a send buffer reused across encodings. `recv_msg` is the
//! only framing loop in the crate: it retries the pure decoder against the
//! window, compacting and reading more bytes until a full frame is present.

use std::io::{Read, Write};
use std::net::TcpStream;

use bytes::BytesMut;

use crate::protocol::{
    md5_password, BackendMessage, DecodeError, FrontendMessage, ScramClient,
};

use super::{PgError, PgResult};

const RECV_BUF_SIZE: usize = 16 * 1024;

/// A raw PostgreSQL connection, authenticated and ready for queries.
pub struct PgConnection {
    stream: TcpStream,
    recv_buf: Vec<u8>,
    /// First unconsumed byte in `recv_buf`.
    start: usize,
    /// One past the last filled byte in `recv_buf`.
    end: usize,
    send_buf: BytesMut,
}

impl PgConnection {
    /// Establish a TCP session, run startup and authentication, and consume
    /// server greetings until the first ReadyForQuery.
    pub fn connect(
        host: &str,
        port: u16,
        user: &str,
        password: Option<&str>,
        database: &str,
    ) -> PgResult<Self> {
        let stream = TcpStream::connect((host, port))?;
        stream.set_nodelay(true)?;

        let mut conn = Self {
            stream,
            recv_buf: vec![0; RECV_BUF_SIZE],
            start: 0,
            end: 0,
            send_buf: BytesMut::with_capacity(1024),
        };

        conn.send(&FrontendMessage::Startup {
            user: user.to_string(),
            database: database.to_string(),
        })?;
        conn.handle_startup(user, password)?;
        Ok(conn)
    }

    /// Encode and send one frontend message.
    pub fn send(&mut self, msg: &FrontendMessage) -> PgResult<()> {
        msg.encode(&mut self.send_buf);
        self.stream.write_all(&self.send_buf)?;
        Ok(())
    }

    /// Receive the next backend message.
    pub fn recv_msg(&mut self) -> PgResult<BackendMessage> {
        loop {
            match BackendMessage::decode(&self.recv_buf[self.start..self.end]) {
                Ok((msg, consumed)) => {
                    self.start += consumed;
                    if self.start >= RECV_BUF_SIZE / 2 {
                        self.compact();
                    }
                    return Ok(msg);
                }
                Err(DecodeError::Incomplete) => {
                    if self.start > 0 {
                        self.compact();
                    }
                    if self.end == self.recv_buf.len() {
                        return Err(PgError::Protocol(format!(
                            "backend message exceeds the {} byte receive buffer",
                            RECV_BUF_SIZE
                        )));
                    }
                    let n = self.stream.read(&mut self.recv_buf[self.end..])?;
                    if n == 0 {
                        return Err(PgError::ConnectionClosed);
                    }
                    self.end += n;
                }
                Err(DecodeError::Malformed(m)) => return Err(PgError::Protocol(m)),
                Err(DecodeError::UnknownMessageType(b)) => {
                    return Err(PgError::Protocol(format!(
                        "unknown backend message type {:?}",
                        b as char
                    )))
                }
            }
        }
    }

    /// Collect messages up to and including the next ReadyForQuery.
    pub fn recv_until_ready(&mut self) -> PgResult<Vec<BackendMessage>> {
        let mut msgs = Vec::new();
        loop {
            let msg = self.recv_msg()?;
            let done = matches!(msg, BackendMessage::ReadyForQuery(_));
            msgs.push(msg);
            if done {
                return Ok(msgs);
            }
        }
    }

    fn compact(&mut self) {
        self.recv_buf.copy_within(self.start..self.end, 0);
        self.end -= self.start;
        self.start = 0;
    }

    /// Drive the startup conversation: authentication, then parameter
    /// statuses and key data, until the server reports ready.
    fn handle_startup(&mut self, user: &str, password: Option<&str>) -> PgResult<()> {
        let mut scram: Option<ScramClient> = None;

        loop {
            match self.recv_msg()? {
                BackendMessage::AuthenticationOk => {}
                BackendMessage::AuthenticationCleartextPassword => {
                    let password = require_password(password)?;
                    self.send(&FrontendMessage::PasswordMessage(password.to_string()))?;
                }
                BackendMessage::AuthenticationMD5Password(salt) => {
                    let password = require_password(password)?;
                    self.send(&FrontendMessage::PasswordMessage(md5_password(
                        user, password, salt,
                    )))?;
                }
                BackendMessage::AuthenticationSASL(mechanisms) => {
                    if !mechanisms.iter().any(|m| m == "SCRAM-SHA-256") {
                        return Err(PgError::UnsupportedAuth(format!(
                            "server offers {:?}, client speaks SCRAM-SHA-256",
                            mechanisms
                        )));
                    }
                    let password = require_password(password)?;
                    let client = ScramClient::new(user, password);
                    self.send(&FrontendMessage::SASLInitialResponse {
                        mechanism: "SCRAM-SHA-256".to_string(),
                        data: client.client_first_message(),
                    })?;
                    scram = Some(client);
                }
                BackendMessage::AuthenticationSASLContinue(data) => {
                    let client = scram
                        .as_mut()
                        .ok_or_else(|| PgError::Auth("SASL continue before SASL start".into()))?;
                    let response = client.handle_server_first(&data).map_err(PgError::Auth)?;
                    self.send(&FrontendMessage::SASLResponse(response))?;
                }
                BackendMessage::AuthenticationSASLFinal(data) => {
                    let client = scram
                        .as_ref()
                        .ok_or_else(|| PgError::Auth("SASL final before SASL start".into()))?;
                    client.verify_server_final(&data).map_err(PgError::Auth)?;
                }
                BackendMessage::AuthenticationOther(subtype) => {
                    return Err(PgError::UnsupportedAuth(format!(
                        "authentication subtype {}",
                        subtype
                    )))
                }
                BackendMessage::ParameterStatus { .. } => {}
                BackendMessage::BackendKeyData { .. } => {}
                BackendMessage::NoticeResponse(_) => {}
                BackendMessage::ReadyForQuery(_) => return Ok(()),
                BackendMessage::ErrorResponse(fields) => {
                    return Err(PgError::Server(fields.message))
                }
                other => {
                    return Err(PgError::Protocol(format!(
                        "unexpected message during startup: {:?}",
                        other
                    )))
                }
            }
        }
    }

    /// Run one statement over the simple query protocol and return its rows
    /// in text format. Used for catalog lookups.
    pub fn simple_query(&mut self, sql: &str) -> PgResult<Vec<Vec<Option<Vec<u8>>>>> {
        self.send(&FrontendMessage::Query(sql.to_string()))?;

        let mut rows = Vec::new();
        let mut server_error: Option<String> = None;
        loop {
            match self.recv_msg()? {
                BackendMessage::RowDescription(_) => {}
                BackendMessage::DataRow(columns) => rows.push(columns),
                BackendMessage::CommandComplete(_) => {}
                BackendMessage::EmptyQueryResponse => {}
                BackendMessage::NoticeResponse(_) => {}
                // the server may report these at any time, e.g. after SET
                BackendMessage::ParameterStatus { .. } => {}
                BackendMessage::ErrorResponse(fields) => {
                    // Drain to ReadyForQuery so the connection stays usable.
                    server_error = Some(fields.message);
                }
                BackendMessage::ReadyForQuery(_) => {
                    return match server_error {
                        Some(message) => Err(PgError::Server(message)),
                        None => Ok(rows),
                    };
                }
                other => {
                    return Err(PgError::Protocol(format!(
                        "unexpected message during simple query: {:?}",
                        other
                    )))
                }
            }
        }
    }

    /// Send Terminate and drop the stream.
    pub fn close(mut self) -> PgResult<()> {
        self.send(&FrontendMessage::Terminate)
    }
}

fn require_password(password: Option<&str>) -> PgResult<&str> {
    password.ok_or_else(|| PgError::Auth("server requires a password, none was given".into()))
}
