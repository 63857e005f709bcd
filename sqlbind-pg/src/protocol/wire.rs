//! PostgreSQL wire protocol messages.
//!
//! Frontend/Backend protocol v3.0 (protocol code 196608), restricted to what
//! introspection needs: startup and authentication, the Parse/Describe/Sync
//! leg of the extended query protocol, and the simple query protocol for
//! catalog lookups.
//!
//! This layer is pure: encoding writes into a caller-owned buffer, decoding
//! reads from a caller-owned slice. All integers are big-endian.
//!
//! Reference: https://www.postgresql.org/docs/current/protocol-message-formats.html

use std::fmt;

use bytes::{BufMut, BytesMut};

/// Frontend (client → server) message types.
#[derive(Debug, Clone)]
pub enum FrontendMessage {
    /// Startup message (sent first, no type byte).
    Startup { user: String, database: String },
    /// Cleartext or MD5 password response.
    PasswordMessage(String),
    /// First message of a SASL exchange.
    SASLInitialResponse { mechanism: String, data: Vec<u8> },
    /// Subsequent SASL messages.
    SASLResponse(Vec<u8>),
    /// Parse a statement; parameter types are left for the server to infer.
    Parse { name: String, query: String },
    Describe { target: DescribeTarget, name: String },
    Close { target: DescribeTarget, name: String },
    Sync,
    /// Simple query protocol.
    Query(String),
    Terminate,
}

/// What a Describe or Close message refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DescribeTarget {
    Statement,
    Portal,
}

impl DescribeTarget {
    fn code(self) -> u8 {
        match self {
            DescribeTarget::Statement => b'S',
            DescribeTarget::Portal => b'P',
        }
    }
}

impl FrontendMessage {
    /// Encode one framed message into `buf`. The buffer is cleared first and
    /// holds exactly this message afterwards.
    pub fn encode(&self, buf: &mut BytesMut) {
        buf.clear();
        match self {
            FrontendMessage::Startup { user, database } => {
                let at = begin_untyped(buf);
                buf.put_i32(196608); // protocol 3.0
                put_cstr(buf, "user");
                put_cstr(buf, user);
                put_cstr(buf, "database");
                put_cstr(buf, database);
                buf.put_u8(0);
                finish(buf, at);
            }
            FrontendMessage::PasswordMessage(password) => {
                let at = begin(buf, b'p');
                put_cstr(buf, password);
                finish(buf, at);
            }
            FrontendMessage::SASLInitialResponse { mechanism, data } => {
                let at = begin(buf, b'p');
                put_cstr(buf, mechanism);
                buf.put_i32(data.len() as i32);
                buf.put_slice(data);
                finish(buf, at);
            }
            FrontendMessage::SASLResponse(data) => {
                let at = begin(buf, b'p');
                buf.put_slice(data);
                finish(buf, at);
            }
            FrontendMessage::Parse { name, query } => {
                let at = begin(buf, b'P');
                put_cstr(buf, name);
                put_cstr(buf, query);
                // zero parameter type OIDs: the server infers them
                buf.put_i16(0);
                finish(buf, at);
            }
            FrontendMessage::Describe { target, name } => {
                let at = begin(buf, b'D');
                buf.put_u8(target.code());
                put_cstr(buf, name);
                finish(buf, at);
            }
            FrontendMessage::Close { target, name } => {
                let at = begin(buf, b'C');
                buf.put_u8(target.code());
                put_cstr(buf, name);
                finish(buf, at);
            }
            FrontendMessage::Sync => {
                let at = begin(buf, b'S');
                finish(buf, at);
            }
            FrontendMessage::Query(sql) => {
                let at = begin(buf, b'Q');
                put_cstr(buf, sql);
                finish(buf, at);
            }
            FrontendMessage::Terminate => {
                let at = begin(buf, b'X');
                finish(buf, at);
            }
        }
    }
}

fn put_cstr(buf: &mut BytesMut, s: &str) {
    buf.put_slice(s.as_bytes());
    buf.put_u8(0);
}

/// Write the type byte and a length placeholder; returns the placeholder
/// offset for [`finish`].
fn begin(buf: &mut BytesMut, code: u8) -> usize {
    buf.put_u8(code);
    let at = buf.len();
    buf.put_i32(0);
    at
}

/// Startup has no type byte, only the length placeholder.
fn begin_untyped(buf: &mut BytesMut) -> usize {
    let at = buf.len();
    buf.put_i32(0);
    at
}

/// Patch the length field (which counts itself, not the type byte).
fn finish(buf: &mut BytesMut, at: usize) {
    let len = (buf.len() - at) as i32;
    buf[at..at + 4].copy_from_slice(&len.to_be_bytes());
}

/// Backend (server → client) message types.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackendMessage {
    AuthenticationOk,
    AuthenticationCleartextPassword,
    AuthenticationMD5Password([u8; 4]),
    AuthenticationSASL(Vec<String>),
    AuthenticationSASLContinue(Vec<u8>),
    AuthenticationSASLFinal(Vec<u8>),
    /// An authentication subtype this client does not speak.
    AuthenticationOther(i32),
    ParameterStatus {
        name: String,
        value: String,
    },
    BackendKeyData {
        process_id: i32,
        secret_key: i32,
    },
    ReadyForQuery(TransactionStatus),
    ParseComplete,
    BindComplete,
    CloseComplete,
    NoData,
    /// Type OIDs the server inferred for `$N` parameters.
    ParameterDescription(Vec<u32>),
    RowDescription(Vec<FieldDescription>),
    DataRow(Vec<Option<Vec<u8>>>),
    CommandComplete(String),
    ErrorResponse(ErrorFields),
    NoticeResponse(ErrorFields),
    EmptyQueryResponse,
}

/// Transaction status byte of ReadyForQuery.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransactionStatus {
    Idle,    // 'I'
    InBlock, // 'T'
    Failed,  // 'E'
}

/// One entry of a RowDescription, exactly as the server reports it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDescription {
    pub name: String,
    /// Originating table OID; zero for computed expressions.
    pub table_oid: u32,
    /// Attribute number within the table; zero for computed expressions.
    pub column_attr: i16,
    pub type_oid: u32,
    pub type_size: i16,
    pub type_modifier: i32,
    pub format: i16,
}

/// Fields from an ErrorResponse or NoticeResponse.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ErrorFields {
    pub severity: String,
    pub code: String,
    pub message: String,
    pub detail: Option<String>,
    pub hint: Option<String>,
}

/// Decoder outcome other than a complete message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    /// The slice does not yet hold a complete frame. Internal to the framing
    /// loop; never surfaced to callers of the connection.
    Incomplete,
    /// The frame is structurally invalid.
    Malformed(String),
    UnknownMessageType(u8),
}

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DecodeError::Incomplete => write!(f, "incomplete message frame"),
            DecodeError::Malformed(m) => write!(f, "malformed message: {}", m),
            DecodeError::UnknownMessageType(b) => {
                write!(f, "unknown message type: {:?}", *b as char)
            }
        }
    }
}

impl std::error::Error for DecodeError {}

fn malformed(msg: impl Into<String>) -> DecodeError {
    DecodeError::Malformed(msg.into())
}

impl BackendMessage {
    /// Decode one message from the front of `buf`.
    ///
    /// Returns the message and the number of bytes consumed. All
    /// variable-length contents are copied out of `buf`, so the caller may
    /// compact its receive buffer afterwards.
    pub fn decode(buf: &[u8]) -> Result<(Self, usize), DecodeError> {
        if buf.len() < 5 {
            return Err(DecodeError::Incomplete);
        }
        let msg_type = buf[0];
        let len = i32::from_be_bytes([buf[1], buf[2], buf[3], buf[4]]);
        if len < 4 {
            return Err(malformed(format!("frame length {} below header size", len)));
        }
        let total = len as usize + 1;
        if buf.len() < total {
            return Err(DecodeError::Incomplete);
        }

        let mut payload = Payload::new(&buf[5..total]);
        let message = match msg_type {
            b'R' => Self::decode_auth(&mut payload)?,
            b'S' => BackendMessage::ParameterStatus {
                name: payload.cstr()?,
                value: payload.cstr()?,
            },
            b'K' => BackendMessage::BackendKeyData {
                process_id: payload.i32()?,
                secret_key: payload.i32()?,
            },
            b'Z' => Self::decode_ready_for_query(&mut payload)?,
            b'1' => BackendMessage::ParseComplete,
            b'2' => BackendMessage::BindComplete,
            b'3' => BackendMessage::CloseComplete,
            b'n' => BackendMessage::NoData,
            b't' => Self::decode_parameter_description(&mut payload)?,
            b'T' => Self::decode_row_description(&mut payload)?,
            b'D' => Self::decode_data_row(&mut payload)?,
            b'C' => BackendMessage::CommandComplete(payload.cstr()?),
            b'E' => BackendMessage::ErrorResponse(Self::decode_error_fields(&mut payload)?),
            b'N' => BackendMessage::NoticeResponse(Self::decode_error_fields(&mut payload)?),
            b'I' => BackendMessage::EmptyQueryResponse,
            other => return Err(DecodeError::UnknownMessageType(other)),
        };

        Ok((message, total))
    }

    fn decode_auth(payload: &mut Payload<'_>) -> Result<Self, DecodeError> {
        let subtype = payload.i32()?;
        Ok(match subtype {
            0 => BackendMessage::AuthenticationOk,
            3 => BackendMessage::AuthenticationCleartextPassword,
            5 => {
                let salt = payload.take(4)?;
                BackendMessage::AuthenticationMD5Password([salt[0], salt[1], salt[2], salt[3]])
            }
            10 => {
                let mut mechanisms = Vec::new();
                while payload.peek() != Some(0) && payload.remaining() > 0 {
                    mechanisms.push(payload.cstr()?);
                }
                BackendMessage::AuthenticationSASL(mechanisms)
            }
            11 => BackendMessage::AuthenticationSASLContinue(payload.rest().to_vec()),
            12 => BackendMessage::AuthenticationSASLFinal(payload.rest().to_vec()),
            other => BackendMessage::AuthenticationOther(other),
        })
    }

    fn decode_ready_for_query(payload: &mut Payload<'_>) -> Result<Self, DecodeError> {
        let status = match payload.u8()? {
            b'I' => TransactionStatus::Idle,
            b'T' => TransactionStatus::InBlock,
            b'E' => TransactionStatus::Failed,
            other => {
                return Err(malformed(format!(
                    "unknown transaction status: {:?}",
                    other as char
                )))
            }
        };
        Ok(BackendMessage::ReadyForQuery(status))
    }

    fn decode_parameter_description(payload: &mut Payload<'_>) -> Result<Self, DecodeError> {
        let count = payload.i16()?;
        if count < 0 {
            return Err(malformed("negative parameter count"));
        }
        let mut oids = Vec::with_capacity(count as usize);
        for _ in 0..count {
            oids.push(payload.u32()?);
        }
        Ok(BackendMessage::ParameterDescription(oids))
    }

    fn decode_row_description(payload: &mut Payload<'_>) -> Result<Self, DecodeError> {
        let count = payload.i16()?;
        if count < 0 {
            return Err(malformed("negative field count"));
        }
        let mut fields = Vec::with_capacity(count as usize);
        for _ in 0..count {
            fields.push(FieldDescription {
                name: payload.cstr()?,
                table_oid: payload.u32()?,
                column_attr: payload.i16()?,
                type_oid: payload.u32()?,
                type_size: payload.i16()?,
                type_modifier: payload.i32()?,
                format: payload.i16()?,
            });
        }
        Ok(BackendMessage::RowDescription(fields))
    }

    fn decode_data_row(payload: &mut Payload<'_>) -> Result<Self, DecodeError> {
        let count = payload.i16()?;
        if count < 0 {
            return Err(malformed("negative column count"));
        }
        let mut columns = Vec::with_capacity(count as usize);
        for _ in 0..count {
            let len = payload.i32()?;
            if len == -1 {
                columns.push(None);
            } else if len < 0 {
                return Err(malformed(format!("negative column length {}", len)));
            } else {
                columns.push(Some(payload.take(len as usize)?.to_vec()));
            }
        }
        Ok(BackendMessage::DataRow(columns))
    }

    fn decode_error_fields(payload: &mut Payload<'_>) -> Result<ErrorFields, DecodeError> {
        let mut fields = ErrorFields::default();
        loop {
            let field_type = match payload.peek() {
                None | Some(0) => break,
                Some(b) => b,
            };
            payload.u8()?;
            let value = payload.cstr()?;
            match field_type {
                b'S' => fields.severity = value,
                b'C' => fields.code = value,
                b'M' => fields.message = value,
                b'D' => fields.detail = Some(value),
                b'H' => fields.hint = Some(value),
                _ => {}
            }
        }
        Ok(fields)
    }
}

/// Bounds-checked cursor over a message payload.
struct Payload<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> Payload<'a> {
    fn new(buf: &'a [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    fn remaining(&self) -> usize {
        self.buf.len() - self.pos
    }

    fn peek(&self) -> Option<u8> {
        self.buf.get(self.pos).copied()
    }

    fn take(&mut self, n: usize) -> Result<&'a [u8], DecodeError> {
        if self.remaining() < n {
            return Err(malformed("truncated message payload"));
        }
        let out = &self.buf[self.pos..self.pos + n];
        self.pos += n;
        Ok(out)
    }

    fn u8(&mut self) -> Result<u8, DecodeError> {
        self.take(1).map(|b| b[0])
    }

    fn i16(&mut self) -> Result<i16, DecodeError> {
        self.take(2).map(|b| i16::from_be_bytes([b[0], b[1]]))
    }

    fn i32(&mut self) -> Result<i32, DecodeError> {
        self.take(4)
            .map(|b| i32::from_be_bytes([b[0], b[1], b[2], b[3]]))
    }

    fn u32(&mut self) -> Result<u32, DecodeError> {
        self.take(4)
            .map(|b| u32::from_be_bytes([b[0], b[1], b[2], b[3]]))
    }

    /// NUL-terminated string, duplicated out of the buffer.
    fn cstr(&mut self) -> Result<String, DecodeError> {
        let rest = &self.buf[self.pos..];
        let end = rest
            .iter()
            .position(|&b| b == 0)
            .ok_or_else(|| malformed("unterminated string in message payload"))?;
        let s = String::from_utf8_lossy(&rest[..end]).into_owned();
        self.pos += end + 1;
        Ok(s)
    }

    fn rest(&mut self) -> &'a [u8] {
        let out = &self.buf[self.pos..];
        self.pos = self.buf.len();
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Build a typed backend frame around `payload`.
    fn frame(code: u8, payload: &[u8]) -> Vec<u8> {
        let mut out = vec![code];
        out.extend_from_slice(&((payload.len() + 4) as i32).to_be_bytes());
        out.extend_from_slice(payload);
        out
    }

    fn decode_one(bytes: &[u8]) -> BackendMessage {
        let (msg, consumed) = BackendMessage::decode(bytes).expect("decode failed");
        assert_eq!(consumed, bytes.len());
        msg
    }

    fn encode(msg: &FrontendMessage) -> Vec<u8> {
        let mut buf = BytesMut::new();
        msg.encode(&mut buf);
        buf.to_vec()
    }

    #[test]
    fn test_encode_startup() {
        let bytes = encode(&FrontendMessage::Startup {
            user: "u".into(),
            database: "d".into(),
        });
        assert_eq!(&bytes[..4], &27i32.to_be_bytes());
        assert_eq!(&bytes[4..8], &196608i32.to_be_bytes());
        assert_eq!(&bytes[8..], b"user\0u\0database\0d\0\0");
    }

    #[test]
    fn test_encode_parse_describe_sync() {
        let bytes = encode(&FrontendMessage::Parse {
            name: String::new(),
            query: "SELECT 1".into(),
        });
        assert_eq!(bytes[0], b'P');
        assert_eq!(&bytes[1..5], &(4 + 1 + 9 + 2i32).to_be_bytes());
        assert_eq!(&bytes[5..], b"\0SELECT 1\0\0\0");

        let bytes = encode(&FrontendMessage::Describe {
            target: DescribeTarget::Statement,
            name: String::new(),
        });
        assert_eq!(bytes, vec![b'D', 0, 0, 0, 6, b'S', 0]);

        assert_eq!(encode(&FrontendMessage::Sync), vec![b'S', 0, 0, 0, 4]);
        assert_eq!(encode(&FrontendMessage::Terminate), vec![b'X', 0, 0, 0, 4]);
    }

    #[test]
    fn test_encode_clears_previous_contents() {
        let mut buf = BytesMut::new();
        FrontendMessage::Query("SELECT 1".into()).encode(&mut buf);
        FrontendMessage::Sync.encode(&mut buf);
        assert_eq!(buf.to_vec(), vec![b'S', 0, 0, 0, 4]);
    }

    #[test]
    fn test_encode_sasl_initial_response() {
        let bytes = encode(&FrontendMessage::SASLInitialResponse {
            mechanism: "SCRAM-SHA-256".into(),
            data: b"n,,n=u,r=abc".to_vec(),
        });
        assert_eq!(bytes[0], b'p');
        assert_eq!(&bytes[5..19], b"SCRAM-SHA-256\0");
        assert_eq!(&bytes[19..23], &12i32.to_be_bytes());
        assert_eq!(&bytes[23..], b"n,,n=u,r=abc");
    }

    #[test]
    fn test_decode_auth_variants() {
        assert_eq!(
            decode_one(&frame(b'R', &0i32.to_be_bytes())),
            BackendMessage::AuthenticationOk
        );
        assert_eq!(
            decode_one(&frame(b'R', &3i32.to_be_bytes())),
            BackendMessage::AuthenticationCleartextPassword
        );

        let mut md5 = 5i32.to_be_bytes().to_vec();
        md5.extend_from_slice(&[1, 2, 3, 4]);
        assert_eq!(
            decode_one(&frame(b'R', &md5)),
            BackendMessage::AuthenticationMD5Password([1, 2, 3, 4])
        );

        let mut sasl = 10i32.to_be_bytes().to_vec();
        sasl.extend_from_slice(b"SCRAM-SHA-256\0\0");
        assert_eq!(
            decode_one(&frame(b'R', &sasl)),
            BackendMessage::AuthenticationSASL(vec!["SCRAM-SHA-256".into()])
        );

        // Kerberos (2) is not supported but must decode cleanly
        assert_eq!(
            decode_one(&frame(b'R', &2i32.to_be_bytes())),
            BackendMessage::AuthenticationOther(2)
        );
    }

    #[test]
    fn test_decode_parameter_description() {
        let mut payload = 2i16.to_be_bytes().to_vec();
        payload.extend_from_slice(&23u32.to_be_bytes());
        payload.extend_from_slice(&1184u32.to_be_bytes());
        assert_eq!(
            decode_one(&frame(b't', &payload)),
            BackendMessage::ParameterDescription(vec![23, 1184])
        );
    }

    #[test]
    fn test_decode_row_description() {
        let mut payload = 1i16.to_be_bytes().to_vec();
        payload.extend_from_slice(b"id\0");
        payload.extend_from_slice(&16385u32.to_be_bytes());
        payload.extend_from_slice(&1i16.to_be_bytes());
        payload.extend_from_slice(&23u32.to_be_bytes());
        payload.extend_from_slice(&4i16.to_be_bytes());
        payload.extend_from_slice(&(-1i32).to_be_bytes());
        payload.extend_from_slice(&0i16.to_be_bytes());

        let msg = decode_one(&frame(b'T', &payload));
        assert_eq!(
            msg,
            BackendMessage::RowDescription(vec![FieldDescription {
                name: "id".into(),
                table_oid: 16385,
                column_attr: 1,
                type_oid: 23,
                type_size: 4,
                type_modifier: -1,
                format: 0,
            }])
        );
    }

    #[test]
    fn test_decode_data_row_with_null() {
        let mut payload = 2i16.to_be_bytes().to_vec();
        payload.extend_from_slice(&2i32.to_be_bytes());
        payload.extend_from_slice(b"42");
        payload.extend_from_slice(&(-1i32).to_be_bytes());
        assert_eq!(
            decode_one(&frame(b'D', &payload)),
            BackendMessage::DataRow(vec![Some(b"42".to_vec()), None])
        );
    }

    #[test]
    fn test_decode_error_response() {
        let payload = b"SERROR\0C42P01\0Mrelation \"nope\" does not exist\0\0";
        let msg = decode_one(&frame(b'E', payload));
        match msg {
            BackendMessage::ErrorResponse(fields) => {
                assert_eq!(fields.severity, "ERROR");
                assert_eq!(fields.code, "42P01");
                assert_eq!(fields.message, "relation \"nope\" does not exist");
                assert!(fields.detail.is_none());
            }
            other => panic!("unexpected message: {:?}", other),
        }
    }

    #[test]
    fn test_decode_ready_and_completions() {
        assert_eq!(
            decode_one(&frame(b'Z', b"I")),
            BackendMessage::ReadyForQuery(TransactionStatus::Idle)
        );
        assert_eq!(decode_one(&frame(b'1', b"")), BackendMessage::ParseComplete);
        assert_eq!(decode_one(&frame(b'3', b"")), BackendMessage::CloseComplete);
        assert_eq!(decode_one(&frame(b'n', b"")), BackendMessage::NoData);
        assert_eq!(
            decode_one(&frame(b'C', b"SELECT 1\0")),
            BackendMessage::CommandComplete("SELECT 1".into())
        );
    }

    #[test]
    fn test_encode_password_and_close() {
        let bytes = encode(&FrontendMessage::PasswordMessage("hunter2".into()));
        assert_eq!(bytes[0], b'p');
        assert_eq!(&bytes[5..], b"hunter2\0");

        let bytes = encode(&FrontendMessage::Close {
            target: DescribeTarget::Portal,
            name: "c1".into(),
        });
        assert_eq!(bytes, vec![b'C', 0, 0, 0, 8, b'P', b'c', b'1', 0]);
    }

    #[test]
    fn test_decode_session_messages() {
        assert_eq!(
            decode_one(&frame(b'S', b"server_version\x0017.2\0")),
            BackendMessage::ParameterStatus {
                name: "server_version".into(),
                value: "17.2".into(),
            }
        );

        let mut key = 1234i32.to_be_bytes().to_vec();
        key.extend_from_slice(&5678i32.to_be_bytes());
        assert_eq!(
            decode_one(&frame(b'K', &key)),
            BackendMessage::BackendKeyData {
                process_id: 1234,
                secret_key: 5678,
            }
        );

        assert_eq!(decode_one(&frame(b'2', b"")), BackendMessage::BindComplete);
        assert_eq!(
            decode_one(&frame(b'I', b"")),
            BackendMessage::EmptyQueryResponse
        );
    }

    #[test]
    fn test_decode_sasl_continue_and_final() {
        let mut cont = 11i32.to_be_bytes().to_vec();
        cont.extend_from_slice(b"r=abc,s=c2FsdA==,i=4096");
        assert_eq!(
            decode_one(&frame(b'R', &cont)),
            BackendMessage::AuthenticationSASLContinue(b"r=abc,s=c2FsdA==,i=4096".to_vec())
        );

        let mut fin = 12i32.to_be_bytes().to_vec();
        fin.extend_from_slice(b"v=c2ln");
        assert_eq!(
            decode_one(&frame(b'R', &fin)),
            BackendMessage::AuthenticationSASLFinal(b"v=c2ln".to_vec())
        );
    }

    #[test]
    fn test_decode_notice_response() {
        let msg = decode_one(&frame(b'N', b"SNOTICE\0Mtruncating table\0\0"));
        match msg {
            BackendMessage::NoticeResponse(fields) => {
                assert_eq!(fields.severity, "NOTICE");
                assert_eq!(fields.message, "truncating table");
            }
            other => panic!("unexpected message: {:?}", other),
        }
    }

    #[test]
    fn test_partial_frame_needs_more_data() {
        let mut payload = 1i16.to_be_bytes().to_vec();
        payload.extend_from_slice(&23u32.to_be_bytes());
        let full = frame(b't', &payload);
        for split in 0..full.len() {
            assert_eq!(
                BackendMessage::decode(&full[..split]),
                Err(DecodeError::Incomplete),
                "split at {}",
                split
            );
        }
        assert!(BackendMessage::decode(&full).is_ok());
    }

    #[test]
    fn test_decode_consumes_exactly_one_message() {
        let mut stream = frame(b'1', b"");
        stream.extend_from_slice(&frame(b'Z', b"I"));
        let (msg, consumed) = BackendMessage::decode(&stream).unwrap();
        assert_eq!(msg, BackendMessage::ParseComplete);
        assert_eq!(consumed, 5);
        let (msg, _) = BackendMessage::decode(&stream[consumed..]).unwrap();
        assert_eq!(msg, BackendMessage::ReadyForQuery(TransactionStatus::Idle));
    }

    #[test]
    fn test_bad_length_is_malformed() {
        let bad = [b'Z', 0, 0, 0, 2, b'I'];
        assert!(matches!(
            BackendMessage::decode(&bad),
            Err(DecodeError::Malformed(_))
        ));
    }

    #[test]
    fn test_unknown_type_byte() {
        let unknown = frame(b'X', b"");
        assert_eq!(
            BackendMessage::decode(&unknown),
            Err(DecodeError::UnknownMessageType(b'X'))
        );
    }

    #[test]
    fn test_truncated_payload_is_malformed() {
        // Claims a 10-byte text column but the frame ends after 2 bytes.
        let mut payload = 1i16.to_be_bytes().to_vec();
        payload.extend_from_slice(&10i32.to_be_bytes());
        payload.extend_from_slice(b"ab");
        assert!(matches!(
            BackendMessage::decode(&frame(b'D', &payload)),
            Err(DecodeError::Malformed(_))
        ));
    }
}
