//! RESP (Redis Serialization Protocol) codec
//!
//! Client-side subset: commands go out as arrays of bulk strings, replies are
//! decoded from a growing read buffer. A frame is only consumed once it has
//! fully arrived.

use bytes::{Buf, BytesMut};
use std::io::{self, Write};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RespError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Protocol error: {0}")]
    Protocol(String),

    #[error("Invalid encoding: {0}")]
    InvalidEncoding(String),
}

pub type RespResult<T> = Result<T, RespError>;

/// RESP value types
#[derive(Debug, Clone, PartialEq)]
pub enum RespValue {
    /// `+OK\r\n`
    SimpleString(String),
    /// `-ERR message\r\n`
    Error(String),
    /// `:1000\r\n`
    Integer(i64),
    /// `$6\r\nfoobar\r\n`, or `$-1\r\n` for null
    BulkString(Option<Vec<u8>>),
    /// `*2\r\n...`, or `*-1\r\n` for null
    Array(Vec<RespValue>),
    /// `_\r\n` (RESP3)
    Null,
}

impl RespValue {
    /// A command frame: an array of bulk strings
    pub fn command<I, S>(parts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<[u8]>,
    {
        RespValue::Array(
            parts
                .into_iter()
                .map(|p| RespValue::BulkString(Some(p.as_ref().to_vec())))
                .collect(),
        )
    }

    pub fn encode(&self, buf: &mut Vec<u8>) -> io::Result<()> {
        match self {
            RespValue::SimpleString(s) => write!(buf, "+{}\r\n", s)?,
            RespValue::Error(e) => write!(buf, "-{}\r\n", e)?,
            RespValue::Integer(i) => write!(buf, ":{}\r\n", i)?,
            RespValue::BulkString(None) => buf.extend_from_slice(b"$-1\r\n"),
            RespValue::BulkString(Some(data)) => {
                write!(buf, "${}\r\n", data.len())?;
                buf.extend_from_slice(data);
                buf.extend_from_slice(b"\r\n");
            }
            RespValue::Array(items) => {
                write!(buf, "*{}\r\n", items.len())?;
                for item in items {
                    item.encode(buf)?;
                }
            }
            RespValue::Null => buf.extend_from_slice(b"_\r\n"),
        }
        Ok(())
    }

    /// Decode one frame from the front of `buf`.
    ///
    /// Returns `Ok(None)` and leaves `buf` untouched while the frame is
    /// incomplete.
    pub fn decode(buf: &mut BytesMut) -> RespResult<Option<RespValue>> {
        let mut cursor = Cursor { data: &buf[..], pos: 0 };
        match cursor.value()? {
            Some(value) => {
                let consumed = cursor.pos;
                buf.advance(consumed);
                Ok(Some(value))
            }
            None => Ok(None),
        }
    }

    /// Text of a simple or bulk string; `None` for null replies
    pub fn as_text(&self) -> RespResult<Option<String>> {
        match self {
            RespValue::SimpleString(s) => Ok(Some(s.clone())),
            RespValue::BulkString(Some(bytes)) => String::from_utf8(bytes.clone())
                .map(Some)
                .map_err(|e| RespError::InvalidEncoding(e.to_string())),
            RespValue::BulkString(None) | RespValue::Null => Ok(None),
            other => Err(RespError::Protocol(format!("Expected string reply, got {:?}", other))),
        }
    }

    pub fn as_integer(&self) -> RespResult<i64> {
        match self {
            RespValue::Integer(i) => Ok(*i),
            other => Err(RespError::Protocol(format!("Expected integer reply, got {:?}", other))),
        }
    }
}

/// Read position over a borrowed buffer
struct Cursor<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn value(&mut self) -> RespResult<Option<RespValue>> {
        let Some(line) = self.line()? else {
            return Ok(None);
        };
        let (kind, rest) = match line.split_first() {
            Some((kind, rest)) => (*kind, rest),
            None => return Err(RespError::Protocol("Empty frame".to_string())),
        };

        let value = match kind {
            b'+' => RespValue::SimpleString(text(rest)?),
            b'-' => RespValue::Error(text(rest)?),
            b':' => RespValue::Integer(number(rest)?),
            b'_' if rest.is_empty() => RespValue::Null,
            b'$' => {
                let len = number(rest)?;
                if len < 0 {
                    return Ok(Some(RespValue::BulkString(None)));
                }
                let len = len as usize;
                if self.data.len() < self.pos + len + 2 {
                    return Ok(None);
                }
                let body = &self.data[self.pos..self.pos + len];
                if &self.data[self.pos + len..self.pos + len + 2] != b"\r\n" {
                    return Err(RespError::Protocol("Missing \\r\\n after bulk string".to_string()));
                }
                self.pos += len + 2;
                RespValue::BulkString(Some(body.to_vec()))
            }
            b'*' => {
                let len = number(rest)?;
                if len < 0 {
                    return Ok(Some(RespValue::Null));
                }
                let mut items = Vec::with_capacity(len as usize);
                for _ in 0..len {
                    match self.value()? {
                        Some(item) => items.push(item),
                        None => return Ok(None),
                    }
                }
                RespValue::Array(items)
            }
            other => {
                return Err(RespError::Protocol(format!("Unknown RESP type: {}", other as char)));
            }
        };
        Ok(Some(value))
    }

    /// Next CRLF-terminated line, without the terminator
    fn line(&mut self) -> RespResult<Option<&'a [u8]>> {
        let data: &'a [u8] = self.data;
        let remaining = &data[self.pos..];
        match remaining.windows(2).position(|w| w == b"\r\n") {
            Some(end) => {
                self.pos += end + 2;
                Ok(Some(&remaining[..end]))
            }
            None => Ok(None),
        }
    }
}

fn text(bytes: &[u8]) -> RespResult<String> {
    String::from_utf8(bytes.to_vec()).map_err(|e| RespError::InvalidEncoding(e.to_string()))
}

fn number(bytes: &[u8]) -> RespResult<i64> {
    text(bytes)?
        .parse::<i64>()
        .map_err(|e| RespError::Protocol(format!("Invalid integer: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encoded(value: &RespValue) -> Vec<u8> {
        let mut buf = Vec::new();
        value.encode(&mut buf).unwrap();
        buf
    }

    #[test]
    fn test_encode_command() {
        let cmd = RespValue::command(["SET", "ranking:page_rank", "[]", "EX", "600"]);
        assert_eq!(
            encoded(&cmd),
            b"*5\r\n$3\r\nSET\r\n$17\r\nranking:page_rank\r\n$2\r\n[]\r\n$2\r\nEX\r\n$3\r\n600\r\n"
        );
    }

    #[test]
    fn test_encode_scalars() {
        assert_eq!(encoded(&RespValue::SimpleString("OK".into())), b"+OK\r\n");
        assert_eq!(encoded(&RespValue::Error("ERR nope".into())), b"-ERR nope\r\n");
        assert_eq!(encoded(&RespValue::Integer(-4)), b":-4\r\n");
        assert_eq!(encoded(&RespValue::BulkString(None)), b"$-1\r\n");
    }

    #[test]
    fn test_decode_replies() {
        let mut buf = BytesMut::from(&b"+PONG\r\n:6\r\n$-1\r\n-ERR wrong type\r\n"[..]);
        assert_eq!(RespValue::decode(&mut buf).unwrap(), Some(RespValue::SimpleString("PONG".into())));
        assert_eq!(RespValue::decode(&mut buf).unwrap(), Some(RespValue::Integer(6)));
        assert_eq!(RespValue::decode(&mut buf).unwrap(), Some(RespValue::BulkString(None)));
        assert_eq!(RespValue::decode(&mut buf).unwrap(), Some(RespValue::Error("ERR wrong type".into())));
        assert!(buf.is_empty());
    }

    #[test]
    fn test_decode_nested_array() {
        let mut buf = BytesMut::from(&b"*2\r\n$3\r\nfoo\r\n*1\r\n:1\r\n"[..]);
        let val = RespValue::decode(&mut buf).unwrap().unwrap();
        assert_eq!(
            val,
            RespValue::Array(vec![
                RespValue::BulkString(Some(b"foo".to_vec())),
                RespValue::Array(vec![RespValue::Integer(1)]),
            ])
        );
    }

    #[test]
    fn test_incomplete_frame_is_not_consumed() {
        let mut buf = BytesMut::from(&b"$6\r\nfoo"[..]);
        assert_eq!(RespValue::decode(&mut buf).unwrap(), None);
        assert_eq!(&buf[..], b"$6\r\nfoo");

        buf.extend_from_slice(b"bar\r\n");
        assert_eq!(
            RespValue::decode(&mut buf).unwrap(),
            Some(RespValue::BulkString(Some(b"foobar".to_vec())))
        );

        let mut partial_array = BytesMut::from(&b"*2\r\n:1\r\n"[..]);
        assert_eq!(RespValue::decode(&mut partial_array).unwrap(), None);
        assert_eq!(partial_array.len(), 8);
    }

    #[test]
    fn test_decode_rejects_garbage() {
        let mut buf = BytesMut::from(&b"?what\r\n"[..]);
        assert!(matches!(RespValue::decode(&mut buf), Err(RespError::Protocol(_))));
        let mut bad_int = BytesMut::from(&b":abc\r\n"[..]);
        assert!(matches!(RespValue::decode(&mut bad_int), Err(RespError::Protocol(_))));
    }

    #[test]
    fn test_reply_accessors() {
        assert_eq!(RespValue::BulkString(Some(b"[]".to_vec())).as_text().unwrap().as_deref(), Some("[]"));
        assert_eq!(RespValue::BulkString(None).as_text().unwrap(), None);
        assert_eq!(RespValue::Integer(3).as_integer().unwrap(), 3);
        assert!(RespValue::Integer(3).as_text().is_err());
    }
}
