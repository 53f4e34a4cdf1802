//! Client connection speaking RESP over TCP

use super::resp::{RespError, RespResult, RespValue};
use bytes::BytesMut;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpStream, ToSocketAddrs};
use tracing::trace;

/// One request/reply stream to a Redis-compatible server
#[derive(Debug)]
pub struct RespConnection {
    stream: TcpStream,
    buffer: BytesMut,
}

impl RespConnection {
    pub async fn connect(addr: impl ToSocketAddrs) -> RespResult<Self> {
        let stream = TcpStream::connect(addr).await?;
        stream.set_nodelay(true)?;
        Ok(Self {
            stream,
            buffer: BytesMut::with_capacity(4096),
        })
    }

    /// Send a command and wait for its reply
    pub async fn call<I, S>(&mut self, parts: I) -> RespResult<RespValue>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<[u8]>,
    {
        let mut frame = Vec::new();
        RespValue::command(parts).encode(&mut frame)?;
        self.stream.write_all(&frame).await?;
        self.read_reply().await
    }

    async fn read_reply(&mut self) -> RespResult<RespValue> {
        loop {
            if let Some(value) = RespValue::decode(&mut self.buffer)? {
                trace!(?value, "reply");
                return Ok(value);
            }
            let n = self.stream.read_buf(&mut self.buffer).await?;
            if n == 0 {
                return Err(RespError::Io(std::io::Error::new(
                    std::io::ErrorKind::UnexpectedEof,
                    "connection closed by server",
                )));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::net::TcpListener;

    #[tokio::test]
    async fn test_call_reads_split_reply() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let server = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut request = vec![0u8; 64];
            let n = socket.read(&mut request).await.unwrap();
            assert_eq!(&request[..n], b"*2\r\n$3\r\nGET\r\n$1\r\nk\r\n");
            socket.write_all(b"$5\r\nhel").await.unwrap();
            socket.flush().await.unwrap();
            tokio::time::sleep(std::time::Duration::from_millis(20)).await;
            socket.write_all(b"lo\r\n").await.unwrap();
        });

        let mut conn = RespConnection::connect(addr).await.unwrap();
        let reply = conn.call(["GET", "k"]).await.unwrap();
        assert_eq!(reply, RespValue::BulkString(Some(b"hello".to_vec())));
        server.await.unwrap();
    }

    #[tokio::test]
    async fn test_closed_connection_is_an_io_error() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let server = tokio::spawn(async move {
            let (socket, _) = listener.accept().await.unwrap();
            drop(socket);
        });

        let mut conn = RespConnection::connect(addr).await.unwrap();
        server.await.unwrap();
        assert!(matches!(conn.call(["PING"]).await, Err(RespError::Io(_))));
    }
}
