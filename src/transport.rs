#![cfg(feature = "std")]

//! Length-prefixed framing over any tokio byte stream: a 4-byte big-endian
//! length followed by that many payload bytes.

use std::io::ErrorKind;

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::{TcpStream, ToSocketAddrs};
use tokio::time::{timeout, Duration};

use crate::config::MAX_FRAME_SIZE;

/// Default timeout for finishing a started read or a write (30 seconds).
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

fn read_error(e: std::io::Error) -> anyhow::Error {
    match e.kind() {
        ErrorKind::UnexpectedEof => anyhow::anyhow!("Connection closed by peer"),
        ErrorKind::ConnectionReset => anyhow::anyhow!("Connection reset by peer"),
        _ => anyhow::anyhow!("Read error: {}", e),
    }
}

fn write_error(e: std::io::Error) -> anyhow::Error {
    match e.kind() {
        ErrorKind::BrokenPipe | ErrorKind::ConnectionReset => {
            anyhow::anyhow!("Connection closed by peer")
        }
        _ => anyhow::anyhow!("Write error: {}", e),
    }
}

/// Reading half of a framed connection.
pub struct FrameReader<R> {
    inner: R,
    max_frame_size: u32,
    timeout_duration: Duration,
}

impl<R: AsyncRead + Unpin> FrameReader<R> {
    pub fn new(inner: R) -> Self {
        Self::with_limits(inner, MAX_FRAME_SIZE, DEFAULT_TIMEOUT)
    }

    pub fn with_limits(inner: R, max_frame_size: u32, timeout_duration: Duration) -> Self {
        Self {
            inner,
            max_frame_size,
            timeout_duration,
        }
    }

    /// Next frame, or `None` when the peer closed the stream between frames.
    ///
    /// Waiting for a frame to begin has no deadline; once the length prefix
    /// arrived the body must follow within the timeout.
    pub async fn read_frame(&mut self) -> anyhow::Result<Option<Vec<u8>>> {
        let mut len_buf = [0u8; 4];
        match self.inner.read_exact(&mut len_buf).await {
            Ok(_) => {}
            Err(e) if e.kind() == ErrorKind::UnexpectedEof => return Ok(None),
            Err(e) => return Err(read_error(e)),
        }

        let len = u32::from_be_bytes(len_buf);
        if len > self.max_frame_size {
            return Err(anyhow::anyhow!(
                "Message too large: {} bytes (max: {})",
                len,
                self.max_frame_size
            ));
        }
        if len == 0 {
            return Err(anyhow::anyhow!("Invalid message length: 0"));
        }

        let mut buf = vec![0u8; len as usize];
        timeout(self.timeout_duration, self.inner.read_exact(&mut buf))
            .await
            .map_err(|_| anyhow::anyhow!("Receive timeout after {:?}", self.timeout_duration))?
            .map_err(read_error)?;
        Ok(Some(buf))
    }

    /// Next frame decoded as UTF-8 text.
    pub async fn read_text(&mut self) -> anyhow::Result<Option<String>> {
        match self.read_frame().await? {
            Some(buf) => String::from_utf8(buf)
                .map(Some)
                .map_err(|e| anyhow::anyhow!("Frame is not UTF-8: {}", e)),
            None => Ok(None),
        }
    }
}

/// Writing half of a framed connection.
pub struct FrameWriter<W> {
    inner: W,
    max_frame_size: u32,
    timeout_duration: Duration,
}

impl<W: AsyncWrite + Unpin> FrameWriter<W> {
    pub fn new(inner: W) -> Self {
        Self::with_limits(inner, MAX_FRAME_SIZE, DEFAULT_TIMEOUT)
    }

    pub fn with_limits(inner: W, max_frame_size: u32, timeout_duration: Duration) -> Self {
        Self {
            inner,
            max_frame_size,
            timeout_duration,
        }
    }

    pub async fn write_frame(&mut self, payload: &[u8]) -> anyhow::Result<()> {
        if payload.is_empty() {
            return Err(anyhow::anyhow!("Invalid message length: 0"));
        }
        if payload.len() > self.max_frame_size as usize {
            return Err(anyhow::anyhow!(
                "Message too large: {} bytes (max: {})",
                payload.len(),
                self.max_frame_size
            ));
        }

        let limit = self.timeout_duration;
        let inner = &mut self.inner;
        let send_op = async move {
            let len = (payload.len() as u32).to_be_bytes();
            inner.write_all(&len).await.map_err(write_error)?;
            inner.write_all(payload).await.map_err(write_error)?;
            inner.flush().await.map_err(write_error)?;
            anyhow::Ok(())
        };
        timeout(limit, send_op)
            .await
            .map_err(|_| anyhow::anyhow!("Send timeout after {:?}", limit))?
    }

    pub async fn write_text(&mut self, text: &str) -> anyhow::Result<()> {
        self.write_frame(text.as_bytes()).await
    }

    /// Close the write side so the peer sees end of stream.
    pub async fn shutdown(&mut self) -> anyhow::Result<()> {
        self.inner.shutdown().await.map_err(write_error)
    }
}

/// Framed halves of a TCP connection.
pub fn split(stream: TcpStream) -> (FrameReader<OwnedReadHalf>, FrameWriter<OwnedWriteHalf>) {
    let (read, write) = stream.into_split();
    (FrameReader::new(read), FrameWriter::new(write))
}

/// Connect to a server and frame the connection.
pub async fn connect<A: ToSocketAddrs>(
    addr: A,
) -> anyhow::Result<(FrameReader<OwnedReadHalf>, FrameWriter<OwnedWriteHalf>)> {
    let stream = TcpStream::connect(addr).await?;
    stream.set_nodelay(true)?;
    Ok(split(stream))
}
