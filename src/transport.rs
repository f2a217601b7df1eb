// Frame-level transport abstraction. The session engine is agnostic to
// framing mechanics; it only requires that one call moves exactly one
// protocol message.

use std::future::Future;
use std::io;

use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader, ReadHalf,
    WriteHalf};

/// One logical protocol message per call. Both operations may block
/// indefinitely on a slow peer; deadlines are the caller's concern, not the
/// engine's.
pub trait FrameTransport {
    fn receive_frame(&mut self) -> impl Future<Output = io::Result<Vec<u8>>> + Send;
    fn send_frame(&mut self, frame: &[u8]) -> impl Future<Output = io::Result<()>> + Send;
}

/// Newline-delimited framing over any async byte stream. Trailing newlines
/// are stripped on receive; one newline is appended on send.
pub struct LineTransport<S> {
    reader: BufReader<ReadHalf<S>>,
    writer: WriteHalf<S>,
}

impl<S: AsyncRead + AsyncWrite> LineTransport<S> {
    pub fn new(stream: S) -> Self {
        let (read_half, write_half) = tokio::io::split(stream);
        Self {
            reader: BufReader::new(read_half),
            writer: write_half,
        }
    }
}

impl<S: AsyncRead + AsyncWrite + Send> FrameTransport for LineTransport<S> {
    async fn receive_frame(&mut self) -> io::Result<Vec<u8>> {
        let mut frame = Vec::new();
        let n_read = self.reader.read_until(b'\n', &mut frame).await?;
        if n_read == 0 {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "peer closed the connection",
            ));
        }
        while frame.last() == Some(&b'\n') {
            frame.pop();
        }
        Ok(frame)
    }

    async fn send_frame(&mut self, frame: &[u8]) -> io::Result<()> {
        self.writer.write_all(frame).await?;
        self.writer.write_all(b"\n").await?;
        self.writer.flush().await
    }
}
