use tokio::io::{self, AsyncWriteExt, ReadHalf, SimplexStream, WriteHalf};

/// Index identifying one producer-to-collector channel.
pub type ChannelId = usize;

/// Read side of a channel, owned by the collector.
pub type ByteReader = ReadHalf<SimplexStream>;

/// Write side of a channel. Exactly one producer owns it; dropping it is what
/// lets the collector observe end-of-stream, so it must never be cloned or
/// held anywhere else.
pub struct MessageWriter {
    inner: WriteHalf<SimplexStream>,
}

impl MessageWriter {
    /// Writes one framed message (the line delimiter is appended here).
    ///
    /// A failure means the read side is gone, which is unrecoverable for the
    /// owning producer.
    pub async fn send(&mut self, message: &str) -> io::Result<()> {
        self.inner.write_all(message.as_bytes()).await?;
        self.inner.write_all(b"\n").await
    }
}

/// Creates a unidirectional in-memory byte pipe with the given buffer
/// capacity. Bytes may be delivered to the reader in arbitrary partial
/// chunks; message framing is the assembler's job, not the channel's.
pub fn byte_channel(capacity: usize) -> (MessageWriter, ByteReader) {
    let (reader, writer) = io::simplex(capacity);
    (MessageWriter { inner: writer }, reader)
}
