use bytes::BytesMut;

/// Per-channel accumulator that turns an arbitrary sequence of byte chunks
/// back into newline-framed messages.
///
/// Bytes are appended as they arrive; each complete line is split off and
/// returned exactly once, leaving any undelimited tail buffered for the next
/// chunk. Framing is therefore independent of how the bytes were chunked in
/// transit.
pub struct LineAssembler {
    buf: BytesMut,
    max_line_len: usize,
}

impl LineAssembler {
    pub fn new(max_line_len: usize) -> Self {
        Self {
            buf: BytesMut::new(),
            max_line_len,
        }
    }

    /// Appends a chunk and returns every line it completes, left to right.
    ///
    /// An undelimited run longer than `max_line_len` is force-split at the
    /// limit so the buffer cannot grow without bound.
    pub fn push(&mut self, chunk: &[u8]) -> Vec<String> {
        self.buf.extend_from_slice(chunk);

        let mut lines = Vec::new();
        loop {
            if let Some(pos) = self.buf.iter().position(|&b| b == b'\n') {
                // Consume through the delimiter so this line can never be
                // produced again.
                let line = self.buf.split_to(pos + 1);
                lines.push(String::from_utf8_lossy(&line[..pos]).into_owned());
            } else if self.buf.len() >= self.max_line_len {
                let line = self.buf.split_to(self.max_line_len);
                lines.push(String::from_utf8_lossy(&line).into_owned());
            } else {
                break;
            }
        }
        lines
    }

    /// Takes the buffered undelimited tail, if any. Called when the channel
    /// closes with bytes still pending.
    pub fn take_remainder(&mut self) -> Option<String> {
        if self.buf.is_empty() {
            return None;
        }
        let tail = self.buf.split();
        Some(String::from_utf8_lossy(&tail).into_owned())
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }
}
