pub mod assembler;

pub use assembler::LineAssembler;

use crate::channel::{ByteReader, ChannelId};
use crate::clock::StartInstant;
use futures::future::select_all;
use futures::FutureExt;
use thiserror::Error;
use tokio::io::{self, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tracing::{debug, error, info, warn};

#[derive(Debug, Error)]
pub enum CollectorError {
    #[error("failed to write log entry: {0}")]
    Sink(#[from] std::io::Error),
}

/// Accounting returned once every channel has closed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectorSummary {
    /// Total log entries written, flushed tails included.
    pub entries_written: u64,
    /// Entries written per channel, indexed by `ChannelId`.
    pub per_channel: Vec<u64>,
    /// Channels that closed with an undelimited tail, which was flushed as a
    /// final entry.
    pub flushed_tails: u64,
}

struct ChannelState {
    /// `None` once end-of-stream has been observed; the channel is then
    /// excluded from every subsequent wait.
    reader: Option<ByteReader>,
    assembler: LineAssembler,
    entries: u64,
}

/// The fan-in engine. Owns the read side of every channel and the output
/// sink; waits for readiness across all open channels at once, reassembles
/// lines from whatever chunks arrive, and appends each resolved line to the
/// sink stamped with the collector's own elapsed time.
pub struct Collector<W> {
    start: StartInstant,
    channels: Vec<ChannelState>,
    sink: W,
    chunk_size: usize,
    open: usize,
    entries_written: u64,
    flushed_tails: u64,
}

impl<W: AsyncWrite + Unpin> Collector<W> {
    pub fn new(
        start: StartInstant,
        readers: Vec<ByteReader>,
        sink: W,
        chunk_size: usize,
        max_line_len: usize,
    ) -> Self {
        let open = readers.len();
        let channels = readers
            .into_iter()
            .map(|reader| ChannelState {
                reader: Some(reader),
                assembler: LineAssembler::new(max_line_len),
                entries: 0,
            })
            .collect();
        Self {
            start,
            channels,
            sink,
            chunk_size,
            open,
            entries_written: 0,
            flushed_tails: 0,
        }
    }

    /// Runs the collection loop until every channel has reported
    /// end-of-stream, which requires every producer to have dropped its
    /// write half.
    pub async fn run(mut self) -> Result<CollectorSummary, CollectorError> {
        info!(channels = self.open, "Collector started");

        while self.open > 0 {
            let ready = self.wait_ready().await;
            for (id, result) in ready {
                self.handle_read(id, result).await?;
            }
        }

        let summary = CollectorSummary {
            entries_written: self.entries_written,
            per_channel: self.channels.iter().map(|ch| ch.entries).collect(),
            flushed_tails: self.flushed_tails,
        };
        info!(
            entries = summary.entries_written,
            flushed_tails = summary.flushed_tails,
            "Collector finished, all channels closed"
        );
        Ok(summary)
    }

    /// Blocks (no timeout) until at least one open channel is readable, then
    /// drains every other channel that is already ready. Servicing all ready
    /// channels per wake keeps one busy producer from starving the rest.
    async fn wait_ready(&mut self) -> Vec<(ChannelId, io::Result<Vec<u8>>)> {
        let chunk_size = self.chunk_size;
        let reads: Vec<_> = self
            .channels
            .iter_mut()
            .enumerate()
            .filter_map(|(id, ch)| {
                ch.reader
                    .as_mut()
                    .map(|reader| read_chunk(id, reader, chunk_size).boxed())
            })
            .collect();

        let (first, _, rest) = select_all(reads).await;
        let mut ready = vec![first];
        for pending in rest {
            // A single poll; reads left pending lose no data.
            if let Some(result) = pending.now_or_never() {
                ready.push(result);
            }
        }
        ready
    }

    async fn handle_read(
        &mut self,
        id: ChannelId,
        result: io::Result<Vec<u8>>,
    ) -> Result<(), CollectorError> {
        match result {
            Ok(chunk) if chunk.is_empty() => self.close_channel(id).await,
            Ok(chunk) => {
                let lines = self.channels[id].assembler.push(&chunk);
                for line in lines {
                    self.persist(id, &line).await?;
                }
                Ok(())
            }
            Err(e) => {
                // Per-channel failure: report and keep collecting from the
                // others. The channel stays open until it signals EOS.
                error!(channel = id, error = %e, "Read failed");
                Ok(())
            }
        }
    }

    async fn close_channel(&mut self, id: ChannelId) -> Result<(), CollectorError> {
        self.channels[id].reader = None;
        self.open -= 1;
        debug!(channel = id, open = self.open, "Channel closed");

        // A tail without a final delimiter still came from the producer;
        // flush it as a last entry rather than dropping the bytes.
        if let Some(tail) = self.channels[id].assembler.take_remainder() {
            warn!(channel = id, "Channel closed mid-message, flushing tail");
            self.flushed_tails += 1;
            self.persist(id, &tail).await?;
        }
        Ok(())
    }

    /// Appends one log entry, stamped with the collector's current elapsed
    /// time, and flushes so the log is durable up to this line.
    async fn persist(&mut self, id: ChannelId, line: &str) -> Result<(), CollectorError> {
        let entry = format!("{}: {}\n", self.start.timestamp(), line);
        self.sink.write_all(entry.as_bytes()).await?;
        self.sink.flush().await?;
        self.channels[id].entries += 1;
        self.entries_written += 1;
        debug!(channel = id, "Persisted log entry");
        Ok(())
    }
}

async fn read_chunk(
    id: ChannelId,
    reader: &mut ByteReader,
    chunk_size: usize,
) -> (ChannelId, io::Result<Vec<u8>>) {
    let mut buf = vec![0u8; chunk_size];
    match reader.read(&mut buf).await {
        Ok(n) => {
            buf.truncate(n);
            (id, Ok(buf))
        }
        Err(e) => (id, Err(e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::simplex;

    fn lines(log: &[u8]) -> Vec<String> {
        String::from_utf8(log.to_vec())
            .unwrap()
            .lines()
            .map(str::to_string)
            .collect()
    }

    #[tokio::test(start_paused = true)]
    async fn test_collects_from_multiple_channels_until_all_close() {
        let start = StartInstant::now();
        let (r1, mut w1) = simplex(1024);
        let (r2, mut w2) = simplex(1024);

        w1.write_all(b"from one\n").await.unwrap();
        w2.write_all(b"from two\n").await.unwrap();
        drop(w1);
        drop(w2);

        let mut log = Vec::new();
        let collector = Collector::new(start, vec![r1, r2], &mut log, 256, 1024);
        let summary = collector.run().await.unwrap();

        assert_eq!(summary.entries_written, 2);
        assert_eq!(summary.per_channel, vec![1, 1]);
        assert_eq!(summary.flushed_tails, 0);

        let mut got = lines(&log);
        got.sort();
        assert_eq!(got, vec!["0:00.000: from one", "0:00.000: from two"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_message_split_across_reads_resolved_once() {
        let start = StartInstant::now();
        let (reader, mut writer) = simplex(1024);

        let mut log = Vec::new();
        let collector = Collector::new(start, vec![reader], &mut log, 256, 1024);

        let feed = tokio::spawn(async move {
            writer.write_all(b"first ha").await.unwrap();
            writer.flush().await.unwrap();
            tokio::time::sleep(std::time::Duration::from_millis(10)).await;
            writer.write_all(b"lf joined\n").await.unwrap();
        });

        let summary = collector.run().await.unwrap();
        feed.await.unwrap();

        assert_eq!(summary.entries_written, 1);
        assert_eq!(lines(&log), vec!["0:00.010: first half joined"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_multiple_messages_in_one_read() {
        let start = StartInstant::now();
        let (reader, mut writer) = simplex(1024);

        writer.write_all(b"a\nb\nc\n").await.unwrap();
        drop(writer);

        let mut log = Vec::new();
        let collector = Collector::new(start, vec![reader], &mut log, 256, 1024);
        let summary = collector.run().await.unwrap();

        assert_eq!(summary.entries_written, 3);
        assert_eq!(
            lines(&log),
            vec!["0:00.000: a", "0:00.000: b", "0:00.000: c"]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_undelimited_tail_flushed_on_close() {
        let start = StartInstant::now();
        let (reader, mut writer) = simplex(1024);

        writer.write_all(b"complete\nleftover").await.unwrap();
        drop(writer);

        let mut log = Vec::new();
        let collector = Collector::new(start, vec![reader], &mut log, 256, 1024);
        let summary = collector.run().await.unwrap();

        assert_eq!(summary.entries_written, 2);
        assert_eq!(summary.flushed_tails, 1);
        assert_eq!(
            lines(&log),
            vec!["0:00.000: complete", "0:00.000: leftover"]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_interleaved_producers_persisted_in_arrival_order() {
        let start = StartInstant::now();
        let (r1, mut w1) = simplex(1024);
        let (r2, mut w2) = simplex(1024);

        let mut log = Vec::new();
        let collector = Collector::new(start, vec![r1, r2], &mut log, 256, 1024);

        let feed = tokio::spawn(async move {
            w1.write_all(b"one early\n").await.unwrap();
            tokio::time::sleep(std::time::Duration::from_millis(20)).await;
            w2.write_all(b"two later\n").await.unwrap();
            tokio::time::sleep(std::time::Duration::from_millis(20)).await;
            w1.write_all(b"one again\n").await.unwrap();
        });

        let summary = collector.run().await.unwrap();
        feed.await.unwrap();

        assert_eq!(summary.per_channel, vec![2, 1]);
        assert_eq!(
            lines(&log),
            vec![
                "0:00.000: one early",
                "0:00.020: two later",
                "0:00.040: one again",
            ]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_empty_channel_closes_cleanly() {
        let start = StartInstant::now();
        let (reader, writer) = simplex(1024);
        drop(writer);

        let mut log = Vec::new();
        let collector = Collector::new(start, vec![reader], &mut log, 256, 1024);
        let summary = collector.run().await.unwrap();

        assert_eq!(summary.entries_written, 0);
        assert_eq!(summary.flushed_tails, 0);
        assert!(log.is_empty());
    }
}
