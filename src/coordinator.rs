use crate::channel::byte_channel;
use crate::clock::StartInstant;
use crate::collector::{Collector, CollectorError, CollectorSummary};
use crate::config::Config;
use crate::producer::{InteractiveProducer, LineSource, StdinLineSource, TimedProducer};
use thiserror::Error;
use tokio::io::AsyncWrite;
use tracing::{debug, error, info};

#[derive(Debug, Error)]
pub enum RunError {
    #[error("failed to open output file '{path}': {source}")]
    OutputOpen {
        path: std::path::PathBuf,
        source: std::io::Error,
    },

    #[error("collector error: {0}")]
    Collector(#[from] CollectorError),

    #[error("task join error: {0}")]
    Join(#[from] tokio::task::JoinError),
}

#[derive(Debug)]
pub struct RunSummary {
    pub collector: CollectorSummary,
    /// Producers that terminated with an error rather than at their deadline.
    pub producer_failures: usize,
}

/// Runs a full collection session against the real output file and stdin.
pub async fn run(config: &Config) -> Result<RunSummary, RunError> {
    let sink = tokio::fs::File::create(&config.output)
        .await
        .map_err(|e| RunError::OutputOpen {
            path: config.output.clone(),
            source: e,
        })?;
    info!(output = %config.output.display(), "Opened output log");

    let start = StartInstant::now();
    run_session(config, start, sink, StdinLineSource::new()).await
}

/// Spawns the configured producer mix, drives the collector until every
/// channel closes, then reaps every producer task.
///
/// Each producer task takes sole ownership of its channel's write half; the
/// coordinator keeps none. That is what makes end-of-stream observable: a
/// channel only signals it once every write-side holder is gone.
pub async fn run_session<W, S>(
    config: &Config,
    start: StartInstant,
    sink: W,
    input: S,
) -> Result<RunSummary, RunError>
where
    W: AsyncWrite + Unpin,
    S: LineSource + 'static,
{
    let capacity = config.collector.channel_capacity;
    let mut readers = Vec::with_capacity(config.producer_count());
    let mut handles = Vec::with_capacity(config.producer_count());

    for id in 1..=config.producers.timed {
        let (writer, reader) = byte_channel(capacity);
        readers.push(reader);
        let producer = TimedProducer::new(id, start, config);
        debug!(producer = id, "Spawning timed producer");
        handles.push(tokio::spawn(producer.run(writer)));
    }

    if config.producers.interactive {
        let id = config.producers.timed + 1;
        let (writer, reader) = byte_channel(capacity);
        readers.push(reader);
        let producer = InteractiveProducer::new(id, start, config);
        debug!(producer = id, "Spawning interactive producer");
        handles.push(tokio::spawn(producer.run(writer, input)));
    }

    info!(producers = handles.len(), run_duration = ?config.run_duration, "Run started");

    let collector = Collector::new(
        start,
        readers,
        sink,
        config.collector.read_chunk_size,
        config.collector.max_line_len,
    );
    let summary = collector.run().await?;

    // The collector only returns once every channel hit end-of-stream, so
    // every producer has already dropped its writer; reaping cannot block on
    // a producer that is still emitting.
    let mut producer_failures = 0;
    for (i, handle) in handles.into_iter().enumerate() {
        match handle.await? {
            Ok(()) => debug!(producer = i + 1, "Producer reaped"),
            Err(e) => {
                producer_failures += 1;
                error!(producer = i + 1, error = %e, "Producer failed");
            }
        }
    }

    info!(
        entries = summary.entries_written,
        failures = producer_failures,
        "Run complete"
    );

    Ok(RunSummary {
        collector: summary,
        producer_failures,
    })
}
