use crate::channel::MessageWriter;
use crate::clock::StartInstant;
use crate::config::Config;
use crate::producer::ProducerError;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::time::Duration;
use tokio::time::{sleep, Instant};
use tracing::{debug, info};

/// A producer that emits numbered messages at random whole-second delays
/// until the shared run deadline.
pub struct TimedProducer {
    id: usize,
    start: StartInstant,
    run_duration: Duration,
    max_delay_secs: u64,
    min_idle_pause: Duration,
}

impl TimedProducer {
    pub fn new(id: usize, start: StartInstant, config: &Config) -> Self {
        Self {
            id,
            start,
            run_duration: config.run_duration,
            max_delay_secs: config.delay.max_delay_secs,
            min_idle_pause: config.delay.min_idle_pause,
        }
    }

    pub async fn run(self, writer: MessageWriter) -> Result<(), ProducerError> {
        self.run_with_rng(writer, StdRng::from_entropy()).await
    }

    /// Runs the emission loop with a caller-supplied RNG so tests can seed it.
    pub async fn run_with_rng<R: Rng + Send>(
        self,
        mut writer: MessageWriter,
        mut rng: R,
    ) -> Result<(), ProducerError> {
        let deadline = self.start.deadline(self.run_duration);
        let mut seq = 1u64;

        loop {
            let now = Instant::now();
            if now >= deadline {
                break;
            }
            let remaining = deadline - now;

            // Uniform over the whole-second choices 0..=max, clamped so the
            // sleep never overshoots the deadline. A clamped-to-zero delay
            // becomes a short fixed pause instead of a tight spin.
            let delay_secs = rng.gen_range(0..=self.max_delay_secs).min(remaining.as_secs());
            if delay_secs > 0 {
                sleep(Duration::from_secs(delay_secs)).await;
            } else {
                sleep(self.min_idle_pause).await;
            }

            // The pause may have consumed the rest of the budget.
            if Instant::now() >= deadline {
                break;
            }

            let message = format!(
                "{}: Producer {} message {}",
                self.start.timestamp(),
                self.id,
                seq
            );
            writer.send(&message).await.map_err(ProducerError::Write)?;
            debug!(producer = self.id, seq, "Sent message");
            seq += 1;
        }

        info!(producer = self.id, sent = seq - 1, "Timed producer finished");
        Ok(())
        // Dropping the writer here releases the write half; only then can the
        // collector observe end-of-stream on this channel.
    }
}
