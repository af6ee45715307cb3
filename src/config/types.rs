use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Run configuration: producer mix, run duration, delay range and buffer
/// sizes. Defaults are 4 timed producers plus one interactive, 30 seconds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Path of the collected log file.
    #[serde(default = "default_output")]
    pub output: PathBuf,

    #[serde(default)]
    pub producers: ProducerMixConfig,

    /// Shared time budget; every producer computes its deadline from the run
    /// start plus this duration.
    #[serde(default = "default_run_duration", with = "humantime_serde")]
    pub run_duration: Duration,

    #[serde(default)]
    pub delay: DelayConfig,

    #[serde(default)]
    pub collector: CollectorConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProducerMixConfig {
    /// Number of timed-random producers.
    #[serde(default = "default_timed")]
    pub timed: usize,

    /// Whether to run the interactive (stdin-fed) producer.
    #[serde(default = "default_interactive")]
    pub interactive: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DelayConfig {
    /// Timed producers sleep a uniform whole-second delay in
    /// `0..=max_delay_secs` between messages.
    #[serde(default = "default_max_delay_secs")]
    pub max_delay_secs: u64,

    /// Pause applied instead of a zero-length delay, so a producer never
    /// spins when less than a second of budget remains.
    #[serde(default = "default_min_idle_pause", with = "humantime_serde")]
    pub min_idle_pause: Duration,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CollectorConfig {
    /// Upper bound on a single read from a channel.
    #[serde(default = "default_read_chunk_size")]
    pub read_chunk_size: usize,

    /// Undelimited runs longer than this are force-split.
    #[serde(default = "default_max_line_len")]
    pub max_line_len: usize,

    /// Byte capacity of each producer channel.
    #[serde(default = "default_channel_capacity")]
    pub channel_capacity: usize,
}

fn default_output() -> PathBuf {
    PathBuf::from("output.txt")
}

fn default_timed() -> usize {
    4
}

fn default_interactive() -> bool {
    true
}

fn default_run_duration() -> Duration {
    Duration::from_secs(30)
}

fn default_max_delay_secs() -> u64 {
    2
}

fn default_min_idle_pause() -> Duration {
    Duration::from_millis(100)
}

fn default_read_chunk_size() -> usize {
    256
}

fn default_max_line_len() -> usize {
    1024
}

fn default_channel_capacity() -> usize {
    64 * 1024
}

impl Default for Config {
    fn default() -> Self {
        Self {
            output: default_output(),
            producers: ProducerMixConfig::default(),
            run_duration: default_run_duration(),
            delay: DelayConfig::default(),
            collector: CollectorConfig::default(),
        }
    }
}

impl Default for ProducerMixConfig {
    fn default() -> Self {
        Self {
            timed: default_timed(),
            interactive: default_interactive(),
        }
    }
}

impl Default for DelayConfig {
    fn default() -> Self {
        Self {
            max_delay_secs: default_max_delay_secs(),
            min_idle_pause: default_min_idle_pause(),
        }
    }
}

impl Default for CollectorConfig {
    fn default() -> Self {
        Self {
            read_chunk_size: default_read_chunk_size(),
            max_line_len: default_max_line_len(),
            channel_capacity: default_channel_capacity(),
        }
    }
}

impl Config {
    /// Total number of producers this configuration will spawn.
    pub fn producer_count(&self) -> usize {
        self.producers.timed + usize::from(self.producers.interactive)
    }
}
