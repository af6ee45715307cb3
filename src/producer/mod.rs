pub mod interactive;
pub mod timed;

pub use interactive::{ordinal_suffix, InteractiveProducer, LineSource, StdinLineSource};
pub use timed::TimedProducer;

use thiserror::Error;

/// Producer-local failures. Fatal for the producer that hit them; the
/// coordinator logs the outcome but the run continues on other channels.
#[derive(Debug, Error)]
pub enum ProducerError {
    #[error("channel write failed: {0}")]
    Write(#[source] std::io::Error),

    #[error("input source failed: {0}")]
    Input(#[source] std::io::Error),
}
