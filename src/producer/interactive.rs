use crate::channel::MessageWriter;
use crate::clock::StartInstant;
use crate::config::Config;
use crate::producer::ProducerError;
use async_trait::async_trait;
use std::io;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, Lines, Stdin, Stdout};
use tokio::time::{timeout, Instant};
use tracing::{debug, info};

/// A line-oriented, prompt/response input source. Abstracted so tests can
/// script input; production uses [`StdinLineSource`].
#[async_trait]
pub trait LineSource: Send {
    /// Shows the input prompt, if the source has somewhere to show one.
    async fn prompt(&mut self) -> io::Result<()> {
        Ok(())
    }

    /// Waits for the next line. `None` means the input is exhausted.
    async fn next_line(&mut self) -> io::Result<Option<String>>;
}

/// Reads lines from stdin, prompting on stdout.
pub struct StdinLineSource {
    lines: Lines<BufReader<Stdin>>,
    stdout: Stdout,
}

impl StdinLineSource {
    pub fn new() -> Self {
        Self {
            lines: BufReader::new(tokio::io::stdin()).lines(),
            stdout: tokio::io::stdout(),
        }
    }
}

impl Default for StdinLineSource {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl LineSource for StdinLineSource {
    async fn prompt(&mut self) -> io::Result<()> {
        self.stdout.write_all(b"Enter a message: ").await?;
        self.stdout.flush().await
    }

    async fn next_line(&mut self) -> io::Result<Option<String>> {
        self.lines.next_line().await
    }
}

/// English ordinal suffix: 11/12/13 take "th"; otherwise the last digit
/// decides (1 "st", 2 "nd", 3 "rd", anything else "th").
pub fn ordinal_suffix(n: u64) -> &'static str {
    match n % 100 {
        11..=13 => "th",
        _ => match n % 10 {
            1 => "st",
            2 => "nd",
            3 => "rd",
            _ => "th",
        },
    }
}

/// A producer that relays lines from an interactive source, one message per
/// line, until the shared run deadline.
pub struct InteractiveProducer {
    id: usize,
    start: StartInstant,
    run_duration: Duration,
}

impl InteractiveProducer {
    pub fn new(id: usize, start: StartInstant, config: &Config) -> Self {
        Self {
            id,
            start,
            run_duration: config.run_duration,
        }
    }

    pub async fn run<S: LineSource>(
        self,
        mut writer: MessageWriter,
        mut input: S,
    ) -> Result<(), ProducerError> {
        let deadline = self.start.deadline(self.run_duration);
        let mut count = 1u64;

        loop {
            let now = Instant::now();
            if now >= deadline {
                break;
            }
            // The wait shrinks every iteration; it is the time left in the
            // run, not a fixed timeout.
            let remaining = deadline - now;

            input.prompt().await.map_err(ProducerError::Input)?;

            let line = match timeout(remaining, input.next_line()).await {
                Err(_) => {
                    debug!(producer = self.id, "Deadline reached with no pending input");
                    break;
                }
                Ok(Ok(None)) => {
                    debug!(producer = self.id, "Input exhausted");
                    break;
                }
                Ok(Ok(Some(line))) => line,
                Ok(Err(e)) => return Err(ProducerError::Input(e)),
            };

            // Input readiness does not guarantee the line beat the deadline.
            if Instant::now() >= deadline {
                break;
            }

            let message = format!(
                "{}: Producer {}: {}{} text msg from the terminal: {}",
                self.start.timestamp(),
                self.id,
                count,
                ordinal_suffix(count),
                line
            );
            writer.send(&message).await.map_err(ProducerError::Write)?;
            debug!(producer = self.id, count, "Relayed input line");
            count += 1;
        }

        info!(producer = self.id, sent = count - 1, "Interactive producer finished");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::channel::byte_channel;
    use std::collections::VecDeque;
    use tokio::io::AsyncReadExt;

    /// Scripted input: each entry is (delay before the line arrives, line).
    struct ScriptedSource {
        script: VecDeque<(Duration, String)>,
    }

    impl ScriptedSource {
        fn new(entries: &[(u64, &str)]) -> Self {
            Self {
                script: entries
                    .iter()
                    .map(|(ms, text)| (Duration::from_millis(*ms), text.to_string()))
                    .collect(),
            }
        }
    }

    #[async_trait]
    impl LineSource for ScriptedSource {
        async fn next_line(&mut self) -> io::Result<Option<String>> {
            match self.script.pop_front() {
                Some((delay, line)) => {
                    tokio::time::sleep(delay).await;
                    Ok(Some(line))
                }
                None => Ok(None),
            }
        }
    }

    fn test_config(run_duration: Duration) -> Config {
        let mut config = Config::default();
        config.run_duration = run_duration;
        config
    }

    async fn read_lines(mut reader: crate::channel::ByteReader) -> Vec<String> {
        let mut out = Vec::new();
        reader.read_to_end(&mut out).await.unwrap();
        String::from_utf8(out)
            .unwrap()
            .lines()
            .map(str::to_string)
            .collect()
    }

    #[test]
    fn test_ordinal_suffixes() {
        let cases = [
            (1, "st"),
            (2, "nd"),
            (3, "rd"),
            (4, "th"),
            (11, "th"),
            (12, "th"),
            (13, "th"),
            (21, "st"),
            (22, "nd"),
            (23, "rd"),
            (101, "st"),
            (111, "th"),
        ];
        for (n, expected) in cases {
            assert_eq!(ordinal_suffix(n), expected, "ordinal for {}", n);
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_relays_lines_with_ordinals() {
        let start = StartInstant::now();
        let config = test_config(Duration::from_secs(5));
        let producer = InteractiveProducer::new(5, start, &config);
        let (writer, reader) = byte_channel(64 * 1024);
        let input = ScriptedSource::new(&[(100, "hello"), (200, "world")]);

        let handle = tokio::spawn(async move { producer.run(writer, input).await });
        let lines = read_lines(reader).await;
        handle.await.unwrap().unwrap();

        assert_eq!(lines.len(), 2);
        assert!(lines[0].ends_with("Producer 5: 1st text msg from the terminal: hello"));
        assert!(lines[1].ends_with("Producer 5: 2nd text msg from the terminal: world"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_line_arriving_after_deadline_is_dropped() {
        let start = StartInstant::now();
        let config = test_config(Duration::from_millis(500));
        let producer = InteractiveProducer::new(5, start, &config);
        let (writer, reader) = byte_channel(64 * 1024);
        // First line in time, second would land past the deadline.
        let input = ScriptedSource::new(&[(100, "in time"), (900, "too late")]);

        let handle = tokio::spawn(async move { producer.run(writer, input).await });
        let lines = read_lines(reader).await;
        handle.await.unwrap().unwrap();

        assert_eq!(lines.len(), 1);
        assert!(lines[0].ends_with("1st text msg from the terminal: in time"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_input_eof_ends_producer_before_deadline() {
        let start = StartInstant::now();
        let config = test_config(Duration::from_secs(30));
        let producer = InteractiveProducer::new(5, start, &config);
        let (writer, reader) = byte_channel(64 * 1024);
        let input = ScriptedSource::new(&[(50, "only line")]);

        let handle = tokio::spawn(async move { producer.run(writer, input).await });
        let lines = read_lines(reader).await;
        handle.await.unwrap().unwrap();

        assert_eq!(lines.len(), 1);
        assert!(start.elapsed() < Duration::from_secs(30));
    }
}
