use std::fs;
use std::path::Path;

/// Starter config written by `fanlog config init`. Every value shown is the
/// default, so the file can be trimmed to just the overrides you want.
pub fn generate_starter_config() -> String {
    r#"# =============================================================================
# FANLOG CONFIGURATION
# =============================================================================
# All fields are optional; the values below are the defaults.
#
# Config file locations (in order of precedence):
#   1. Path specified via --config argument
#   2. ~/.config/fanlog/config.yml
#   3. /etc/fanlog/config.yml

# Where the collected log is written. One line per message, each prefixed
# with the collector's elapsed-time stamp (m:ss.mmm), flushed per line.
output: output.txt

# Producer mix for a run.
producers:
  # Timed producers emit "Producer <id> message <n>" at random delays.
  timed: 4
  # The interactive producer relays lines typed on stdin.
  interactive: true

# Shared time budget. Every producer stops at run start + this duration.
run_duration: 30s

delay:
  # Timed producers pick a uniform whole-second delay in 0..=max_delay_secs.
  max_delay_secs: 2
  # Used instead of a zero delay so producers never spin.
  min_idle_pause: 100ms

collector:
  # Largest single read from a producer channel, in bytes.
  read_chunk_size: 256
  # Lines longer than this are force-split.
  max_line_len: 1024
  # Byte capacity of each producer channel.
  channel_capacity: 65536
"#
    .to_string()
}

/// Handles `fanlog config init`: print the starter config, or write it to
/// `fanlog.yml` in the current directory.
pub fn init(stdout: bool) -> Result<(), Box<dyn std::error::Error>> {
    let content = generate_starter_config();

    if stdout {
        print!("{}", content);
        return Ok(());
    }

    let target = Path::new("fanlog.yml");
    if target.exists() {
        return Err(format!("refusing to overwrite existing '{}'", target.display()).into());
    }
    fs::write(target, content)?;
    println!("Wrote starter config to {}", target.display());
    Ok(())
}
