use chrono::{DateTime, Utc};
use serde::Deserialize;
use tokio::fs::File;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tracing::{info, warn};

use common::{Bar, MarketEvent, Result};

/// One line of the bar file.
#[derive(Debug, Deserialize)]
struct BarRecord {
    timestamp: DateTime<Utc>,
    open: f64,
    high: f64,
    low: f64,
    close: f64,
    #[serde(default)]
    volume: f64,
    /// Present only when the source knows whether the bar is final.
    #[serde(default)]
    delayed: Option<bool>,
}

/// Replays a JSON-lines bar file as a data feed.
///
/// A line whose timestamp equals the previous one is a replay of the same
/// bar and keeps its index.
pub struct JsonlFeed {
    path: String,
    pair: String,
}

impl JsonlFeed {
    pub fn new(path: impl Into<String>, pair: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            pair: pair.into(),
        }
    }

    /// Stream every bar into `bar_tx`; returns the number of lines sent.
    pub async fn run(self, bar_tx: mpsc::Sender<MarketEvent>) -> Result<u64> {
        let file = File::open(&self.path).await?;
        let mut lines = BufReader::new(file).lines();

        let mut sent = 0u64;
        let mut index = 0u64;
        let mut last_timestamp: Option<DateTime<Utc>> = None;
        let mut line_no = 0usize;

        while let Some(line) = lines.next_line().await? {
            line_no += 1;
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let record: BarRecord = match serde_json::from_str(line) {
                Ok(r) => r,
                Err(e) => {
                    warn!(path = %self.path, line = line_no, error = %e, "Skipping malformed bar");
                    continue;
                }
            };

            match last_timestamp {
                Some(ts) if ts == record.timestamp => {}
                Some(ts) if record.timestamp < ts => {
                    warn!(line = line_no, "Skipping out-of-order bar");
                    continue;
                }
                Some(_) => index += 1,
                None => {}
            }
            last_timestamp = Some(record.timestamp);

            let event = MarketEvent {
                pair: self.pair.clone(),
                index,
                bar: Bar {
                    timestamp: record.timestamp,
                    open: record.open,
                    high: record.high,
                    low: record.low,
                    close: record.close,
                    volume: record.volume,
                },
                is_delayed: record.delayed,
            };
            if bar_tx.send(event).await.is_err() {
                warn!("Bar channel closed, stopping feed");
                break;
            }
            sent += 1;
        }

        info!(path = %self.path, bars = sent, "Feed exhausted");
        Ok(sent)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn replayed_timestamp_keeps_its_index() {
        let path = std::env::temp_dir()
            .join(format!("rollercoaster-feed-{}.jsonl", std::process::id()));
        let body = r#"{"timestamp":"2024-01-02T09:30:00Z","open":1,"high":2,"low":0.5,"close":1.5,"volume":10}
{"timestamp":"2024-01-02T09:45:00Z","open":1.5,"high":2,"low":1,"close":1.8}
{"timestamp":"2024-01-02T09:45:00Z","open":1.5,"high":2,"low":1,"close":1.8}

not json
{"timestamp":"2024-01-02T10:00:00Z","open":1.8,"high":2.2,"low":1.7,"close":2.1,"delayed":true}
"#;
        tokio::fs::write(&path, body).await.unwrap();

        let (tx, mut rx) = mpsc::channel(16);
        let sent = JsonlFeed::new(path.to_string_lossy(), "BTCUSD")
            .run(tx)
            .await
            .unwrap();
        assert_eq!(sent, 4);

        let mut events = Vec::new();
        while let Some(ev) = rx.recv().await {
            events.push(ev);
        }
        let indices: Vec<u64> = events.iter().map(|e| e.index).collect();
        assert_eq!(indices, vec![0, 1, 1, 2]);
        assert_eq!(events[0].is_delayed, None);
        assert_eq!(events[3].is_delayed, Some(true));
        assert_eq!(events[1].bar.volume, 0.0);

        let _ = tokio::fs::remove_file(&path).await;
    }
}
