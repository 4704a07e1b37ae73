//! Decorative effects while a session runs: the scrolling decryption stream
//! and the occasional ambient mission-log line.

use std::collections::VecDeque;

use rand::seq::SliceRandom;
use rand::Rng;

use crate::mission_log::{LogEntry, Severity};

pub const STREAM_SNIPPETS: &[&str] = &[
    "SCAN", "DECODE", "VECTOR", "DELTA", "QUANT", "OMEGA", "NOVA", "SIGMA", "PHASE", "FREQ",
    "ALIGN", "SHIFT", "BYPASS", "LOCK", "TRACE", "RANGE",
];

pub const STREAM_SUFFIXES: &[&str] = &["=0x", "::", "->", "<=", "//"];

/// Lines kept in the stream view.
pub const STREAM_MAX_LINES: usize = 80;
/// Lines shown immediately when the stream starts.
pub const STREAM_SEED_LINES: usize = 6;

/// Minimum gap between two ambient log lines.
pub const AMBIENT_LOG_INTERVAL_MS: i64 = 5 * 60 * 1000;

fn hex6<R: Rng + ?Sized>(rng: &mut R) -> String {
    format!("{:06X}", rng.gen_range(0..0x100_0000u32))
}

fn pick<'a, R: Rng + ?Sized>(rng: &mut R, options: &[&'a str]) -> &'a str {
    options.choose(rng).copied().unwrap_or_default()
}

/// One line of pseudo-decryption output, in one of three lengths.
pub fn generate_stream_line<R: Rng + ?Sized>(rng: &mut R) -> String {
    let segment_count = rng.gen_range(2..=4);
    let parts: Vec<&str> = (0..segment_count)
        .map(|_| pick(rng, STREAM_SNIPPETS))
        .collect();
    let suffix = pick(rng, STREAM_SUFFIXES);
    let a = hex6(rng);
    let b = hex6(rng);
    let c = hex6(rng);

    let style: f64 = rng.gen();
    if style < 0.33 {
        format!("{}{suffix}{a}", parts[..2].join("_"))
    } else if style < 0.66 {
        format!("{}{suffix}{a}:{b}", parts.join("_"))
    } else {
        let d = hex6(rng);
        format!("{}{suffix}{a}{b}{c}{d}|CHK={a}:{b}:{c}", parts.join("_"))
    }
}

/// Bounded scrollback for the decryption stream.
#[derive(Debug, Clone, Default)]
pub struct DecryptionStream {
    lines: VecDeque<String>,
}

impl DecryptionStream {
    /// Clear and fill with a few lines so the view is never empty.
    pub fn seed<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        self.lines.clear();
        for _ in 0..STREAM_SEED_LINES {
            self.lines.push_back(generate_stream_line(rng));
        }
    }

    /// Append a fresh line and return it.
    pub fn advance<R: Rng + ?Sized>(&mut self, rng: &mut R) -> &str {
        self.lines.push_back(generate_stream_line(rng));
        while self.lines.len() > STREAM_MAX_LINES {
            self.lines.pop_front();
        }
        self.lines.back().map(String::as_str).unwrap_or_default()
    }

    pub fn lines(&self) -> impl Iterator<Item = &str> {
        self.lines.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

/// Rolls for an ambient log line. At most one per [`AMBIENT_LOG_INTERVAL_MS`].
#[derive(Debug, Clone, Default)]
pub struct AmbientChatter {
    last_epoch_ms: i64,
}

impl AmbientChatter {
    pub fn roll<R: Rng + ?Sized>(&mut self, now_ms: i64, rng: &mut R) -> Option<LogEntry> {
        if now_ms - self.last_epoch_ms < AMBIENT_LOG_INTERVAL_MS {
            return None;
        }
        let chance: f64 = rng.gen();
        let entry = if chance < 0.2 {
            LogEntry::new("Signal noise detected. Auto-correcting...", Severity::None)
        } else if chance < 0.3 {
            LogEntry::new("Quantum checksum stable.", Severity::Info)
        } else {
            return None;
        };
        self.last_epoch_ms = now_ms;
        Some(entry)
    }
}
