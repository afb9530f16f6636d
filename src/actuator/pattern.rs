use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Parsed blink pattern: one delay per toggle
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct BlinkPattern {
    delays_ms: Vec<u64>,
}

impl BlinkPattern {
    /// Parse `d0:d1:...:dn`. Tokens never fail to parse: anything without a
    /// leading number counts as zero. An empty pattern has no steps.
    pub fn parse(pattern: &str) -> Self {
        if pattern.trim().is_empty() {
            return Self::default();
        }

        Self {
            delays_ms: pattern.split(':').map(parse_delay_ms).collect(),
        }
    }

    pub fn from_delays(delays_ms: Vec<u64>) -> Self {
        Self { delays_ms }
    }

    pub fn delays(&self) -> impl Iterator<Item = Duration> + '_ {
        self.delays_ms.iter().map(|ms| Duration::from_millis(*ms))
    }

    pub fn delays_ms(&self) -> &[u64] {
        &self.delays_ms
    }

    /// Number of toggles the pattern performs
    pub fn steps(&self) -> usize {
        self.delays_ms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.delays_ms.is_empty()
    }

    pub fn total_duration(&self) -> Duration {
        Duration::from_millis(self.delays_ms.iter().fold(0u64, |acc, ms| acc.saturating_add(*ms)))
    }

    /// Whether playing the pattern leaves the output in the opposite state
    pub fn flips_state(&self) -> bool {
        self.delays_ms.len() % 2 == 1
    }
}

impl fmt::Display for BlinkPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tokens: Vec<String> = self.delays_ms.iter().map(u64::to_string).collect();
        write!(f, "{}", tokens.join(":"))
    }
}

/// Lenient millisecond parse: skip leading whitespace, read an optional sign
/// and as many digits as follow. No digits or a negative number gives zero,
/// overflow saturates.
pub fn parse_delay_ms(token: &str) -> u64 {
    let token = token.trim_start();
    let (negative, digits) = match token.as_bytes().first() {
        Some(b'-') => (true, &token[1..]),
        Some(b'+') => (false, &token[1..]),
        _ => (false, token),
    };

    let value = digits
        .bytes()
        .take_while(u8::is_ascii_digit)
        .fold(0u64, |acc, digit| {
            acc.saturating_mul(10).saturating_add(u64::from(digit - b'0'))
        });

    if negative {
        0
    } else {
        value
    }
}
