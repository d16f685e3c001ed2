//! Hit counter and phrase reveal
//!
//! Qualifying collisions advance a counter that is clamped to the phrase
//! length (in characters). The revealed text is the matching prefix.

use serde::{Deserialize, Serialize};

use super::collision::CollisionEvent;
use crate::config::{ProgressConfig, ProgressSource};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProgressTracker {
    phrase: String,
    /// Phrase length in characters
    phrase_len: usize,
    hit_count: usize,
    step: usize,
    threshold: usize,
    /// Paddle hits count (otherwise wall bounces do)
    paddle_hits: bool,
}

impl ProgressTracker {
    pub fn new(config: &ProgressConfig, has_paddle: bool) -> Self {
        Self {
            phrase_len: config.phrase.chars().count(),
            phrase: config.phrase.clone(),
            hit_count: 0,
            step: config.step,
            threshold: config.threshold,
            paddle_hits: config.source.resolve(has_paddle) == ProgressSource::Paddle,
        }
    }

    /// Whether this collision advances progress under the configured source
    pub fn qualifies(&self, event: CollisionEvent) -> bool {
        if self.paddle_hits {
            event == CollisionEvent::Paddle
        } else {
            event.is_wall()
        }
    }

    /// Feed one collision event; returns true if it qualified
    pub fn on_collision(&mut self, event: CollisionEvent) -> bool {
        if !self.qualifies(event) {
            return false;
        }
        self.hit_count = (self.hit_count + self.step).min(self.phrase_len);
        log::debug!("{event:?} qualified, hit count {}", self.hit_count);
        true
    }

    pub fn hit_count(&self) -> usize {
        self.hit_count
    }

    /// Number of phrase characters currently shown
    pub fn revealed_len(&self) -> usize {
        self.hit_count.min(self.phrase_len)
    }

    pub fn revealed_prefix(&self) -> &str {
        match self.phrase.char_indices().nth(self.revealed_len()) {
            Some((end, _)) => &self.phrase[..end],
            None => &self.phrase,
        }
    }

    /// Latches true once the counter passes the threshold (the counter never decreases)
    pub fn should_converge(&self) -> bool {
        self.hit_count > self.threshold
    }

    pub fn phrase_len(&self) -> usize {
        self.phrase_len
    }
}
