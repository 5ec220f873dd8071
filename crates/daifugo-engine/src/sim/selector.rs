//! Softmax-family move selection over policy scores.

use rand::Rng;

use crate::config::{SearchConfig, SelectorKind};

/// Turns raw policy scores into a sampled index.
#[derive(Debug, Clone, Copy)]
pub struct Selector {
    kind: SelectorKind,
    temperature: f64,
    threshold: f64,
}

impl Selector {
    pub fn from_config(cfg: &SearchConfig) -> Selector {
        Selector {
            kind: cfg.selector,
            temperature: cfg.playout_temperature.max(1e-3),
            threshold: cfg.selector_threshold,
        }
    }

    pub fn new(kind: SelectorKind, temperature: f64, threshold: f64) -> Selector {
        Selector {
            kind,
            temperature: temperature.max(1e-3),
            threshold,
        }
    }

    /// Softmax probabilities for `scores`, after the kind's reshaping.
    pub fn probabilities(&self, scores: &[f64]) -> Vec<f64> {
        let top = scores.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let mut probs: Vec<f64> = scores
            .iter()
            .map(|s| ((s - top) / self.temperature).exp())
            .collect();
        if let SelectorKind::ExpBiased = self.kind {
            for p in probs.iter_mut() {
                *p *= *p;
            }
        }
        let mut total: f64 = probs.iter().sum();
        if let SelectorKind::ThresholdSoftmax = self.kind {
            // drop the long tail so playouts stay plausible
            let floor = self.threshold * total;
            let kept: f64 = probs.iter().filter(|p| **p >= floor).sum();
            if kept > 0.0 {
                for p in probs.iter_mut() {
                    if *p < floor {
                        *p = 0.0;
                    }
                }
                total = kept;
            }
        }
        for p in probs.iter_mut() {
            *p /= total;
        }
        probs
    }

    pub fn pick<R: Rng + ?Sized>(&self, scores: &[f64], rng: &mut R) -> usize {
        debug_assert!(!scores.is_empty());
        if scores.len() == 1 {
            return 0;
        }
        let probs = self.probabilities(scores);
        let mut choice = rng.gen_range(0.0..1.0f64);
        for (i, p) in probs.iter().enumerate() {
            if choice < *p {
                return i;
            }
            choice -= p;
        }
        probs.len() - 1
    }
}
