//! Core types: random-key chromosomes, optimization sense, and the decoder
//! capability that links the generic engine to a concrete problem.

use crate::errors::DecodeError;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// A random-key chromosome: a fixed-length vector of values in `[0, 1)`.
///
/// The engine never inspects chromosome semantics beyond length and value
/// range; all problem meaning lives in the [`Decoder`].
pub type Chromosome = Vec<f64>;

/// Whether smaller or larger fitness values are better.
///
/// Every comparison in the engine routes through this, so the same code
/// serves minimization and maximization problems.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Sense {
    Minimize,
    Maximize,
}

impl Sense {
    /// Returns `true` if fitness `a` is strictly better than `b`.
    pub fn better(self, a: f64, b: f64) -> bool {
        match self {
            Sense::Minimize => a < b,
            Sense::Maximize => a > b,
        }
    }

    /// The worst representable fitness, used for not-yet-decoded individuals.
    pub fn worst(self) -> f64 {
        match self {
            Sense::Minimize => f64::INFINITY,
            Sense::Maximize => f64::NEG_INFINITY,
        }
    }

    /// Ordering that places better fitness first.
    pub fn compare(self, a: f64, b: f64) -> Ordering {
        let ord = match self {
            Sense::Minimize => a.partial_cmp(&b),
            Sense::Maximize => b.partial_cmp(&a),
        };
        ord.unwrap_or(Ordering::Equal)
    }
}

/// Decoder capability: maps a chromosome to a fitness value.
///
/// This is the **only** trait a user must implement. The implementation must
/// be pure and deterministic — same keys, same fitness — and reentrant, since
/// the engine decodes independent chromosomes concurrently from a worker
/// pool. A decoder that rejects its input (e.g. wrong chromosome length)
/// returns a [`DecodeError`], which aborts the run rather than corrupting a
/// population.
///
/// # Examples
///
/// ```ignore
/// struct KnapsackDecoder { weights: Vec<f64>, values: Vec<f64>, capacity: f64 }
///
/// impl Decoder for KnapsackDecoder {
///     fn decode(&self, keys: &[f64]) -> Result<f64, DecodeError> {
///         // keys[i] > 0.5 means include item i
///         let (w, v) = keys.iter().enumerate()
///             .filter(|(_, &k)| k > 0.5)
///             .fold((0.0, 0.0), |(w, v), (i, _)| (w + self.weights[i], v + self.values[i]));
///         Ok(if w > self.capacity { f64::INFINITY } else { -v })
///     }
/// }
/// ```
///
/// # References
///
/// - Bean (1994), "Genetic algorithms and random keys for sequencing and
///   optimization"
/// - Andrade, Toso, Goncalves & Resende (2021), "The multi-parent biased
///   random-key genetic algorithm with implicit path-relinking",
///   *European J. Operational Research* 289(1), 17–30
pub trait Decoder: Send + Sync {
    /// Decodes a random-key chromosome and returns its fitness.
    ///
    /// `keys` has exactly the chromosome length the engine was built with;
    /// all values lie in `[0.0, 1.0)`.
    fn decode(&self, keys: &[f64]) -> Result<f64, DecodeError>;
}

/// A chromosome together with its cached fitness.
///
/// Fitness is written exactly once, at a decode barrier; once known it is
/// never recomputed. Elite individuals carry both fields unchanged into the
/// next generation.
#[derive(Debug, Clone)]
pub struct Individual {
    /// The random keys.
    pub keys: Chromosome,
    /// Cached fitness; `sense.worst()` until decoded.
    pub fitness: f64,
}

impl Individual {
    /// Creates a not-yet-decoded individual.
    pub(crate) fn undecoded(keys: Chromosome, sense: Sense) -> Self {
        Self {
            keys,
            fitness: sense.worst(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sense_better() {
        assert!(Sense::Minimize.better(1.0, 2.0));
        assert!(!Sense::Minimize.better(2.0, 1.0));
        assert!(!Sense::Minimize.better(1.0, 1.0));
        assert!(Sense::Maximize.better(2.0, 1.0));
        assert!(!Sense::Maximize.better(1.0, 2.0));
    }

    #[test]
    fn test_sense_worst() {
        assert_eq!(Sense::Minimize.worst(), f64::INFINITY);
        assert_eq!(Sense::Maximize.worst(), f64::NEG_INFINITY);
    }

    #[test]
    fn test_compare_orders_better_first() {
        let mut v = vec![3.0, 1.0, 2.0];
        v.sort_by(|a, b| Sense::Minimize.compare(*a, *b));
        assert_eq!(v, vec![1.0, 2.0, 3.0]);
        v.sort_by(|a, b| Sense::Maximize.compare(*a, *b));
        assert_eq!(v, vec![3.0, 2.0, 1.0]);
    }
}
