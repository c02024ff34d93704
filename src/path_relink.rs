//! Implicit path relinking between two elite chromosomes.
//!
//! Given a decoded base B and guide G, the module walks a path of
//! intermediate solutions from B toward G and returns the best intermediate
//! that is strictly better than both endpoints, or reports no improvement.
//! The walk is fully determined before any decoding, so the intermediates
//! form one embarrassingly parallel decode batch.

use crate::config::PathRelinkType;
use crate::errors::DecodeError;
use crate::types::{Chromosome, Decoder, Individual, Sense};
use rayon::prelude::*;

/// Keys closer than this are treated as equal when computing the path.
const KEY_EPS: f64 = 1e-10;

/// Outcome of a path relinking attempt.
#[derive(Debug, Clone)]
pub enum PathRelinkResult {
    /// An intermediate strictly better than both endpoints (and clearing the
    /// configured minimum improvement).
    Improvement(Individual),
    /// No qualifying intermediate on the path.
    NoImprovement,
}

/// Walks the path from `base` to `guide` and evaluates every intermediate.
///
/// Both endpoints must already be decoded. `min_improvement` is the required
/// relative gain over the better endpoint; `0.0` accepts any strict
/// improvement. Decode failures propagate unmodified.
pub fn path_relink<D: Decoder>(
    decoder: &D,
    pool: &rayon::ThreadPool,
    sense: Sense,
    kind: PathRelinkType,
    base: &Individual,
    guide: &Individual,
    min_improvement: f64,
) -> Result<PathRelinkResult, DecodeError> {
    let mut intermediates = match kind {
        PathRelinkType::Direct => direct_path(&base.keys, &guide.keys),
        PathRelinkType::Permutation => permutation_path(&base.keys, &guide.keys),
    };
    if intermediates.is_empty() {
        return Ok(PathRelinkResult::NoImprovement);
    }

    let fitnesses: Vec<f64> = pool.install(|| {
        intermediates
            .par_iter()
            .map(|keys| decoder.decode(keys))
            .collect::<Result<Vec<_>, _>>()
    })?;

    let mut best: Option<(usize, f64)> = None;
    for (idx, &fitness) in fitnesses.iter().enumerate() {
        if sense.better(fitness, base.fitness)
            && sense.better(fitness, guide.fitness)
            && best.map_or(true, |(_, f)| sense.better(fitness, f))
        {
            best = Some((idx, fitness));
        }
    }

    if let Some((idx, fitness)) = best {
        let best_endpoint = if sense.better(base.fitness, guide.fitness) {
            base.fitness
        } else {
            guide.fitness
        };
        let gain = (fitness - best_endpoint).abs() / best_endpoint.abs().max(KEY_EPS);
        if gain >= min_improvement {
            tracing::debug!(fitness, gain, "path relinking found an improvement");
            return Ok(PathRelinkResult::Improvement(Individual {
                keys: intermediates.swap_remove(idx),
                fitness,
            }));
        }
    }
    Ok(PathRelinkResult::NoImprovement)
}

/// Coordinate-wise walk: each step adopts one more differing gene from the
/// guide, in gene order. The endpoints themselves are not part of the path.
fn direct_path(base: &[f64], guide: &[f64]) -> Vec<Chromosome> {
    let diffs: Vec<usize> = base
        .iter()
        .zip(guide)
        .enumerate()
        .filter(|(_, (b, g))| (*b - *g).abs() > KEY_EPS)
        .map(|(j, _)| j)
        .collect();
    if diffs.len() < 2 {
        return Vec::new();
    }

    let mut current = base.to_vec();
    let mut path = Vec::with_capacity(diffs.len() - 1);
    // the last adoption would reproduce the guide itself
    for &j in &diffs[..diffs.len() - 1] {
        current[j] = guide[j];
        path.push(current.clone());
    }
    path
}

/// Permutation-preserving walk for rank-sensitive decoders: each step swaps
/// two keys of the base so that its induced permutation agrees with the
/// guide's at one more position.
fn permutation_path(base: &[f64], guide: &[f64]) -> Vec<Chromosome> {
    let n = base.len();
    let perm_g = argsort(guide);
    let mut perm_b = argsort(base);
    let mut pos_in_b = vec![0usize; n];
    for (pos, &gene) in perm_b.iter().enumerate() {
        pos_in_b[gene] = pos;
    }

    let mut current = base.to_vec();
    let mut path = Vec::new();
    for i in 0..n {
        if perm_b[i] == perm_g[i] {
            continue;
        }
        let want = perm_g[i];
        let held = perm_b[i];
        let j = pos_in_b[want];
        // swapping the two key values swaps the two genes' ranks
        current.swap(held, want);
        perm_b.swap(i, j);
        pos_in_b[held] = j;
        pos_in_b[want] = i;
        path.push(current.clone());
    }
    // the final state induces the guide's permutation, so it is an endpoint
    path.pop();
    path
}

/// Indices of `keys` ordered by ascending value, ties by index.
fn argsort(keys: &[f64]) -> Vec<usize> {
    let mut order: Vec<usize> = (0..keys.len()).collect();
    order.sort_by(|&a, &b| {
        keys[a]
            .partial_cmp(&keys[b])
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    order
}
