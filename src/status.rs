//! Run-state snapshots and stopping criteria.

use crate::types::Chromosome;
use std::fmt;
use std::time::Duration;

/// Snapshot of a running algorithm, updated once per completed generation.
///
/// The control loop writes it at each generation barrier; the stopping
/// criterion and the optional observer only read it.
#[derive(Debug, Clone)]
pub struct AlgorithmStatus {
    /// Generations completed so far.
    pub current_iteration: usize,

    /// Wall-clock time since the run started.
    pub elapsed: Duration,

    /// Fitness of the best solution found across all populations and time.
    pub best_fitness: f64,

    /// Chromosome of the best solution found.
    pub best_chromosome: Chromosome,

    /// Consecutive generations without improvement to the best solution.
    pub stalled_iterations: usize,

    /// Generation at which the best solution last improved.
    pub last_update_iteration: usize,

    /// Elapsed time at the last improvement.
    pub last_update_time: Duration,

    /// Best fitness currently held by each population.
    pub population_best: Vec<f64>,

    /// Elite exchanges performed.
    pub num_exchanges: usize,

    /// Shakes performed.
    pub num_shakes: usize,

    /// Population resets performed.
    pub num_resets: usize,

    /// Path relinking attempts.
    pub num_path_relink_calls: usize,

    /// Path relinking attempts that produced an improving solution.
    pub num_path_relink_improvements: usize,
}

impl fmt::Display for AlgorithmStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "iteration {} | best {:.6} | last update at iteration {} ({:.2?}) | \
             stalled {} | elapsed {:.2?} | exchanges {} | shakes {} | resets {} | \
             relinks {}/{}",
            self.current_iteration,
            self.best_fitness,
            self.last_update_iteration,
            self.last_update_time,
            self.stalled_iterations,
            self.elapsed,
            self.num_exchanges,
            self.num_shakes,
            self.num_resets,
            self.num_path_relink_improvements,
            self.num_path_relink_calls,
        )
    }
}

/// A stopping criterion: consulted once per completed generation, the run
/// terminates the first time it returns `true`.
pub type StoppingCriteria = Box<dyn Fn(&AlgorithmStatus) -> bool + Send>;

/// Ready-made stopping criteria, composable with [`stopping::any`].
pub mod stopping {
    use super::{AlgorithmStatus, StoppingCriteria};
    use std::time::Duration;

    /// Stops once `n` generations have completed.
    pub fn max_iterations(n: usize) -> StoppingCriteria {
        Box::new(move |s: &AlgorithmStatus| s.current_iteration >= n)
    }

    /// Stops once the elapsed wall-clock time exceeds `limit`.
    pub fn max_time(limit: Duration) -> StoppingCriteria {
        Box::new(move |s: &AlgorithmStatus| s.elapsed >= limit)
    }

    /// Stops after `n` consecutive generations without improvement.
    pub fn stall_offset(n: usize) -> StoppingCriteria {
        Box::new(move |s: &AlgorithmStatus| s.stalled_iterations >= n)
    }

    /// Stops when any of the given criteria fires.
    pub fn any(criteria: Vec<StoppingCriteria>) -> StoppingCriteria {
        Box::new(move |s: &AlgorithmStatus| criteria.iter().any(|c| c(s)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status(iteration: usize, stalled: usize, elapsed: Duration) -> AlgorithmStatus {
        AlgorithmStatus {
            current_iteration: iteration,
            elapsed,
            best_fitness: 1.0,
            best_chromosome: vec![0.5],
            stalled_iterations: stalled,
            last_update_iteration: 0,
            last_update_time: Duration::ZERO,
            population_best: vec![1.0],
            num_exchanges: 0,
            num_shakes: 0,
            num_resets: 0,
            num_path_relink_calls: 0,
            num_path_relink_improvements: 0,
        }
    }

    #[test]
    fn test_max_iterations() {
        let stop = stopping::max_iterations(10);
        assert!(!stop(&status(9, 0, Duration::ZERO)));
        assert!(stop(&status(10, 0, Duration::ZERO)));
    }

    #[test]
    fn test_stall_offset() {
        let stop = stopping::stall_offset(5);
        assert!(!stop(&status(100, 4, Duration::ZERO)));
        assert!(stop(&status(100, 5, Duration::ZERO)));
    }

    #[test]
    fn test_any_composition() {
        let stop = stopping::any(vec![
            stopping::max_iterations(100),
            stopping::max_time(Duration::from_secs(1)),
        ]);
        assert!(!stop(&status(50, 0, Duration::from_millis(10))));
        assert!(stop(&status(100, 0, Duration::ZERO)));
        assert!(stop(&status(50, 0, Duration::from_secs(2))));
    }
}
