//! The multi-population BRKGA-MP-IPR engine and its control loop.
//!
//! [`BrkgaMpIpr`] owns `k` independent populations, one seeded random
//! stream per population, and a fixed-size rayon pool used only for decode
//! barriers. All random draws happen on the control thread, so a run is
//! reproducible for any thread count.

use crate::config::{BrkgaParams, ControlParams};
use crate::errors::{BrkgaError, DecodeError};
use crate::path_relink::PathRelinkResult;
use crate::population::Population;
use crate::status::{AlgorithmStatus, StoppingCriteria};
use crate::types::{Chromosome, Decoder, Individual, Sense};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;
use std::time::{Duration, Instant};

/// Mixes the population index into the master seed (golden-ratio constant),
/// giving each population its own independent stream.
const SEED_MIX: u64 = 0x9E37_79B9_7F4A_7C15;

/// The BRKGA-MP-IPR engine.
///
/// # Examples
///
/// ```ignore
/// let params = BrkgaParams::default().with_num_independent_populations(3);
/// let mut algorithm = BrkgaMpIpr::new(decoder, Sense::Minimize, seed, n, params, 4)?;
/// algorithm.set_stopping_criteria(stopping::max_iterations(1000));
/// let status = algorithm.run(&ControlParams::default())?;
/// println!("best cost: {}", status.best_fitness);
/// ```
pub struct BrkgaMpIpr<D: Decoder> {
    decoder: D,
    sense: Sense,
    chromosome_length: usize,
    params: BrkgaParams,
    bias_weights: Vec<f64>,
    pool: rayon::ThreadPool,
    rngs: Vec<ChaCha8Rng>,
    populations: Vec<Population>,
    best: Option<Individual>,
    stopping: Option<StoppingCriteria>,
}

impl<D: Decoder> BrkgaMpIpr<D> {
    /// Builds the engine. All configuration errors surface here, before any
    /// chromosome is decoded.
    pub fn new(
        decoder: D,
        sense: Sense,
        seed: u64,
        chromosome_length: usize,
        params: BrkgaParams,
        num_threads: usize,
    ) -> Result<Self, BrkgaError> {
        params.validate()?;
        if chromosome_length == 0 {
            return Err(BrkgaError::Configuration(
                "chromosome_length must be at least 1".into(),
            ));
        }
        if num_threads == 0 {
            return Err(BrkgaError::Configuration(
                "num_threads must be at least 1".into(),
            ));
        }
        let bias_weights: Vec<f64> = (1..=params.total_parents)
            .map(|rank| params.bias_function.weight(rank))
            .collect();
        validate_bias_weights(&bias_weights)?;

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(num_threads)
            .build()
            .map_err(|e| BrkgaError::Configuration(format!("failed to build worker pool: {e}")))?;

        let rngs = (0..params.num_independent_populations)
            .map(|i| ChaCha8Rng::seed_from_u64(seed ^ (i as u64).wrapping_mul(SEED_MIX)))
            .collect();

        Ok(Self {
            decoder,
            sense,
            chromosome_length,
            params,
            bias_weights,
            pool,
            rngs,
            populations: Vec::new(),
            best: None,
            stopping: None,
        })
    }

    /// Replaces the rank-bias weighting with a custom function over 1-based
    /// parent rank. Weights must be positive, finite, and non-increasing.
    pub fn set_bias_custom_function<F>(&mut self, bias: F) -> Result<(), BrkgaError>
    where
        F: Fn(usize) -> f64,
    {
        let weights: Vec<f64> = (1..=self.params.total_parents).map(bias).collect();
        validate_bias_weights(&weights)?;
        self.bias_weights = weights;
        Ok(())
    }

    /// Installs the stopping criterion consulted after every generation.
    pub fn set_stopping_criteria(&mut self, criteria: StoppingCriteria) {
        self.stopping = Some(criteria);
    }

    pub fn params(&self) -> &BrkgaParams {
        &self.params
    }

    pub fn sense(&self) -> Sense {
        self.sense
    }

    /// The population at `index`, if the engine is initialized.
    pub fn population(&self, index: usize) -> Option<&Population> {
        self.populations.get(index)
    }

    /// Fitness of the best solution found so far.
    pub fn best_fitness(&self) -> Option<f64> {
        self.best.as_ref().map(|b| b.fitness)
    }

    /// Chromosome of the best solution found so far.
    pub fn best_chromosome(&self) -> Option<&[f64]> {
        self.best.as_ref().map(|b| b.keys.as_slice())
    }

    /// Creates, decodes, and ranks all populations from their seeded
    /// streams. Identical seed, parameters, and decoder always produce
    /// identical initial populations.
    pub fn initialize(&mut self) -> Result<(), BrkgaError> {
        let k = self.params.num_independent_populations;
        let mut populations = Vec::with_capacity(k);
        for i in 0..k {
            let mut pop = Population::random(
                self.params.population_size,
                self.chromosome_length,
                self.sense,
                &mut self.rngs[i],
            );
            decode_members(&self.pool, &self.decoder, pop.members_mut())?;
            pop.sort();
            populations.push(pop);
        }
        self.populations = populations;
        self.update_best();
        Ok(())
    }

    /// Advances every population by one generation.
    pub fn evolve(&mut self) -> Result<(), BrkgaError> {
        self.ensure_initialized()?;
        let num_elites = self.params.num_elites();
        for i in 0..self.populations.len() {
            let mut next = self.populations[i].next_generation(
                &self.params,
                &self.bias_weights,
                &mut self.rngs[i],
            );
            decode_members(
                &self.pool,
                &self.decoder,
                &mut next.members_mut()[num_elites..],
            )?;
            next.sort();
            self.populations[i] = next;
        }
        self.update_best();
        Ok(())
    }

    /// Migrates the best individuals around the population ring: the worst
    /// `num_exchange_individuals` of population `i` are replaced by the best
    /// of population `(i + 1) mod k`. No-op with a single population.
    pub fn exchange_elite(&mut self) -> Result<(), BrkgaError> {
        self.ensure_initialized()?;
        let k = self.populations.len();
        if k < 2 {
            return Ok(());
        }
        let count = self.params.num_exchange_individuals;
        // snapshot all immigrants first so replacement order cannot leak
        // between populations
        let immigrants: Vec<Vec<Individual>> = (0..k)
            .map(|i| self.populations[(i + 1) % k].members()[..count].to_vec())
            .collect();
        for (i, incoming) in immigrants.into_iter().enumerate() {
            let pop = &mut self.populations[i];
            let size = pop.len();
            let members = pop.members_mut();
            for (slot, ind) in incoming.into_iter().enumerate() {
                members[size - count + slot] = ind;
            }
            pop.sort();
        }
        self.update_best();
        Ok(())
    }

    /// Perturbs the non-elite individuals of every population to escape
    /// stagnation. Elites are untouched.
    pub fn shake(&mut self) -> Result<(), BrkgaError> {
        self.ensure_initialized()?;
        let num_elites = self.params.num_elites();
        let intensity = self.params.shake_intensity;
        for i in 0..self.populations.len() {
            self.populations[i].shake(num_elites, intensity, &mut self.rngs[i]);
            decode_members(
                &self.pool,
                &self.decoder,
                &mut self.populations[i].members_mut()[num_elites..],
            )?;
            self.populations[i].sort();
        }
        self.update_best();
        Ok(())
    }

    /// Fully reinitializes every population. The best-known solution is
    /// owned by the engine and survives the reset.
    pub fn reset(&mut self) -> Result<(), BrkgaError> {
        self.ensure_initialized()?;
        for i in 0..self.populations.len() {
            let mut pop = Population::random(
                self.params.population_size,
                self.chromosome_length,
                self.sense,
                &mut self.rngs[i],
            );
            decode_members(&self.pool, &self.decoder, pop.members_mut())?;
            pop.sort();
            self.populations[i] = pop;
        }
        self.update_best();
        Ok(())
    }

    /// Runs path relinking for every population: population `i`'s best is
    /// the base, the guide is population `(i + 1) mod k`'s best (or the
    /// historical best when there is only one population). An improving
    /// intermediate displaces population `i`'s worst individual. Returns
    /// whether any injection happened.
    pub fn path_relink(&mut self) -> Result<bool, BrkgaError> {
        self.ensure_initialized()?;
        let k = self.populations.len();
        let mut improved = false;
        for i in 0..k {
            let base = self.populations[i].best().clone();
            let guide = if k > 1 {
                self.populations[(i + 1) % k].best().clone()
            } else {
                match &self.best {
                    Some(b) => b.clone(),
                    None => continue,
                }
            };
            if base.keys == guide.keys {
                continue;
            }
            let result = crate::path_relink::path_relink(
                &self.decoder,
                &self.pool,
                self.sense,
                self.params.path_relink_type,
                &base,
                &guide,
                self.params.path_relink_min_improvement,
            )?;
            if let PathRelinkResult::Improvement(ind) = result {
                if self.populations[i].try_inject(ind) {
                    improved = true;
                }
            }
        }
        self.update_best();
        Ok(improved)
    }

    /// Runs the full control loop until the stopping criterion (or a bound
    /// of `control`) fires, returning the final status.
    ///
    /// A stopping criterion that never returns `true` together with
    /// unbounded control parameters makes this non-terminating; that is a
    /// caller error.
    pub fn run(&mut self, control: &ControlParams) -> Result<AlgorithmStatus, BrkgaError> {
        self.run_with_observer(control, |_status| {})
    }

    /// Like [`run`](Self::run), invoking `observer` with the status snapshot
    /// after every completed generation.
    pub fn run_with_observer<F>(
        &mut self,
        control: &ControlParams,
        mut observer: F,
    ) -> Result<AlgorithmStatus, BrkgaError>
    where
        F: FnMut(&AlgorithmStatus),
    {
        if self.populations.is_empty() {
            self.initialize()?;
        }
        let start = Instant::now();
        let (best_fitness, best_chromosome) = self.best_entry();
        let mut status = AlgorithmStatus {
            current_iteration: 0,
            elapsed: Duration::ZERO,
            best_fitness,
            best_chromosome,
            stalled_iterations: 0,
            last_update_iteration: 0,
            last_update_time: Duration::ZERO,
            population_best: self.population_best(),
            num_exchanges: 0,
            num_shakes: 0,
            num_resets: 0,
            num_path_relink_calls: 0,
            num_path_relink_improvements: 0,
        };

        loop {
            let iteration = status.current_iteration + 1;

            self.evolve()?;

            if interval_hit(self.params.exchange_interval, iteration) {
                self.exchange_elite()?;
                status.num_exchanges += 1;
                tracing::debug!(iteration, "exchanged elite individuals");
            }
            if interval_hit(self.params.shake_interval, iteration) {
                self.shake()?;
                status.num_shakes += 1;
                tracing::debug!(iteration, "shook non-elite individuals");
            }
            if interval_hit(self.params.reset_interval, iteration)
                && self.reset_eligible(&status, control)
            {
                self.reset()?;
                status.num_resets += 1;
                tracing::debug!(iteration, "reset stalled populations");
            }
            if interval_hit(self.params.path_relink_interval, iteration) {
                let injected = self.path_relink()?;
                status.num_path_relink_calls += 1;
                if injected {
                    status.num_path_relink_improvements += 1;
                }
            }

            // generation barrier: everything below runs single-threaded
            let (best_fitness, best_chromosome) = self.best_entry();
            let improved = self.sense.better(best_fitness, status.best_fitness);
            status.current_iteration = iteration;
            status.elapsed = start.elapsed();
            status.best_fitness = best_fitness;
            status.best_chromosome = best_chromosome;
            status.population_best = self.population_best();
            if improved {
                status.stalled_iterations = 0;
                status.last_update_iteration = iteration;
                status.last_update_time = status.elapsed;
                tracing::info!(iteration, best = best_fitness, "improved best solution");
            } else {
                status.stalled_iterations += 1;
            }

            observer(&status);

            let stop = self.stopping.as_ref().is_some_and(|c| c(&status))
                || control
                    .maximum_running_time
                    .is_some_and(|limit| status.elapsed >= limit)
                || (control.stall_offset > 0
                    && status.stalled_iterations >= control.stall_offset);
            if stop {
                tracing::info!(%status, "terminated");
                return Ok(status);
            }
        }
    }

    /// A reset requires an actual stall, raised to `stall_offset`
    /// generations when that bound is set.
    fn reset_eligible(&self, status: &AlgorithmStatus, control: &ControlParams) -> bool {
        let improved_this_iteration = self
            .best_fitness()
            .is_some_and(|f| self.sense.better(f, status.best_fitness));
        !improved_this_iteration
            && status.stalled_iterations + 1 >= control.stall_offset.max(1)
    }

    fn ensure_initialized(&self) -> Result<(), BrkgaError> {
        if self.populations.is_empty() {
            return Err(BrkgaError::Configuration(
                "the algorithm has not been initialized; call initialize() first".into(),
            ));
        }
        Ok(())
    }

    /// Monotonic best-known update: scans population bests, never regresses.
    fn update_best(&mut self) {
        for i in 0..self.populations.len() {
            let candidate = self.populations[i].best();
            let replace = match &self.best {
                Some(current) => self.sense.better(candidate.fitness, current.fitness),
                None => true,
            };
            if replace {
                self.best = Some(candidate.clone());
            }
        }
    }

    fn best_entry(&self) -> (f64, Chromosome) {
        match &self.best {
            Some(b) => (b.fitness, b.keys.clone()),
            None => (self.sense.worst(), Vec::new()),
        }
    }

    fn population_best(&self) -> Vec<f64> {
        self.populations.iter().map(|p| p.best().fitness).collect()
    }
}

fn interval_hit(interval: usize, iteration: usize) -> bool {
    interval > 0 && iteration % interval == 0
}

fn validate_bias_weights(weights: &[f64]) -> Result<(), BrkgaError> {
    if weights.iter().any(|w| !w.is_finite() || *w <= 0.0) {
        return Err(BrkgaError::Configuration(
            "bias weights must be positive and finite".into(),
        ));
    }
    if weights.windows(2).any(|pair| pair[1] > pair[0]) {
        return Err(BrkgaError::Configuration(
            "bias weights must be non-increasing over parent rank".into(),
        ));
    }
    Ok(())
}

/// Decode barrier: evaluates every member on the worker pool. The control
/// loop never proceeds until all decodes issued here have completed.
fn decode_members<D: Decoder>(
    pool: &rayon::ThreadPool,
    decoder: &D,
    members: &mut [Individual],
) -> Result<(), DecodeError> {
    pool.install(|| {
        members.par_iter_mut().try_for_each(|ind| {
            ind.fitness = decoder.decode(&ind.keys)?;
            Ok(())
        })
    })
}
