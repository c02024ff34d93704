//! Engine parameters and control parameters.
//!
//! [`BrkgaParams`] describes the evolutionary machinery — population shape,
//! crossover bias, and the intervals of exchange, shake, reset, and path
//! relinking. [`ControlParams`] bounds the run itself (wall-clock limit and
//! stall offset). Both are immutable for the lifetime of a run; every
//! invalid combination is rejected eagerly by [`BrkgaParams::validate`],
//! never silently clamped.

use crate::errors::BrkgaError;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Rank-biased weighting rule for multi-parent crossover.
///
/// For an offspring built from `total_parents` parents sorted best-first,
/// the parent of rank `r` (1-based) receives weight `w(r)`; each gene is
/// drawn from one parent by roulette over these weights. All shapes except
/// `Constant` are strictly decreasing in rank, so better-ranked parents are
/// strictly more likely to contribute.
///
/// A custom shape can be installed after construction with
/// [`BrkgaMpIpr::set_bias_custom_function`](crate::runner::BrkgaMpIpr::set_bias_custom_function).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BiasFunction {
    /// `w(r) = 1`: all sampled parents equally likely.
    Constant,
    /// `w(r) = 1 / r`.
    Linear,
    /// `w(r) = r^-2`.
    Quadratic,
    /// `w(r) = r^-3`.
    Cubic,
    /// `w(r) = e^-r`.
    Exponential,
    /// `w(r) = 1 / ln(r + 1)`.
    LogInverse,
}

impl BiasFunction {
    /// Weight for the parent of 1-based rank `rank`.
    pub fn weight(self, rank: usize) -> f64 {
        let r = rank as f64;
        match self {
            BiasFunction::Constant => 1.0,
            BiasFunction::Linear => 1.0 / r,
            BiasFunction::Quadratic => r.powi(-2),
            BiasFunction::Cubic => r.powi(-3),
            BiasFunction::Exponential => (-r).exp(),
            BiasFunction::LogInverse => 1.0 / (r + 1.0).ln(),
        }
    }
}

/// Path relinking scheme.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PathRelinkType {
    /// Coordinate-wise: each step adopts one differing gene from the guide.
    Direct,
    /// Permutation-preserving: each step swaps two keys of the base so that
    /// its induced permutation agrees with the guide's at one more position.
    Permutation,
}

/// Parameters of the BRKGA-MP-IPR engine.
///
/// # Parameters
///
/// The population fractions must satisfy
/// `elite_fraction + mutant_fraction < 1.0`; the remainder of each
/// population is filled by multi-parent crossover offspring. Intervals of 0
/// disable the corresponding feature.
///
/// # Examples
///
/// ```
/// use brkga_mp_ipr::BrkgaParams;
///
/// let params = BrkgaParams::default()
///     .with_population_size(200)
///     .with_num_independent_populations(3)
///     .with_elite_fraction(0.20)
///     .with_mutant_fraction(0.15)
///     .with_total_parents(3)
///     .with_num_elite_parents(2);
/// assert!(params.validate().is_ok());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BrkgaParams {
    /// Size of each population.
    pub population_size: usize,

    /// Number of independent populations evolved side by side.
    pub num_independent_populations: usize,

    /// Fraction of each population preserved as elite (0.10–0.30 typical).
    pub elite_fraction: f64,

    /// Fraction of each population replaced by random mutants each
    /// generation (0.10–0.30 typical).
    pub mutant_fraction: f64,

    /// Total parents sampled per crossover offspring (≥ 2).
    pub total_parents: usize,

    /// How many of the sampled parents come from the elite set
    /// (≥ 1, < `total_parents`).
    pub num_elite_parents: usize,

    /// Rank-biased weighting rule over the sampled parents.
    pub bias_function: BiasFunction,

    /// Generations between elite exchanges across populations (0 disables).
    pub exchange_interval: usize,

    /// Individuals migrated per population during an exchange.
    pub num_exchange_individuals: usize,

    /// Generations between shakes (0 disables).
    pub shake_interval: usize,

    /// Fraction of genes resampled in each non-elite individual by a shake.
    pub shake_intensity: f64,

    /// Generations between reset eligibility checks (0 disables).
    pub reset_interval: usize,

    /// Generations between path relinking attempts (0 disables).
    pub path_relink_interval: usize,

    /// Path relinking scheme.
    pub path_relink_type: PathRelinkType,

    /// Minimum relative improvement over the better endpoint for a relinked
    /// solution to be accepted (0.0 accepts any strict improvement).
    pub path_relink_min_improvement: f64,
}

impl Default for BrkgaParams {
    fn default() -> Self {
        Self {
            population_size: 100,
            num_independent_populations: 1,
            elite_fraction: 0.20,
            mutant_fraction: 0.15,
            total_parents: 2,
            num_elite_parents: 1,
            bias_function: BiasFunction::LogInverse,
            exchange_interval: 0,
            num_exchange_individuals: 2,
            shake_interval: 0,
            shake_intensity: 0.3,
            reset_interval: 0,
            path_relink_interval: 0,
            path_relink_type: PathRelinkType::Direct,
            path_relink_min_improvement: 0.0,
        }
    }
}

impl BrkgaParams {
    pub fn with_population_size(mut self, n: usize) -> Self {
        self.population_size = n;
        self
    }

    pub fn with_num_independent_populations(mut self, k: usize) -> Self {
        self.num_independent_populations = k;
        self
    }

    pub fn with_elite_fraction(mut self, f: f64) -> Self {
        self.elite_fraction = f;
        self
    }

    pub fn with_mutant_fraction(mut self, f: f64) -> Self {
        self.mutant_fraction = f;
        self
    }

    pub fn with_total_parents(mut self, n: usize) -> Self {
        self.total_parents = n;
        self
    }

    pub fn with_num_elite_parents(mut self, n: usize) -> Self {
        self.num_elite_parents = n;
        self
    }

    pub fn with_bias_function(mut self, bias: BiasFunction) -> Self {
        self.bias_function = bias;
        self
    }

    pub fn with_exchange(mut self, interval: usize, individuals: usize) -> Self {
        self.exchange_interval = interval;
        self.num_exchange_individuals = individuals;
        self
    }

    pub fn with_shake(mut self, interval: usize, intensity: f64) -> Self {
        self.shake_interval = interval;
        self.shake_intensity = intensity;
        self
    }

    pub fn with_reset_interval(mut self, interval: usize) -> Self {
        self.reset_interval = interval;
        self
    }

    pub fn with_path_relink(mut self, interval: usize, kind: PathRelinkType) -> Self {
        self.path_relink_interval = interval;
        self.path_relink_type = kind;
        self
    }

    pub fn with_path_relink_min_improvement(mut self, threshold: f64) -> Self {
        self.path_relink_min_improvement = threshold;
        self
    }

    /// Number of elite individuals per population: `⌈p · elite_fraction⌉`.
    pub fn num_elites(&self) -> usize {
        (self.population_size as f64 * self.elite_fraction).ceil() as usize
    }

    /// Number of mutants injected per generation: `⌈p · mutant_fraction⌉`.
    pub fn num_mutants(&self) -> usize {
        (self.population_size as f64 * self.mutant_fraction).ceil() as usize
    }

    /// Number of crossover offspring per generation.
    pub fn num_offspring(&self) -> usize {
        self.population_size - self.num_elites() - self.num_mutants()
    }

    /// Validates the parameter combination.
    ///
    /// Called by the engine at construction, before any decoding.
    pub fn validate(&self) -> Result<(), BrkgaError> {
        let err = |msg: String| Err(BrkgaError::Configuration(msg));

        if self.population_size < 3 {
            return err(format!(
                "population_size must be at least 3, got {}",
                self.population_size
            ));
        }
        if self.num_independent_populations == 0 {
            return err("num_independent_populations must be at least 1".into());
        }
        if !(self.elite_fraction > 0.0 && self.elite_fraction < 1.0) {
            return err(format!(
                "elite_fraction must lie in (0, 1), got {}",
                self.elite_fraction
            ));
        }
        if !(self.mutant_fraction > 0.0 && self.mutant_fraction < 1.0) {
            return err(format!(
                "mutant_fraction must lie in (0, 1), got {}",
                self.mutant_fraction
            ));
        }
        if self.elite_fraction + self.mutant_fraction >= 1.0 {
            return err(format!(
                "elite_fraction ({}) + mutant_fraction ({}) must be < 1.0",
                self.elite_fraction, self.mutant_fraction
            ));
        }
        let elites = self.num_elites();
        let mutants = self.num_mutants();
        if elites + mutants >= self.population_size {
            return err(format!(
                "elites ({elites}) + mutants ({mutants}) leave no room for \
                 crossover offspring in a population of {}",
                self.population_size
            ));
        }
        if self.total_parents < 2 {
            return err(format!(
                "total_parents must be at least 2, got {}",
                self.total_parents
            ));
        }
        if self.num_elite_parents == 0 || self.num_elite_parents >= self.total_parents {
            return err(format!(
                "num_elite_parents must lie in [1, total_parents), got {} of {}",
                self.num_elite_parents, self.total_parents
            ));
        }
        if self.num_elite_parents > elites {
            return err(format!(
                "num_elite_parents ({}) exceeds the elite set size ({elites})",
                self.num_elite_parents
            ));
        }
        if self.total_parents - self.num_elite_parents > self.population_size - elites {
            return err(format!(
                "total_parents - num_elite_parents ({}) exceeds the non-elite \
                 set size ({})",
                self.total_parents - self.num_elite_parents,
                self.population_size - elites
            ));
        }
        if self.exchange_interval > 0 {
            if self.num_exchange_individuals == 0 {
                return err("num_exchange_individuals must be at least 1".into());
            }
            if self.num_exchange_individuals > self.population_size - elites {
                return err(format!(
                    "num_exchange_individuals ({}) would displace elite \
                     individuals (non-elite set size is {})",
                    self.num_exchange_individuals,
                    self.population_size - elites
                ));
            }
        }
        if self.shake_interval > 0 && !(self.shake_intensity > 0.0 && self.shake_intensity <= 1.0)
        {
            return err(format!(
                "shake_intensity must lie in (0, 1], got {}",
                self.shake_intensity
            ));
        }
        if self.path_relink_min_improvement < 0.0 {
            return err(format!(
                "path_relink_min_improvement must be non-negative, got {}",
                self.path_relink_min_improvement
            ));
        }
        Ok(())
    }
}

/// Control parameters bounding a [`run`](crate::runner::BrkgaMpIpr::run).
///
/// Defaults disable both bounds, leaving termination entirely to the
/// stopping criterion — a criterion that never fires makes the run
/// non-terminating, which is a caller error.
#[derive(Debug, Clone, Default)]
pub struct ControlParams {
    /// Wall-clock limit for the whole run (`None` = unlimited).
    pub maximum_running_time: Option<Duration>,

    /// Generations without improvement before the run stops and before a
    /// stalled population becomes reset-eligible (0 = no stall stopping).
    pub stall_offset: usize,
}

impl ControlParams {
    pub fn with_maximum_running_time(mut self, limit: Duration) -> Self {
        self.maximum_running_time = Some(limit);
        self
    }

    pub fn with_stall_offset(mut self, generations: usize) -> Self {
        self.stall_offset = generations;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_params_valid() {
        assert!(BrkgaParams::default().validate().is_ok());
    }

    #[test]
    fn test_partition_counts_sum_to_population() {
        let params = BrkgaParams::default()
            .with_population_size(100)
            .with_elite_fraction(0.2)
            .with_mutant_fraction(0.1);
        assert_eq!(params.num_elites(), 20);
        assert_eq!(params.num_mutants(), 10);
        assert_eq!(params.num_offspring(), 70);
        assert_eq!(
            params.num_elites() + params.num_mutants() + params.num_offspring(),
            100
        );
    }

    #[test]
    fn test_validate_fractions_sum() {
        let params = BrkgaParams::default()
            .with_elite_fraction(0.6)
            .with_mutant_fraction(0.5);
        assert!(params.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_without_clamping() {
        // Out-of-range values are rejected, never silently adjusted.
        let params = BrkgaParams::default().with_elite_fraction(1.5);
        assert!((params.elite_fraction - 1.5).abs() < 1e-12);
        assert!(params.validate().is_err());
    }

    #[test]
    fn test_validate_parent_counts() {
        assert!(BrkgaParams::default()
            .with_total_parents(1)
            .validate()
            .is_err());
        assert!(BrkgaParams::default()
            .with_total_parents(4)
            .with_num_elite_parents(4)
            .validate()
            .is_err());
        assert!(BrkgaParams::default()
            .with_total_parents(4)
            .with_num_elite_parents(2)
            .validate()
            .is_ok());
    }

    #[test]
    fn test_validate_exchange_preserves_elites() {
        let params = BrkgaParams::default()
            .with_population_size(10)
            .with_elite_fraction(0.3)
            .with_mutant_fraction(0.2)
            .with_exchange(5, 8);
        assert!(params.validate().is_err());
    }

    #[test]
    fn test_bias_weights_decrease_with_rank() {
        for bias in [
            BiasFunction::Linear,
            BiasFunction::Quadratic,
            BiasFunction::Cubic,
            BiasFunction::Exponential,
            BiasFunction::LogInverse,
        ] {
            for r in 1..10 {
                assert!(
                    bias.weight(r) > bias.weight(r + 1),
                    "{bias:?} not decreasing at rank {r}"
                );
            }
        }
        assert_eq!(BiasFunction::Constant.weight(1), BiasFunction::Constant.weight(5));
    }

    #[test]
    fn test_params_yaml_round_trip() {
        let yaml = "
population_size: 50
num_independent_populations: 2
bias_function: quadratic
path_relink_type: permutation
";
        let params: BrkgaParams = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(params.population_size, 50);
        assert_eq!(params.num_independent_populations, 2);
        assert_eq!(params.bias_function, BiasFunction::Quadratic);
        assert_eq!(params.path_relink_type, PathRelinkType::Permutation);
        // omitted fields fall back to defaults
        assert_eq!(params.total_parents, 2);
    }
}
