//! Biased random-key genetic algorithm with multi-parent crossover and
//! implicit path relinking (BRKGA-MP-IPR).
//!
//! BRKGA separates the evolutionary engine from the problem by using a
//! random-key representation: chromosomes are vectors of `f64` in `[0, 1)`,
//! and a user-provided **decoder** maps keys to a fitness value. The engine
//! handles everything else generically:
//!
//! - **Multi-parent biased crossover**: offspring sample genes from several
//!   parents with rank-biased weighting, not just an elite/non-elite pair.
//! - **Multiple populations**: independent populations evolved side by side,
//!   periodically exchanging their top individuals around a ring.
//! - **Implicit path relinking**: intensification between elite chromosomes
//!   of different populations, direct or permutation-preserving.
//! - **Shake and reset**: perturbation and reinitialization to escape
//!   stagnation, with the best-known solution preserved throughout.
//! - **Composable stopping criteria**: iteration, time, and stall bounds, or
//!   any custom predicate over the per-generation [`AlgorithmStatus`].
//!
//! Decoding dominates wall-clock time, so all fitness evaluation runs on a
//! fixed-size worker pool; everything between decode barriers is
//! single-threaded, keeping runs reproducible for any thread count.
//!
//! # References
//!
//! - Bean (1994), "Genetic algorithms and random keys for sequencing and
//!   optimization"
//! - Goncalves & Resende (2011), "Biased random-key genetic algorithms for
//!   combinatorial optimization", *J. Heuristics* 17(5), 487–525
//! - Andrade, Toso, Goncalves & Resende (2021), "The multi-parent biased
//!   random-key genetic algorithm with implicit path-relinking and its
//!   real-world applications", *European J. Operational Research* 289(1)

pub mod config;
pub mod errors;
pub mod path_relink;
pub mod population;
pub mod runner;
pub mod status;
pub mod types;

pub use config::{BiasFunction, BrkgaParams, ControlParams, PathRelinkType};
pub use errors::{BrkgaError, DecodeError};
pub use path_relink::PathRelinkResult;
pub use population::Population;
pub use runner::BrkgaMpIpr;
pub use status::{stopping, AlgorithmStatus, StoppingCriteria};
pub use types::{Chromosome, Decoder, Individual, Sense};
