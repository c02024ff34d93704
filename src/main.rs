//! brkga-tsp: runs BRKGA-MP-IPR on a travelling-salesman instance for a
//! fixed number of iterations.
//!
//! The driver is deliberately thin: argument parsing, instance and config
//! loading, and error reporting. All search logic lives in the library.

use anyhow::{bail, Context, Result};
use brkga_mp_ipr::{
    AlgorithmStatus, BrkgaMpIpr, BrkgaParams, ControlParams, DecodeError, Decoder, Sense,
};
use clap::Parser;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "brkga-tsp")]
#[command(about = "BRKGA-MP-IPR over a TSP instance, for a fixed number of iterations")]
struct Args {
    /// Master random seed
    seed: u64,

    /// YAML file with the BRKGA parameters
    config_file: PathBuf,

    /// Number of generations to run
    maximum_number_of_iterations: usize,

    /// TSP instance file
    instance_file: PathBuf,

    /// Number of decoding threads
    #[arg(short, long, default_value_t = 4)]
    threads: usize,
}

/// Symmetric TSP instance: node count followed by the strict upper triangle
/// of the distance matrix, whitespace separated.
struct TspInstance {
    num_nodes: usize,
    distances: Vec<f64>,
}

impl TspInstance {
    fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("cannot read instance file {}", path.display()))?;
        Self::parse(&content)
    }

    fn parse(content: &str) -> Result<Self> {
        let mut tokens = content.split_whitespace();
        let num_nodes: usize = tokens
            .next()
            .context("instance file is empty")?
            .parse()
            .context("invalid node count")?;
        if num_nodes < 2 {
            bail!("instance must have at least 2 nodes, got {num_nodes}");
        }
        let mut distances = vec![0.0; num_nodes * num_nodes];
        for i in 0..num_nodes {
            for j in (i + 1)..num_nodes {
                let distance: f64 = tokens
                    .next()
                    .with_context(|| format!("missing distance ({i}, {j})"))?
                    .parse()
                    .with_context(|| format!("invalid distance ({i}, {j})"))?;
                distances[i * num_nodes + j] = distance;
                distances[j * num_nodes + i] = distance;
            }
        }
        Ok(Self {
            num_nodes,
            distances,
        })
    }

    fn distance(&self, i: usize, j: usize) -> f64 {
        self.distances[i * self.num_nodes + j]
    }
}

/// Decodes a chromosome as a tour: nodes visited in ascending key order.
struct TspDecoder {
    instance: TspInstance,
}

impl Decoder for TspDecoder {
    fn decode(&self, keys: &[f64]) -> Result<f64, DecodeError> {
        let n = self.instance.num_nodes;
        if keys.len() != n {
            return Err(DecodeError::new(format!(
                "expected a chromosome of {n} keys, got {}",
                keys.len()
            )));
        }
        let mut tour: Vec<usize> = (0..n).collect();
        tour.sort_by(|&a, &b| {
            keys[a]
                .partial_cmp(&keys[b])
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        let mut cost = self.instance.distance(tour[n - 1], tour[0]);
        for pair in tour.windows(2) {
            cost += self.instance.distance(pair[0], pair[1]);
        }
        Ok(cost)
    }
}

fn main() -> Result<()> {
    let args = match Args::try_parse() {
        Ok(args) => args,
        Err(err) => {
            // usage problems exit with code 1, like any other failure
            eprintln!("{err}");
            std::process::exit(1);
        }
    };
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::WARN)
        .init();

    println!("Reading data...");
    let instance = TspInstance::from_file(&args.instance_file)?;
    let num_nodes = instance.num_nodes;

    println!("Reading parameters...");
    let raw = fs::read_to_string(&args.config_file)
        .with_context(|| format!("cannot read config file {}", args.config_file.display()))?;
    let params: BrkgaParams = serde_yaml::from_str(&raw)
        .with_context(|| format!("invalid config file {}", args.config_file.display()))?;

    // Time and stall termination stay disabled; the exact-iteration
    // criterion below is the only stop.
    let control = ControlParams::default();

    println!("Building BRKGA data and initializing...");
    let decoder = TspDecoder { instance };
    let mut algorithm = BrkgaMpIpr::new(
        decoder,
        Sense::Minimize,
        args.seed,
        num_nodes,
        params,
        args.threads,
    )?;
    let max_iterations = args.maximum_number_of_iterations;
    algorithm.set_stopping_criteria(Box::new(move |status: &AlgorithmStatus| {
        status.current_iteration == max_iterations
    }));

    println!("Running for {max_iterations} iterations...");
    let mut last_best = f64::INFINITY;
    let status = algorithm.run_with_observer(&control, |status| {
        if status.best_fitness < last_best {
            last_best = status.best_fitness;
            println!(
                "* {} | {:.2} | {:.2?}",
                status.current_iteration, status.best_fitness, status.elapsed
            );
        }
    })?;

    println!("\nAlgorithm status: {status}");
    println!("\nBest cost: {}", status.best_fitness);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    // 4 nodes on a unit square: optimal tour cost 4.
    const SQUARE: &str = "4  1 1.4142 1  1 1.4142  1";

    #[test]
    fn test_parse_upper_triangular_instance() {
        let instance = TspInstance::parse(SQUARE).unwrap();
        assert_eq!(instance.num_nodes, 4);
        assert_eq!(instance.distance(0, 1), 1.0);
        assert_eq!(instance.distance(1, 0), 1.0);
        assert_eq!(instance.distance(0, 2), 1.4142);
        assert_eq!(instance.distance(2, 3), 1.0);
        assert_eq!(instance.distance(1, 1), 0.0);
    }

    #[test]
    fn test_parse_rejects_truncated_instance() {
        assert!(TspInstance::parse("4 1 2").is_err());
        assert!(TspInstance::parse("").is_err());
        assert!(TspInstance::parse("1").is_err());
    }

    #[test]
    fn test_decoder_tour_cost() {
        let decoder = TspDecoder {
            instance: TspInstance::parse(SQUARE).unwrap(),
        };
        // keys inducing the tour 0 -> 1 -> 2 -> 3: all unit edges
        let cost = decoder.decode(&[0.1, 0.2, 0.3, 0.4]).unwrap();
        assert!((cost - 4.0).abs() < 1e-9);
        // tour 0 -> 2 -> 1 -> 3 crosses both diagonals
        let cost = decoder.decode(&[0.1, 0.3, 0.2, 0.4]).unwrap();
        assert!((cost - (2.0 + 2.0 * 1.4142)).abs() < 1e-9);
    }

    #[test]
    fn test_decoder_rejects_wrong_length() {
        let decoder = TspDecoder {
            instance: TspInstance::parse(SQUARE).unwrap(),
        };
        assert!(decoder.decode(&[0.1, 0.2]).is_err());
    }
}
