//! Ranked populations and the generation transition.
//!
//! A [`Population`] is a fixed-size vector of individuals kept sorted
//! best-to-worst under the configured [`Sense`]. The generation transition
//! partitions it by rank into elites (copied unchanged), mutants (fresh
//! random chromosomes), and multi-parent biased crossover offspring.

use crate::config::BrkgaParams;
use crate::types::{Individual, Sense};
use rand::seq::index;
use rand::Rng;

/// An ordered collection of individuals ranked by decoded fitness.
#[derive(Debug, Clone)]
pub struct Population {
    members: Vec<Individual>,
    sense: Sense,
}

impl Population {
    /// Creates an undecoded population of uniformly random chromosomes.
    pub(crate) fn random<R: Rng>(
        size: usize,
        chromosome_length: usize,
        sense: Sense,
        rng: &mut R,
    ) -> Self {
        let members = (0..size)
            .map(|_| {
                let keys = (0..chromosome_length)
                    .map(|_| rng.random_range(0.0..1.0))
                    .collect();
                Individual::undecoded(keys, sense)
            })
            .collect();
        Self { members, sense }
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// The members, best first once sorted.
    pub fn members(&self) -> &[Individual] {
        &self.members
    }

    pub(crate) fn members_mut(&mut self) -> &mut [Individual] {
        &mut self.members
    }

    /// The best-ranked individual.
    pub fn best(&self) -> &Individual {
        &self.members[0]
    }

    pub fn sense(&self) -> Sense {
        self.sense
    }

    /// Stable sort by fitness, best first. Ties keep insertion order.
    pub(crate) fn sort(&mut self) {
        let sense = self.sense;
        self.members.sort_by(|a, b| sense.compare(a.fitness, b.fitness));
    }

    /// Builds the next generation from this (sorted) population.
    ///
    /// Layout of the result: `[elites][mutants][offspring]`. Elites carry
    /// their chromosomes and cached fitness unchanged; mutants and offspring
    /// are returned undecoded and must pass a decode barrier before the
    /// result is sorted. The three partition sizes always sum to the
    /// population size.
    pub(crate) fn next_generation<R: Rng>(
        &self,
        params: &BrkgaParams,
        bias_weights: &[f64],
        rng: &mut R,
    ) -> Population {
        let p = self.members.len();
        let n = self.members[0].keys.len();
        let num_elites = params.num_elites();
        let num_mutants = params.num_mutants();
        let num_offspring = p - num_elites - num_mutants;
        let num_nonelite_parents = params.total_parents - params.num_elite_parents;
        let total_weight: f64 = bias_weights.iter().sum();

        let mut next = Vec::with_capacity(p);
        next.extend_from_slice(&self.members[..num_elites]);

        for _ in 0..num_mutants {
            let keys = (0..n).map(|_| rng.random_range(0.0..1.0)).collect();
            next.push(Individual::undecoded(keys, self.sense));
        }

        for _ in 0..num_offspring {
            // Distinct parents: some from the elite block, the rest from the
            // non-elite block, then ranked best-first for the bias roulette.
            let elite_picks = index::sample(rng, num_elites, params.num_elite_parents);
            let other_picks = index::sample(rng, p - num_elites, num_nonelite_parents);
            let mut parents: Vec<&Individual> = elite_picks
                .iter()
                .map(|i| &self.members[i])
                .chain(other_picks.iter().map(|i| &self.members[num_elites + i]))
                .collect();
            parents.sort_by(|a, b| self.sense.compare(a.fitness, b.fitness));

            let keys = (0..n)
                .map(|gene| {
                    let mut u = rng.random_range(0.0..total_weight);
                    let mut chosen = parents.len() - 1;
                    for (rank, w) in bias_weights.iter().enumerate() {
                        if u < *w {
                            chosen = rank;
                            break;
                        }
                        u -= *w;
                    }
                    parents[chosen].keys[gene]
                })
                .collect();
            next.push(Individual::undecoded(keys, self.sense));
        }

        Population {
            members: next,
            sense: self.sense,
        }
    }

    /// Resamples a fixed fraction of genes in every non-elite individual.
    ///
    /// Elites are untouched. Perturbed individuals are marked undecoded and
    /// must pass a decode barrier before the population is sorted again.
    pub(crate) fn shake<R: Rng>(&mut self, num_elites: usize, intensity: f64, rng: &mut R) {
        let sense = self.sense;
        let n = self.members[0].keys.len();
        let num_changes = ((n as f64 * intensity).ceil() as usize).clamp(1, n);
        for ind in &mut self.members[num_elites..] {
            for _ in 0..num_changes {
                let gene = rng.random_range(0..n);
                ind.keys[gene] = rng.random_range(0.0..1.0);
            }
            ind.fitness = sense.worst();
        }
    }

    /// Replaces the worst member with `candidate` if it is strictly better,
    /// re-sorting afterwards. Returns whether an injection happened.
    pub(crate) fn try_inject(&mut self, candidate: Individual) -> bool {
        let worst = self.members.len() - 1;
        if self.sense.better(candidate.fitness, self.members[worst].fitness) {
            self.members[worst] = candidate;
            self.sort();
            true
        } else {
            false
        }
    }
}
