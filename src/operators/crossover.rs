//! Crossover operators.
//!
//! A crossover combines `number_of_required_parents()` parents into
//! `number_of_generated_children()` fresh children. Parents are never
//! modified; children start as deep copies and carry no attributes from a
//! previous generation.
//!
//! - [`SbxCrossover`]: simulated binary crossover (Deb & Agrawal, 1995)
//! - [`SinglePointCrossover`]: tail exchange at one cut point
//! - [`DifferentialEvolutionCrossover`]: DE/x/y/z trial vector construction
//!
//! # References
//!
//! - Deb & Agrawal (1995), "Simulated Binary Crossover for Continuous Search
//!   Space", Complex Systems 9
//! - Storn & Price (1997), "Differential Evolution", J. Global Optimization 11

use crate::algorithm::{check_non_negative, check_probability};
use crate::core::{Attributes, Solution, Variable};
use crate::error::{Error, Result};
use rand::{Rng, RngCore};
use std::fmt;
use std::str::FromStr;

const EPS: f64 = 1.0e-14;

/// Combines parents into children.
pub trait CrossoverOperator<V>: Send + Sync {
    /// Parents consumed per call.
    fn number_of_required_parents(&self) -> usize;

    /// Children produced per call.
    fn number_of_generated_children(&self) -> usize;

    /// Produces children from `parents`.
    ///
    /// # Errors
    /// Returns [`Error::ParentCount`] if `parents.len()` differs from
    /// [`number_of_required_parents`](Self::number_of_required_parents).
    fn execute(
        &self,
        parents: &[&Solution<V>],
        rng: &mut dyn RngCore,
    ) -> Result<Vec<Solution<V>>>;
}

fn check_parents(operator: &'static str, expected: usize, got: usize) -> Result<()> {
    if expected != got {
        return Err(Error::ParentCount {
            operator,
            expected,
            got,
        });
    }
    Ok(())
}

/// Deep copy of `parent` with cleared attributes.
fn offspring_of<V: Clone>(parent: &Solution<V>) -> Solution<V> {
    let mut child = parent.clone();
    *child.attributes_mut() = Attributes::default();
    child
}

/// Simulated binary crossover.
///
/// Applied with probability `probability` per parent pair; each variable is
/// then recombined with probability 0.5. The spread of the children around
/// the parents is controlled by `distribution_index` (larger = closer).
/// Children are repaired into the variable bounds.
///
/// Integer encodings are recombined in `f64` space and rounded.
#[derive(Debug, Clone, Copy)]
pub struct SbxCrossover {
    probability: f64,
    distribution_index: f64,
}

impl Default for SbxCrossover {
    fn default() -> Self {
        Self {
            probability: 0.9,
            distribution_index: 20.0,
        }
    }
}

impl SbxCrossover {
    /// Creates the operator.
    ///
    /// # Errors
    /// Returns [`Error::InvalidConfig`] for a probability outside `[0, 1]` or
    /// a negative distribution index.
    pub fn new(probability: f64, distribution_index: f64) -> Result<Self> {
        check_probability("crossover probability", probability)?;
        check_non_negative("distribution index", distribution_index)?;
        Ok(Self {
            probability,
            distribution_index,
        })
    }

    /// Per-pair crossover probability.
    pub fn probability(&self) -> f64 {
        self.probability
    }

    /// Distribution index (eta).
    pub fn distribution_index(&self) -> f64 {
        self.distribution_index
    }

    fn spread(&self, beta: f64, rand: f64) -> f64 {
        let exponent = 1.0 / (self.distribution_index + 1.0);
        let alpha = 2.0 - beta.powf(-(self.distribution_index + 1.0));
        if rand <= 1.0 / alpha {
            (rand * alpha).powf(exponent)
        } else {
            (1.0 / (2.0 - rand * alpha)).powf(exponent)
        }
    }
}

impl<V: Variable> CrossoverOperator<V> for SbxCrossover {
    fn number_of_required_parents(&self) -> usize {
        2
    }

    fn number_of_generated_children(&self) -> usize {
        2
    }

    fn execute(
        &self,
        parents: &[&Solution<V>],
        rng: &mut dyn RngCore,
    ) -> Result<Vec<Solution<V>>> {
        check_parents("SBX", 2, parents.len())?;
        let (p1, p2) = (parents[0], parents[1]);
        let mut c1 = offspring_of(p1);
        let mut c2 = offspring_of(p2);

        if rng.random::<f64>() > self.probability {
            return Ok(vec![c1, c2]);
        }

        for i in 0..p1.number_of_variables() {
            if rng.random::<f64>() > 0.5 {
                continue;
            }
            let x1 = p1.variable(i).to_f64();
            let x2 = p2.variable(i).to_f64();
            if (x1 - x2).abs() <= EPS {
                continue;
            }

            let (y1, y2) = if x1 < x2 { (x1, x2) } else { (x2, x1) };
            let bounds = p1.bounds(i);
            let lower = bounds.lower.to_f64();
            let upper = bounds.upper.to_f64();

            let rand = rng.random::<f64>();
            let beta = 1.0 + 2.0 * (y1 - lower) / (y2 - y1);
            let betaq = self.spread(beta, rand);
            let v1 = 0.5 * ((y1 + y2) - betaq * (y2 - y1));

            let beta = 1.0 + 2.0 * (upper - y2) / (y2 - y1);
            let betaq = self.spread(beta, rand);
            let v2 = 0.5 * ((y1 + y2) + betaq * (y2 - y1));

            let v1 = bounds.repair(v1);
            let v2 = bounds.repair(v2);
            if rng.random::<f64>() <= 0.5 {
                c1.variables_mut()[i] = v2;
                c2.variables_mut()[i] = v1;
            } else {
                c1.variables_mut()[i] = v1;
                c2.variables_mut()[i] = v2;
            }
        }

        Ok(vec![c1, c2])
    }
}

/// Single-point crossover: both children swap their tails after a random
/// cut point.
///
/// Suited to integer encodings where recombining in `f64` space is not
/// meaningful.
#[derive(Debug, Clone, Copy)]
pub struct SinglePointCrossover {
    probability: f64,
}

impl Default for SinglePointCrossover {
    fn default() -> Self {
        Self { probability: 0.9 }
    }
}

impl SinglePointCrossover {
    /// Creates the operator.
    ///
    /// # Errors
    /// Returns [`Error::InvalidConfig`] for a probability outside `[0, 1]`.
    pub fn new(probability: f64) -> Result<Self> {
        check_probability("crossover probability", probability)?;
        Ok(Self { probability })
    }
}

impl<V: Variable> CrossoverOperator<V> for SinglePointCrossover {
    fn number_of_required_parents(&self) -> usize {
        2
    }

    fn number_of_generated_children(&self) -> usize {
        2
    }

    fn execute(
        &self,
        parents: &[&Solution<V>],
        rng: &mut dyn RngCore,
    ) -> Result<Vec<Solution<V>>> {
        check_parents("single-point", 2, parents.len())?;
        let mut c1 = offspring_of(parents[0]);
        let mut c2 = offspring_of(parents[1]);

        let n = c1.number_of_variables();
        if n > 1 && rng.random::<f64>() < self.probability {
            let point = rng.random_range(1..n);
            for i in point..n {
                let tmp = c1.variable(i);
                c1.variables_mut()[i] = c2.variable(i);
                c2.variables_mut()[i] = tmp;
            }
        }

        Ok(vec![c1, c2])
    }
}

/// Differential evolution mutation/recombination schemes.
///
/// Donor slots `d0, d1, ...` are supplied as parents; for the `best`
/// variants the caller places the best solution of the population in the
/// base slot `d2`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum DeVariant {
    /// `d2 + F(d0 - d1)`, binomial recombination.
    #[default]
    Rand1Bin,
    /// `d2 + F(d0 - d1)`, exponential recombination.
    Rand1Exp,
    /// `d4 + F(d0 - d1) + F(d2 - d3)`, binomial recombination.
    Rand2Bin,
    /// `best + F(d0 - d1)`, binomial recombination.
    Best1Bin,
    /// `best + F(d0 - d1)`, exponential recombination.
    Best1Exp,
    /// `x + K(d2 - x) + F(d0 - d1)` on every variable.
    CurrentToRand1,
    /// `x + F(best - x) + F(d0 - d1)`, binomial recombination.
    CurrentToBest1Bin,
}

impl DeVariant {
    /// Donors the scheme needs, excluding the target.
    pub fn number_of_donors(self) -> usize {
        match self {
            DeVariant::Rand2Bin => 5,
            _ => 3,
        }
    }

    /// Whether the base slot must hold the best solution.
    pub fn uses_best(self) -> bool {
        matches!(
            self,
            DeVariant::Best1Bin | DeVariant::Best1Exp | DeVariant::CurrentToBest1Bin
        )
    }
}

impl fmt::Display for DeVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            DeVariant::Rand1Bin => "rand/1/bin",
            DeVariant::Rand1Exp => "rand/1/exp",
            DeVariant::Rand2Bin => "rand/2/bin",
            DeVariant::Best1Bin => "best/1/bin",
            DeVariant::Best1Exp => "best/1/exp",
            DeVariant::CurrentToRand1 => "current-to-rand/1",
            DeVariant::CurrentToBest1Bin => "current-to-best/1/bin",
        };
        f.write_str(s)
    }
}

impl FromStr for DeVariant {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "rand/1/bin" => Ok(DeVariant::Rand1Bin),
            "rand/1/exp" => Ok(DeVariant::Rand1Exp),
            "rand/2/bin" => Ok(DeVariant::Rand2Bin),
            "best/1/bin" => Ok(DeVariant::Best1Bin),
            "best/1/exp" => Ok(DeVariant::Best1Exp),
            "current-to-rand/1" => Ok(DeVariant::CurrentToRand1),
            "current-to-best/1/bin" => Ok(DeVariant::CurrentToBest1Bin),
            other => Err(Error::config(format!("unknown DE variant {other:?}"))),
        }
    }
}

/// Builds a DE trial vector.
///
/// Parents are the donors in slot order followed by the target (current)
/// solution, so the operator needs `variant.number_of_donors() + 1` parents
/// and yields one child, a copy of the target with the recombined variables.
/// Every produced value is clamped into its bounds.
#[derive(Debug, Clone, Copy)]
pub struct DifferentialEvolutionCrossover {
    cr: f64,
    f: f64,
    k: f64,
    variant: DeVariant,
}

impl Default for DifferentialEvolutionCrossover {
    fn default() -> Self {
        Self {
            cr: 0.5,
            f: 0.5,
            k: 0.5,
            variant: DeVariant::Rand1Bin,
        }
    }
}

impl DifferentialEvolutionCrossover {
    /// Creates the operator with crossover rate `cr` and scale factor `f`.
    ///
    /// # Errors
    /// Returns [`Error::InvalidConfig`] if `cr` is outside `[0, 1]` or `f` is
    /// negative.
    pub fn new(cr: f64, f: f64, variant: DeVariant) -> Result<Self> {
        check_probability("CR", cr)?;
        check_non_negative("F", f)?;
        Ok(Self {
            cr,
            f,
            k: 0.5,
            variant,
        })
    }

    /// Sets the `K` coefficient of current-to-rand/1.
    pub fn with_k(mut self, k: f64) -> Self {
        self.k = k;
        self
    }

    /// The scheme.
    pub fn variant(&self) -> DeVariant {
        self.variant
    }

    /// Crossover rate.
    pub fn cr(&self) -> f64 {
        self.cr
    }

    /// Scale factor.
    pub fn f(&self) -> f64 {
        self.f
    }
}

impl<V: Variable> CrossoverOperator<V> for DifferentialEvolutionCrossover {
    fn number_of_required_parents(&self) -> usize {
        self.variant.number_of_donors() + 1
    }

    fn number_of_generated_children(&self) -> usize {
        1
    }

    fn execute(
        &self,
        parents: &[&Solution<V>],
        rng: &mut dyn RngCore,
    ) -> Result<Vec<Solution<V>>> {
        let expected = self.variant.number_of_donors() + 1;
        check_parents("differential evolution", expected, parents.len())?;

        let current = parents[expected - 1];
        let d = |slot: usize, j: usize| parents[slot].variable(j).to_f64();
        let x = |j: usize| current.variable(j).to_f64();

        let mut child = offspring_of(current);
        let n = child.number_of_variables();
        if n == 0 {
            return Ok(vec![child]);
        }
        let (cr, f, k) = (self.cr, self.f, self.k);

        let donor = |j: usize| -> f64 {
            match self.variant {
                DeVariant::Rand1Bin
                | DeVariant::Rand1Exp
                | DeVariant::Best1Bin
                | DeVariant::Best1Exp => d(2, j) + f * (d(0, j) - d(1, j)),
                DeVariant::Rand2Bin => {
                    d(4, j) + f * (d(0, j) - d(1, j)) + f * (d(2, j) - d(3, j))
                }
                DeVariant::CurrentToRand1 => {
                    x(j) + k * (d(2, j) - x(j)) + f * (d(0, j) - d(1, j))
                }
                DeVariant::CurrentToBest1Bin => {
                    x(j) + f * (d(2, j) - x(j)) + f * (d(0, j) - d(1, j))
                }
            }
        };

        match self.variant {
            DeVariant::Rand1Bin
            | DeVariant::Rand2Bin
            | DeVariant::Best1Bin
            | DeVariant::CurrentToBest1Bin => {
                let jrand = rng.random_range(0..n);
                for j in 0..n {
                    if rng.random::<f64>() < cr || j == jrand {
                        let value = child.bounds(j).repair(donor(j));
                        child.variables_mut()[j] = value;
                    }
                }
            }
            DeVariant::Rand1Exp | DeVariant::Best1Exp => {
                let mut j = rng.random_range(0..n);
                let mut changed = 0;
                loop {
                    let value = child.bounds(j).repair(donor(j));
                    child.variables_mut()[j] = value;
                    j = (j + 1) % n;
                    changed += 1;
                    if !(rng.random::<f64>() < cr && changed < n) {
                        break;
                    }
                }
            }
            DeVariant::CurrentToRand1 => {
                for j in 0..n {
                    let value = child.bounds(j).repair(donor(j));
                    child.variables_mut()[j] = value;
                }
            }
        }

        Ok(vec![child])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Bounds;
    use crate::random::create_rng;
    use proptest::prelude::*;
    use std::sync::Arc;

    fn real(values: &[f64], lower: f64, upper: f64) -> Solution<f64> {
        let bounds: Arc<[Bounds<f64>]> = vec![Bounds::new(lower, upper); values.len()].into();
        Solution::new(values.to_vec(), bounds, 1)
    }

    #[test]
    fn test_sbx_wrong_parent_count() {
        let p = real(&[0.5], 0.0, 1.0);
        let mut rng = create_rng(42);
        assert!(matches!(
            SbxCrossover::default().execute(&[&p], &mut rng),
            Err(Error::ParentCount { expected: 2, got: 1, .. })
        ));
    }

    #[test]
    fn test_sbx_invalid_config() {
        assert!(SbxCrossover::new(1.5, 20.0).is_err());
        assert!(SbxCrossover::new(0.9, -1.0).is_err());
        assert!(SbxCrossover::new(0.9, 20.0).is_ok());
    }

    #[test]
    fn test_sbx_zero_probability_copies() {
        let p1 = real(&[0.1, 0.2, 0.3], 0.0, 1.0);
        let p2 = real(&[0.9, 0.8, 0.7], 0.0, 1.0);
        let mut rng = create_rng(42);
        let sbx = SbxCrossover::new(0.0, 20.0).unwrap();
        let children = sbx.execute(&[&p1, &p2], &mut rng).unwrap();
        assert_eq!(children[0].variables(), p1.variables());
        assert_eq!(children[1].variables(), p2.variables());
    }

    #[test]
    fn test_sbx_identical_parents_unchanged() {
        let p = real(&[0.4, 0.6], 0.0, 1.0);
        let mut rng = create_rng(42);
        let sbx = SbxCrossover::new(1.0, 20.0).unwrap();
        for _ in 0..50 {
            let children = sbx.execute(&[&p, &p], &mut rng).unwrap();
            assert_eq!(children[0].variables(), p.variables());
            assert_eq!(children[1].variables(), p.variables());
        }
    }

    #[test]
    fn test_sbx_children_clear_attributes() {
        let mut p1 = real(&[0.1], 0.0, 1.0);
        p1.attributes_mut().rank = Some(3);
        let p2 = real(&[0.9], 0.0, 1.0);
        let mut rng = create_rng(42);
        let children = SbxCrossover::default().execute(&[&p1, &p2], &mut rng).unwrap();
        assert_eq!(children[0].attributes().rank, None);
        assert_eq!(p1.attributes().rank, Some(3));
    }

    #[test]
    fn test_sbx_integer_encoding() {
        let bounds: Arc<[Bounds<i32>]> = vec![Bounds::new(0, 10); 4].into();
        let p1 = Solution::new(vec![0, 2, 4, 6], bounds.clone(), 1);
        let p2 = Solution::new(vec![10, 8, 6, 4], bounds, 1);
        let mut rng = create_rng(42);
        let sbx = SbxCrossover::new(1.0, 5.0).unwrap();
        for _ in 0..100 {
            for child in sbx.execute(&[&p1, &p2], &mut rng).unwrap() {
                assert!(child.within_bounds());
            }
        }
    }

    #[test]
    fn test_single_point_swaps_tails() {
        let bounds: Arc<[Bounds<i32>]> = vec![Bounds::new(0, 9); 5].into();
        let p1 = Solution::new(vec![0, 0, 0, 0, 0], bounds.clone(), 1);
        let p2 = Solution::new(vec![9, 9, 9, 9, 9], bounds, 1);
        let mut rng = create_rng(42);
        let op = SinglePointCrossover::new(1.0).unwrap();
        let children = op.execute(&[&p1, &p2], &mut rng).unwrap();
        let a = children[0].variables();
        let b = children[1].variables();
        // A prefix of zeros followed by nines, mirrored in the sibling.
        let cut = a.iter().position(|&v| v == 9).unwrap();
        assert!(cut >= 1);
        assert!(a[..cut].iter().all(|&v| v == 0) && a[cut..].iter().all(|&v| v == 9));
        assert!(b[..cut].iter().all(|&v| v == 9) && b[cut..].iter().all(|&v| v == 0));
    }

    #[test]
    fn test_de_variant_parse_and_display() {
        for v in [
            DeVariant::Rand1Bin,
            DeVariant::Rand1Exp,
            DeVariant::Rand2Bin,
            DeVariant::Best1Bin,
            DeVariant::Best1Exp,
            DeVariant::CurrentToRand1,
            DeVariant::CurrentToBest1Bin,
        ] {
            assert_eq!(v.to_string().parse::<DeVariant>().unwrap(), v);
        }
        assert!("rand/3/bin".parse::<DeVariant>().is_err());
    }

    #[test]
    fn test_de_rand1bin_full_crossover() {
        let d0 = real(&[0.6, 0.6], -10.0, 10.0);
        let d1 = real(&[0.1, 0.1], -10.0, 10.0);
        let d2 = real(&[1.0, 2.0], -10.0, 10.0);
        let x = real(&[5.0, 5.0], -10.0, 10.0);
        let op = DifferentialEvolutionCrossover::new(1.0, 0.5, DeVariant::Rand1Bin).unwrap();
        let mut rng = create_rng(42);
        let child = op.execute(&[&d0, &d1, &d2, &x], &mut rng).unwrap().remove(0);
        assert!((child.variable(0) - 1.25).abs() < 1e-12);
        assert!((child.variable(1) - 2.25).abs() < 1e-12);
    }

    #[test]
    fn test_de_zero_cr_changes_exactly_one() {
        let d0 = real(&[1.0; 6], -10.0, 10.0);
        let d1 = real(&[0.0; 6], -10.0, 10.0);
        let d2 = real(&[2.0; 6], -10.0, 10.0);
        let x = real(&[-3.0; 6], -10.0, 10.0);
        let op = DifferentialEvolutionCrossover::new(0.0, 1.0, DeVariant::Rand1Bin).unwrap();
        let mut rng = create_rng(42);
        let child = op.execute(&[&d0, &d1, &d2, &x], &mut rng).unwrap().remove(0);
        let changed = child.variables().iter().filter(|&&v| v != -3.0).count();
        assert_eq!(changed, 1);
    }

    #[test]
    fn test_de_clamps_to_bounds() {
        let d0 = real(&[1.0], 0.0, 1.0);
        let d1 = real(&[0.0], 0.0, 1.0);
        let d2 = real(&[1.0], 0.0, 1.0);
        let x = real(&[0.5], 0.0, 1.0);
        let op = DifferentialEvolutionCrossover::new(1.0, 2.0, DeVariant::Rand1Bin).unwrap();
        let mut rng = create_rng(42);
        let child = op.execute(&[&d0, &d1, &d2, &x], &mut rng).unwrap().remove(0);
        assert_eq!(child.variable(0), 1.0);
    }

    #[test]
    fn test_de_rand2_needs_six_parents() {
        let p = real(&[0.5], 0.0, 1.0);
        let op = DifferentialEvolutionCrossover::new(0.5, 0.5, DeVariant::Rand2Bin).unwrap();
        assert_eq!(CrossoverOperator::<f64>::number_of_required_parents(&op), 6);
        let mut rng = create_rng(42);
        assert!(matches!(
            op.execute(&[&p, &p, &p, &p], &mut rng),
            Err(Error::ParentCount { expected: 6, got: 4, .. })
        ));
    }

    #[test]
    fn test_de_current_to_rand() {
        let d0 = real(&[2.0], -10.0, 10.0);
        let d1 = real(&[1.0], -10.0, 10.0);
        let d2 = real(&[4.0], -10.0, 10.0);
        let x = real(&[0.0], -10.0, 10.0);
        let op = DifferentialEvolutionCrossover::new(0.0, 0.5, DeVariant::CurrentToRand1)
            .unwrap()
            .with_k(0.25);
        let mut rng = create_rng(42);
        let child = op.execute(&[&d0, &d1, &d2, &x], &mut rng).unwrap().remove(0);
        // 0 + 0.25 * (4 - 0) + 0.5 * (2 - 1)
        assert!((child.variable(0) - 1.5).abs() < 1e-12);
    }

    #[test]
    fn test_de_invalid_config() {
        assert!(DifferentialEvolutionCrossover::new(-0.1, 0.5, DeVariant::Rand1Bin).is_err());
        assert!(DifferentialEvolutionCrossover::new(0.5, -0.5, DeVariant::Rand1Bin).is_err());
    }

    proptest! {
        #[test]
        fn prop_sbx_children_within_bounds(
            a in prop::collection::vec(-5.0f64..5.0, 1..8),
            seed in 0u64..1000,
        ) {
            let b: Vec<f64> = a.iter().map(|v| -v).collect();
            let p1 = real(&a, -5.0, 5.0);
            let p2 = real(&b, -5.0, 5.0);
            let mut rng = create_rng(seed);
            let children = SbxCrossover::new(1.0, 20.0)
                .unwrap()
                .execute(&[&p1, &p2], &mut rng)
                .unwrap();
            prop_assert_eq!(children.len(), 2);
            for c in &children {
                prop_assert!(c.within_bounds());
            }
        }

        #[test]
        fn prop_de_exp_within_bounds(
            values in prop::collection::vec(-1.0f64..1.0, 4),
            seed in 0u64..1000,
        ) {
            let parents: Vec<Solution<f64>> = (0..4)
                .map(|k| {
                    let scaled: Vec<f64> = values.iter().map(|v| v / (k as f64 + 1.0)).collect();
                    real(&scaled, -1.0, 1.0)
                })
                .collect();
            let refs: Vec<&Solution<f64>> = parents.iter().collect();
            let op = DifferentialEvolutionCrossover::new(0.7, 0.9, DeVariant::Rand1Exp).unwrap();
            let mut rng = create_rng(seed);
            let child = op.execute(&refs, &mut rng).unwrap().remove(0);
            prop_assert!(child.within_bounds());
        }
    }
}
