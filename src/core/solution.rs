//! Candidate solutions.

use super::variable::{Bounds, Variable};
use std::sync::Arc;

/// Algorithm-private bookkeeping stamped onto a solution.
///
/// The set of derived values the engine uses is closed, so each one has its
/// own typed slot. A value left at `None` has not been computed for the
/// solution's current population.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Attributes {
    /// Index of the non-dominated front the solution belongs to (0 = best).
    pub rank: Option<usize>,
    /// Crowding distance inside its front; higher is more isolated.
    pub crowding_distance: Option<f64>,
    /// Sum of constraint violations; `0.0` feasible, negative infeasible.
    pub overall_constraint_violation: Option<f64>,
    /// Count of constraints the solution violates.
    pub number_of_violated_constraints: Option<usize>,
    /// SPEA2 raw fitness plus density; lower is better.
    pub strength_raw_fitness: Option<f64>,
}

/// A candidate solution: decision variables, objective values and
/// [`Attributes`].
///
/// The variable bounds are shared with every copy of the solution so
/// variation operators can repair out-of-range values without a reference
/// to the problem. `Clone` is a deep copy of everything mutable.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Solution<V> {
    variables: Vec<V>,
    objectives: Vec<f64>,
    bounds: Arc<[Bounds<V>]>,
    attributes: Attributes,
}

impl<V: Variable> Solution<V> {
    /// Creates a solution with the given variables, one slot per bound, and
    /// `number_of_objectives` objectives initialized to `0.0`.
    ///
    /// # Panics
    /// Panics if `variables` and `bounds` differ in length.
    pub fn new(variables: Vec<V>, bounds: Arc<[Bounds<V>]>, number_of_objectives: usize) -> Self {
        assert_eq!(
            variables.len(),
            bounds.len(),
            "one bound pair is required per variable"
        );
        Self {
            variables,
            objectives: vec![0.0; number_of_objectives],
            bounds,
            attributes: Attributes::default(),
        }
    }

    /// Creates a solution with variables drawn uniformly inside `bounds`.
    pub fn random(
        bounds: Arc<[Bounds<V>]>,
        number_of_objectives: usize,
        rng: &mut dyn rand::RngCore,
    ) -> Self {
        let variables = bounds
            .iter()
            .map(|b| V::sample(b.lower, b.upper, rng))
            .collect();
        Self::new(variables, bounds, number_of_objectives)
    }

    /// The variable at `index`.
    pub fn variable(&self, index: usize) -> V {
        self.variables[index]
    }

    /// Sets the variable at `index`, clamped into its bounds.
    pub fn set_variable(&mut self, index: usize, value: V) {
        self.variables[index] = self.bounds[index].clamp(value);
    }

    /// Bounds of the variable at `index`.
    pub fn bounds(&self, index: usize) -> Bounds<V> {
        self.bounds[index]
    }

    /// Whether every variable lies inside its bounds.
    pub fn within_bounds(&self) -> bool {
        self.variables
            .iter()
            .zip(self.bounds.iter())
            .all(|(&v, b)| b.contains(v))
    }
}

impl<V> Solution<V> {
    /// Number of decision variables.
    pub fn number_of_variables(&self) -> usize {
        self.variables.len()
    }

    /// Number of objectives.
    pub fn number_of_objectives(&self) -> usize {
        self.objectives.len()
    }

    /// Decision variables.
    pub fn variables(&self) -> &[V] {
        &self.variables
    }

    /// Mutable decision variables.
    pub fn variables_mut(&mut self) -> &mut [V] {
        &mut self.variables
    }

    /// The shared bounds table.
    pub fn bounds_table(&self) -> &Arc<[Bounds<V>]> {
        &self.bounds
    }

    /// Objective values.
    pub fn objectives(&self) -> &[f64] {
        &self.objectives
    }

    /// The objective at `index`.
    pub fn objective(&self, index: usize) -> f64 {
        self.objectives[index]
    }

    /// Sets the objective at `index`.
    pub fn set_objective(&mut self, index: usize, value: f64) {
        self.objectives[index] = value;
    }

    /// Derived bookkeeping values.
    pub fn attributes(&self) -> &Attributes {
        &self.attributes
    }

    /// Mutable bookkeeping values.
    pub fn attributes_mut(&mut self) -> &mut Attributes {
        &mut self.attributes
    }

    /// Records the constraint evaluation result.
    ///
    /// `violations` holds one entry per constraint, negative when violated.
    /// The overall violation is the sum of the negative entries.
    pub fn set_constraint_violations(&mut self, violations: &[f64]) {
        let mut overall = 0.0;
        let mut count = 0;
        for &v in violations {
            if v < 0.0 {
                overall += v;
                count += 1;
            }
        }
        self.attributes.overall_constraint_violation = Some(overall);
        self.attributes.number_of_violated_constraints = Some(count);
    }

    /// Whether the solution satisfies all constraints (unconstrained
    /// solutions are feasible).
    pub fn is_feasible(&self) -> bool {
        self.attributes
            .overall_constraint_violation
            .map_or(true, |v| v >= 0.0)
    }

    /// Euclidean distance between the objective vectors of two solutions.
    pub fn objective_distance(&self, other: &Self) -> f64 {
        self.objectives
            .iter()
            .zip(other.objectives.iter())
            .map(|(a, b)| (a - b) * (a - b))
            .sum::<f64>()
            .sqrt()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::random::create_rng;

    fn unit_bounds(n: usize) -> Arc<[Bounds<f64>]> {
        vec![Bounds::new(0.0, 1.0); n].into()
    }

    #[test]
    fn test_new_initializes_objectives() {
        let s = Solution::new(vec![0.2, 0.4], unit_bounds(2), 3);
        assert_eq!(s.objectives(), &[0.0, 0.0, 0.0]);
        assert_eq!(s.number_of_variables(), 2);
        assert_eq!(s.attributes(), &Attributes::default());
    }

    #[test]
    fn test_copy_is_independent() {
        let mut original = Solution::new(vec![0.2, 0.4], unit_bounds(2), 2);
        original.set_objective(0, 1.0);
        original.attributes_mut().rank = Some(2);

        let mut copy = original.clone();
        copy.set_variable(0, 0.9);
        copy.set_objective(0, 5.0);
        copy.attributes_mut().rank = Some(0);
        copy.attributes_mut().crowding_distance = Some(1.0);

        assert_eq!(original.variables(), &[0.2, 0.4]);
        assert_eq!(original.objective(0), 1.0);
        assert_eq!(original.attributes().rank, Some(2));
        assert_eq!(original.attributes().crowding_distance, None);
    }

    #[test]
    fn test_set_variable_clamps() {
        let mut s = Solution::new(vec![0.5], unit_bounds(1), 1);
        s.set_variable(0, 3.0);
        assert_eq!(s.variable(0), 1.0);
        s.set_variable(0, -3.0);
        assert_eq!(s.variable(0), 0.0);
    }

    #[test]
    fn test_random_within_bounds() {
        let mut rng = create_rng(42);
        let bounds: Arc<[Bounds<i32>]> = vec![Bounds::new(-3, 3); 5].into();
        for _ in 0..50 {
            let s = Solution::random(bounds.clone(), 1, &mut rng);
            assert!(s.within_bounds());
        }
    }

    #[test]
    fn test_constraint_violations() {
        let mut s = Solution::new(vec![0.5], unit_bounds(1), 1);
        assert!(s.is_feasible());
        s.set_constraint_violations(&[1.0, -0.5, -1.5]);
        assert_eq!(s.attributes().overall_constraint_violation, Some(-2.0));
        assert_eq!(s.attributes().number_of_violated_constraints, Some(2));
        assert!(!s.is_feasible());
        s.set_constraint_violations(&[0.0, 3.0]);
        assert!(s.is_feasible());
    }

    #[test]
    #[should_panic(expected = "one bound pair is required per variable")]
    fn test_bounds_length_mismatch_panics() {
        let _ = Solution::new(vec![0.1, 0.2], unit_bounds(1), 1);
    }
}
