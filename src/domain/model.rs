use serde::{Deserialize, Serialize};

use crate::domain::solver::Assignment;

/// Handle to a variable inside a [`MipInstance`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VarId(usize);

impl VarId {
    pub fn index(self) -> usize {
        self.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VarKind {
    Binary,
    Continuous,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Variable {
    pub name: String,
    pub kind: VarKind,
    pub lower: f64,
    pub upper: f64,
    /// Higher values are branched on first. Only a hint.
    pub branch_priority: i32,
}

/// Sparse linear expression `sum(coeff * var)`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LinExpr {
    terms: Vec<(VarId, f64)>,
}

impl LinExpr {
    pub fn new() -> Self {
        LinExpr { terms: Vec::new() }
    }

    pub fn term(mut self, var: VarId, coeff: f64) -> Self {
        self.add(var, coeff);
        self
    }

    pub fn add(&mut self, var: VarId, coeff: f64) {
        self.terms.push((var, coeff));
    }

    pub fn terms(&self) -> &[(VarId, f64)] {
        &self.terms
    }

    pub fn evaluate(&self, values: &[f64]) -> f64 {
        self.terms
            .iter()
            .map(|&(var, coeff)| coeff * values.get(var.index()).copied().unwrap_or(0.0))
            .sum()
    }
}

impl FromIterator<(VarId, f64)> for LinExpr {
    fn from_iter<I: IntoIterator<Item = (VarId, f64)>>(iter: I) -> Self {
        LinExpr {
            terms: iter.into_iter().collect(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConstraintSense {
    LessEqual,
    Equal,
    GreaterEqual,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Constraint {
    pub name: String,
    pub expr: LinExpr,
    pub sense: ConstraintSense,
    pub rhs: f64,
}

impl Constraint {
    pub fn is_satisfied(&self, values: &[f64], tolerance: f64) -> bool {
        let lhs = self.expr.evaluate(values);
        match self.sense {
            ConstraintSense::LessEqual => lhs <= self.rhs + tolerance,
            ConstraintSense::Equal => (lhs - self.rhs).abs() <= tolerance,
            ConstraintSense::GreaterEqual => lhs >= self.rhs - tolerance,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SolverDirection {
    Maximize,
    Minimize,
}

/// Constraint matrix in `A x <= b` form, stored as coordinate triplets.
///
/// Equalities become two rows and `>=` rows are negated.
#[derive(Debug, Clone, Default)]
pub struct SparseLeForm {
    pub rows: Vec<usize>,
    pub cols: Vec<usize>,
    pub vals: Vec<f64>,
    pub rhs: Vec<f64>,
}

impl SparseLeForm {
    pub fn nrows(&self) -> usize {
        self.rhs.len()
    }

    fn push_row(&mut self, expr: &LinExpr, sign: f64, rhs: f64) {
        let row = self.rhs.len();
        for &(var, coeff) in expr.terms() {
            self.rows.push(row);
            self.cols.push(var.index());
            self.vals.push(sign * coeff);
        }
        self.rhs.push(sign * rhs);
    }
}

/// A complete mixed-integer program. Immutable once built.
#[derive(Debug, Clone, PartialEq)]
pub struct MipInstance {
    name: String,
    variables: Vec<Variable>,
    constraints: Vec<Constraint>,
    objective: LinExpr,
    direction: SolverDirection,
}

impl MipInstance {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn variables(&self) -> &[Variable] {
        &self.variables
    }

    pub fn variable(&self, id: VarId) -> &Variable {
        &self.variables[id.index()]
    }

    pub fn constraints(&self) -> &[Constraint] {
        &self.constraints
    }

    pub fn objective(&self) -> &LinExpr {
        &self.objective
    }

    pub fn direction(&self) -> SolverDirection {
        self.direction
    }

    /// Objective coefficient of every variable, in variable order.
    pub fn objective_coefficients(&self) -> Vec<f64> {
        let mut coefficients = vec![0.0; self.variables.len()];
        for &(var, coeff) in self.objective.terms() {
            coefficients[var.index()] += coeff;
        }
        coefficients
    }

    /// Dense value vector in variable order, read from a solver assignment.
    pub fn values_from(&self, assignment: &Assignment) -> Vec<f64> {
        self.variables
            .iter()
            .map(|v| assignment.value(&v.name))
            .collect()
    }

    pub fn objective_value(&self, values: &[f64]) -> f64 {
        self.objective.evaluate(values)
    }

    /// Names of every constraint, bound or integrality requirement that
    /// `values` breaks. Empty means the point is feasible.
    pub fn violated_constraints(&self, values: &[f64], tolerance: f64) -> Vec<String> {
        let mut violated = Vec::new();

        for (variable, &value) in self.variables.iter().zip(values) {
            if value < variable.lower - tolerance || value > variable.upper + tolerance {
                violated.push(format!("bound_{}", variable.name));
            }
            if variable.kind == VarKind::Binary && (value - value.round()).abs() > tolerance {
                violated.push(format!("integrality_{}", variable.name));
            }
        }

        violated.extend(
            self.constraints
                .iter()
                .filter(|c| !c.is_satisfied(values, tolerance))
                .map(|c| c.name.clone()),
        );

        violated
    }

    pub fn to_sparse_le(&self) -> SparseLeForm {
        let mut form = SparseLeForm::default();
        for constraint in &self.constraints {
            match constraint.sense {
                ConstraintSense::LessEqual => form.push_row(&constraint.expr, 1.0, constraint.rhs),
                ConstraintSense::GreaterEqual => {
                    form.push_row(&constraint.expr, -1.0, constraint.rhs)
                }
                ConstraintSense::Equal => {
                    form.push_row(&constraint.expr, 1.0, constraint.rhs);
                    form.push_row(&constraint.expr, -1.0, constraint.rhs);
                }
            }
        }
        form
    }
}

/// Incremental construction of a [`MipInstance`].
#[derive(Debug)]
pub struct MipBuilder {
    name: String,
    variables: Vec<Variable>,
    constraints: Vec<Constraint>,
    objective: LinExpr,
    direction: SolverDirection,
}

impl MipBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        MipBuilder {
            name: name.into(),
            variables: Vec::new(),
            constraints: Vec::new(),
            objective: LinExpr::new(),
            direction: SolverDirection::Minimize,
        }
    }

    pub fn add_binary(&mut self, name: impl Into<String>) -> VarId {
        self.push_variable(name.into(), VarKind::Binary, 0.0, 1.0)
    }

    pub fn add_continuous(&mut self, name: impl Into<String>, lower: f64, upper: f64) -> VarId {
        self.push_variable(name.into(), VarKind::Continuous, lower, upper)
    }

    fn push_variable(&mut self, name: String, kind: VarKind, lower: f64, upper: f64) -> VarId {
        let id = VarId(self.variables.len());
        self.variables.push(Variable {
            name,
            kind,
            lower,
            upper,
            branch_priority: 0,
        });
        id
    }

    pub fn set_branch_priority(&mut self, var: VarId, priority: i32) {
        self.variables[var.index()].branch_priority = priority;
    }

    pub fn add_constraint(
        &mut self,
        name: impl Into<String>,
        expr: LinExpr,
        sense: ConstraintSense,
        rhs: f64,
    ) {
        self.constraints.push(Constraint {
            name: name.into(),
            expr,
            sense,
            rhs,
        });
    }

    pub fn set_objective(&mut self, expr: LinExpr, direction: SolverDirection) {
        self.objective = expr;
        self.direction = direction;
    }

    pub fn build(self) -> MipInstance {
        MipInstance {
            name: self.name,
            variables: self.variables,
            constraints: self.constraints,
            objective: self.objective,
            direction: self.direction,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_instance() -> (MipInstance, VarId, VarId) {
        let mut builder = MipBuilder::new("small");
        let x = builder.add_binary("x");
        let y = builder.add_continuous("y", 0.0, 3.0);
        builder.add_constraint(
            "link",
            LinExpr::new().term(y, 1.0).term(x, -3.0),
            ConstraintSense::LessEqual,
            0.0,
        );
        builder.add_constraint("fix", LinExpr::new().term(x, 1.0), ConstraintSense::Equal, 1.0);
        builder.add_constraint("floor", LinExpr::new().term(y, 1.0), ConstraintSense::GreaterEqual, 1.0);
        builder.set_objective(LinExpr::new().term(y, 2.0), SolverDirection::Minimize);
        (builder.build(), x, y)
    }

    #[test]
    fn test_violated_constraints_given_feasible_point_should_be_empty() {
        let (instance, _, _) = small_instance();
        assert!(instance.violated_constraints(&[1.0, 2.0], 1e-6).is_empty());
        assert_eq!(instance.objective_value(&[1.0, 2.0]), 4.0);
    }

    #[test]
    fn test_violated_constraints_should_name_broken_rows_and_bounds() {
        let (instance, _, _) = small_instance();
        let violated = instance.violated_constraints(&[0.5, 4.0], 1e-6);
        assert!(violated.contains(&"integrality_x".to_string()));
        assert!(violated.contains(&"bound_y".to_string()));
        assert!(violated.contains(&"link".to_string()));
        assert!(violated.contains(&"fix".to_string()));
        assert!(!violated.contains(&"floor".to_string()));
    }

    #[test]
    fn test_to_sparse_le_should_split_equalities_and_negate_ge_rows() {
        let (instance, x, y) = small_instance();
        let form = instance.to_sparse_le();
        // link, fix (x2), floor
        assert_eq!(form.nrows(), 4);
        assert_eq!(form.rhs, vec![0.0, 1.0, -1.0, -1.0]);
        assert_eq!(form.rows, vec![0, 0, 1, 2, 3]);
        assert_eq!(
            form.cols,
            vec![y.index(), x.index(), x.index(), x.index(), y.index()]
        );
        assert_eq!(form.vals, vec![1.0, -3.0, 1.0, -1.0, -1.0]);
    }

    #[test]
    fn test_objective_coefficients_should_be_dense() {
        let (instance, x, y) = small_instance();
        let coefficients = instance.objective_coefficients();
        assert_eq!(coefficients[x.index()], 0.0);
        assert_eq!(coefficients[y.index()], 2.0);
    }
}
