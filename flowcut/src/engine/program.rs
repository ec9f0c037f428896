use crate::index::{AsIndex, IndexedVec};
use crate::new_index;

new_index!(pub index VarId);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum VarKind {
    Continuous,
    Binary,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Var {
    pub kind: VarKind,
    pub lower: f64,
    pub upper: f64,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Cmp {
    Le,
    Eq,
    Ge,
}

impl Cmp {
    pub fn holds(self, lhs: f64, rhs: f64, tol: f64) -> bool {
        match self {
            Cmp::Le => lhs <= rhs + tol,
            Cmp::Eq => (lhs - rhs).abs() <= tol,
            Cmp::Ge => lhs >= rhs - tol,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Sense {
    Maximize,
    Minimize,
}

/// A sum of weighted variables. The same variable may appear more than once.
#[derive(Clone, Debug, Default)]
pub struct LinExpr {
    terms: Vec<(VarId, f64)>,
}

impl LinExpr {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn term(mut self, var: VarId, coeff: f64) -> Self {
        self.terms.push((var, coeff));
        self
    }

    pub fn add(&mut self, var: VarId, coeff: f64) {
        self.terms.push((var, coeff));
    }

    pub fn sum(vars: impl IntoIterator<Item = VarId>) -> Self {
        vars.into_iter().map(|var| (var, 1.0)).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    /// Terms sorted by variable, with repeated variables merged and zeros dropped.
    pub fn compact(&self) -> Vec<(VarId, f64)> {
        let mut terms = self.terms.clone();
        terms.sort_by_key(|&(var, _)| var);

        let mut merged = Vec::<(VarId, f64)>::with_capacity(terms.len());
        for (var, coeff) in terms {
            match merged.last_mut() {
                Some((last, acc)) if *last == var => *acc += coeff,
                _ => merged.push((var, coeff)),
            }
        }
        merged.retain(|&(_, coeff)| coeff != 0.0);
        merged
    }

    pub fn eval(&self, values: &[f64]) -> f64 {
        self.terms.iter().map(|&(var, coeff)| coeff * values[var.to_usize()]).sum()
    }
}

impl FromIterator<(VarId, f64)> for LinExpr {
    fn from_iter<I: IntoIterator<Item = (VarId, f64)>>(iter: I) -> Self {
        Self { terms: iter.into_iter().collect() }
    }
}

#[derive(Clone, Debug)]
pub struct Constraint {
    pub expr: LinExpr,
    pub cmp: Cmp,
    pub rhs: f64,
}

/// A mixed integer linear program, as handed to an [`Engine`](super::Engine).
#[derive(Clone, Debug)]
pub struct Program {
    pub sense: Sense,
    pub vars: IndexedVec<VarId, Var>,
    pub objective: LinExpr,
    pub constraints: Vec<Constraint>,
}

impl Program {
    pub fn new(sense: Sense) -> Self {
        Self { sense, vars: IndexedVec::new(), objective: LinExpr::new(), constraints: Vec::new() }
    }

    pub fn add_continuous(&mut self, lower: f64, upper: f64) -> VarId {
        self.vars.push(Var { kind: VarKind::Continuous, lower, upper })
    }

    pub fn add_binary(&mut self) -> VarId {
        self.vars.push(Var { kind: VarKind::Binary, lower: 0.0, upper: 1.0 })
    }

    pub fn add_constraint(&mut self, expr: LinExpr, cmp: Cmp, rhs: f64) {
        self.constraints.push(Constraint { expr, cmp, rhs });
    }

    pub fn set_objective(&mut self, objective: LinExpr) {
        self.objective = objective;
    }

    pub fn binary_count(&self) -> usize {
        self.vars.iter().filter(|v| v.kind == VarKind::Binary).count()
    }

    pub fn continuous_count(&self) -> usize {
        self.vars.len() - self.binary_count()
    }

    pub fn constraint_count(&self) -> usize {
        self.constraints.len()
    }

    /// Whether `values` respects every bound, integrality requirement and constraint.
    pub fn is_feasible(&self, values: &[f64], tol: f64) -> bool {
        let bounds = self.vars.iter().zip(values).all(|(var, &x)| {
            let integral = var.kind == VarKind::Continuous || (x - x.round()).abs() <= tol;
            integral && x >= var.lower - tol && x <= var.upper + tol
        });

        bounds && self.constraints.iter().all(|c| c.cmp.holds(c.expr.eval(values), c.rhs, tol))
    }
}
