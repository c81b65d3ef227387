// sampler/arithmetic.rs — binary combinators over two child samplers
//
// Both children are queried with the same seed and coordinates. The operator
// is a plain tag; the derivative rule for each operator lives next to its
// scalar rule so the two can't drift apart.

use super::Sampler;
use serde::{Deserialize, Serialize};

/// Binary operator applied to two child samples.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ArithmeticOp {
    Add,
    Sub,
    Mul,
    Div,
    Min,
    Max,
}

impl ArithmeticOp {
    #[inline(always)]
    pub fn operate(self, left: f64, right: f64) -> f64 {
        match self {
            ArithmeticOp::Add => left + right,
            ArithmeticOp::Sub => left - right,
            ArithmeticOp::Mul => left * right,
            ArithmeticOp::Div => left / right,
            ArithmeticOp::Min => left.min(right),
            ArithmeticOp::Max => left.max(right),
        }
    }

    /// Min and Max are non-smooth where the children tie, and no subgradient
    /// convention is picked for them.
    pub fn is_differentiable(self) -> bool {
        !matches!(self, ArithmeticOp::Min | ArithmeticOp::Max)
    }

    pub fn name(self) -> &'static str {
        match self {
            ArithmeticOp::Add => "Add",
            ArithmeticOp::Sub => "Sub",
            ArithmeticOp::Mul => "Mul",
            ArithmeticOp::Div => "Div",
            ArithmeticOp::Min => "Min",
            ArithmeticOp::Max => "Max",
        }
    }

    /// Combine `[value, partials...]` vectors of the two children.
    #[inline]
    pub fn operate_derivative<const N: usize>(self, left: [f64; N], right: [f64; N]) -> [f64; N] {
        let mut out = left;
        match self {
            ArithmeticOp::Add => {
                for (o, r) in out.iter_mut().zip(right) {
                    *o += r;
                }
            }
            ArithmeticOp::Sub => {
                for (o, r) in out.iter_mut().zip(right) {
                    *o -= r;
                }
            }
            ArithmeticOp::Mul => {
                // (lr)' = l'r + lr'
                let (l, r) = (left[0], right[0]);
                for (o, dr) in out.iter_mut().zip(right).skip(1) {
                    *o = *o * r + l * dr;
                }
                out[0] = l * r;
            }
            ArithmeticOp::Div => {
                // (l/r)' = (l'r - lr') / r²
                let (l, r) = (left[0], right[0]);
                let r2 = r * r;
                for (o, dr) in out.iter_mut().zip(right).skip(1) {
                    *o = (*o * r - l * dr) / r2;
                }
                out[0] = l / r;
            }
            ArithmeticOp::Min | ArithmeticOp::Max => {
                unreachable!(
                    "{} has no derivative rule; rejected by into_differentiable",
                    self.name()
                )
            }
        }
        out
    }
}

/// `op(left, right)` over two owned child samplers.
#[derive(Debug, Clone)]
pub struct BinaryArithmetic {
    op: ArithmeticOp,
    left: Box<Sampler>,
    right: Box<Sampler>,
}

impl BinaryArithmetic {
    pub fn new(op: ArithmeticOp, left: Sampler, right: Sampler) -> Self {
        BinaryArithmetic {
            op,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    pub fn op(&self) -> ArithmeticOp {
        self.op
    }

    pub fn left(&self) -> &Sampler {
        &self.left
    }

    pub fn right(&self) -> &Sampler {
        &self.right
    }

    #[inline]
    pub fn sample_2d(&self, seed: i64, x: f64, y: f64) -> f64 {
        self.op
            .operate(self.left.sample_2d(seed, x, y), self.right.sample_2d(seed, x, y))
    }

    #[inline]
    pub fn sample_3d(&self, seed: i64, x: f64, y: f64, z: f64) -> f64 {
        self.op.operate(
            self.left.sample_3d(seed, x, y, z),
            self.right.sample_3d(seed, x, y, z),
        )
    }

    #[inline]
    pub(crate) fn derivative_2d(&self, seed: i64, x: f64, y: f64) -> [f64; 3] {
        self.op.operate_derivative(
            self.left.derivative_2d(seed, x, y),
            self.right.derivative_2d(seed, x, y),
        )
    }

    #[inline]
    pub(crate) fn derivative_3d(&self, seed: i64, x: f64, y: f64, z: f64) -> [f64; 4] {
        self.op.operate_derivative(
            self.left.derivative_3d(seed, x, y, z),
            self.right.derivative_3d(seed, x, y, z),
        )
    }
}
