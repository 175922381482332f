//! trainer::adapter — expose a map objective to `argmin`.
//!
//! Purpose
//! -------
//! Bridge a [`MapObjective`] bound to a map structure into `argmin`'s
//! [`CostFunction`] + [`Gradient`] traits, and keep a side record of the
//! best iterate and evaluation counts that survives a failed run.
//!
//! Key behaviors
//! -------------
//! - `cost(θ)` evaluates `objective(map, θ, None)` and rejects non-finite
//!   values.
//! - `gradient(θ)` evaluates `objective(map, θ, Some(&mut g))` and validates
//!   `g`; on [`OptError::GradientNotImplemented`] it falls back to
//!   [`fd_gradient`] over `cost`.
//! - Every finite value seen updates the shared [`TrainingRecord`].
//!
//! Conventions
//! -----------
//! - The record lives outside the adapter (`&RefCell`) because the adapter
//!   is moved into the executor and is lost when the run errors.
use std::cell::RefCell;

use argmin::core::{CostFunction, Error, Gradient};

use crate::{
    map::ConditionalMap,
    optimization::{
        errors::OptError,
        trainer::{
            finite_diff::fd_gradient,
            traits::MapObjective,
            types::{Cost, FnEvalMap, Grad, Theta},
            validation::{validate_grad, validate_value},
        },
    },
};

/// Best iterate and evaluation counts seen by an [`ArgMinAdapter`].
#[derive(Debug, Clone, PartialEq)]
pub struct TrainingRecord {
    pub best_theta: Option<Theta>,
    pub best_value: Cost,
    pub cost_count: u64,
    pub gradient_count: u64,
}

impl Default for TrainingRecord {
    fn default() -> Self {
        Self { best_theta: None, best_value: f64::INFINITY, cost_count: 0, gradient_count: 0 }
    }
}

impl TrainingRecord {
    fn record(&mut self, theta: &Theta, value: Cost) {
        if self.best_theta.is_none() || value < self.best_value {
            self.best_theta = Some(theta.clone());
            self.best_value = value;
        }
    }

    pub fn fn_evals(&self) -> FnEvalMap {
        FnEvalMap::from([
            ("cost_count".to_string(), self.cost_count),
            ("gradient_count".to_string(), self.gradient_count),
        ])
    }
}

pub struct ArgMinAdapter<'a, O: MapObjective> {
    map: &'a dyn ConditionalMap,
    objective: &'a O,
    record: &'a RefCell<TrainingRecord>,
}

impl<'a, O: MapObjective> ArgMinAdapter<'a, O> {
    pub fn new(
        map: &'a dyn ConditionalMap, objective: &'a O, record: &'a RefCell<TrainingRecord>,
    ) -> Self {
        Self { map, objective, record }
    }
}

impl<'a, O: MapObjective> CostFunction for ArgMinAdapter<'a, O> {
    type Param = Theta;
    type Output = Cost;

    fn cost(&self, theta: &Self::Param) -> Result<Self::Output, Error> {
        self.record.borrow_mut().cost_count += 1;
        let value = self.objective.objective(self.map, theta, None)?;
        validate_value(value)?;
        self.record.borrow_mut().record(theta, value);
        Ok(value)
    }
}

impl<'a, O: MapObjective> Gradient for ArgMinAdapter<'a, O> {
    type Param = Theta;
    type Gradient = Grad;

    fn gradient(&self, theta: &Self::Param) -> Result<Self::Gradient, Error> {
        let dim = theta.len();
        let mut grad = Grad::zeros(dim);
        match self.objective.objective(self.map, theta, Some(&mut grad)) {
            Ok(value) => {
                self.record.borrow_mut().gradient_count += 1;
                validate_grad(&grad, dim)?;
                if value.is_finite() {
                    self.record.borrow_mut().record(theta, value);
                }
                Ok(grad)
            }
            Err(OptError::GradientNotImplemented) => fd_gradient(theta, |t| self.cost(t)),
            Err(e) => Err(e.into()),
        }
    }
}
