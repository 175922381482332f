//! trainer::builders — solver construction from [`TrainOptions`].
//!
//! Each builder returns an inner `argmin` solver wrapped in a
//! [`ToleranceGuard`] carrying the change-based criteria and evaluation
//! budget. Initial coefficients, the iteration cap, the target cost and the
//! timeout are runtime concerns applied by [`run`](crate::optimization::trainer::run).
use argmin::solver::gradientdescent::SteepestDescent;

use crate::optimization::{
    errors::OptResult,
    trainer::{
        guard::ToleranceGuard,
        traits::TrainOptions,
        types::{
            HagerZhangLS, LbfgsHagerZhang, LbfgsMoreThuente, MoreThuenteLS, SteepestDescentMT,
        },
    },
};

pub fn build_lbfgs_more_thuente(
    opts: &TrainOptions,
) -> OptResult<ToleranceGuard<LbfgsMoreThuente>> {
    opts.validate()?;
    let lbfgs = LbfgsMoreThuente::new(MoreThuenteLS::new(), opts.lbfgs_mem);
    Ok(ToleranceGuard::new(lbfgs, opts))
}

pub fn build_lbfgs_hager_zhang(
    opts: &TrainOptions,
) -> OptResult<ToleranceGuard<LbfgsHagerZhang>> {
    opts.validate()?;
    let lbfgs = LbfgsHagerZhang::new(HagerZhangLS::new(), opts.lbfgs_mem);
    Ok(ToleranceGuard::new(lbfgs, opts))
}

pub fn build_steepest_descent(
    opts: &TrainOptions,
) -> OptResult<ToleranceGuard<SteepestDescentMT>> {
    opts.validate()?;
    Ok(ToleranceGuard::new(SteepestDescent::new(MoreThuenteLS::new()), opts))
}
