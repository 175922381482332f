//! objectives — ready-made [`MapObjective`](crate::optimization::trainer::MapObjective)s.
//!
//! - [`KLObjective`]: sample-based KL divergence against a standard normal
//!   reference, with train and test errors.

pub mod kl;

pub use self::kl::KLObjective;
