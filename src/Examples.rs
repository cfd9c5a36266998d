//! examples of usage of RustedJacobian
/// finite-difference jacobians compared with analytic ones
pub mod jacobian_examples;
