//! Pre-trained emission model and the estimation pipeline around it.
//!
//! - [`regressor`] - The [`Regressor`](regressor::Regressor) trait and the exported
//!   estimator families (linear, tree ensemble)
//! - [`artifact`] - Loading the JSON model export with its metadata
//! - [`predictor`] - Output guards around a loaded regressor
//! - [`pipeline`] - Encode → scale → predict, with the cross-artifact column checks
//!
//! Artifacts are loaded once and shared by reference; every estimation request builds its
//! own feature vectors and never mutates the model.

pub mod artifact;
pub mod pipeline;
pub mod predictor;
pub mod regressor;
