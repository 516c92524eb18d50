//! Integration tests for mondeploy
//!
//! Drive whole batches against scripted fleet tools and a temporary staging repo.

mod batch_scenarios;
mod helpers;
