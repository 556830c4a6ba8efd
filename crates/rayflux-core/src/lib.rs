// ─────────────────────────────────────────────────────────────────────
// Rayflux — Core
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Random-ray transport solver for 2D Cartesian lattices.
//!
//! Geometry and tracing: `geometry`, `sampler`, `tracer`
//! Sweep kernels: `attenuation`, `sweep`, `source`, `normalization`
//! Eigenvalue driver: `eigenvalue`, `statistics`

pub mod attenuation;
pub mod eigenvalue;
pub mod geometry;
pub mod normalization;
pub mod sampler;
pub mod source;
pub mod statistics;
pub mod sweep;
pub mod tracer;
