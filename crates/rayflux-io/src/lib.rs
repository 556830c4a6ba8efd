// ─────────────────────────────────────────────────────────────────────
// Rayflux — I/O
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Problem input loading and result output.

pub mod material_map;
pub mod output;
pub mod report;
pub mod xs;

mod text;
