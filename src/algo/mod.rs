//! Mesh processing algorithms.
//!
//! - **Curvature**: principal curvature directions and magnitudes, by the
//!   normal-cycle tensor or by per-face second fundamental form fitting

pub mod curvature;
