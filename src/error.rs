//! Error types for crestline.
//!
//! Curvature estimation itself never fails on bad geometry: degenerate faces
//! and unresolved vertices are recovered locally and reported through
//! [`CurvatureDiagnostics`](crate::algo::curvature::CurvatureDiagnostics).
//! The errors here cover input validation, the strict singular-fit policy,
//! and the document I/O layer.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using [`MeshError`].
pub type Result<T> = std::result::Result<T, MeshError>;

/// Errors that can occur while building meshes or estimating curvature.
#[derive(Error, Debug)]
pub enum MeshError {
    /// The mesh has no faces.
    #[error("mesh has no faces")]
    EmptyMesh,

    /// A face references an invalid vertex index.
    #[error("face {face} references invalid vertex index {vertex}")]
    InvalidVertexIndex {
        /// The face index.
        face: usize,
        /// The invalid vertex index.
        vertex: usize,
    },

    /// The normal array does not match the position array.
    #[error("mesh has {positions} positions but {normals} normals")]
    NormalCountMismatch {
        /// Number of vertex positions.
        positions: usize,
        /// Number of vertex normals supplied.
        normals: usize,
    },

    /// The per-face second fundamental form fit had a singular system.
    #[error("ill-conditioned curvature fit on face {face} at vertex {vertex}")]
    IllConditionedFit {
        /// The face index.
        face: usize,
        /// The vertex whose corner was being fitted.
        vertex: usize,
    },

    /// File I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON (de)serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Error loading mesh from file.
    #[error("failed to load mesh from {path}: {message}")]
    LoadError {
        /// The file path.
        path: PathBuf,
        /// Error message.
        message: String,
    },

    /// Error saving a document to file.
    #[error("failed to save to {path}: {message}")]
    SaveError {
        /// The file path.
        path: PathBuf,
        /// Error message.
        message: String,
    },

    /// Invalid parameter value.
    #[error("invalid parameter: {name} = {value} ({reason})")]
    InvalidParameter {
        /// Parameter name.
        name: &'static str,
        /// The invalid value (as string).
        value: String,
        /// Reason the value is invalid.
        reason: &'static str,
    },
}

impl MeshError {
    /// Create an invalid parameter error.
    pub fn invalid_param<T: std::fmt::Display>(
        name: &'static str,
        value: T,
        reason: &'static str,
    ) -> Self {
        MeshError::InvalidParameter {
            name,
            value: value.to_string(),
            reason,
        }
    }
}
