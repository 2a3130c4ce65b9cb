use thiserror::Error;

/// Errors surfaced by the boolean engine.
#[derive(Debug, Error, PartialEq)]
pub enum CsgError {
    /// The subtraction left fewer than three usable vertices.
    /// The target geometry must be left unchanged.
    #[error("operation produced no usable geometry ({vertex_count} vertices)")]
    EmptyResult { vertex_count: usize },

    /// Mesh buffers are inconsistent (length mismatch, index out of range).
    #[error("invalid mesh: {0}")]
    InvalidMesh(String),

    /// A world transform could not be inverted.
    #[error("world transform is singular")]
    SingularTransform,
}

/// Convenience type alias for results using [`CsgError`].
pub type Result<T> = std::result::Result<T, CsgError>;
