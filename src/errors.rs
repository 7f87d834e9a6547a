/// Geometry rejected when a face is added to an [`Object3D`](crate::geom::Object3D).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InvalidGeometry {
    #[error("a face needs at least 3 vertices, got {count}")]
    TooFewVertices { count: usize },

    #[error("face references vertex {index}, but the object only has {vertex_count} vertices")]
    VertexOutOfRange { index: usize, vertex_count: usize },
}

/// Errors while parsing a color string.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InvalidColor {
    #[error("color must start with '#': {0}")]
    MissingHash(String),

    #[error("color must have 6 or 8 hex digits: {0}")]
    BadLength(String),

    #[error("invalid hex digits in color: {0}")]
    BadDigits(String),
}

/// A camera position that cannot produce a view.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum InvalidViewPoint {
    #[error("viewing distance must be positive and finite, got {rho}")]
    NonPositiveDistance { rho: f64 },

    #[error("view angles must be finite")]
    NonFinite,
}
