use thiserror::Error;

#[derive(Error, Debug)]
pub enum RayfluxError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Dimension mismatch for {what}: expected {expected}, found {found}")]
    DimensionMismatch {
        what: String,
        expected: usize,
        found: usize,
    },

    #[error("Cell {cell} has material {material}, but only {n_materials} materials are defined")]
    InvalidMaterial {
        cell: usize,
        material: usize,
        n_materials: usize,
    },

    #[error("Physics constraint violated: {0}")]
    PhysicsViolation(String),

    #[error("Parse error in {path} (entry {entry}): {message}")]
    Parse {
        path: String,
        entry: usize,
        message: String,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("NPY error: {0}")]
    Npy(String),
}

pub type RayfluxResult<T> = Result<T, RayfluxError>;
