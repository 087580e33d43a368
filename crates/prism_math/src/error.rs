use thiserror::Error;

/// Errors raised while building geometric quantities from scene data.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MathError {
    #[error("cannot compute the bounds of an empty point set")]
    EmptyPointSet,

    #[error("object transform is not invertible (determinant {0:e})")]
    SingularTransform(f64),
}

pub type MathResult<T> = Result<T, MathError>;
