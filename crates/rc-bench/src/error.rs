use thiserror::Error;

#[derive(Error, Debug)]
pub enum BenchError {
    #[error("invalid benchmark configuration: {0}")]
    InvalidConfig(String),
    #[error("tensor error: {0}")]
    Tensor(#[from] rc_tensor::TensorError),
}

pub type Result<T> = std::result::Result<T, BenchError>;
