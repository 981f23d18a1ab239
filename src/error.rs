use thiserror::Error;

/// Top-level error type for the simulator
#[derive(Error, Debug)]
pub enum SimError {
    #[error("error parsing instruction on line {line}: {msg}")]
    Parse { line: usize, msg: String },

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Failed to parse YAML configuration: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Division by zero in instruction {seq}")]
    DivideByZero { seq: u32 },

    #[error("Memory address out of bounds: {addr} (memory holds {size} words)")]
    AddressOutOfBounds { addr: i32, size: usize },
}

pub type SimResult<T> = Result<T, SimError>;
