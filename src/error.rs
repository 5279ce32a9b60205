use thiserror::Error;

#[derive(Error, Debug)]
pub enum EcgError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("WAV error: {0}")]
    Wav(#[from] hound::Error),

    #[error("Invalid sample on line {line}: {token:?}")]
    Parse { line: usize, token: String },

    #[error("Sample {value} out of range for {bits}-bit input")]
    SampleOutOfRange { value: i64, bits: u32 },
}

pub type Result<T> = std::result::Result<T, EcgError>;
