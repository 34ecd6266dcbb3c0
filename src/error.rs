use thiserror::Error;

/// Errors reported by the model evaluation pipeline.
///
/// Input-domain problems (year outside the model window, coordinates outside
/// their physical range) are ordinary results of the contract, not panics;
/// they abort the evaluation before any partial output is produced.
#[derive(Debug, Error)]
pub enum MagError {
    #[error("decimal year {year} is outside model validity {min}..={max}")]
    YearOutOfRange { year: f64, min: f64, max: f64 },

    #[error("latitude {0} degrees is outside -90..=90")]
    LatitudeOutOfRange(f64),

    #[error("longitude {0} degrees is outside -180..=360")]
    LongitudeOutOfRange(f64),

    #[error("height {0} km is outside the model's tested band -1..=1900")]
    HeightOutOfRange(f64),

    /// The high-degree Legendre recurrence cannot form derivatives at
    /// |sin(latitude)| = 1; pole evaluations must take the low-degree path.
    #[error("Legendre derivative undefined at the geographic pole")]
    PoleDerivative,

    #[error("bad coefficient file: {0}")]
    BadCoefficientFile(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, MagError>;
