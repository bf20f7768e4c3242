use thiserror::Error;

/// Everything that can abort a run. All variants are detected before the
/// simulation loop starts; the loop itself has no recoverable error states
/// (near-zero distances and densities are clamped, not reported).
#[derive(Debug, Error)]
pub enum SimError {
    #[error("time steps must be numeric")]
    NonNumericTimeSteps,

    #[error("invalid number of time steps: {0}")]
    InvalidTimeSteps(i64),

    #[error("cannot open {path} for reading")]
    InputFile {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot open {path} for writing")]
    OutputFile {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("file too short to contain a particle header")]
    MalformedHeader,

    #[error("invalid number of particles: {0}")]
    InvalidParticleCount(i32),

    #[error("number of particles mismatch; header: {header}, found: {found}")]
    ParticleCountMismatch { header: i32, found: usize },

    #[error("failed parsing constants file {path}: {message}")]
    ConstantsFile { path: String, message: String },
}

impl SimError {
    /// Process exit code for each failure class.
    pub fn exit_code(&self) -> i32 {
        match self {
            SimError::NonNumericTimeSteps | SimError::ConstantsFile { .. } => -1,
            SimError::InvalidTimeSteps(_) => -2,
            SimError::InputFile { .. } => -3,
            SimError::OutputFile { .. } => -4,
            SimError::MalformedHeader
            | SimError::InvalidParticleCount(_)
            | SimError::ParticleCountMismatch { .. } => -5,
        }
    }
}
