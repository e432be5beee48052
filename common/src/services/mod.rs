pub mod activities;

/// Coarse error class, independent of transport.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    NotFound,
    Conflict,
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ServiceError {
    #[error("Activity not found")]
    ActivityNotFound { activity: String },
    #[error("Student already signed up")]
    AlreadySignedUp { activity: String, email: String },
    #[error("Student is not signed up for this activity")]
    ParticipantNotFound { activity: String, email: String },
}

impl ServiceError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::ActivityNotFound { .. } | Self::ParticipantNotFound { .. } => {
                ErrorKind::NotFound
            }
            Self::AlreadySignedUp { .. } => ErrorKind::Conflict,
        }
    }

    /// HTTP status the error is reported with. Duplicate signups are a 400,
    /// not a 409.
    pub fn code(&self) -> u16 {
        match self.kind() {
            ErrorKind::NotFound => 404,
            ErrorKind::Conflict => 400,
        }
    }
}
