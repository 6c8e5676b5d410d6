use crate::credentials::Credential;
use crate::types::{Domain, StateKind};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoachError {
    #[error("{state} is incomplete: '{field}' is empty, describe it before generating a plan")]
    MissingField { state: StateKind, field: Domain },

    #[error("profile not found: run 'pathcoach profile set' first")]
    MissingProfile,

    #[error(
        "no {} key found: set {} or run 'pathcoach key set {}'",
        .0.label(),
        .0.env_var(),
        .0.as_str()
    )]
    MissingCredential(Credential),

    #[error("{} key must not be empty", .0.label())]
    EmptyCredential(Credential),

    #[error("no song lyrics yet: run 'pathcoach song lyrics' first")]
    MissingLyrics,

    #[error("no unfinished audio task to resume: run 'pathcoach song audio' to start one")]
    NothingToResume,

    #[error("the service returned a response in an unexpected format ({0}); please try again")]
    MalformedResponse(String),

    #[error("unknown quiz question: {0}")]
    UnknownQuestion(u8),

    #[error("invalid answer {option} for question {question}: choose 0-3")]
    InvalidAnswer { question: u8, option: u8 },

    #[error("home directory not found: set HOME or pass --root")]
    HomeNotFound,

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, CoachError>;
