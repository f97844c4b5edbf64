/// Defines public-facing structures used in the web API
use serde::{Deserialize, Serialize};

mod clip;

pub use clip::{Clip, ClipCreate, ClipStats};

/// Liveness payload served at `/health`.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
pub struct Health {
    pub status: String,
}

/// Greeting served at the service root.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
pub struct Welcome {
    pub message: String,
}

/// The body of every error response.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
pub struct ErrorBody {
    pub error: String,
}
