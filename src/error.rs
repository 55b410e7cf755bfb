use thiserror::Error;

/// An action that cannot be carried out right now. The reason is shown to the
/// player as-is, and the turn is not consumed.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct Impossible(pub String);

impl Impossible {
    pub fn new<S: Into<String>>(reason: S) -> Self {
        Self(reason.into())
    }

    pub fn reason(&self) -> &str {
        &self.0
    }
}

#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("room layout for floor {floor} did not converge after {restarts} restarts")]
    RestartsExhausted { floor: u32, restarts: u32 },

    #[error("a {width}x{height} map is too small for {what}")]
    MapTooSmall {
        width: i32,
        height: i32,
        what: &'static str,
    },

    #[error("first room anchor ({x}, {y}) is not inside a {width}x{height} map")]
    AnchorOutOfBounds { x: i32, y: i32, width: i32, height: i32 },
}

/// Failure of a performed action. Only `Impossible` is an expected game-state
/// signal; anything else must reach the caller.
#[derive(Debug, Error)]
pub enum ActionError {
    #[error(transparent)]
    Impossible(#[from] Impossible),

    #[error(transparent)]
    Generation(#[from] GenerationError),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read '{path}': {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid TOML in '{path}': {source}")]
    Parse {
        path: String,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid setting: {0}")]
    Invalid(String),
}
