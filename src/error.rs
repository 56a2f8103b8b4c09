use thiserror::Error;

#[derive(Error, Debug)]
pub enum RunappError {
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Cannot start {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Cannot register handler for {signal}: {source}")]
    SignalRegistration {
        signal: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to kill app (pid {pid}): {source}")]
    KillFailed {
        pid: u32,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid signal: {name}")]
    InvalidSignal { name: String },

    #[error("System error: {message}")]
    System { message: String },
}

impl RunappError {
    pub fn system<S: Into<String>>(message: S) -> Self {
        Self::System {
            message: message.into(),
        }
    }

    pub fn invalid_signal<S: Into<String>>(name: S) -> Self {
        Self::InvalidSignal { name: name.into() }
    }
}

pub type Result<T> = std::result::Result<T, RunappError>;
