use thiserror::Error;

use crate::ids::VideoId;

/// Fallos del entorno DOM (escritura de atributos, suscripción del observer)
#[derive(Error, Debug, Clone, PartialEq)]
pub enum HostError {
    #[error("Node `{node}` does not accept attributes")]
    NotAnElement { node: String },

    #[error("Could not write attribute `{name}`: {reason}")]
    AttributeWrite { name: String, reason: String },

    #[error("Could not subscribe to document mutations: {0}")]
    Subscribe(String),

    #[error("The document has no body to observe")]
    NoBody,
}

/// Fallos del subsistema de audio del host
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AudioError {
    #[error("The audio context is closed")]
    Closed,

    #[error("The audio context is suspended and resuming is disabled")]
    Suspended,

    #[error("Element `{0}` cannot produce an audio source")]
    UnsupportedElement(String),

    #[error("Audio backend error: {0}")]
    Backend(String),
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum RegistryError {
    #[error("Video ID {0} is already registered")]
    Duplicate(VideoId),

    #[error("No gain node registered for video ID {0}")]
    UnknownId(VideoId),
}

/// Errores al montar la cadena source → gain → destination
#[derive(Error, Debug, Clone, PartialEq)]
pub enum InstallError {
    #[error(transparent)]
    Audio(#[from] AudioError),

    #[error(transparent)]
    Host(#[from] HostError),

    #[error(transparent)]
    Registry(#[from] RegistryError),
}

/// Errores al aplicar un nuevo valor de ganancia escrito en el marcador
#[derive(Error, Debug, Clone, PartialEq)]
pub enum UpdateError {
    #[error("Couldn't parse gain for video ID {id:?}: {raw:?}")]
    InvalidGain { id: Option<String>, raw: Option<String> },

    #[error("Couldn't parse video ID {raw:?} (gain: {gain:?})")]
    InvalidId { raw: Option<String>, gain: Option<String> },

    #[error(transparent)]
    Registry(#[from] RegistryError),
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Configuration parse error: {0}")]
    Parse(#[from] config::ConfigError),

    #[error("JSON configuration error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid page pattern: {0}")]
    Pattern(#[from] regex::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}
