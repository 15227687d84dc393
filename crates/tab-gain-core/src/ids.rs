use std::{
    fmt,
    num::ParseIntError,
    str::FromStr,
    sync::atomic::{AtomicU64, Ordering},
};

/// Identificador de un reproductor dentro de la sesión de la página.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VideoId(pub u64);

impl fmt::Display for VideoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for VideoId {
    type Err = ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse::<u64>().map(VideoId)
    }
}

/// Secuencia 0, 1, 2, … que nunca se reinicia ni reutiliza valores.
#[derive(Debug, Default)]
pub struct IdSource {
    next: AtomicU64,
}

impl IdSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Devuelve el siguiente identificador libre.
    pub fn next(&self) -> VideoId {
        VideoId(self.next.fetch_add(1, Ordering::Relaxed))
    }

    /// Cantidad de identificadores entregados hasta ahora.
    pub fn issued(&self) -> u64 {
        self.next.load(Ordering::Relaxed)
    }
}
