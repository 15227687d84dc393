//! Host en memoria: un documento con cola de mutaciones y un grafo de audio
//! simulado. Sirve para probar la sesión sin navegador.

mod audio;
mod dom;

pub use audio::{MemoryAudio, MemoryGain, MemorySource};
pub use dom::{MemoryDocument, MemoryNode};
