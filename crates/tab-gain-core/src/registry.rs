use std::collections::{HashMap, hash_map::Entry};

use crate::{error::RegistryError, ids::VideoId};

/// Mapa `VideoId → nodo de ganancia`. Solo crece durante la sesión.
#[derive(Debug)]
pub struct GainRegistry<G> {
    entries: HashMap<VideoId, G>,
}

impl<G> Default for GainRegistry<G> {
    fn default() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }
}

impl<G> GainRegistry<G> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserta una entrada nueva. Un id repetido se rechaza sin tocar la existente.
    pub fn register(&mut self, id: VideoId, handle: G) -> Result<(), RegistryError> {
        match self.entries.entry(id) {
            Entry::Occupied(_) => Err(RegistryError::Duplicate(id)),
            Entry::Vacant(slot) => {
                slot.insert(handle);
                Ok(())
            }
        }
    }

    pub fn lookup(&self, id: VideoId) -> Result<&G, RegistryError> {
        self.entries.get(&id).ok_or(RegistryError::UnknownId(id))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&VideoId, &G)> {
        self.entries.iter()
    }
}
