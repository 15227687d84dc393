use std::{
    cell::{Cell, RefCell},
    rc::Rc,
};

use crate::{
    error::AudioError,
    traits::{AudioGraph, AudioState, DomNode, GainControl},
};

use super::dom::MemoryNode;

/// Tipos de nodo que pueden alimentar un `MediaElementSource`.
const MEDIA_TAGS: [&str; 2] = ["VIDEO", "AUDIO"];

struct AudioInner {
    state: AudioState,
    captured: Vec<MemoryNode>,
    links: Vec<(usize, usize)>,
    destination_inputs: Vec<usize>,
    gains_created: usize,
    fail_gain_creation: bool,
    fail_connections: bool,
}

/// Contexto de audio simulado con un único destino compartido.
#[derive(Clone)]
pub struct MemoryAudio {
    inner: Rc<RefCell<AudioInner>>,
}

#[derive(Debug)]
pub struct MemorySource {
    index: usize,
}

#[derive(Debug, Clone)]
pub struct MemoryGain {
    index: usize,
    value: Rc<Cell<f32>>,
}

impl MemoryAudio {
    /// Contexto ya en marcha.
    pub fn new() -> Self {
        Self::with_state(AudioState::Running)
    }

    pub fn with_state(state: AudioState) -> Self {
        MemoryAudio {
            inner: Rc::new(RefCell::new(AudioInner {
                state,
                captured: Vec::new(),
                links: Vec::new(),
                destination_inputs: Vec::new(),
                gains_created: 0,
                fail_gain_creation: false,
                fail_connections: false,
            })),
        }
    }

    pub fn suspend(&self) {
        let mut inner = self.inner.borrow_mut();
        if inner.state == AudioState::Running {
            inner.state = AudioState::Suspended;
        }
    }

    pub fn close(&self) {
        self.inner.borrow_mut().state = AudioState::Closed;
    }

    pub fn fail_gain_creation(&self, fail: bool) {
        self.inner.borrow_mut().fail_gain_creation = fail;
    }

    /// Hace fallar `connect_source` y `connect_destination`.
    pub fn fail_connections(&self, fail: bool) {
        self.inner.borrow_mut().fail_connections = fail;
    }

    /// Elementos que ya tienen un source creado.
    pub fn sources_created(&self) -> usize {
        self.inner.borrow().captured.len()
    }

    /// Nodos de ganancia conectados al destino.
    pub fn destination_inputs(&self) -> usize {
        self.inner.borrow().destination_inputs.len()
    }

    /// `true` si el source `source` alimenta el gain `gain`.
    pub fn is_linked(&self, source: usize, gain: usize) -> bool {
        self.inner.borrow().links.contains(&(source, gain))
    }
}

impl Default for MemoryAudio {
    fn default() -> Self {
        Self::new()
    }
}

impl AudioGraph for MemoryAudio {
    type Element = MemoryNode;
    type Source = MemorySource;
    type Gain = MemoryGain;

    fn state(&self) -> AudioState {
        self.inner.borrow().state
    }

    fn resume(&self) -> Result<(), AudioError> {
        let mut inner = self.inner.borrow_mut();
        match inner.state {
            AudioState::Closed => Err(AudioError::Closed),
            _ => {
                inner.state = AudioState::Running;
                Ok(())
            }
        }
    }

    fn create_source(&self, element: &MemoryNode) -> Result<MemorySource, AudioError> {
        let name = element.node_name();
        if !MEDIA_TAGS.iter().any(|tag| name.eq_ignore_ascii_case(tag)) {
            return Err(AudioError::UnsupportedElement(name));
        }

        let mut inner = self.inner.borrow_mut();
        if inner.captured.contains(element) {
            return Err(AudioError::Backend(
                "element is already connected to a media element source".into(),
            ));
        }
        inner.captured.push(element.clone());
        Ok(MemorySource {
            index: inner.captured.len() - 1,
        })
    }

    fn create_gain(&self, initial: f32) -> Result<MemoryGain, AudioError> {
        let mut inner = self.inner.borrow_mut();
        if inner.fail_gain_creation {
            return Err(AudioError::Backend("gain node creation failed".into()));
        }
        inner.gains_created += 1;
        Ok(MemoryGain {
            index: inner.gains_created - 1,
            value: Rc::new(Cell::new(initial)),
        })
    }

    fn connect_source(&self, source: &MemorySource, gain: &MemoryGain) -> Result<(), AudioError> {
        let mut inner = self.inner.borrow_mut();
        if inner.fail_connections {
            return Err(AudioError::Backend("could not connect source".into()));
        }
        inner.links.push((source.index, gain.index));
        Ok(())
    }

    fn connect_destination(&self, gain: &MemoryGain) -> Result<(), AudioError> {
        let mut inner = self.inner.borrow_mut();
        if inner.fail_connections {
            return Err(AudioError::Backend("could not connect to destination".into()));
        }
        inner.destination_inputs.push(gain.index);
        Ok(())
    }
}

impl MemorySource {
    pub fn index(&self) -> usize {
        self.index
    }
}

impl MemoryGain {
    pub fn index(&self) -> usize {
        self.index
    }
}

impl GainControl for MemoryGain {
    fn value(&self) -> f32 {
        self.value.get()
    }

    fn set_value(&self, value: f32) {
        self.value.set(value);
    }
}
