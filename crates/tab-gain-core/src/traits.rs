use crate::{
    error::{AudioError, HostError},
    events::{MutationCallback, ObserveOptions},
};

/// Trait para abstraer un nodo del documento del host
pub trait DomNode: Clone {
    /// Nombre del nodo tal como lo reporta el DOM (`VIDEO`, `DIV`, `#text`…)
    fn node_name(&self) -> String;
    fn attribute(&self, name: &str) -> Option<String>;
    fn set_attribute(&self, name: &str, value: &str) -> Result<(), HostError>;
    fn remove_attribute(&self, name: &str) -> Result<(), HostError>;
}

/// Trait para abstraer la observación de mutaciones sobre el body
pub trait MutationObserve {
    type Node: DomNode;

    fn subscribe(
        &self,
        options: ObserveOptions,
        callback: MutationCallback<Self::Node>,
    ) -> Result<(), HostError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AudioState {
    Suspended,
    Running,
    Closed,
}

/// Punto de control de ganancia vivo dentro del grafo del host
pub trait GainControl {
    fn value(&self) -> f32;
    fn set_value(&self, value: f32);
}

/// Trait para abstraer el grafo de audio del host (un único destino compartido)
pub trait AudioGraph {
    type Element: DomNode;
    type Source;
    type Gain: GainControl;

    fn state(&self) -> AudioState;
    fn resume(&self) -> Result<(), AudioError>;

    fn create_source(&self, element: &Self::Element) -> Result<Self::Source, AudioError>;
    fn create_gain(&self, initial: f32) -> Result<Self::Gain, AudioError>;

    fn connect_source(&self, source: &Self::Source, gain: &Self::Gain) -> Result<(), AudioError>;
    fn connect_destination(&self, gain: &Self::Gain) -> Result<(), AudioError>;
}
