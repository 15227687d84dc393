use tab_gain_core::{
    AudioError,
    traits::{AudioGraph, AudioState, DomNode, GainControl},
};
use wasm_bindgen::JsCast;
use web_sys::{AudioContext, AudioContextState, GainNode, HtmlMediaElement, MediaElementAudioSourceNode};

use crate::dom::{WebNode, describe};

/// `AudioContext` compartido por todos los reproductores de la página
pub struct WebAudio {
    ctx: AudioContext,
}

#[derive(Clone)]
pub struct WebGain(GainNode);

impl WebAudio {
    pub fn new() -> Result<Self, AudioError> {
        let ctx = AudioContext::new().map_err(backend)?;
        Ok(WebAudio { ctx })
    }
}

impl AudioGraph for WebAudio {
    type Element = WebNode;
    type Source = MediaElementAudioSourceNode;
    type Gain = WebGain;

    fn state(&self) -> AudioState {
        match self.ctx.state() {
            AudioContextState::Running => AudioState::Running,
            AudioContextState::Closed => AudioState::Closed,
            _ => AudioState::Suspended,
        }
    }

    /// Pide la reanudación; el navegador la completa cuando su política de
    /// autoplay lo permita.
    fn resume(&self) -> Result<(), AudioError> {
        self.ctx.resume().map(drop).map_err(backend)
    }

    fn create_source(&self, element: &WebNode) -> Result<Self::Source, AudioError> {
        let media = element
            .0
            .dyn_ref::<HtmlMediaElement>()
            .ok_or_else(|| AudioError::UnsupportedElement(element.node_name()))?;
        self.ctx.create_media_element_source(media).map_err(backend)
    }

    fn create_gain(&self, initial: f32) -> Result<WebGain, AudioError> {
        let node = self.ctx.create_gain().map_err(backend)?;
        node.gain().set_value(initial);
        Ok(WebGain(node))
    }

    fn connect_source(&self, source: &Self::Source, gain: &WebGain) -> Result<(), AudioError> {
        source
            .connect_with_audio_node(&gain.0)
            .map(drop)
            .map_err(backend)
    }

    fn connect_destination(&self, gain: &WebGain) -> Result<(), AudioError> {
        gain.0
            .connect_with_audio_node(&self.ctx.destination())
            .map(drop)
            .map_err(backend)
    }
}

impl GainControl for WebGain {
    fn value(&self) -> f32 {
        self.0.gain().value()
    }

    fn set_value(&self, value: f32) {
        self.0.gain().set_value(value);
    }
}

fn backend(e: wasm_bindgen::JsValue) -> AudioError {
    AudioError::Backend(describe(&e))
}
