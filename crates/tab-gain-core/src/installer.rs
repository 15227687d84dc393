use tracing::{Level, info, instrument, warn};

use crate::{
    error::{AudioError, HostError, InstallError},
    ids::VideoId,
    session::GainSession,
    traits::{AudioGraph, AudioState, DomNode, GainControl},
};

/// Resultado de pasar un nodo por el instalador
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Installed {
    Attached { id: VideoId, gain: f32 },
    Skipped(SkipReason),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    NotAPlayer,
    AlreadyInstalled,
}

impl<A: AudioGraph> GainSession<A> {
    /// Monta `source → gain → destination` para un reproductor recién descubierto.
    ///
    /// La operación es atómica respecto al registro: o se registra un nodo
    /// completamente conectado, o no se registra nada y el elemento queda sin
    /// marcar. Un elemento que ya lleva el marcador se omite sin efectos.
    #[instrument(skip_all, level = Level::DEBUG, fields(node = %element.node_name()))]
    pub fn install(&mut self, element: &A::Element) -> Result<Installed, InstallError> {
        if !self.config.is_player(&element.node_name()) {
            return Ok(Installed::Skipped(SkipReason::NotAPlayer));
        }
        if element.attribute(&self.config.gain_attribute).is_some() {
            return Ok(Installed::Skipped(SkipReason::AlreadyInstalled));
        }

        self.ensure_audio_running()?;
        let gain = self.audio.create_gain(self.config.default_gain)?;

        // Crear el source captura el elemento para siempre: todo lo que puede
        // fallar sin dejar rastro va antes.
        let source = self.audio.create_source(element)?;
        self.audio.connect_source(&source, &gain)?;
        self.audio.connect_destination(&gain)?;

        let id = self.ids.next();
        let value = gain.value();
        self.stamp(element, id, value)?;
        self.registry.register(id, gain)?;

        info!("Applied gain {value} to video ID {id}");
        Ok(Installed::Attached { id, gain: value })
    }

    fn ensure_audio_running(&self) -> Result<(), AudioError> {
        match self.audio.state() {
            AudioState::Running => Ok(()),
            AudioState::Closed => Err(AudioError::Closed),
            AudioState::Suspended if self.config.resume_suspended => {
                warn!("Audio context is suspended, requesting resume");
                self.audio.resume()
            }
            AudioState::Suspended => Err(AudioError::Suspended),
        }
    }

    /// Escribe marcador + id. Si falla, intenta dejar el elemento como estaba.
    fn stamp(&self, element: &A::Element, id: VideoId, gain: f32) -> Result<(), HostError> {
        let written = element
            .set_attribute(&self.config.gain_attribute, &gain.to_string())
            .and_then(|_| element.set_attribute(&self.config.id_attribute, &id.to_string()));

        if let Err(e) = written {
            for name in [&self.config.gain_attribute, &self.config.id_attribute] {
                if let Err(cleanup) = element.remove_attribute(name) {
                    warn!("Could not roll back attribute `{name}`: {cleanup}");
                }
            }
            return Err(e);
        }

        Ok(())
    }
}
