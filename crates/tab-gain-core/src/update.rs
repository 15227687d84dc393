use tracing::{Level, info, instrument};

use crate::{
    error::UpdateError,
    ids::VideoId,
    session::GainSession,
    traits::{AudioGraph, DomNode, GainControl},
};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GainUpdate {
    pub id: VideoId,
    pub previous: f32,
    pub gain: f32,
}

impl<A: AudioGraph> GainSession<A> {
    /// Aplica el valor del marcador de `element` a su nodo de ganancia registrado.
    ///
    /// El cambio es inmediato: el host lo usa en el siguiente buffer que procese.
    #[instrument(skip_all, level = Level::TRACE)]
    pub fn apply_gain_change(&mut self, element: &A::Element) -> Result<GainUpdate, UpdateError> {
        let raw_gain = element.attribute(&self.config.gain_attribute);
        let raw_id = element.attribute(&self.config.id_attribute);

        let gain = raw_gain
            .as_deref()
            .and_then(parse_gain)
            .ok_or_else(|| UpdateError::InvalidGain {
                id: raw_id.clone(),
                raw: raw_gain.clone(),
            })?;
        let id = raw_id
            .as_deref()
            .and_then(|raw| raw.parse::<VideoId>().ok())
            .ok_or_else(|| UpdateError::InvalidId {
                raw: raw_id.clone(),
                gain: raw_gain.clone(),
            })?;

        let handle = self.registry.lookup(id)?;
        let previous = handle.value();
        handle.set_value(gain);

        info!("Updated gain for video ID {id}: {previous} -> {gain}");
        Ok(GainUpdate { id, previous, gain })
    }
}

/// `NaN` e infinitos cuentan como valores no parseables.
fn parse_gain(raw: &str) -> Option<f32> {
    raw.trim().parse::<f32>().ok().filter(|g| g.is_finite())
}
