use std::{cell::RefCell, rc::Rc};

use tracing::{Level, info, instrument};

use crate::{
    config::BoostConfig,
    error::HostError,
    events::{MutationRecord, ObserveOptions},
    ids::{IdSource, VideoId},
    registry::GainRegistry,
    traits::{AudioGraph, GainControl, MutationObserve},
};

/// Contexto de una sesión de página: identificadores, registro y grafo de audio.
///
/// No hay estado global: varias sesiones independientes pueden coexistir.
pub struct GainSession<A: AudioGraph> {
    pub(crate) config: BoostConfig,
    pub(crate) audio: A,
    pub(crate) ids: IdSource,
    pub(crate) registry: GainRegistry<A::Gain>,
}

impl<A: AudioGraph> GainSession<A> {
    pub fn new(config: BoostConfig, audio: A) -> Self {
        GainSession {
            config,
            audio,
            ids: IdSource::new(),
            registry: GainRegistry::new(),
        }
    }

    pub fn config(&self) -> &BoostConfig {
        &self.config
    }

    pub fn ids(&self) -> &IdSource {
        &self.ids
    }

    pub fn registry(&self) -> &GainRegistry<A::Gain> {
        &self.registry
    }

    /// Ganancia actual del reproductor `id`, si está registrado.
    pub fn gain_of(&self, id: VideoId) -> Option<f32> {
        self.registry.lookup(id).ok().map(|gain| gain.value())
    }
}

/// Sesión compartida con el callback del observer.
pub type SessionHandle<A> = Rc<RefCell<GainSession<A>>>;

/// Suscribe la sesión una única vez al subárbol del body del observer.
///
/// Cada lote entregado se despacha de forma síncrona. No hay desuscripción: la
/// sesión vive lo mismo que la página.
#[instrument(skip_all, level = Level::DEBUG, err)]
pub fn attach<A, O>(session: GainSession<A>, observer: &O) -> Result<SessionHandle<A>, HostError>
where
    A: AudioGraph + 'static,
    O: MutationObserve<Node = A::Element>,
{
    let shared = Rc::new(RefCell::new(session));
    let target = Rc::clone(&shared);

    observer.subscribe(
        ObserveOptions::body_subtree(),
        Box::new(move |records: Vec<MutationRecord<A::Element>>| {
            target.borrow_mut().dispatch(records);
        }),
    )?;

    info!("Watching the page body for video players");
    Ok(shared)
}
