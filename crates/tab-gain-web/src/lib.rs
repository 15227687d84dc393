//! Enlace con el navegador: `MutationObserver` + `AudioContext` vía `web-sys`.
//!
//! Cargar el módulo solo instala el logging; el cargador tiene que llamar a
//! `start()` o `startWithConfig(json)` para empezar a observar la página.

mod audio;
mod dom;
mod logging;

use std::cell::RefCell;

use tab_gain_core::{
    AudioError, BoostConfig, ConfigError, GainSession, HostError, SessionHandle, attach,
};
use thiserror::Error;
use tracing::{Level, error, info};
use wasm_bindgen::prelude::*;

pub use audio::{WebAudio, WebGain};
pub use dom::{WebDocument, WebNode};

#[derive(Error, Debug)]
pub enum StartError {
    #[error("Tab gain is already running on this page")]
    AlreadyRunning,

    #[error("No window or document available")]
    NoDocument,

    #[error("Could not read the page URL: {0}")]
    Location(String),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Host(#[from] HostError),

    #[error(transparent)]
    Audio(#[from] AudioError),
}

/// Sesión activa junto al documento que mantiene vivo el observer
struct Page {
    _document: WebDocument,
    _session: SessionHandle<WebAudio>,
}

thread_local! {
    static PAGE: RefCell<Option<Page>> = const { RefCell::new(None) };
}

#[wasm_bindgen(start)]
pub fn main_js() {
    console_error_panic_hook::set_once();
    logging::init(Level::INFO);
}

/// Arranca con la configuración por defecto (refuerzo 1.75).
#[wasm_bindgen]
pub fn start() -> Result<(), JsError> {
    boot(BoostConfig::default()).map_err(report)
}

/// Arranca con una configuración JSON; los campos ausentes toman su valor por defecto.
#[wasm_bindgen(js_name = startWithConfig)]
pub fn start_with_config(json: &str) -> Result<(), JsError> {
    let config = BoostConfig::from_json(json)
        .map_err(StartError::from)
        .map_err(report)?;
    boot(config).map_err(report)
}

fn boot(config: BoostConfig) -> Result<(), StartError> {
    if PAGE.with(|p| p.borrow().is_some()) {
        return Err(StartError::AlreadyRunning);
    }

    let window = web_sys::window().ok_or(StartError::NoDocument)?;
    let url = window
        .location()
        .href()
        .map_err(|e| StartError::Location(dom::describe(&e)))?;
    if !config.matches_page(&url)? {
        info!("{url} does not match {}, staying idle", config.page_pattern);
        return Ok(());
    }

    let document = window.document().ok_or(StartError::NoDocument)?;
    let observed = WebDocument::new(&document)?;
    let session = GainSession::new(config, WebAudio::new()?);
    let handle = attach(session, &observed)?;

    PAGE.with(|p| {
        *p.borrow_mut() = Some(Page {
            _document: observed,
            _session: handle,
        })
    });
    Ok(())
}

fn report(e: StartError) -> JsError {
    error!("Couldn't start tab gain: {e}");
    JsError::new(&e.to_string())
}
