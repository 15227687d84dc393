use std::path::Path;

use config::{Config, File};
use derive_builder::Builder;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Ganancia aplicada al descubrir un reproductor: un refuerzo útil sin clipping típico.
pub const DEFAULT_AUDIO_GAIN: f32 = 1.75;
pub const ATTRIBUTE_GAIN_MARKER: &str = "data-tab-gain";
pub const ATTRIBUTE_VIDEO_ID: &str = "data-tab-video-id";
pub const PLAYER_TAG: &str = "VIDEO";
pub const PAGE_PATTERN: &str = "https://www.twitch.tv/*";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Builder)]
#[builder(setter(into), default)]
#[serde(default)]
pub struct BoostConfig {
    pub default_gain: f32,
    pub gain_attribute: String,
    pub id_attribute: String,
    pub player_tag: String,
    /// Glob (`*` = cualquier cosa) de las URLs donde se activa el refuerzo
    pub page_pattern: String,
    /// Reanudar el contexto de audio si está suspendido en vez de fallar
    pub resume_suspended: bool,
}

impl Default for BoostConfig {
    fn default() -> Self {
        BoostConfig {
            default_gain: DEFAULT_AUDIO_GAIN,
            gain_attribute: ATTRIBUTE_GAIN_MARKER.to_string(),
            id_attribute: ATTRIBUTE_VIDEO_ID.to_string(),
            player_tag: PLAYER_TAG.to_string(),
            page_pattern: PAGE_PATTERN.to_string(),
            resume_suspended: true,
        }
    }
}

impl BoostConfig {
    /// Carga desde un fichero (formato deducido por la extensión) y valida.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let cfg = Config::builder()
            .add_source(File::from(path.as_ref()))
            .build()
            .map_err(ConfigError::Parse)?;
        let bc = cfg
            .try_deserialize::<BoostConfig>()
            .map_err(ConfigError::Parse)?;
        bc.validate()?;
        Ok(bc)
    }

    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let bc: BoostConfig = serde_json::from_str(json)?;
        bc.validate()?;
        Ok(bc)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.default_gain.is_finite() {
            return Err(ConfigError::Invalid(format!(
                "default_gain must be finite, got {}",
                self.default_gain
            )));
        }
        if self.gain_attribute.trim().is_empty() || self.id_attribute.trim().is_empty() {
            return Err(ConfigError::Invalid("attribute names cannot be empty".into()));
        }
        if self.gain_attribute == self.id_attribute {
            return Err(ConfigError::Invalid(format!(
                "gain and id attributes must differ (both are `{}`)",
                self.gain_attribute
            )));
        }
        if self.player_tag.trim().is_empty() {
            return Err(ConfigError::Invalid("player_tag cannot be empty".into()));
        }
        self.page_regex()?;
        Ok(())
    }

    /// `true` si `node_name` corresponde al tipo de reproductor configurado.
    pub fn is_player(&self, node_name: &str) -> bool {
        node_name.eq_ignore_ascii_case(&self.player_tag)
    }

    pub fn matches_page(&self, url: &str) -> Result<bool, ConfigError> {
        Ok(self.page_regex()?.is_match(url))
    }

    fn page_regex(&self) -> Result<Regex, ConfigError> {
        let body = self
            .page_pattern
            .split('*')
            .map(regex::escape)
            .collect::<Vec<_>>()
            .join(".*");
        Ok(Regex::new(&format!("^{body}$"))?)
    }
}
