//! Crate `tab_gain_core`: refuerzo de volumen para reproductores de vídeo de una página.
//!
//! Observa el body, monta `source → gain → destination` una sola vez por cada
//! `<video>` nuevo y aplica los cambios que se escriban en su atributo marcador.
//! El DOM y el audio del host llegan a través de los traits de [`traits`].

pub mod config;
mod dispatcher;
pub mod error;
pub mod events;
pub mod ids;
mod installer;
pub mod memory;
pub mod registry;
pub mod session;
pub mod traits;
mod update;

pub use crate::config::{BoostConfig, BoostConfigBuilder, DEFAULT_AUDIO_GAIN};
pub use dispatcher::DispatchReport;
pub use error::{AudioError, ConfigError, HostError, InstallError, RegistryError, UpdateError};
pub use ids::{IdSource, VideoId};
pub use installer::{Installed, SkipReason};
pub use registry::GainRegistry;
pub use session::{GainSession, SessionHandle, attach};
pub use update::GainUpdate;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        config::{ATTRIBUTE_GAIN_MARKER as GAIN, ATTRIBUTE_VIDEO_ID as VID},
        events::MutationRecord,
        memory::{MemoryAudio, MemoryDocument, MemoryNode},
        traits::{AudioGraph, AudioState, DomNode},
    };

    fn page() -> (MemoryDocument, MemoryAudio, SessionHandle<MemoryAudio>) {
        let doc = MemoryDocument::new();
        let audio = MemoryAudio::new();
        let session = GainSession::new(BoostConfig::default(), audio.clone());
        let handle = attach(session, &doc).unwrap();
        (doc, audio, handle)
    }

    fn insert_video(doc: &MemoryDocument) -> MemoryNode {
        let video = doc.create_element("video");
        doc.append_to_body(&video);
        doc.flush();
        video
    }

    #[test]
    fn scenario_two_videos_then_update_first() {
        let (doc, audio, session) = page();

        let v1 = insert_video(&doc);
        assert_eq!(v1.attribute(GAIN).as_deref(), Some("1.75"));
        assert_eq!(v1.attribute(VID).as_deref(), Some("0"));
        assert_eq!(session.borrow().gain_of(VideoId(0)), Some(1.75));

        let v2 = insert_video(&doc);
        assert_eq!(v2.attribute(GAIN).as_deref(), Some("1.75"));
        assert_eq!(v2.attribute(VID).as_deref(), Some("1"));
        assert_eq!(session.borrow().gain_of(VideoId(1)), Some(1.75));

        v1.set_attribute(GAIN, "3.0").unwrap();
        doc.flush();

        let session = session.borrow();
        assert_eq!(session.gain_of(VideoId(0)), Some(3.0));
        assert_eq!(session.gain_of(VideoId(1)), Some(1.75));
        assert_eq!(session.registry().len(), 2);
        assert_eq!(audio.destination_inputs(), 2);
    }

    #[test]
    fn ids_follow_discovery_order() {
        let (doc, _, session) = page();
        let videos: Vec<MemoryNode> = (0..5).map(|_| insert_video(&doc)).collect();

        for (expected, video) in videos.iter().enumerate() {
            assert_eq!(video.attribute(VID), Some(expected.to_string()));
        }
        let session = session.borrow();
        assert_eq!(session.ids().issued(), 5);
        let mut ids: Vec<u64> = session.registry().iter().map(|(id, _)| id.0).collect();
        ids.sort();
        assert_eq!(ids, vec![0, 1, 2, 3, 4]);
    }

    #[test]
    fn installing_twice_is_a_no_op() {
        let doc = MemoryDocument::new();
        let audio = MemoryAudio::new();
        let mut session = GainSession::new(BoostConfig::default(), audio.clone());
        let video = doc.create_element("video");

        let first = session.install(&video).unwrap();
        assert_eq!(
            first,
            Installed::Attached {
                id: VideoId(0),
                gain: 1.75
            }
        );
        let attrs = video.attribute_names();

        let second = session.install(&video).unwrap();
        assert_eq!(second, Installed::Skipped(SkipReason::AlreadyInstalled));
        assert_eq!(session.registry().len(), 1);
        assert_eq!(video.attribute_names(), attrs);
        assert_eq!(video.attribute(VID).as_deref(), Some("0"));
        assert_eq!(audio.sources_created(), 1);
    }

    #[test]
    fn marker_write_does_not_reinstall() {
        let (doc, audio, session) = page();
        let video = doc.create_element("video");
        doc.append_to_body(&video);

        // lote 1: childList; lote 2: los dos atributos escritos por el instalador
        assert_eq!(doc.flush(), 2);
        assert_eq!(session.borrow().registry().len(), 1);
        assert_eq!(audio.sources_created(), 1);
        assert_eq!(session.borrow().gain_of(VideoId(0)), Some(1.75));
    }

    #[test]
    fn non_players_are_ignored() {
        let (doc, audio, session) = page();
        let div = doc.create_element("div");
        doc.append_to_body(&div);
        doc.append_to_body(&doc.create_text());
        doc.append_to_body(&doc.create_element("audio"));
        doc.flush();

        assert!(session.borrow().registry().is_empty());
        assert_eq!(audio.sources_created(), 0);
        assert!(div.attribute(GAIN).is_none());
    }

    #[test]
    fn dispatch_reports_outcomes() {
        let doc = MemoryDocument::new();
        let mut session = GainSession::new(BoostConfig::default(), MemoryAudio::new());
        let video = doc.create_element("video");
        let div = doc.create_element("div");

        let report = session.dispatch(vec![
            MutationRecord::ChildList {
                added: vec![video.clone(), div.clone()],
            },
            MutationRecord::Other,
            MutationRecord::Attributes {
                target: div,
                name: Some("class".into()),
            },
        ]);
        assert_eq!(
            report,
            DispatchReport {
                installed: 1,
                updated: 0,
                skipped: 1,
                failed: 0
            }
        );

        video.set_attribute(GAIN, "0.5").unwrap();
        let report = session.dispatch(vec![MutationRecord::Attributes {
            target: video,
            name: Some(GAIN.into()),
        }]);
        assert_eq!(report.updated, 1);
        assert_eq!(session.gain_of(VideoId(0)), Some(0.5));
    }

    #[test]
    fn update_sets_the_registered_multiplier() {
        let doc = MemoryDocument::new();
        let mut session = GainSession::new(BoostConfig::default(), MemoryAudio::new());
        let video = doc.create_element("video");
        session.install(&video).unwrap();

        video.set_attribute(GAIN, "0.5").unwrap();
        let update = session.apply_gain_change(&video).unwrap();
        assert_eq!(
            update,
            GainUpdate {
                id: VideoId(0),
                previous: 1.75,
                gain: 0.5
            }
        );
        assert_eq!(session.gain_of(VideoId(0)), Some(0.5));
    }

    #[test]
    fn update_without_id_leaves_registry_untouched() {
        let (doc, _, session) = page();
        let installed = insert_video(&doc);

        // un vídeo al que alguien puso el marcador a mano, sin id
        let stranger = doc.create_element("video");
        stranger.set_attribute(GAIN, "4.0").unwrap();
        doc.append_to_body(&stranger);
        doc.flush();
        stranger.set_attribute(GAIN, "5.0").unwrap();
        let report = session.borrow_mut().dispatch(vec![MutationRecord::Attributes {
            target: stranger.clone(),
            name: Some(GAIN.into()),
        }]);

        assert_eq!(report.failed, 1);
        let session = session.borrow();
        assert_eq!(session.registry().len(), 1);
        assert_eq!(session.gain_of(VideoId(0)), Some(1.75));
        assert!(installed.attribute(VID).is_some());
        assert!(matches!(
            session.registry().lookup(VideoId(1)),
            Err(RegistryError::UnknownId(_))
        ));
    }

    #[test]
    fn unparseable_values_are_reported() {
        let doc = MemoryDocument::new();
        let mut session = GainSession::new(BoostConfig::default(), MemoryAudio::new());
        let video = doc.create_element("video");
        session.install(&video).unwrap();

        video.set_attribute(GAIN, "very loud").unwrap();
        assert!(matches!(
            session.apply_gain_change(&video),
            Err(UpdateError::InvalidGain { .. })
        ));

        video.set_attribute(GAIN, "2").unwrap();
        video.set_attribute(VID, "zero").unwrap();
        assert!(matches!(
            session.apply_gain_change(&video),
            Err(UpdateError::InvalidId { .. })
        ));

        video.set_attribute(VID, "99").unwrap();
        assert_eq!(
            session.apply_gain_change(&video),
            Err(UpdateError::Registry(RegistryError::UnknownId(VideoId(99))))
        );
        assert_eq!(session.gain_of(VideoId(0)), Some(1.75));
    }

    #[test]
    fn failed_graph_leaves_no_partial_entry() {
        let doc = MemoryDocument::new();
        let audio = MemoryAudio::new();
        audio.fail_gain_creation(true);
        let mut session = GainSession::new(BoostConfig::default(), audio.clone());
        let video = doc.create_element("video");

        assert!(matches!(
            session.install(&video),
            Err(InstallError::Audio(AudioError::Backend(_)))
        ));
        assert!(session.registry().is_empty());
        assert_eq!(session.ids().issued(), 0);
        assert!(video.attribute_names().is_empty());
    }

    #[test]
    fn install_can_be_retried_after_gain_failure() {
        let doc = MemoryDocument::new();
        let audio = MemoryAudio::new();
        audio.fail_gain_creation(true);
        let mut session = GainSession::new(BoostConfig::default(), audio.clone());
        let video = doc.create_element("video");

        assert!(session.install(&video).is_err());
        assert_eq!(audio.sources_created(), 0);
        assert!(video.attribute(GAIN).is_none());

        audio.fail_gain_creation(false);
        assert_eq!(
            session.install(&video),
            Ok(Installed::Attached {
                id: VideoId(0),
                gain: 1.75
            })
        );
        assert_eq!(audio.sources_created(), 1);
        assert_eq!(audio.destination_inputs(), 1);
    }

    #[test]
    fn failed_connection_leaves_element_unmarked() {
        let doc = MemoryDocument::new();
        let audio = MemoryAudio::new();
        audio.fail_connections(true);
        let mut session = GainSession::new(BoostConfig::default(), audio.clone());
        let video = doc.create_element("video");

        assert!(matches!(
            session.install(&video),
            Err(InstallError::Audio(AudioError::Backend(_)))
        ));
        assert!(session.registry().is_empty());
        assert_eq!(session.ids().issued(), 0);
        assert_eq!(audio.destination_inputs(), 0);
        assert!(video.attribute_names().is_empty());
    }

    #[test]
    fn nested_player_in_added_wrapper_is_not_discovered() {
        let (doc, audio, session) = page();
        let wrapper = doc.create_element("div");
        let video = doc.create_element("video");
        wrapper.append_child(&video);
        doc.append_to_body(&wrapper);
        doc.flush();

        assert!(session.borrow().registry().is_empty());
        assert_eq!(audio.sources_created(), 0);
        assert!(video.attribute(GAIN).is_none());
    }

    #[test]
    fn player_added_into_attached_wrapper_is_installed() {
        let (doc, audio, session) = page();
        let wrapper = doc.create_element("div");
        doc.append_to_body(&wrapper);
        doc.flush();

        let video = doc.create_element("video");
        wrapper.append_child(&video);
        doc.flush();

        assert_eq!(video.attribute(GAIN).as_deref(), Some("1.75"));
        assert_eq!(video.attribute(VID).as_deref(), Some("0"));
        assert_eq!(session.borrow().gain_of(VideoId(0)), Some(1.75));
        assert_eq!(audio.sources_created(), 1);
    }

    #[test]
    fn failed_stamp_rolls_back_marker() {
        let doc = MemoryDocument::new();
        let mut session = GainSession::new(BoostConfig::default(), MemoryAudio::new());
        let video = doc.create_element("video");
        video.reject_writes_of(VID);

        assert!(matches!(
            session.install(&video),
            Err(InstallError::Host(HostError::AttributeWrite { .. }))
        ));
        assert!(video.attribute(GAIN).is_none());
        assert!(session.registry().is_empty());
    }

    #[test]
    fn suspended_audio_is_resumed_by_default() {
        let doc = MemoryDocument::new();
        let audio = MemoryAudio::with_state(AudioState::Suspended);
        let mut session = GainSession::new(BoostConfig::default(), audio.clone());

        session.install(&doc.create_element("video")).unwrap();
        assert_eq!(audio.state(), AudioState::Running);
    }

    #[test]
    fn suspended_or_closed_audio_fails_install() {
        let doc = MemoryDocument::new();
        let config = BoostConfigBuilder::default()
            .resume_suspended(false)
            .build()
            .unwrap();
        let audio = MemoryAudio::with_state(AudioState::Suspended);
        let mut session = GainSession::new(config, audio.clone());
        let video = doc.create_element("video");

        assert_eq!(
            session.install(&video),
            Err(InstallError::Audio(AudioError::Suspended))
        );
        audio.close();
        assert_eq!(
            session.install(&video),
            Err(InstallError::Audio(AudioError::Closed))
        );
        assert!(video.attribute(GAIN).is_none());
        assert!(session.registry().is_empty());
    }

    #[test]
    fn sessions_are_independent() {
        let (doc, _, first) = page();
        let config = BoostConfigBuilder::default()
            .default_gain(2.5_f32)
            .build()
            .unwrap();
        let other = MemoryDocument::new();
        let second = attach(GainSession::new(config, MemoryAudio::new()), &other).unwrap();

        let video = insert_video(&other);
        assert_eq!(video.attribute(GAIN).as_deref(), Some("2.5"));
        assert_eq!(second.borrow().gain_of(VideoId(0)), Some(2.5));
        assert!(first.borrow().registry().is_empty());
        assert_eq!(doc.pending(), 0);
    }
}
