use tracing::{debug, error, warn};

use crate::{
    events::MutationRecord,
    installer::Installed,
    session::GainSession,
    traits::{AudioGraph, DomNode},
};

/// Conteo de lo que ocurrió en un lote de mutaciones
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispatchReport {
    pub installed: usize,
    pub updated: usize,
    pub skipped: usize,
    pub failed: usize,
}

impl<A: AudioGraph> GainSession<A> {
    /// Enruta un lote de registros: nodos añadidos al instalador, cambios del
    /// marcador al actualizador. Ningún error sale de aquí; solo se registran.
    pub fn dispatch(&mut self, records: Vec<MutationRecord<A::Element>>) -> DispatchReport {
        let mut report = DispatchReport::default();

        for record in records {
            match record {
                MutationRecord::ChildList { added } => {
                    for node in &added {
                        if !self.is_unmarked_player(node) {
                            report.skipped += 1;
                            continue;
                        }
                        match self.install(node) {
                            Ok(Installed::Attached { .. }) => report.installed += 1,
                            Ok(Installed::Skipped(reason)) => {
                                debug!("Skipped {}: {reason:?}", node.node_name());
                                report.skipped += 1;
                            }
                            Err(e) => {
                                error!("Couldn't set up audio gain for {}: {e}", node.node_name());
                                report.failed += 1;
                            }
                        }
                    }
                }
                MutationRecord::Attributes { target, name }
                    if name.as_deref() == Some(self.config.gain_attribute.as_str()) =>
                {
                    match self.apply_gain_change(&target) {
                        Ok(_) => report.updated += 1,
                        Err(e) => {
                            error!("Couldn't update gain: {e}");
                            report.failed += 1;
                        }
                    }
                }
                MutationRecord::Attributes { .. } | MutationRecord::Other => {}
            }
        }

        if report.failed > 0 {
            warn!("{} mutation(s) could not be handled", report.failed);
        }
        report
    }

    fn is_unmarked_player(&self, node: &A::Element) -> bool {
        self.config.is_player(&node.node_name())
            && node.attribute(&self.config.gain_attribute).is_none()
    }
}
