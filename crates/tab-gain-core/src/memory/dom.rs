use std::{
    cell::RefCell,
    collections::{BTreeMap, HashSet},
    fmt,
    rc::{Rc, Weak},
};

use tracing::warn;

use crate::{
    error::HostError,
    events::{MutationCallback, MutationRecord, ObserveOptions},
    traits::{DomNode, MutationObserve},
};

/// Rondas máximas de `flush` antes de asumir un bucle de mutaciones.
const MAX_FLUSH_ROUNDS: usize = 64;

#[derive(Default)]
struct DocState {
    pending: Vec<MutationRecord<MemoryNode>>,
    options: Option<ObserveOptions>,
    callback: Option<MutationCallback<MemoryNode>>,
}

impl DocState {
    fn queue(&mut self, record: MutationRecord<MemoryNode>) {
        let Some(options) = self.options else { return };
        let wanted = match &record {
            MutationRecord::ChildList { .. } => options.child_list,
            MutationRecord::Attributes { .. } => options.attributes,
            MutationRecord::Other => false,
        };
        if wanted {
            self.pending.push(record);
        }
    }
}

/// Documento con un único body observable.
///
/// Como un `MutationObserver` real, los cambios se encolan y solo se entregan
/// cuando se llama a [`MemoryDocument::flush`].
#[derive(Clone, Default)]
pub struct MemoryDocument {
    state: Rc<RefCell<DocState>>,
}

struct NodeData {
    name: String,
    is_element: bool,
    attached: bool,
    attributes: BTreeMap<String, String>,
    children: Vec<MemoryNode>,
    rejected_writes: HashSet<String>,
}

#[derive(Clone)]
pub struct MemoryNode {
    data: Rc<RefCell<NodeData>>,
    doc: Weak<RefCell<DocState>>,
}

impl MemoryDocument {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn create_element(&self, tag: &str) -> MemoryNode {
        self.create_node(tag.to_ascii_uppercase(), true)
    }

    pub fn create_text(&self) -> MemoryNode {
        self.create_node("#text".to_string(), false)
    }

    fn create_node(&self, name: String, is_element: bool) -> MemoryNode {
        MemoryNode {
            data: Rc::new(RefCell::new(NodeData {
                name,
                is_element,
                attached: false,
                attributes: BTreeMap::new(),
                children: Vec::new(),
                rejected_writes: HashSet::new(),
            })),
            doc: Rc::downgrade(&self.state),
        }
    }

    /// Inserta `node` (y su subárbol) directamente bajo el body.
    pub fn append_to_body(&self, node: &MemoryNode) {
        node.mark_attached();
        self.state.borrow_mut().queue(MutationRecord::ChildList {
            added: vec![node.clone()],
        });
    }

    pub fn pending(&self) -> usize {
        self.state.borrow().pending.len()
    }

    /// Entrega los registros pendientes al callback hasta que no queden más.
    ///
    /// Los registros generados durante una entrega llegan en el lote siguiente.
    /// Devuelve el número de lotes entregados.
    pub fn flush(&self) -> usize {
        let mut rounds = 0;

        while rounds < MAX_FLUSH_ROUNDS {
            let (batch, callback) = {
                let mut state = self.state.borrow_mut();
                if state.pending.is_empty() {
                    break;
                }
                (std::mem::take(&mut state.pending), state.callback.take())
            };
            let Some(mut callback) = callback else {
                break;
            };

            callback(batch);
            self.state.borrow_mut().callback = Some(callback);
            rounds += 1;
        }

        if rounds == MAX_FLUSH_ROUNDS {
            warn!("Mutation delivery did not settle after {MAX_FLUSH_ROUNDS} rounds");
        }
        rounds
    }
}

impl MutationObserve for MemoryDocument {
    type Node = MemoryNode;

    fn subscribe(
        &self,
        options: ObserveOptions,
        callback: MutationCallback<MemoryNode>,
    ) -> Result<(), HostError> {
        let mut state = self.state.borrow_mut();
        if state.options.is_some() {
            return Err(HostError::Subscribe("the body is already observed".into()));
        }
        state.options = Some(options);
        state.callback = Some(callback);
        Ok(())
    }
}

impl MemoryNode {
    /// Añade `child` a este nodo; solo genera registro si este nodo ya está en el body.
    pub fn append_child(&self, child: &MemoryNode) {
        self.data.borrow_mut().children.push(child.clone());
        if self.data.borrow().attached {
            child.mark_attached();
            self.queue(MutationRecord::ChildList {
                added: vec![child.clone()],
            });
        }
    }

    /// Hace que las escrituras de `name` fallen, como un host que las rechaza.
    pub fn reject_writes_of(&self, name: &str) {
        self.data.borrow_mut().rejected_writes.insert(name.to_string());
    }

    pub fn attribute_names(&self) -> Vec<String> {
        self.data.borrow().attributes.keys().cloned().collect()
    }

    fn mark_attached(&self) {
        let children = {
            let mut data = self.data.borrow_mut();
            data.attached = true;
            data.children.clone()
        };
        for child in &children {
            child.mark_attached();
        }
    }

    fn queue(&self, record: MutationRecord<MemoryNode>) {
        if let Some(doc) = self.doc.upgrade() {
            doc.borrow_mut().queue(record);
        }
    }

    fn writable(&self, name: &str) -> Result<(), HostError> {
        let data = self.data.borrow();
        if !data.is_element {
            return Err(HostError::NotAnElement {
                node: data.name.clone(),
            });
        }
        if data.rejected_writes.contains(name) {
            return Err(HostError::AttributeWrite {
                name: name.to_string(),
                reason: "rejected by host".into(),
            });
        }
        Ok(())
    }

    fn notify_attribute(&self, name: &str) {
        if self.data.borrow().attached {
            self.queue(MutationRecord::Attributes {
                target: self.clone(),
                name: Some(name.to_string()),
            });
        }
    }
}

impl DomNode for MemoryNode {
    fn node_name(&self) -> String {
        self.data.borrow().name.clone()
    }

    fn attribute(&self, name: &str) -> Option<String> {
        self.data.borrow().attributes.get(name).cloned()
    }

    fn set_attribute(&self, name: &str, value: &str) -> Result<(), HostError> {
        self.writable(name)?;
        self.data
            .borrow_mut()
            .attributes
            .insert(name.to_string(), value.to_string());
        self.notify_attribute(name);
        Ok(())
    }

    fn remove_attribute(&self, name: &str) -> Result<(), HostError> {
        self.writable(name)?;
        let removed = self.data.borrow_mut().attributes.remove(name);
        if removed.is_some() {
            self.notify_attribute(name);
        }
        Ok(())
    }
}

impl PartialEq for MemoryNode {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.data, &other.data)
    }
}

impl fmt::Debug for MemoryNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let data = self.data.borrow();
        f.debug_struct("MemoryNode")
            .field("name", &data.name)
            .field("attributes", &data.attributes)
            .finish()
    }
}
