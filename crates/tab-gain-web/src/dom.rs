use std::cell::RefCell;

use js_sys::Array;
use tab_gain_core::{
    HostError,
    events::{MutationCallback, MutationRecord, ObserveOptions},
    traits::{DomNode, MutationObserve},
};
use tracing::{Level, instrument, trace};
use wasm_bindgen::{JsCast, JsValue, closure::Closure};
use web_sys::{Document, Element, HtmlElement, MutationObserver, MutationObserverInit};

type ObserverClosure = Closure<dyn FnMut(Array, MutationObserver)>;

/// Nodo del DOM del navegador
#[derive(Debug, Clone)]
pub struct WebNode(pub web_sys::Node);

impl WebNode {
    fn element(&self) -> Result<&Element, HostError> {
        self.0
            .dyn_ref::<Element>()
            .ok_or_else(|| HostError::NotAnElement {
                node: self.0.node_name(),
            })
    }
}

impl DomNode for WebNode {
    fn node_name(&self) -> String {
        self.0.node_name()
    }

    fn attribute(&self, name: &str) -> Option<String> {
        self.0.dyn_ref::<Element>()?.get_attribute(name)
    }

    fn set_attribute(&self, name: &str, value: &str) -> Result<(), HostError> {
        self.element()?
            .set_attribute(name, value)
            .map_err(|e| HostError::AttributeWrite {
                name: name.to_string(),
                reason: describe(&e),
            })
    }

    fn remove_attribute(&self, name: &str) -> Result<(), HostError> {
        self.element()?
            .remove_attribute(name)
            .map_err(|e| HostError::AttributeWrite {
                name: name.to_string(),
                reason: describe(&e),
            })
    }
}

/// Body del documento observado con un `MutationObserver`.
///
/// El observer y su closure se guardan aquí para que sigan vivos mientras
/// exista el documento.
pub struct WebDocument {
    body: HtmlElement,
    observer: RefCell<Option<(MutationObserver, ObserverClosure)>>,
}

impl WebDocument {
    pub fn new(document: &Document) -> Result<Self, HostError> {
        let body = document.body().ok_or(HostError::NoBody)?;
        Ok(WebDocument {
            body,
            observer: RefCell::new(None),
        })
    }
}

impl MutationObserve for WebDocument {
    type Node = WebNode;

    #[instrument(skip_all, level = Level::DEBUG, err)]
    fn subscribe(
        &self,
        options: ObserveOptions,
        mut callback: MutationCallback<WebNode>,
    ) -> Result<(), HostError> {
        if self.observer.borrow().is_some() {
            return Err(HostError::Subscribe("the body is already observed".into()));
        }

        let closure = ObserverClosure::new(move |records: Array, _: MutationObserver| {
            let batch: Vec<MutationRecord<WebNode>> = records
                .iter()
                .filter_map(|r| r.dyn_into::<web_sys::MutationRecord>().ok())
                .map(convert)
                .collect();
            trace!("Delivering {} mutation record(s)", batch.len());
            callback(batch);
        });

        let observer = MutationObserver::new(closure.as_ref().unchecked_ref())
            .map_err(|e| HostError::Subscribe(describe(&e)))?;

        let init = MutationObserverInit::new();
        init.set_child_list(options.child_list);
        init.set_attributes(options.attributes);
        init.set_subtree(options.subtree);

        observer
            .observe_with_options(&self.body, &init)
            .map_err(|e| HostError::Subscribe(describe(&e)))?;

        *self.observer.borrow_mut() = Some((observer, closure));
        Ok(())
    }
}

fn convert(record: web_sys::MutationRecord) -> MutationRecord<WebNode> {
    match record.type_().as_str() {
        "childList" => {
            let nodes = record.added_nodes();
            MutationRecord::ChildList {
                added: (0..nodes.length())
                    .filter_map(|i| nodes.item(i))
                    .map(WebNode)
                    .collect(),
            }
        }
        "attributes" => match record.target() {
            Some(target) => MutationRecord::Attributes {
                target: WebNode(target),
                name: record.attribute_name(),
            },
            None => MutationRecord::Other,
        },
        _ => MutationRecord::Other,
    }
}

pub(crate) fn describe(value: &JsValue) -> String {
    value.as_string().unwrap_or_else(|| format!("{value:?}"))
}
