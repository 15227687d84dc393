/// Cambios del árbol entregados por el observer del host, en orden de llegada
#[derive(Debug, Clone)]
pub enum MutationRecord<N> {
    /// Nodos insertados bajo el subárbol observado
    ChildList { added: Vec<N> },
    /// Un atributo de `target` cambió
    Attributes { target: N, name: Option<String> },
    /// Cualquier otro tipo (characterData, etc.)
    Other,
}

/// Opciones de suscripción, equivalentes a `MutationObserverInit`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ObserveOptions {
    pub child_list: bool,
    pub attributes: bool,
    pub subtree: bool,
}

impl ObserveOptions {
    /// Estructura + atributos sobre todo el subárbol del body.
    pub fn body_subtree() -> Self {
        Self {
            child_list: true,
            attributes: true,
            subtree: true,
        }
    }
}

/// Callback que recibe cada lote de registros
pub type MutationCallback<N> = Box<dyn FnMut(Vec<MutationRecord<N>>)>;
