//! Editor view abstraction.
//!
//! The view is the handle the upload engine keeps across an upload: it is
//! cheap to clone, can be moved into a spawned task, and gives short,
//! exclusive access to the current state whenever the engine needs to read
//! or mutate it. It also owns the host's coordinate-to-position mapping.

use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::document::{DocumentTree, EditorState};
use crate::node::Node;
use crate::types::Coords;

/// Platform-specific view operations.
///
/// Implementations must never hand out the state across an await point; the
/// engine only touches it inside the closures below.
pub trait EditorView: Clone + Send + Sync + 'static {
    /// The state container behind the view.
    type State: DocumentTree;

    /// Run `f` with exclusive access to the current state.
    fn update<R>(&self, f: impl FnOnce(&mut Self::State) -> R) -> R;

    /// Run `f` against the current state.
    fn read<R>(&self, f: impl FnOnce(&Self::State) -> R) -> R {
        self.update(|state| f(state))
    }

    /// Map viewport coordinates to a document position.
    ///
    /// Returns None if the point is outside the document.
    fn pos_at_coords(&self, coords: Coords) -> Option<usize>;
}

type CoordsMapper = Arc<dyn Fn(Coords) -> Option<usize> + Send + Sync>;

/// Reference view: an `EditorState` behind a mutex plus an optional
/// coordinate mapper supplied by the host.
#[derive(Clone)]
pub struct SharedView {
    state: Arc<Mutex<EditorState>>,
    coords: Option<CoordsMapper>,
}

impl fmt::Debug for SharedView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SharedView")
            .field("state", &self.state)
            .field("coords", &self.coords.is_some())
            .finish()
    }
}

impl SharedView {
    pub fn new(state: EditorState) -> Self {
        Self {
            state: Arc::new(Mutex::new(state)),
            coords: None,
        }
    }

    /// Install the host's coordinate mapping.
    pub fn with_coords<F>(mut self, mapper: F) -> Self
    where
        F: Fn(Coords) -> Option<usize> + Send + Sync + 'static,
    {
        self.coords = Some(Arc::new(mapper));
        self
    }

    /// Clone of the current document.
    pub fn doc(&self) -> Node {
        self.lock().doc().clone()
    }

    /// Whether two handles point at the same state.
    pub fn same_view(&self, other: &SharedView) -> bool {
        Arc::ptr_eq(&self.state, &other.state)
    }

    fn lock(&self) -> MutexGuard<'_, EditorState> {
        // Transactions commit in one assignment, so a poisoned state is still consistent.
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl EditorView for SharedView {
    type State = EditorState;

    fn update<R>(&self, f: impl FnOnce(&mut EditorState) -> R) -> R {
        let mut guard = self.lock();
        f(&mut guard)
    }

    fn pos_at_coords(&self, coords: Coords) -> Option<usize> {
        let mapper = self.coords.as_ref()?;
        let pos = mapper(coords)?;
        let size = self.read(|state| state.doc().content_size());
        (pos <= size).then_some(pos)
    }
}
