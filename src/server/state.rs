use crate::solve::Solver;
use std::sync::Arc;

/// Shared router state. Cloned per request; the solver itself is shared.
#[derive(Clone)]
pub struct AppState {
    pub solver: Arc<Solver>,
}

impl AppState {
    pub fn new(solver: Arc<Solver>) -> Self {
        Self { solver }
    }
}
