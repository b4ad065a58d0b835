//! Default-shape factories.

use draft_model::Record;

/// Builds a fresh default shape for a draft.
///
/// Called on every initialize, update, clear, load and reload, so it must be
/// pure and must never hand out shared state.
pub trait ShapeFactory: Send + Sync {
    fn build(&self) -> Record;
}

impl<F> ShapeFactory for F
where
    F: Fn() -> Record + Send + Sync,
{
    fn build(&self) -> Record {
        self()
    }
}

/// Shape with no fields. Every draft is a superset of it.
#[derive(Debug, Clone, Copy, Default)]
pub struct EmptyShape;

impl ShapeFactory for EmptyShape {
    fn build(&self) -> Record {
        Record::new()
    }
}
