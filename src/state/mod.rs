pub mod context;
pub mod drag;
mod editor_state;
pub mod lasso;

pub use context::{EditorSession, SharedSession};
pub use drag::{DragSession, PositionChange};
pub use editor_state::InteractionState;
pub use lasso::LassoSession;
