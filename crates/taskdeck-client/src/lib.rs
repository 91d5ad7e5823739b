pub mod board;
pub mod cache;
pub mod editor;
pub mod state;

pub use board::BoardController;
pub use cache::{QueryClient, QueryState, Tag};
pub use editor::TaskEditor;
pub use state::UiState;
