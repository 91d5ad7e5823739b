pub mod attachment;
pub mod board;
pub mod comment;
pub mod project;
pub mod search;
pub mod task;
pub mod team;
pub mod user;

pub use attachment::Attachment;
pub use board::{Board, BoardColumn};
pub use comment::Comment;
pub use project::{CreateProject, Project};
pub use search::SearchResults;
pub use task::{CreateTask, DeletedTask, Priority, Status, Task, UpdateTask};
pub use team::Team;
pub use user::{CreateUser, User};
