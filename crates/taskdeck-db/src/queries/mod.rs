pub mod attachments;
pub mod comments;
pub mod projects;
pub mod search;
pub mod tasks;
pub mod teams;
pub mod users;
