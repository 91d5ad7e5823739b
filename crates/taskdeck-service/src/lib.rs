mod http;
mod local;
mod traits;

pub use http::{HttpService, SessionProvider};
pub use local::LocalService;
pub use traits::{ServiceError, TaskService};
