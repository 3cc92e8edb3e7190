mod http;
pub use http::HttpApi;

mod poll;
pub use poll::poll_comments;

mod state;
pub use state::{ThreadState, Vote};

pub mod api {
    pub use braid_api::*;
}
