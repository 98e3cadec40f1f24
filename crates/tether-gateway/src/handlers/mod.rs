mod health;
mod link;

pub use health::health_handler;
pub use link::{
    create_link_handler, delete_link_handler, fallback_handler, get_link_handler,
    increment_access_handler, link_stats_handler, missing_code_handler, update_link_handler,
};
