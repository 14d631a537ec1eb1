pub mod codes;
pub mod health;

pub use codes::{
    create_codes_handler, delete_code_handler, get_code_handler, list_codes_handler,
    purge_invalid_handler, search_codes_handler, update_code_handler, update_status_handler,
};
pub use health::health_handler;
