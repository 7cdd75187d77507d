pub mod add;
pub mod auth_cmd;
pub mod common;
pub mod completions;
pub mod config;
pub mod delete;
pub mod edit;
pub mod list;
pub mod toggle;

pub use add::run_add;
pub use auth_cmd::run_auth;
pub use completions::run_completions;
pub use config::run_config;
pub use delete::run_delete;
pub use edit::run_edit;
pub use list::run_list;
pub use toggle::run_toggle;
