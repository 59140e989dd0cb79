//! Command implementations.

pub mod apply;
pub mod catalogue;
pub mod config;
pub mod run;

pub use self::apply::execute_apply;
pub use self::catalogue::execute_catalogue;
pub use self::config::execute_config;
pub use self::run::execute_run;
