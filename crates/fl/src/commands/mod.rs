pub mod check;
pub mod compile;
pub mod completion;
pub mod config_cmd;
pub mod run;
pub mod validate;
pub mod version;
