pub mod app;
pub mod collaborators;
pub mod logging;
pub mod script;
pub mod utils;
