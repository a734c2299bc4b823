pub mod console;
pub mod migrate;
pub mod setup;
pub mod site;
