pub mod cache;
pub mod fs;
pub mod net;
pub mod proto;
pub mod shell;
pub mod sim;
pub mod utils;
