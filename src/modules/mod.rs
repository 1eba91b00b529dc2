pub mod io;
pub mod matcher;
pub mod parser;
