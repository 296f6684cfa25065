pub mod debug;
pub mod generate;
pub mod scan;
