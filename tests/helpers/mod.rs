#![allow(unused_imports, dead_code)]
pub mod test_db;
pub mod ticket_helpers;

pub use test_db::*;
pub use ticket_helpers::*;
