pub mod finite;
pub mod table;
