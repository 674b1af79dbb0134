pub mod print;
pub mod replay;
