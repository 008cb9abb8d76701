pub mod failure;
pub mod release;
