pub mod compare;
pub mod reconstruct;
