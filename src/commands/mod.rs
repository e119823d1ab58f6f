pub mod requirements;
pub mod segment;
pub mod status;
