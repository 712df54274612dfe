pub mod inference;
pub mod io;
pub mod network;
pub mod system;
