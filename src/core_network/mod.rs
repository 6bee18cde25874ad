pub mod network;
pub mod pasv;

pub use pasv::{open_data_connection, PassiveAddress};
