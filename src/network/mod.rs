//! Network subsystem for the game-server console (RCON)

pub mod console;
pub mod rcon;

pub use console::{Console, ConsoleConnector};
pub use rcon::{RconConnector, RconConsole};
