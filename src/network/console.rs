//! Console protocol seam
//!
//! The synchronizer only needs "log in" and "run a command, get text back".
//! Keeping that behind a trait lets tenants be tested against scripted
//! consoles instead of a live game server.

use futures_util::future::BoxFuture;

use crate::error::ConsoleError;

/// A logged-in console connection
pub trait Console: Send {
    /// Run a textual game command and return its textual response
    fn command<'a>(&'a mut self, command: &'a str) -> BoxFuture<'a, Result<String, ConsoleError>>;

    /// Close the connection
    fn close(&mut self) -> BoxFuture<'_, ()>;
}

/// Opens console connections
pub trait ConsoleConnector: Send + Sync {
    fn login<'a>(
        &'a self,
        address: &'a str,
        password: &'a str,
    ) -> BoxFuture<'a, Result<Box<dyn Console>, ConsoleError>>;
}
