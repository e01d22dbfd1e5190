//! Network link (WiFi association and addressing)

use core::future::Future;

/// A network link that can be brought up on demand
pub trait Link {
    type Error;

    /// True once the link is associated and has an address
    fn is_up(&mut self) -> bool;

    /// Start an association attempt
    ///
    /// May return before the link is usable; callers poll [`Link::is_up`].
    fn join(&mut self) -> impl Future<Output = Result<(), Self::Error>>;

    /// Received signal strength in dBm
    fn signal_strength(&mut self) -> impl Future<Output = i32>;
}
