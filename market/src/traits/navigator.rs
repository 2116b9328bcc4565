/// The host navigation system (browser history, router, terminal UI...).
pub trait Navigator: Send + Sync {
    /// Replace the current location with `path`.
    fn navigate(&self, path: &str);
}
