/// Reference count of autohide requests.
///
/// Several independent parties may ask for autohide at once (a fullscreen
/// window on the output, the user's configuration), the window stays in
/// autohide mode until all of them released it.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct AutohideCounter {
    count: u32,
}

impl AutohideCounter {
    pub fn count(&self) -> u32 {
        self.count
    }

    pub fn is_active(&self) -> bool {
        self.count > 0
    }

    /// Returns true when this request turned autohide on.
    pub fn increase(&mut self) -> bool {
        self.count = self.count.saturating_add(1);
        self.count == 1
    }

    /// Returns true when this release turned autohide off. Releasing an
    /// inactive counter does nothing.
    pub fn decrease(&mut self) -> bool {
        if self.count == 0 {
            return false;
        }
        self.count -= 1;
        self.count == 0
    }
}
