//! Presentation anchor selection
//!
//! The platform needs a window to attach its sign-in sheet to. The
//! coordinator asks a `PresentationContextProvider` for one per request and
//! passes it along; it never renders anything itself.

/// Opaque handle to the window the sign-in sheet is presented over
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PresentationAnchor(pub u64);

/// Supplies the window the authorization UI is attached to
pub trait PresentationContextProvider: Send + Sync {
    /// `None` means no window is available and the provider cannot proceed
    fn presentation_anchor(&self) -> Option<PresentationAnchor>;
}

/// An application window as seen by anchor selection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowInfo {
    pub anchor: PresentationAnchor,
    pub is_key: bool,
}

/// Picks the key window, or the first window when none is key
pub struct WindowListAnchorProvider<F>
where
    F: Fn() -> Vec<WindowInfo> + Send + Sync,
{
    windows: F,
}

impl<F> WindowListAnchorProvider<F>
where
    F: Fn() -> Vec<WindowInfo> + Send + Sync,
{
    /// `windows` is queried on every request so the current key window wins
    pub fn new(windows: F) -> Self {
        Self { windows }
    }
}

impl<F> PresentationContextProvider for WindowListAnchorProvider<F>
where
    F: Fn() -> Vec<WindowInfo> + Send + Sync,
{
    fn presentation_anchor(&self) -> Option<PresentationAnchor> {
        select_anchor(&(self.windows)())
    }
}

#[must_use]
pub fn select_anchor(windows: &[WindowInfo]) -> Option<PresentationAnchor> {
    windows
        .iter()
        .find(|window| window.is_key)
        .or_else(|| windows.first())
        .map(|window| window.anchor)
}
