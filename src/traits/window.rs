use x11rb::protocol::xproto::{Atom, Colormap, EventMask, Visualid, Window};

use crate::error::RequestError;

/// Window dimensions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowDimensions {
    pub width: u32,
    pub height: u32,
}

impl WindowDimensions {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

/// Screen the window is created on
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScreenInfo {
    /// Screen number, as used by GLX
    pub number: i32,
    pub root: Window,
    pub root_visual: Visualid,
    /// Every visual the screen supports with its depth
    pub visual_depths: Vec<(Visualid, u8)>,
}

impl ScreenInfo {
    pub fn depth_of(&self, visual: Visualid) -> Option<u8> {
        self.visual_depths
            .iter()
            .find(|(id, _)| *id == visual)
            .map(|(_, depth)| *depth)
    }
}

/// Parameters for a top-level input/output window
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WindowParams {
    /// Zero copies the parent's depth
    pub depth: u8,
    pub parent: Window,
    pub visual: Visualid,
    pub dimensions: WindowDimensions,
    pub border_width: u16,
    pub colormap: Colormap,
    pub event_mask: EventMask,
}

/// Windowing-system client primitives
///
/// Every state-mutating request is checked: implementations wait for the
/// server's verdict and report protocol errors as `RequestError::Request`
/// or `RequestError::Value`.
pub trait WindowSystem {
    /// A dequeued event in wire format. Dropping it releases it.
    type Event: AsRef<[u8]>;

    /// Get the default screen
    fn default_screen(&mut self) -> Result<ScreenInfo, RequestError>;

    /// Allocate and create a colormap for `visual`
    fn create_colormap(&mut self, root: Window, visual: Visualid) -> Result<Colormap, RequestError>;

    /// Allocate and create a window
    fn create_window(&mut self, params: &WindowParams) -> Result<Window, RequestError>;

    fn map_window(&mut self, window: Window) -> Result<(), RequestError>;

    /// Look up an atom by its exact name. With `only_if_exists` an unknown
    /// name yields `NONE` instead of creating the atom.
    fn intern_atom(&mut self, name: &str, only_if_exists: bool) -> Result<Atom, RequestError>;

    /// Replace an 8-bit property
    fn change_property8(
        &mut self,
        window: Window,
        property: Atom,
        type_: Atom,
        data: &[u8],
    ) -> Result<(), RequestError>;

    /// Replace a 32-bit property
    fn change_property32(
        &mut self,
        window: Window,
        property: Atom,
        type_: Atom,
        data: &[u32],
    ) -> Result<(), RequestError>;

    /// Dequeue the next pending event without blocking
    fn poll_event(&mut self) -> Result<Option<Self::Event>, RequestError>;

    fn destroy_window(&mut self, window: Window);

    /// Close the display connection. Must be called last and at most once.
    fn close(&mut self);
}
