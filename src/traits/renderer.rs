use glam::Vec4;
use x11rb::protocol::xproto::{Visualid, Window};

use super::window::WindowDimensions;
use crate::config::FramebufferAttributes;
use crate::error::RequestError;

/// GL context and surface binding primitives
pub trait GlBackend {
    type FbConfig: Copy;
    type Context;
    type Surface: Copy;

    /// Pick the first framebuffer config matching `attribs` and return it
    /// with its visual id. No match is an error.
    fn choose_fb_config(
        &mut self,
        screen: i32,
        attribs: &FramebufferAttributes,
    ) -> Result<(Self::FbConfig, Visualid), RequestError>;

    fn create_context(&mut self, config: Self::FbConfig) -> Result<Self::Context, RequestError>;

    /// Create the GL-side surface for an existing window
    fn create_window_surface(
        &mut self,
        config: Self::FbConfig,
        window: Window,
    ) -> Result<Self::Surface, RequestError>;

    /// Bind `context` with `surface` as both draw and read target
    fn make_current(
        &mut self,
        surface: Self::Surface,
        context: &Self::Context,
    ) -> Result<(), RequestError>;

    fn destroy_surface(&mut self, surface: Self::Surface);

    fn destroy_context(&mut self, context: Self::Context);

    /// Set the viewport to the full window area
    fn set_viewport(&mut self, dimensions: WindowDimensions);

    /// Clear the color buffer
    fn clear(&mut self, color: Vec4);

    fn swap_buffers(&mut self, surface: Self::Surface);
}
