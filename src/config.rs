// config.rs - Fixed program configuration
use glam::Vec4;
use std::os::raw::c_int;
use x11::glx;
use x11rb::protocol::xproto::EventMask;

use crate::traits::WindowDimensions;

pub const WINDOW_TITLE: &str = "xcb-opengl";
pub const INITIAL_WINDOW_WIDTH: u32 = 300;
pub const INITIAL_WINDOW_HEIGHT: u32 = 300;
pub const WINDOW_BORDER_WIDTH: u16 = 10;
pub const CLEAR_COLOR: Vec4 = Vec4::new(0.0, 1.0, 0.0, 1.0);

/// Required framebuffer capabilities
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FramebufferAttributes {
    pub red_bits: u8,
    pub green_bits: u8,
    pub blue_bits: u8,
    pub alpha_bits: u8,
    pub depth_bits: u8,
    pub stencil_bits: u8,
    pub double_buffered: bool,
}

impl FramebufferAttributes {
    /// Zero-terminated attribute list for glXChooseFBConfig
    #[rustfmt::skip]
    pub fn to_glx_attribs(&self) -> Vec<c_int> {
        vec![
            glx::GLX_X_RENDERABLE, 1,
            glx::GLX_DRAWABLE_TYPE, glx::GLX_WINDOW_BIT,
            glx::GLX_RENDER_TYPE, glx::GLX_RGBA_BIT,
            glx::GLX_X_VISUAL_TYPE, glx::GLX_TRUE_COLOR,
            glx::GLX_RED_SIZE, c_int::from(self.red_bits),
            glx::GLX_GREEN_SIZE, c_int::from(self.green_bits),
            glx::GLX_BLUE_SIZE, c_int::from(self.blue_bits),
            glx::GLX_ALPHA_SIZE, c_int::from(self.alpha_bits),
            glx::GLX_DEPTH_SIZE, c_int::from(self.depth_bits),
            glx::GLX_STENCIL_SIZE, c_int::from(self.stencil_bits),
            glx::GLX_DOUBLEBUFFER, c_int::from(self.double_buffered),
            0,
        ]
    }
}

impl Default for FramebufferAttributes {
    fn default() -> Self {
        Self {
            red_bits: 8,
            green_bits: 8,
            blue_bits: 8,
            alpha_bits: 8,
            depth_bits: 24,
            stencil_bits: 8,
            double_buffered: true,
        }
    }
}

/// Everything the window and context are created from
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub title: String,
    pub dimensions: WindowDimensions,
    pub border_width: u16,
    pub clear_color: Vec4,
    pub event_mask: EventMask,
    pub framebuffer: FramebufferAttributes,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            title: WINDOW_TITLE.to_string(),
            dimensions: WindowDimensions::new(INITIAL_WINDOW_WIDTH, INITIAL_WINDOW_HEIGHT),
            border_width: WINDOW_BORDER_WIDTH,
            clear_color: CLEAR_COLOR,
            event_mask: default_event_mask(),
            framebuffer: FramebufferAttributes::default(),
        }
    }
}

/// Exposure, keys, buttons, motion and structure changes
pub fn default_event_mask() -> EventMask {
    EventMask::EXPOSURE
        | EventMask::KEY_PRESS
        | EventMask::KEY_RELEASE
        | EventMask::BUTTON_PRESS
        | EventMask::BUTTON_RELEASE
        | EventMask::POINTER_MOTION
        | EventMask::BUTTON_MOTION
        | EventMask::STRUCTURE_NOTIFY
}
