use glam::Vec4;
use log::{debug, warn};
use std::ffi::{c_void, CString};
use std::os::raw::{c_int, c_ulong};
use std::ptr;
use x11::{glx, xlib, xlib_xcb};
use x11rb::connection::{Connection, RequestConnection};
use x11rb::protocol::xproto::{
    Atom, Colormap, ColormapAlloc, ConnectionExt as _, CreateWindowAux, PropMode, Visualid, Window,
    WindowClass,
};
use x11rb::wrapper::ConnectionExt as _;
use x11rb::xcb_ffi::XCBConnection;

use crate::config::FramebufferAttributes;
use crate::error::{BootstrapError, BootstrapStep, RequestError};
use crate::traits::{GlBackend, ScreenInfo, WindowDimensions, WindowParams, WindowSystem};

/// Xlib display shared by an XCB connection and GLX
///
/// Xlib opens the display because GLX needs it; XCB reads the events and
/// sends the window requests over the same link.
pub struct GlxPlatform {
    display: *mut xlib::Display,
    connection: Option<XCBConnection>,
    screen_number: c_int,
    gl_loaded: bool,
}

impl GlxPlatform {
    /// Open the default display and take over its event queue
    pub fn open() -> Result<Self, BootstrapError> {
        let display = unsafe { xlib::XOpenDisplay(ptr::null()) };
        if display.is_null() {
            return Err(BootstrapError::new(
                BootstrapStep::OpenDisplay,
                RequestError::local("XOpenDisplay returned null"),
            ));
        }

        // From here on drop closes the display
        let mut platform = Self {
            display,
            connection: None,
            screen_number: 0,
            gl_loaded: false,
        };

        let raw = unsafe { xlib_xcb::XGetXCBConnection(display) };
        if raw.is_null() {
            return Err(BootstrapError::new(
                BootstrapStep::XcbConnection,
                RequestError::local("XGetXCBConnection returned null"),
            ));
        }

        // Xlib keeps ownership of the connection
        let connection = unsafe { XCBConnection::from_raw_xcb_connection(raw.cast(), false) }
            .map_err(|e| {
                BootstrapError::new(
                    BootstrapStep::XcbConnection,
                    RequestError::local(e.to_string()),
                )
            })?;

        unsafe {
            xlib_xcb::XSetEventQueueOwner(display, xlib_xcb::XEventQueueOwner::XCBOwnsEventQueue);
        }

        platform.connection = Some(connection);
        platform.screen_number = unsafe { xlib::XDefaultScreen(display) };
        debug!("Opened display, default screen {}", platform.screen_number);

        Ok(platform)
    }

    fn conn(&self) -> Result<&XCBConnection, RequestError> {
        self.connection
            .as_ref()
            .ok_or_else(|| RequestError::local("display is closed"))
    }

    fn display(&self) -> Result<*mut xlib::Display, RequestError> {
        if self.display.is_null() {
            Err(RequestError::local("display is closed"))
        } else {
            Ok(self.display)
        }
    }

    fn load_gl(&mut self) {
        gl::load_with(|name| match CString::new(name) {
            Ok(name) => unsafe { glx::glXGetProcAddress(name.as_ptr().cast()) }
                .map_or(ptr::null(), |f| f as *const c_void),
            Err(_) => ptr::null(),
        });
        self.gl_loaded = true;
    }
}

impl Drop for GlxPlatform {
    fn drop(&mut self) {
        self.close();
    }
}

fn to_u16(value: u32, what: &str) -> Result<u16, RequestError> {
    u16::try_from(value).map_err(|_| RequestError::local(format!("{} {} out of range", what, value)))
}

impl WindowSystem for GlxPlatform {
    type Event = <XCBConnection as RequestConnection>::Buf;

    fn default_screen(&mut self) -> Result<ScreenInfo, RequestError> {
        let number = self.screen_number;
        let conn = self.conn()?;
        let screen = usize::try_from(number)
            .ok()
            .and_then(|n| conn.setup().roots.get(n))
            .ok_or_else(|| RequestError::local(format!("screen {} not in setup", number)))?;

        let visual_depths = screen
            .allowed_depths
            .iter()
            .flat_map(|d| d.visuals.iter().map(move |v| (v.visual_id, d.depth)))
            .collect();

        Ok(ScreenInfo {
            number,
            root: screen.root,
            root_visual: screen.root_visual,
            visual_depths,
        })
    }

    fn create_colormap(&mut self, root: Window, visual: Visualid) -> Result<Colormap, RequestError> {
        let conn = self.conn()?;
        let colormap = conn.generate_id()?;
        conn.create_colormap(ColormapAlloc::NONE, colormap, root, visual)?
            .check()?;
        Ok(colormap)
    }

    fn create_window(&mut self, params: &WindowParams) -> Result<Window, RequestError> {
        let width = to_u16(params.dimensions.width, "width")?;
        let height = to_u16(params.dimensions.height, "height")?;

        let conn = self.conn()?;
        let window = conn.generate_id()?;
        // A border pixel is required when the visual differs from the parent's
        let values = CreateWindowAux::new()
            .event_mask(params.event_mask)
            .colormap(params.colormap)
            .border_pixel(0);

        conn.create_window(
            params.depth,
            window,
            params.parent,
            0,
            0,
            width,
            height,
            params.border_width,
            WindowClass::INPUT_OUTPUT,
            params.visual,
            &values,
        )?
        .check()?;

        Ok(window)
    }

    fn map_window(&mut self, window: Window) -> Result<(), RequestError> {
        self.conn()?.map_window(window)?.check()?;
        Ok(())
    }

    fn intern_atom(&mut self, name: &str, only_if_exists: bool) -> Result<Atom, RequestError> {
        let reply = self
            .conn()?
            .intern_atom(only_if_exists, name.as_bytes())?
            .reply()?;
        Ok(reply.atom)
    }

    fn change_property8(
        &mut self,
        window: Window,
        property: Atom,
        type_: Atom,
        data: &[u8],
    ) -> Result<(), RequestError> {
        self.conn()?
            .change_property8(PropMode::REPLACE, window, property, type_, data)?
            .check()?;
        Ok(())
    }

    fn change_property32(
        &mut self,
        window: Window,
        property: Atom,
        type_: Atom,
        data: &[u32],
    ) -> Result<(), RequestError> {
        self.conn()?
            .change_property32(PropMode::REPLACE, window, property, type_, data)?
            .check()?;
        Ok(())
    }

    fn poll_event(&mut self) -> Result<Option<Self::Event>, RequestError> {
        Ok(self.conn()?.poll_for_raw_event()?)
    }

    fn destroy_window(&mut self, window: Window) {
        let Ok(conn) = self.conn() else {
            return;
        };
        match conn.destroy_window(window) {
            Ok(cookie) => cookie.ignore_error(),
            Err(e) => warn!("Failed to destroy window {:#x}: {}", window, e),
        }
        if let Err(e) = conn.flush() {
            warn!("Failed to flush: {}", e);
        }
    }

    fn close(&mut self) {
        // The XCB connection is owned by Xlib and must go first
        self.connection = None;
        if !self.display.is_null() {
            unsafe { xlib::XCloseDisplay(self.display) };
            self.display = ptr::null_mut();
        }
    }
}

impl GlBackend for GlxPlatform {
    type FbConfig = glx::GLXFBConfig;
    type Context = glx::GLXContext;
    type Surface = glx::GLXWindow;

    fn choose_fb_config(
        &mut self,
        screen: i32,
        attribs: &FramebufferAttributes,
    ) -> Result<(Self::FbConfig, Visualid), RequestError> {
        let display = self.display()?;
        let attribs = attribs.to_glx_attribs();
        let mut count: c_int = 0;

        let configs =
            unsafe { glx::glXChooseFBConfig(display, screen, attribs.as_ptr(), &mut count) };
        if configs.is_null() {
            return Err(RequestError::local("no matching framebuffer config"));
        }
        if count <= 0 {
            unsafe { xlib::XFree(configs.cast()) };
            return Err(RequestError::local("no matching framebuffer config"));
        }

        let config = unsafe { *configs };
        unsafe { xlib::XFree(configs.cast()) };
        debug!("{} framebuffer configs match, using the first", count);

        let mut visual_id: c_int = 0;
        let status = unsafe {
            glx::glXGetFBConfigAttrib(display, config, glx::GLX_VISUAL_ID, &mut visual_id)
        };
        if status != 0 || visual_id == 0 {
            return Err(RequestError::local("framebuffer config has no visual"));
        }

        Ok((config, visual_id as Visualid))
    }

    fn create_context(&mut self, config: Self::FbConfig) -> Result<Self::Context, RequestError> {
        let display = self.display()?;
        let context = unsafe {
            glx::glXCreateNewContext(
                display,
                config,
                glx::GLX_RGBA_TYPE,
                ptr::null_mut(),
                xlib::True,
            )
        };
        if context.is_null() {
            return Err(RequestError::local("glXCreateNewContext returned null"));
        }
        Ok(context)
    }

    fn create_window_surface(
        &mut self,
        config: Self::FbConfig,
        window: Window,
    ) -> Result<Self::Surface, RequestError> {
        let display = self.display()?;
        let surface =
            unsafe { glx::glXCreateWindow(display, config, c_ulong::from(window), ptr::null()) };
        if surface == 0 {
            return Err(RequestError::local("glXCreateWindow returned no drawable"));
        }
        Ok(surface)
    }

    fn make_current(
        &mut self,
        surface: Self::Surface,
        context: &Self::Context,
    ) -> Result<(), RequestError> {
        let display = self.display()?;
        let ok = unsafe { glx::glXMakeContextCurrent(display, surface, surface, *context) };
        if ok == 0 {
            return Err(RequestError::local("glXMakeContextCurrent failed"));
        }
        if !self.gl_loaded {
            self.load_gl();
        }
        Ok(())
    }

    fn destroy_surface(&mut self, surface: Self::Surface) {
        if let Ok(display) = self.display() {
            unsafe { glx::glXDestroyWindow(display, surface) };
        }
    }

    fn destroy_context(&mut self, context: Self::Context) {
        if let Ok(display) = self.display() {
            unsafe {
                glx::glXMakeContextCurrent(display, 0, 0, ptr::null_mut());
                glx::glXDestroyContext(display, context);
            }
        }
    }

    fn set_viewport(&mut self, dimensions: WindowDimensions) {
        if !self.gl_loaded {
            return;
        }
        unsafe {
            gl::Viewport(
                0,
                0,
                dimensions.width as gl::types::GLsizei,
                dimensions.height as gl::types::GLsizei,
            )
        };
    }

    fn clear(&mut self, color: Vec4) {
        if !self.gl_loaded {
            return;
        }
        unsafe {
            gl::ClearColor(color.x, color.y, color.z, color.w);
            gl::Clear(gl::COLOR_BUFFER_BIT);
        }
    }

    fn swap_buffers(&mut self, surface: Self::Surface) {
        if let Ok(display) = self.display() {
            unsafe { glx::glXSwapBuffers(display, surface) };
        }
    }
}
