#![allow(dead_code)]

use glam::Vec4;
use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::rc::Rc;
use x11rb::protocol::xproto::{
    Atom, ClientMessageEvent, Colormap, ConfigureNotifyEvent, Visualid, Window,
    CONFIGURE_NOTIFY_EVENT,
};

use xcb_opengl::config::FramebufferAttributes;
use xcb_opengl::error::{ProtocolError, RequestError};
use xcb_opengl::traits::{GlBackend, ScreenInfo, WindowDimensions, WindowParams, WindowSystem};
use xcb_opengl::{App, AppConfig};

pub const ROOT: Window = 0x100;
pub const ROOT_VISUAL: Visualid = 0x21;
pub const FB_VISUAL: Visualid = 0x7f;
pub const COLORMAP: Colormap = 0x40_0001;
pub const WINDOW: Window = 0x40_0002;
pub const SURFACE: u64 = 0x40_0003;
pub const PROTOCOLS_ATOM: Atom = 0x150;
pub const DELETE_WINDOW_ATOM: Atom = 0x151;

/// Everything the app asked the platform to do
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    DefaultScreen,
    ChooseFbConfig,
    CreateContext,
    CreateColormap { root: Window, visual: Visualid },
    CreateWindow(WindowParams),
    MapWindow(Window),
    InternAtom { name: String, only_if_exists: bool },
    ChangeProperty8 { property: Atom, type_: Atom, data: Vec<u8> },
    ChangeProperty32 { property: Atom, type_: Atom, data: Vec<u32> },
    DestroyWindow(Window),
    Close,
    CreateSurface(Window),
    MakeCurrent(u64),
    DestroySurface(u64),
    DestroyContext,
    SetViewport(WindowDimensions),
    Clear(Vec4),
    SwapBuffers(u64),
}

impl Call {
    pub fn name(&self) -> &'static str {
        match self {
            Call::DefaultScreen => "default_screen",
            Call::ChooseFbConfig => "choose_fb_config",
            Call::CreateContext => "create_context",
            Call::CreateColormap { .. } => "create_colormap",
            Call::CreateWindow(_) => "create_window",
            Call::MapWindow(_) => "map_window",
            Call::InternAtom { .. } => "intern_atom",
            Call::ChangeProperty8 { .. } => "change_property8",
            Call::ChangeProperty32 { .. } => "change_property32",
            Call::DestroyWindow(_) => "destroy_window",
            Call::Close => "close",
            Call::CreateSurface(_) => "create_window_surface",
            Call::MakeCurrent(_) => "make_current",
            Call::DestroySurface(_) => "destroy_surface",
            Call::DestroyContext => "destroy_context",
            Call::SetViewport(_) => "set_viewport",
            Call::Clear(_) => "clear",
            Call::SwapBuffers(_) => "swap_buffers",
        }
    }
}

/// Shared view of a mock's activity, usable after the mock is moved
#[derive(Debug, Clone, Default)]
pub struct Recorder {
    calls: Rc<RefCell<Vec<Call>>>,
    polled: Rc<Cell<usize>>,
    released: Rc<Cell<usize>>,
}

impl Recorder {
    pub fn calls(&self) -> Vec<Call> {
        self.calls.borrow().clone()
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.calls.borrow().iter().map(Call::name).collect()
    }

    pub fn count(&self, name: &str) -> usize {
        self.calls.borrow().iter().filter(|c| c.name() == name).count()
    }

    pub fn viewports(&self) -> Vec<WindowDimensions> {
        self.calls
            .borrow()
            .iter()
            .filter_map(|c| match c {
                Call::SetViewport(dims) => Some(*dims),
                _ => None,
            })
            .collect()
    }

    pub fn clear(&self) {
        self.calls.borrow_mut().clear();
    }

    /// Events handed out by `poll_event`
    pub fn polled(&self) -> usize {
        self.polled.get()
    }

    /// Events dropped after handling
    pub fn released(&self) -> usize {
        self.released.get()
    }
}

/// A dequeued event that counts its own release
#[derive(Debug)]
pub struct MockEvent {
    bytes: [u8; 32],
    released: Rc<Cell<usize>>,
}

impl AsRef<[u8]> for MockEvent {
    fn as_ref(&self) -> &[u8] {
        &self.bytes
    }
}

impl Drop for MockEvent {
    fn drop(&mut self) {
        self.released.set(self.released.get() + 1);
    }
}

/// Owned like a real context: destroying it consumes it
#[derive(Debug)]
pub struct MockContext;

/// Recording stand-in for the X server and GLX
pub struct MockPlatform {
    recorder: Recorder,
    failures: Vec<(&'static str, RequestError)>,
    /// `None` entries end one drain of the queue
    script: VecDeque<Option<[u8; 32]>>,
    pub protocols_atom: Atom,
    /// When false, only-if-exists lookups of the WM atoms find nothing
    pub window_manager: bool,
    pub visual_depths: Vec<(Visualid, u8)>,
    pub queue_error: Option<RequestError>,
}

impl MockPlatform {
    pub fn new() -> Self {
        Self {
            recorder: Recorder::default(),
            failures: Vec::new(),
            script: VecDeque::new(),
            protocols_atom: PROTOCOLS_ATOM,
            window_manager: true,
            visual_depths: vec![(ROOT_VISUAL, 24), (FB_VISUAL, 32)],
            queue_error: None,
        }
    }

    pub fn recorder(&self) -> Recorder {
        self.recorder.clone()
    }

    /// Make the named operation fail
    pub fn fail(mut self, name: &'static str, error: RequestError) -> Self {
        self.failures.push((name, error));
        self
    }

    /// Queue events for the next drain
    pub fn push_events<I: IntoIterator<Item = [u8; 32]>>(&mut self, events: I) {
        self.script.extend(events.into_iter().map(Some));
        self.script.push_back(None);
    }

    /// Queue `count` drains that find nothing
    pub fn push_empty_polls(&mut self, count: usize) {
        self.script.extend(std::iter::repeat(None).take(count));
    }

    fn record(&self, call: Call) -> Result<(), RequestError> {
        let name = call.name();
        self.recorder.calls.borrow_mut().push(call);
        match self.failures.iter().find(|(n, _)| *n == name) {
            Some((_, error)) => Err(error.clone()),
            None => Ok(()),
        }
    }
}

impl WindowSystem for MockPlatform {
    type Event = MockEvent;

    fn default_screen(&mut self) -> Result<ScreenInfo, RequestError> {
        self.record(Call::DefaultScreen)?;
        Ok(ScreenInfo {
            number: 0,
            root: ROOT,
            root_visual: ROOT_VISUAL,
            visual_depths: self.visual_depths.clone(),
        })
    }

    fn create_colormap(&mut self, root: Window, visual: Visualid) -> Result<Colormap, RequestError> {
        self.record(Call::CreateColormap { root, visual })?;
        Ok(COLORMAP)
    }

    fn create_window(&mut self, params: &WindowParams) -> Result<Window, RequestError> {
        self.record(Call::CreateWindow(params.clone()))?;
        Ok(WINDOW)
    }

    fn map_window(&mut self, window: Window) -> Result<(), RequestError> {
        self.record(Call::MapWindow(window))
    }

    fn intern_atom(&mut self, name: &str, only_if_exists: bool) -> Result<Atom, RequestError> {
        self.record(Call::InternAtom {
            name: name.to_string(),
            only_if_exists,
        })?;
        let key = format!("intern_atom:{}", name);
        if let Some((_, error)) = self.failures.iter().find(|(n, _)| *n == key) {
            return Err(error.clone());
        }
        // Interning without only-if-exists creates the atom
        let exists = self.window_manager || !only_if_exists;
        Ok(match name {
            "WM_PROTOCOLS" if exists => self.protocols_atom,
            "WM_DELETE_WINDOW" if exists => DELETE_WINDOW_ATOM,
            _ => 0,
        })
    }

    fn change_property8(
        &mut self,
        _window: Window,
        property: Atom,
        type_: Atom,
        data: &[u8],
    ) -> Result<(), RequestError> {
        self.record(Call::ChangeProperty8 {
            property,
            type_,
            data: data.to_vec(),
        })
    }

    fn change_property32(
        &mut self,
        _window: Window,
        property: Atom,
        type_: Atom,
        data: &[u32],
    ) -> Result<(), RequestError> {
        self.record(Call::ChangeProperty32 {
            property,
            type_,
            data: data.to_vec(),
        })
    }

    fn poll_event(&mut self) -> Result<Option<MockEvent>, RequestError> {
        if let Some(error) = &self.queue_error {
            return Err(error.clone());
        }
        match self.script.pop_front() {
            Some(Some(bytes)) => {
                self.recorder.polled.set(self.recorder.polled.get() + 1);
                Ok(Some(MockEvent {
                    bytes,
                    released: self.recorder.released.clone(),
                }))
            }
            Some(None) | None => Ok(None),
        }
    }

    fn destroy_window(&mut self, window: Window) {
        let _ = self.record(Call::DestroyWindow(window));
    }

    fn close(&mut self) {
        let _ = self.record(Call::Close);
    }
}

impl GlBackend for MockPlatform {
    type FbConfig = u32;
    type Context = MockContext;
    type Surface = u64;

    fn choose_fb_config(
        &mut self,
        _screen: i32,
        _attribs: &FramebufferAttributes,
    ) -> Result<(u32, Visualid), RequestError> {
        self.record(Call::ChooseFbConfig)?;
        Ok((1, FB_VISUAL))
    }

    fn create_context(&mut self, _config: u32) -> Result<MockContext, RequestError> {
        self.record(Call::CreateContext)?;
        Ok(MockContext)
    }

    fn create_window_surface(&mut self, _config: u32, window: Window) -> Result<u64, RequestError> {
        self.record(Call::CreateSurface(window))?;
        Ok(SURFACE)
    }

    fn make_current(&mut self, surface: u64, _context: &MockContext) -> Result<(), RequestError> {
        self.record(Call::MakeCurrent(surface))
    }

    fn destroy_surface(&mut self, surface: u64) {
        let _ = self.record(Call::DestroySurface(surface));
    }

    fn destroy_context(&mut self, _context: MockContext) {
        let _ = self.record(Call::DestroyContext);
    }

    fn set_viewport(&mut self, dimensions: WindowDimensions) {
        let _ = self.record(Call::SetViewport(dimensions));
    }

    fn clear(&mut self, color: Vec4) {
        let _ = self.record(Call::Clear(color));
    }

    fn swap_buffers(&mut self, surface: u64) {
        let _ = self.record(Call::SwapBuffers(surface));
    }
}

pub fn local_failure() -> RequestError {
    RequestError::local("mock failure")
}

/// BadMatch on CreateWindow (major opcode 1)
pub fn bad_match() -> RequestError {
    RequestError::protocol(ProtocolError::new(8, 1, 0))
}

/// BadWindow on MapWindow (major opcode 8)
pub fn bad_window() -> RequestError {
    RequestError::protocol(ProtocolError::new(3, 8, 0))
}

/// App over `platform`, not yet bootstrapped
pub fn app_with(platform: MockPlatform) -> (App<MockPlatform>, Recorder) {
    app_with_config(platform, AppConfig::default())
}

/// App over `platform` with a caller-built config, not yet bootstrapped
pub fn app_with_config(platform: MockPlatform, config: AppConfig) -> (App<MockPlatform>, Recorder) {
    let recorder = platform.recorder();
    (App::new(platform, config), recorder)
}

/// Bootstrapped app with the bootstrap calls cleared from the recorder
pub fn running_app() -> (App<MockPlatform>, Recorder) {
    let (mut app, recorder) = app_with(MockPlatform::new());
    app.bootstrap().expect("mock bootstrap succeeds");
    recorder.clear();
    (app, recorder)
}

pub fn client_message(data0: u32) -> [u8; 32] {
    let event = ClientMessageEvent::new(32, WINDOW, PROTOCOLS_ATOM, [data0, 0, 0, 0, 0]);
    <[u8; 32]>::from(&event)
}

pub fn configure(width: u16, height: u16) -> [u8; 32] {
    let event = ConfigureNotifyEvent {
        response_type: CONFIGURE_NOTIFY_EVENT,
        sequence: 0,
        event: WINDOW,
        window: WINDOW,
        above_sibling: 0,
        x: 0,
        y: 0,
        width,
        height,
        border_width: 0,
        override_redirect: false,
    };
    <[u8; 32]>::from(&event)
}

/// An event of a kind the app ignores
pub fn other(response_type: u8) -> [u8; 32] {
    let mut bytes = [0u8; 32];
    bytes[0] = response_type;
    bytes
}
