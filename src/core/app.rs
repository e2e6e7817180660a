use log::{debug, error, info, trace};
use x11rb::protocol::xproto::{Atom, AtomEnum, Window};

use super::event::WindowEvent;
use crate::config::AppConfig;
use crate::error::{AppError, BootstrapError, BootstrapStep, RequestError, StepContext};
use crate::traits::{GlBackend, WindowDimensions, WindowParams, WindowSystem};

/// Lifecycle of the program
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppState {
    Uninitialized,
    Bootstrapping,
    Running,
    ShuttingDown,
    Closed,
}

/// The window, its GL context and the loop state, owned together
///
/// Handles are created during bootstrap and held as options so teardown
/// can release whatever prefix of them exists.
pub struct App<P: WindowSystem + GlBackend> {
    platform: P,
    config: AppConfig,
    state: AppState,
    window: Option<Window>,
    context: Option<P::Context>,
    surface: Option<P::Surface>,
    close_event: Option<Atom>,
    dimensions: WindowDimensions,
    should_close: bool,
}

impl<P: WindowSystem + GlBackend> App<P> {
    pub fn new(platform: P, config: AppConfig) -> Self {
        let dimensions = config.dimensions;
        Self {
            platform,
            config,
            state: AppState::Uninitialized,
            window: None,
            context: None,
            surface: None,
            close_event: None,
            dimensions,
            should_close: false,
        }
    }

    pub fn state(&self) -> AppState {
        self.state
    }

    pub fn dimensions(&self) -> WindowDimensions {
        self.dimensions
    }

    pub fn should_close(&self) -> bool {
        self.should_close
    }

    pub fn window(&self) -> Option<Window> {
        self.window
    }

    /// Atom carried by a close request, once registered
    pub fn close_event(&self) -> Option<Atom> {
        self.close_event
    }

    pub fn platform(&self) -> &P {
        &self.platform
    }

    pub fn platform_mut(&mut self) -> &mut P {
        &mut self.platform
    }

    /// Bootstrap, then input and render until a close request arrives.
    /// Teardown is left to the caller (or to drop).
    pub fn run(&mut self) -> Result<(), AppError> {
        self.bootstrap()?;

        while !self.should_close {
            self.step()?;
        }

        self.state = AppState::ShuttingDown;
        Ok(())
    }

    /// Create the window and GL context and register for close requests
    pub fn bootstrap(&mut self) -> Result<(), BootstrapError> {
        info!("Loading.");
        self.state = AppState::Bootstrapping;

        let result = self
            .create_window()
            .and_then(|()| self.register_close_event());

        if let Err(e) = result {
            error!("{}", e);
            if let Some(report) = e.source.report() {
                error!("{}", report);
            }
            error!("Initialization failed!");
            self.state = AppState::ShuttingDown;
            return Err(e);
        }

        self.platform.set_viewport(self.dimensions);
        self.state = AppState::Running;
        info!("Initialization finished.");
        Ok(())
    }

    fn create_window(&mut self) -> Result<(), BootstrapError> {
        let screen = self.platform.default_screen().step(BootstrapStep::Screen)?;

        let (fb_config, visual) = self
            .platform
            .choose_fb_config(screen.number, &self.config.framebuffer)
            .step(BootstrapStep::ChooseFbConfig)?;
        debug!("Using framebuffer config with visual {:#x}", visual);

        let context = self
            .platform
            .create_context(fb_config)
            .step(BootstrapStep::CreateContext)?;
        self.context = Some(context);

        // Only needed while creating the window
        let colormap = self
            .platform
            .create_colormap(screen.root, visual)
            .step(BootstrapStep::CreateColormap)?;

        let (visual, depth) = match screen.depth_of(visual) {
            Some(depth) => (visual, depth),
            None => {
                debug!("Visual {:#x} not on screen, copying from parent", visual);
                (screen.root_visual, 0)
            }
        };

        let params = WindowParams {
            depth,
            parent: screen.root,
            visual,
            dimensions: self.dimensions,
            border_width: self.config.border_width,
            colormap,
            event_mask: self.config.event_mask,
        };
        let window = self
            .platform
            .create_window(&params)
            .step(BootstrapStep::CreateWindow)?;
        self.window = Some(window);

        self.platform
            .map_window(window)
            .step(BootstrapStep::MapWindow)?;

        let surface = self
            .platform
            .create_window_surface(fb_config, window)
            .step(BootstrapStep::CreateSurface)?;
        self.surface = Some(surface);

        if let Some(context) = &self.context {
            self.platform
                .make_current(surface, context)
                .step(BootstrapStep::MakeCurrent)?;
        }

        self.platform
            .change_property8(
                window,
                AtomEnum::WM_NAME.into(),
                AtomEnum::STRING.into(),
                self.config.title.as_bytes(),
            )
            .step(BootstrapStep::SetTitle)?;

        Ok(())
    }

    fn register_close_event(&mut self) -> Result<(), BootstrapError> {
        let window = self.window.ok_or_else(|| {
            BootstrapError::new(
                BootstrapStep::RegisterCloseEvent,
                RequestError::local("no window"),
            )
        })?;

        // Without a window manager nothing has interned WM_PROTOCOLS yet
        let protocols = self
            .intern_existing("WM_PROTOCOLS", false)
            .step(BootstrapStep::InternProtocolsAtom)?;
        let delete_window = self
            .intern_existing("WM_DELETE_WINDOW", false)
            .step(BootstrapStep::InternDeleteWindowAtom)?;

        self.platform
            .change_property32(window, protocols, AtomEnum::ATOM.into(), &[delete_window])
            .step(BootstrapStep::RegisterCloseEvent)?;

        self.close_event = Some(delete_window);
        Ok(())
    }

    fn intern_existing(&mut self, name: &str, only_if_exists: bool) -> Result<Atom, RequestError> {
        let atom = self.platform.intern_atom(name, only_if_exists)?;
        if atom == u32::from(AtomEnum::NONE) {
            return Err(RequestError::local(format!("atom {} does not exist", name)));
        }
        Ok(atom)
    }

    /// One loop iteration: drain input, then draw a frame
    pub fn step(&mut self) -> Result<(), AppError> {
        self.process_events()?;
        self.render();
        Ok(())
    }

    /// Drain every queued event without blocking. Returns how many were
    /// handled.
    pub fn process_events(&mut self) -> Result<usize, AppError> {
        let mut count = 0;

        while let Some(event) = self
            .platform
            .poll_event()
            .map_err(AppError::EventQueue)?
        {
            count += 1;
            self.handle_event(WindowEvent::classify(event.as_ref()));
        }

        Ok(count)
    }

    pub fn handle_event(&mut self, event: WindowEvent) {
        match event {
            WindowEvent::ClientMessage { data0 } => {
                if Some(data0) == self.close_event {
                    debug!("Close requested");
                    self.should_close = true;
                }
            }
            WindowEvent::Configure { width, height } => {
                let dimensions = WindowDimensions::new(u32::from(width), u32::from(height));
                if dimensions != self.dimensions {
                    debug!("Resized to {}x{}", width, height);
                    self.dimensions = dimensions;
                    self.platform.set_viewport(dimensions);
                }
            }
            WindowEvent::Other { response_type } => {
                trace!("Ignoring event {}", response_type);
            }
        }
    }

    /// Clear to the configured color and present
    pub fn render(&mut self) {
        if let Some(surface) = self.surface {
            self.platform.clear(self.config.clear_color);
            self.platform.swap_buffers(surface);
        }
    }

    /// Release everything bootstrap created, newest first, then close the
    /// display. Runs once; later calls do nothing.
    pub fn teardown(&mut self) {
        if self.state == AppState::Closed {
            return;
        }
        self.state = AppState::ShuttingDown;
        info!("Exiting.");

        if let Some(surface) = self.surface.take() {
            self.platform.destroy_surface(surface);
        }
        if let Some(window) = self.window.take() {
            self.platform.destroy_window(window);
        }
        if let Some(context) = self.context.take() {
            self.platform.destroy_context(context);
        }
        self.platform.close();

        self.state = AppState::Closed;
    }
}

impl<P: WindowSystem + GlBackend> Drop for App<P> {
    fn drop(&mut self) {
        self.teardown();
    }
}

/// Process exit code for a finished run
pub fn exit_code<T, E>(result: &Result<T, E>) -> i32 {
    match result {
        Ok(_) => 0,
        Err(_) => -1,
    }
}
