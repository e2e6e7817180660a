use std::fmt;

use thiserror::Error;
use x11rb::errors::{ConnectionError, ReplyError, ReplyOrIdError};
use x11rb::x11_utils::X11Error;

/// X11 core protocol error codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum X11ErrorCode {
    Request = 1,
    Value = 2,
    Window = 3,
    Pixmap = 4,
    Atom = 5,
    Cursor = 6,
    Font = 7,
    Match = 8,
    Drawable = 9,
    Access = 10,
    Alloc = 11,
    Colormap = 12,
    GContext = 13,
    IdChoice = 14,
    Name = 15,
    Length = 16,
    Implementation = 17,
}

impl X11ErrorCode {
    pub fn from_code(code: u8) -> Option<Self> {
        use X11ErrorCode::*;
        Some(match code {
            1 => Request,
            2 => Value,
            3 => Window,
            4 => Pixmap,
            5 => Atom,
            6 => Cursor,
            7 => Font,
            8 => Match,
            9 => Drawable,
            10 => Access,
            11 => Alloc,
            12 => Colormap,
            13 => GContext,
            14 => IdChoice,
            15 => Name,
            16 => Length,
            17 => Implementation,
            _ => return None,
        })
    }

    pub fn name(self) -> &'static str {
        use X11ErrorCode::*;
        match self {
            Request => "XCB_REQUEST",
            Value => "XCB_VALUE",
            Window => "XCB_WINDOW",
            Pixmap => "XCB_PIXMAP",
            Atom => "XCB_ATOM",
            Cursor => "XCB_CURSOR",
            Font => "XCB_FONT",
            Match => "XCB_MATCH",
            Drawable => "XCB_DRAWABLE",
            Access => "XCB_ACCESS",
            Alloc => "XCB_ALLOC",
            Colormap => "XCB_COLORMAP",
            GContext => "XCB_G_CONTEXT",
            IdChoice => "XCB_ID_CHOICE",
            Name => "XCB_NAME",
            Length => "XCB_LENGTH",
            Implementation => "XCB_IMPLEMENTATION",
        }
    }

    /// Errors carrying a bad resource id or value are value errors,
    /// the rest are request errors.
    pub fn class(self) -> ErrorClass {
        use X11ErrorCode::*;
        match self {
            Value | Window | Pixmap | Atom | Cursor | Font | Drawable | Colormap | GContext
            | IdChoice => ErrorClass::Value,
            Request | Match | Access | Alloc | Name | Length | Implementation => {
                ErrorClass::Request
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    Request,
    Value,
}

/// Diagnostic fields of an asynchronous protocol error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProtocolError {
    pub code: u8,
    pub major_opcode: u8,
    pub minor_opcode: u16,
}

impl ProtocolError {
    pub fn new(code: u8, major_opcode: u8, minor_opcode: u16) -> Self {
        Self {
            code,
            major_opcode,
            minor_opcode,
        }
    }

    /// Category name from the core error table, `UNKNOWN` for extension codes
    pub fn name(&self) -> &'static str {
        X11ErrorCode::from_code(self.code).map_or("UNKNOWN", X11ErrorCode::name)
    }

    pub fn class(&self) -> ErrorClass {
        X11ErrorCode::from_code(self.code).map_or(ErrorClass::Request, X11ErrorCode::class)
    }
}

impl fmt::Display for ProtocolError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} (error_code: {}, major: {}, minor: {})",
            self.name(),
            self.code,
            self.major_opcode,
            self.minor_opcode
        )
    }
}

/// Outcome of a single windowing-system or GL request
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RequestError {
    /// The call failed locally (null/false return, connection failure)
    #[error("{what}")]
    Local { what: String },
    #[error("request error {0}")]
    Request(ProtocolError),
    #[error("value error {0}")]
    Value(ProtocolError),
}

impl RequestError {
    pub fn local(what: impl Into<String>) -> Self {
        RequestError::Local { what: what.into() }
    }

    /// Classify a protocol error by its code
    pub fn protocol(error: ProtocolError) -> Self {
        match error.class() {
            ErrorClass::Request => RequestError::Request(error),
            ErrorClass::Value => RequestError::Value(error),
        }
    }

    pub fn protocol_error(&self) -> Option<&ProtocolError> {
        match self {
            RequestError::Local { .. } => None,
            RequestError::Request(e) | RequestError::Value(e) => Some(e),
        }
    }

    /// Multi-line diagnostic block for protocol errors
    pub fn report(&self) -> Option<String> {
        let (heading, error) = match self {
            RequestError::Local { .. } => return None,
            RequestError::Request(e) => ("REQUEST ERROR", e),
            RequestError::Value(e) => ("VALUE ERROR", e),
        };
        Some(format!(
            "{}\n{}\nerror_code: {}\nmajor: {}\nminor: {}",
            heading,
            error.name(),
            error.code,
            error.major_opcode,
            error.minor_opcode
        ))
    }
}

impl From<X11Error> for RequestError {
    fn from(e: X11Error) -> Self {
        RequestError::protocol(ProtocolError::new(
            e.error_code,
            e.major_opcode,
            e.minor_opcode,
        ))
    }
}

impl From<ConnectionError> for RequestError {
    fn from(e: ConnectionError) -> Self {
        RequestError::local(format!("connection error: {}", e))
    }
}

impl From<ReplyError> for RequestError {
    fn from(e: ReplyError) -> Self {
        match e {
            ReplyError::ConnectionError(e) => e.into(),
            ReplyError::X11Error(e) => e.into(),
        }
    }
}

impl From<ReplyOrIdError> for RequestError {
    fn from(e: ReplyOrIdError) -> Self {
        match e {
            ReplyOrIdError::IdsExhausted => RequestError::local("resource ids exhausted"),
            ReplyOrIdError::ConnectionError(e) => e.into(),
            ReplyOrIdError::X11Error(e) => e.into(),
        }
    }
}

/// Bootstrap stages, used to tell which one failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BootstrapStep {
    OpenDisplay,
    XcbConnection,
    Screen,
    ChooseFbConfig,
    CreateContext,
    CreateColormap,
    CreateWindow,
    MapWindow,
    CreateSurface,
    MakeCurrent,
    SetTitle,
    InternProtocolsAtom,
    InternDeleteWindowAtom,
    RegisterCloseEvent,
}

impl BootstrapStep {
    pub fn description(self) -> &'static str {
        use BootstrapStep::*;
        match self {
            OpenDisplay => "failed to open X display",
            XcbConnection => "failed to create connection to Xorg",
            Screen => "failed to find the default screen",
            ChooseFbConfig => "failed to find an OpenGL framebuffer config",
            CreateContext => "failed to create an OpenGL context",
            CreateColormap => "failed to create colormap",
            CreateWindow => "failed to create window",
            MapWindow => "failed to map window",
            CreateSurface => "failed to create GLX window",
            MakeCurrent => "failed to make OpenGL context current",
            SetTitle => "failed to rename window",
            InternProtocolsAtom => "failed to get WM_PROTOCOLS",
            InternDeleteWindowAtom => "failed to get WM_DELETE_WINDOW",
            RegisterCloseEvent => "failed to register window close event",
        }
    }
}

impl fmt::Display for BootstrapStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.description())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{step}: {source}")]
pub struct BootstrapError {
    pub step: BootstrapStep,
    #[source]
    pub source: RequestError,
}

impl BootstrapError {
    pub fn new(step: BootstrapStep, source: RequestError) -> Self {
        Self { step, source }
    }
}

/// Attach the bootstrap step to a request result
pub trait StepContext<T> {
    fn step(self, step: BootstrapStep) -> Result<T, BootstrapError>;
}

impl<T> StepContext<T> for Result<T, RequestError> {
    fn step(self, step: BootstrapStep) -> Result<T, BootstrapError> {
        self.map_err(|source| BootstrapError::new(step, source))
    }
}

/// Failures after bootstrap
#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Bootstrap(#[from] BootstrapError),
    #[error("lost the event queue: {0}")]
    EventQueue(RequestError),
}

impl AppError {
    /// Bootstrap failures are logged where they happen
    pub fn is_logged(&self) -> bool {
        matches!(self, AppError::Bootstrap(_))
    }
}
