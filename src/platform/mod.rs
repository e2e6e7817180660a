mod glx;

pub use glx::GlxPlatform;
