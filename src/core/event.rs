use x11rb::protocol::xproto::{
    ClientMessageEvent, ConfigureNotifyEvent, CLIENT_MESSAGE_EVENT, CONFIGURE_NOTIFY_EVENT,
};
use x11rb::x11_utils::TryParse;

/// High bit of the response type, set on events sent by other clients
pub const SYNTHETIC_EVENT_BIT: u8 = 0x80;

/// The events the input step reacts to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowEvent {
    /// First 32-bit data word of a client message
    ClientMessage { data0: u32 },
    /// New window size from a configure notification
    Configure { width: u16, height: u16 },
    /// Anything else, by response type with the synthetic bit cleared
    Other { response_type: u8 },
}

impl WindowEvent {
    /// Decode a wire-format event. Server-generated and synthetic events
    /// are treated alike; malformed known kinds fall through to `Other`.
    pub fn classify(bytes: &[u8]) -> Self {
        let Some(&first) = bytes.first() else {
            return WindowEvent::Other { response_type: 0 };
        };
        let response_type = first & !SYNTHETIC_EVENT_BIT;

        match response_type {
            CLIENT_MESSAGE_EVENT => match ClientMessageEvent::try_parse(bytes) {
                Ok((event, _)) => WindowEvent::ClientMessage {
                    data0: event.data.as_data32()[0],
                },
                Err(_) => WindowEvent::Other { response_type },
            },
            CONFIGURE_NOTIFY_EVENT => match ConfigureNotifyEvent::try_parse(bytes) {
                Ok((event, _)) => WindowEvent::Configure {
                    width: event.width,
                    height: event.height,
                },
                Err(_) => WindowEvent::Other { response_type },
            },
            _ => WindowEvent::Other { response_type },
        }
    }
}
