pub mod bindings;
pub mod controls;
pub mod devices;
pub mod dispatcher;
pub mod error;
pub mod notifications;
pub mod panel;
pub mod sequencer;
pub mod state;
pub mod status;
pub mod transport;

#[cfg(test)]
mod test_support;

pub use bindings::{binding_for, ControlBinding, ControlId, Glyph};
pub use controls::{Control, ControlRegistry, ControlSnapshot, HeadlessControl, HeadlessSurface};
pub use dispatcher::{Dispatcher, Reply};
pub use error::{ApiError, PanelError, TransportError, ValidationError};
pub use notifications::{Level, LiveNotification, NotificationEvent, NotificationQueue, Phase};
pub use panel::{Panel, PanelOptions};
pub use sequencer::Sequencer;
pub use state::PanelState;
pub use status::Indicator;
pub use transport::{ReqwestTransport, Transport};
