mod http;
mod location;
mod navigate;
mod timer;

pub use self::http::{
    settle, ApiUrl, ContentType, Http, HttpError, HttpOutcome, HttpReply, HttpResult,
};
pub use self::location::{Location, LocationOperation, LocationOutput};
pub use self::navigate::{Navigate, NavigateOperation};
pub use self::timer::{Timer, TimerOperation, TimerOutput};

// Crux's built-in Render covers view updates; no custom wrapper needed.
pub use crux_core::render::Render;

use crate::event::Event;

#[derive(crux_core::macros::Effect)]
#[effect(app = "crate::App")]
pub struct Capabilities {
    pub http: Http<Event>,
    pub location: Location<Event>,
    pub timer: Timer<Event>,
    pub navigate: Navigate<Event>,
    pub render: Render<Event>,
}
