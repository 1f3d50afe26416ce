pub mod events;
pub mod manager;
pub mod queue;
pub mod session;
pub mod track;

mod playback;

pub use events::{DestroyReason, EndReason, PlayerEvent};
pub use manager::SessionManager;
pub use queue::TrackQueue;
pub use session::{Session, SessionState};
pub use track::Track;
