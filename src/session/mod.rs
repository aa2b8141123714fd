pub mod broadcast;
pub mod coordinator;
pub mod session;

pub use broadcast::{Broadcaster, ChannelLayer, Outbox};
pub use coordinator::SessionCoordinator;
pub use session::Session;
