pub mod event;
pub mod metadata;
pub mod platform;
pub mod template;

pub use event::{Answer, Attendance, Event, EventDraft, ReactionSymbol, User};
pub use metadata::{DEFAULT_CHANNEL_NAME, Metadata};
pub use platform::{Channel, IncomingMessage, Member, MessageRef, ReactionAdded, UserProfile};
pub use template::{FixedTrainingTime, TemplateFile};
