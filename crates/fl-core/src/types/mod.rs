pub mod enums;
pub mod ids;
pub mod io;
pub mod notification;
pub mod request;

pub use enums::{NotificationKind, RequestAction, RequestStatus};
pub use ids::{HelpRequestId, IdError, NotificationId};
pub use io::{
    AddKnowledgeInput, ChatInput, ChatReply, CreateHelpRequestInput, HelpRequestCreated,
    RequestFilter, ResolveRequestInput,
};
pub use notification::Notification;
pub use request::{HelpRequest, KnowledgeEntry};
