//! Event and ticket domain: payload validation and the business rules that
//! guard selling, redeeming and deleting.

pub mod dates;
pub mod event;
pub mod ticket;

pub use event::{Event, EventDetails, EventDraft, EventPayload};
pub use ticket::Ticket;

/// Inclusive bounds on an event's capacity.
pub const MIN_TICKETS: i64 = 1;
pub const MAX_TICKETS: i64 = 300;

/// Longest accepted event name, in characters.
pub const NAME_MAX_LEN: usize = 100;
