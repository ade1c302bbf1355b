//! Reading sessions overlaid on the record list
//!
//! # Architecture
//!
//! ```text
//! ┌───────────────────────────────────────────────┐
//! │              ReadingSessionStore              │
//! │  records · sessions · progress · search index │
//! └───────────────────────────────────────────────┘
//!        │                 │                │
//!        ▼                 ▼                ▼
//!  ┌────────────┐   ┌─────────────┐   ┌──────────┐
//!  │ContentCache│   │ProgressStore│   │ EventBus │
//!  └────────────┘   └─────────────┘   └──────────┘
//! ```

mod events;
mod progress;
mod store;
mod types;
mod view;

pub use events::{EventBus, ReaderEvent};
pub use progress::{
    MemoryProgressStore, ProgressMap, ProgressStore, SavedProgress, SqliteProgressStore,
    PROGRESS_STATE_KEY,
};
pub use store::ReadingSessionStore;
pub use types::{ReadingSession, ReadingStatus, Record, RecordId, SearchJump, ToggleOutcome};
pub use view::{Icon, RecordView, READING_LABEL};
