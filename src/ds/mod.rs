pub mod intrusive_list;
pub mod recency_set;
pub mod slot_arena;

pub use intrusive_list::IntrusiveList;
pub use recency_set::RecencySet;
pub use slot_arena::{SlotArena, SlotId};
