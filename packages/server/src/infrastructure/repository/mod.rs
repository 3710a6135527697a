//! Repository の実装
//!
//! - `inmemory`: プロセス内の HashMap を使った実装（永続化なし）

pub mod inmemory;

pub use inmemory::InMemoryRoomRepository;
