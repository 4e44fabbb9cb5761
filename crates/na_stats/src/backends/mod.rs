pub mod file;
pub mod memory;

pub use file::FileStats;
pub use memory::MemoryStats;
