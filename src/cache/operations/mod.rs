/// 缓存操作

// 进程内缓存
pub mod memory;

// Redis 共享缓存
pub mod token;

pub use memory::MemoryIdentityCache;
pub use token::RedisIdentityCache;
