mod memory_store;
mod redis_store;

pub use memory_store::create_memory_session_store;
pub use redis_store::create_redis_session_store;
