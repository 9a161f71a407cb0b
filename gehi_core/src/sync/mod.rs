mod keyed_mutex;

pub use keyed_mutex::{KeyedMutex, KeyedMutexGuard};
