/// Ошибки пула и его handle'ов
#[derive(Debug, PartialEq, PartialOrd, Eq, Ord, Clone, thiserror::Error)]
pub enum PoolError {
    #[error("invalid thread count {0}: pool needs at least one worker")]
    InvalidThreadCount(usize),

    #[error("failed to spawn worker thread: {0}")]
    Spawn(String),

    #[error("enqueue on stopped pool")]
    Stopped,

    /// Сообщение паники. Строковые payload'ы передаются как есть, примитивы из
    /// `panic_any` - значением с именем типа. Для остальных типов доступен
    /// только `TypeId`: сам payload не `Clone` и в ошибку не переносится.
    #[error("task panicked: {0}")]
    Panic(String),

    #[error("task result already retrieved")]
    AlreadyRetrieved,

    #[error("task handle broken: task was dropped before producing a result")]
    Broken,
}
