//! Пул потоков фиксированного размера с handle'ами на результаты задач
//!
//! # Features
//! - Общая FIFO очередь для всех воркеров, mutex + condvar
//! - Handle на каждую задачу: блокирующий `get()` или `.await`
//! - `ResultBatch`: пакетное ожидание результатов в порядке постановки
//! - Паники задач доставляются в handle, воркер продолжает работу
//! - Shutdown с дообработкой очереди при drop пула

pub mod batch;
pub mod errors;
pub mod handle;
pub mod model;
pub mod pool;
pub mod result;

pub use batch::ResultBatch;
pub use errors::PoolError;
pub use handle::{ResultSender, TaskHandle};
pub use pool::{Config, Submitter, WorkerPool};
pub use result::TaskResult;
