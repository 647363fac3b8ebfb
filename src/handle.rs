use super::{
    errors::PoolError,
    result::TaskResult,
};
use std::{
    fmt,
    future::Future,
    pin::Pin,
    task::{Context, Poll}
};
use futures::{
    channel::oneshot,
    executor,
};


/// Задача в очереди пула: callable вместе с уже захваченными аргументами
pub(crate) type Task = Box<dyn FnOnce() + Send + 'static>;


/// Создает связанную пару sender/handle для handle'ов, собранных вручную
pub fn channel<T>() -> (ResultSender<T>, TaskHandle<T>) {
    let (sender, receiver) = oneshot::channel();
    (ResultSender { sender }, TaskHandle::new(receiver))
}


/// Сторона производителя: доставляет результат ровно один раз.
/// Если sender дропнут без доставки, handle становится `Broken`.
pub struct ResultSender<T> {
    sender: oneshot::Sender<TaskResult<T>>,
}

impl<T> ResultSender<T> {
    #[inline]
    pub fn send(self, value: T) {
        self.deliver(Ok(value));
    }

    #[inline]
    pub fn fail(self, error: PoolError) {
        self.deliver(Err(error));
    }

    pub fn deliver(self, result: TaskResult<T>) {
        // handle уже дропнут - результат никому не нужен
        let _ = self.sender.send(result);
    }

    /// true, если handle на другой стороне уже дропнут
    #[inline]
    pub fn is_canceled(&self) -> bool {
        self.sender.is_canceled()
    }
}


/// Handle на результат задачи.
///
/// Значение забирается ровно один раз: через блокирующий `get()` или через `.await`.
/// Повторная попытка дает `PoolError::AlreadyRetrieved`.
pub struct TaskHandle<T> {
    receiver: Option<oneshot::Receiver<TaskResult<T>>>,
}

impl<T> TaskHandle<T> {

    pub(crate) fn new(receiver: oneshot::Receiver<TaskResult<T>>) -> Self {
        Self {
            receiver: Some(receiver),
        }
    }

    /// Уже готовый handle со значением
    #[inline]
    pub fn ready(value: T) -> Self {
        Self::from_result(Ok(value))
    }

    pub fn from_result(result: TaskResult<T>) -> Self {
        let (sender, handle) = channel();
        sender.deliver(result);
        handle
    }

    #[inline]
    pub fn is_retrieved(&self) -> bool {
        self.receiver.is_none()
    }

    /// Блокирует текущий поток до завершения задачи
    pub fn get(&mut self) -> TaskResult<T> {
        let receiver = self.receiver.take().ok_or(PoolError::AlreadyRetrieved)?;
        executor::block_on(receiver).unwrap_or(Err(PoolError::Broken))
    }
}

impl<T> Future for TaskHandle<T> {
    type Output = TaskResult<T>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let this = self.get_mut();
        let Some(receiver) = this.receiver.as_mut() else {
            return Poll::Ready(Err(PoolError::AlreadyRetrieved));
        };
        match Pin::new(receiver).poll(cx) {
            Poll::Ready(res) => {
                this.receiver = None;
                Poll::Ready(res.unwrap_or(Err(PoolError::Broken)))
            }
            Poll::Pending => Poll::Pending,
        }
    }
}

impl<T> fmt::Debug for TaskHandle<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TaskHandle")
            .field("retrieved", &self.is_retrieved())
            .finish()
    }
}
