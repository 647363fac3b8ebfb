use super::{
    errors::PoolError,
    result::{self, TaskResult},
    handle::TaskHandle,
    pool::WorkerPool,
};


/// Упорядоченная группа handle'ов, результаты которых забираются одним вызовом.
///
/// Привязанный к пулу batch ставит задачи в пул. Без пула каждая задача
/// выполняется сразу, в потоке вызывающего, и сохраняется как готовый handle.
/// `get()` всегда возвращает результаты в порядке добавления.
pub struct ResultBatch<'a, T> {
    pool: Option<&'a WorkerPool>,
    pending: Vec<TaskHandle<T>>,
}

impl<'a, T> ResultBatch<'a, T> {
    pub fn new() -> Self {
        Self {
            pool: None,
            pending: Vec::new(),
        }
    }

    pub fn with_pool(pool: &'a WorkerPool) -> Self {
        Self {
            pool: Some(pool),
            pending: Vec::new(),
        }
    }

    #[inline]
    pub fn is_bound(&self) -> bool {
        self.pool.is_some()
    }

    /// Ставит задачу в пул или, для batch без пула, выполняет ее сразу.
    ///
    /// Ограничения `Send + 'static` действуют и без пула. Для задач с `Rc`
    /// или заимствованными данными есть `add_inline`.
    pub fn add<F>(&mut self, f: F) -> Result<(), PoolError>
    where
        T: Send + 'static,
        F: FnOnce() -> T + Send + 'static,
    {
        let handle = match self.pool {
            Some(pool) => pool.enqueue(f)?,
            None => TaskHandle::from_result(result::catch_task(f)),
        };
        self.pending.push(handle);
        Ok(())
    }

    /// Всегда выполняет задачу в потоке вызывающего, даже если batch привязан к пулу
    pub fn add_inline<F>(&mut self, f: F)
    where
        F: FnOnce() -> T,
    {
        self.pending.push(TaskHandle::from_result(result::catch_task(f)));
    }

    /// Добавляет handle, созданный вызывающим
    #[inline]
    pub fn add_handle(&mut self, handle: TaskHandle<T>) {
        self.pending.push(handle);
    }

    /// Ждет все handle'ы по порядку добавления.
    ///
    /// Первая ошибка прерывает ожидание, оставшиеся handle'ы отбрасываются.
    /// После вызова batch пуст в любом случае.
    pub fn get(&mut self) -> TaskResult<Vec<T>> {
        let pending = std::mem::take(&mut self.pending);
        let mut results = Vec::with_capacity(pending.len());
        for mut handle in pending {
            results.push(handle.get()?);
        }
        Ok(results)
    }

    /// Async-вариант `get()`: порядок тот же, возвращается первая ошибка
    pub async fn join(&mut self) -> TaskResult<Vec<T>> {
        let pending = std::mem::take(&mut self.pending);
        let mut results = Vec::with_capacity(pending.len());
        for handle in pending {
            results.push(handle.await?);
        }
        Ok(results)
    }

    /// Отбрасывает handle'ы не дожидаясь их. Ошибки задач при этом теряются.
    #[inline]
    pub fn clear(&mut self) {
        self.pending.clear();
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.pending.len()
    }
}

impl ResultBatch<'_, ()> {
    /// Для задач без результата
    pub fn wait(&mut self) -> Result<(), PoolError> {
        self.get().map(|_| ())
    }
}

impl<T> Default for ResultBatch<'_, T> {
    fn default() -> Self {
        Self::new()
    }
}
