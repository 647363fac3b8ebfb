use super::{
    errors::PoolError,
    result::{self, TaskResult},
    handle::{
        self,
        Task,
        TaskHandle,
    },
    model::PoolMetrics,
};
use std::{
    collections::VecDeque,
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    },
    thread::{self, JoinHandle},
};
use parking_lot::{Condvar, Mutex};
use tracing::{debug, info, trace, warn};


/// Конфигурация пула потоков
#[derive(Debug, Clone)]
pub struct Config {
    pub num_threads: usize,
    pub thread_name_prefix: String,
    pub stack_size: Option<usize>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            num_threads: num_cpus::get(),
            thread_name_prefix: "pool-worker".to_owned(),
            stack_size: None,
        }
    }
}

impl Config {
    pub fn cpu_bound() -> Self {
        Self {
            num_threads: num_cpus::get(),
            ..Default::default()
        }
    }

    pub fn io_bound() -> Self {
        Self {
            num_threads: num_cpus::get() * 2, // потоки часто спят в блокирующих вызовах
            ..Default::default()
        }
    }
}


#[inline(always)]
fn unlikely(b: bool) -> bool {
    #[cold]
    fn cold() {}
    if b { cold() }
    b
}

struct State {
    queue: VecDeque<Task>,
    shutdown: bool,
}

/// Общее состояние пула: очередь и флаг shutdown под одной парой mutex/condvar
struct Shared {
    state: Mutex<State>,
    available: Condvar,
    num_threads: usize,
    active_tasks: AtomicUsize,
    total_spawned: AtomicUsize,
    completed_tasks: Arc<AtomicUsize>,
    failed_tasks: Arc<AtomicUsize>,
}

impl Shared {
    fn new(num_threads: usize) -> Self {
        Self {
            state: Mutex::new(State {
                queue: VecDeque::new(),
                shutdown: false,
            }),
            available: Condvar::new(),
            num_threads,
            active_tasks: AtomicUsize::new(0),
            total_spawned: AtomicUsize::new(0),
            completed_tasks: Arc::new(AtomicUsize::new(0)),
            failed_tasks: Arc::new(AtomicUsize::new(0)),
        }
    }

    fn push_task(&self, task: Task) -> Result<(), PoolError> {
        {
            let mut state = self.state.lock();
            if unlikely(state.shutdown) {
                return Err(PoolError::Stopped);
            }
            state.queue.push_back(task);
        }
        self.total_spawned.fetch_add(1, Ordering::Relaxed);
        // очередь выросла на одну задачу - достаточно одного воркера
        self.available.notify_one();
        Ok(())
    }

    fn enqueue<R, F>(&self, f: F) -> TaskResult<TaskHandle<R>>
    where
        R: Send + 'static,
        F: FnOnce() -> R + Send + 'static,
    {
        let (sender, handle) = handle::channel::<R>();
        let completed = self.completed_tasks.clone();
        let failed = self.failed_tasks.clone();

        let task: Task = Box::new(move || {
            let result = result::catch_task(f);
            match &result {
                Ok(_) => {
                    completed.fetch_add(1, Ordering::Relaxed);
                }
                Err(err) => {
                    failed.fetch_add(1, Ordering::Relaxed);
                    debug!(error = %err, "task failed, delivering error to its handle");
                }
            }
            sender.deliver(result);
        });

        self.push_task(task)?;
        trace!("task enqueued");
        Ok(handle)
    }

    fn execute<F>(&self, f: F) -> Result<(), PoolError>
    where
        F: FnOnce() + Send + 'static,
    {
        let completed = self.completed_tasks.clone();
        let failed = self.failed_tasks.clone();

        let task: Task = Box::new(move || {
            match result::catch_task(f) {
                Ok(()) => {
                    completed.fetch_add(1, Ordering::Relaxed);
                }
                Err(err) => {
                    failed.fetch_add(1, Ordering::Relaxed);
                    warn!(error = %err, "detached task failed");
                }
            }
        });

        self.push_task(task)?;
        trace!("detached task enqueued");
        Ok(())
    }

    fn worker_loop(&self, index: usize) {
        debug!(worker = index, "worker started");
        loop {
            let task = {
                let mut state = self.state.lock();
                while state.queue.is_empty() && !state.shutdown {
                    self.available.wait(&mut state);
                }
                match state.queue.pop_front() {
                    Some(task) => task,
                    // shutdown и очередь пуста
                    None => break,
                }
            };

            // lock уже отпущен: задача может сама ставить задачи в этот пул
            self.active_tasks.fetch_add(1, Ordering::Relaxed);
            task();
            self.active_tasks.fetch_sub(1, Ordering::Relaxed);
        }
        debug!(worker = index, "worker stopped");
    }

    fn pending_count(&self) -> usize {
        self.state.lock().queue.len()
    }
}


/// Пул с фиксированным числом потоков и общей FIFO очередью.
///
/// При drop пул перестает принимать задачи, дорабатывает всю очередь
/// и дожидается завершения всех воркеров.
pub struct WorkerPool {
    shared: Arc<Shared>,
    workers: Vec<JoinHandle<()>>,
}

impl WorkerPool {
    pub fn new(num_threads: usize) -> Result<Self, PoolError> {
        let config = Config {
            num_threads,
            ..Default::default()
        };
        Self::with_config(config)
    }

    pub fn with_config(config: Config) -> Result<Self, PoolError> {
        if config.num_threads == 0 {
            return Err(PoolError::InvalidThreadCount(config.num_threads));
        }

        let mut pool = WorkerPool {
            shared: Arc::new(Shared::new(config.num_threads)),
            workers: Vec::with_capacity(config.num_threads),
        };

        // Запускаем воркеры. При ошибке spawn drop пула остановит уже запущенные.
        for index in 0..config.num_threads {
            let mut builder = thread::Builder::new()
                .name(format!("{}-{}", config.thread_name_prefix, index));
            if let Some(stack_size) = config.stack_size {
                builder = builder.stack_size(stack_size);
            }

            let shared = pool.shared.clone();
            let worker = builder
                .spawn(move || shared.worker_loop(index))
                .map_err(|e| PoolError::Spawn(e.to_string()))?;
            pool.workers.push(worker);
        }

        debug!(num_threads = config.num_threads, "worker pool started");
        Ok(pool)
    }

    /// Ставит callable в очередь и возвращает handle на его результат.
    /// Аргументы передаются захватом в замыкание.
    #[inline]
    pub fn enqueue<R, F>(&self, f: F) -> TaskResult<TaskHandle<R>>
    where
        R: Send + 'static,
        F: FnOnce() -> R + Send + 'static,
    {
        self.shared.enqueue(f)
    }

    /// Fire-and-forget: результат не нужен, паника только логируется
    #[inline]
    pub fn execute<F>(&self, f: F) -> Result<(), PoolError>
    where
        F: FnOnce() + Send + 'static,
    {
        self.shared.execute(f)
    }

    pub fn submitter(&self) -> Submitter {
        Submitter {
            shared: self.shared.clone(),
        }
    }

    /// Число задач в очереди (еще не взятых воркерами)
    pub fn pending_count(&self) -> usize {
        self.shared.pending_count()
    }

    #[inline]
    pub fn num_threads(&self) -> usize {
        self.shared.num_threads
    }

    pub fn metrics(&self) -> PoolMetrics {
        PoolMetrics {
            num_threads: self.shared.num_threads,
            active_tasks: self.shared.active_tasks.load(Ordering::Relaxed),
            queued_tasks: self.shared.pending_count(),
            total_spawned: self.shared.total_spawned.load(Ordering::Relaxed),
            completed_tasks: self.shared.completed_tasks.load(Ordering::Relaxed),
            failed_tasks: self.shared.failed_tasks.load(Ordering::Relaxed),
        }
    }

    /// Останавливает прием задач, дорабатывает очередь и join'ит воркеры.
    /// Повторный вызов ничего не делает.
    pub fn shutdown(&mut self) {
        let was_running = {
            let mut state = self.shared.state.lock();
            !std::mem::replace(&mut state.shutdown, true)
        };
        self.shared.available.notify_all();

        let current = thread::current().id();
        for worker in self.workers.drain(..) {
            // последний владелец пула может оказаться задачей на одном из воркеров
            if worker.thread().id() == current {
                continue;
            }
            if worker.join().is_err() {
                warn!("worker thread terminated with a panic");
            }
        }

        if was_running {
            info!(
                completed = self.shared.completed_tasks.load(Ordering::Relaxed),
                failed = self.shared.failed_tasks.load(Ordering::Relaxed),
                "worker pool shut down"
            );
        }
    }
}

impl Drop for WorkerPool {
    fn drop(&mut self) {
        self.shutdown();
    }
}


/// Точка постановки задач в пул без владения им.
///
/// Нужна задачам, которые сами ставят задачи в тот же пул.
/// После shutdown пула все вызовы возвращают `PoolError::Stopped`.
#[derive(Clone)]
pub struct Submitter {
    shared: Arc<Shared>,
}

impl Submitter {
    #[inline]
    pub fn enqueue<R, F>(&self, f: F) -> TaskResult<TaskHandle<R>>
    where
        R: Send + 'static,
        F: FnOnce() -> R + Send + 'static,
    {
        self.shared.enqueue(f)
    }

    #[inline]
    pub fn execute<F>(&self, f: F) -> Result<(), PoolError>
    where
        F: FnOnce() + Send + 'static,
    {
        self.shared.execute(f)
    }

    pub fn pending_count(&self) -> usize {
        self.shared.pending_count()
    }
}
