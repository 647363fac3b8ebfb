use worker_pool::{Config, PoolError, ResultBatch, WorkerPool};
use clap::Parser;
use std::time::Instant;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;


#[derive(Parser, Debug)]
#[command(about = "Runs squaring tasks on a worker pool and checks the results")]
struct Args {
    /// Число воркеров (по умолчанию - число CPU)
    #[arg(long)]
    threads: Option<usize>,
    #[arg(long, default_value_t = 1_000)]
    tasks: usize,
    /// Число потоков, одновременно ставящих задачи
    #[arg(long, default_value_t = 1)]
    submitters: usize,
    /// Выполнять задачи в потоке вызывающего, без пула
    #[arg(long)]
    inline: bool,
    #[arg(long)]
    print: bool,
}

fn square_batch(batch: &mut ResultBatch<'_, u64>, range: std::ops::Range<u64>) -> Result<Vec<u64>, PoolError> {
    for i in range {
        batch.add(move || i * i)?;
    }
    batch.get()
}

fn run(args: &Args) -> Result<Vec<u64>, PoolError> {
    let tasks = args.tasks as u64;

    if args.inline {
        return square_batch(&mut ResultBatch::new(), 0..tasks);
    }

    let mut config = Config::cpu_bound();
    if let Some(threads) = args.threads {
        config.num_threads = threads;
    }
    let pool = WorkerPool::with_config(config)?;
    info!(threads = pool.num_threads(), tasks, submitters = args.submitters, "pool ready");

    let submitters = args.submitters.max(1) as u64;
    let chunk = tasks.div_ceil(submitters);

    // каждый submitter со своим batch, результаты склеиваются по порядку
    let chunks = crossbeam::thread::scope(|s| {
        let workers: Vec<_> = (0..submitters)
            .map(|n| {
                let pool = &pool;
                let range = (n * chunk).min(tasks)..((n + 1) * chunk).min(tasks);
                s.spawn(move |_| square_batch(&mut ResultBatch::with_pool(pool), range))
            })
            .collect();
        workers
            .into_iter()
            .map(|w| w.join().unwrap_or_else(|_| Err(PoolError::Panic("submitter thread panicked".to_owned()))))
            .collect::<Vec<_>>()
    })
    .map_err(|_| PoolError::Panic("submitter scope panicked".to_owned()))?;

    let metrics = pool.metrics();
    info!(
        completed = metrics.completed_tasks,
        failed = metrics.failed_tasks,
        "all submitters finished"
    );

    let mut results = Vec::with_capacity(args.tasks);
    for chunk in chunks {
        results.extend(chunk?);
    }
    Ok(results)
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();
    let now = Instant::now();

    match run(&args) {
        Ok(results) => {
            let valid = results
                .iter()
                .enumerate()
                .all(|(i, &v)| v == (i as u64) * (i as u64));
            if args.print {
                info!(?results, "results");
            }
            info!(count = results.len(), valid, elapsed = ?now.elapsed(), "done");
            if !valid {
                std::process::exit(1);
            }
        }
        Err(err) => {
            error!(error = %err, "run failed");
            std::process::exit(1);
        }
    }
}
