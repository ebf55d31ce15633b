use indicatif::{ProgressBar, ProgressStyle};
use log::warn;
use rayon::prelude::*;
use rayon::ThreadPool;

const PROGRESS_TEMPLATE: &str = "{msg:>6} {wide_bar} {pos}/{len} [{elapsed}<{eta}]";

/// Progress bar for a job of `len` tasks, labelled with `msg`.
///
/// An empty job gets a hidden bar.
pub fn task_progress(len: u64, msg: &'static str) -> ProgressBar {
    if len == 0 {
        return ProgressBar::hidden();
    }
    let style = ProgressStyle::with_template(PROGRESS_TEMPLATE)
        .unwrap_or_else(|_| ProgressStyle::default_bar());
    ProgressBar::new(len).with_style(style).with_message(msg)
}

fn build_pool(nproc: usize) -> Option<ThreadPool> {
    if nproc <= 1 {
        return None;
    }
    match rayon::ThreadPoolBuilder::new().num_threads(nproc).build() {
        Ok(pool) => Some(pool),
        Err(e) => {
            warn!("Failed to start {} workers, running sequentially: {}", nproc, e);
            None
        }
    }
}

/// Apply `func` to every task on `nproc` workers, keeping the `Some` results
/// in task order.
pub fn nproc_map<T, R, F>(func: F, tasks: Vec<T>, nproc: usize) -> Vec<R>
where
    T: Send,
    R: Send,
    F: Fn(T) -> Option<R> + Sync + Send,
{
    match build_pool(nproc) {
        Some(pool) => pool.install(|| tasks.into_par_iter().filter_map(&func).collect()),
        None => tasks.into_iter().filter_map(func).collect(),
    }
}

/// Same as [`nproc_map`], reporting progress on a terminal bar.
pub fn prog_map<T, R, F>(func: F, tasks: Vec<T>, nproc: usize) -> Vec<R>
where
    T: Send,
    R: Send,
    F: Fn(T) -> Option<R> + Sync + Send,
{
    let pb = task_progress(tasks.len() as u64, "load");
    let step = |task: T| {
        let content = func(task);
        pb.inc(1);
        content
    };
    let contents = match build_pool(nproc) {
        Some(pool) => pool.install(|| tasks.into_par_iter().filter_map(&step).collect()),
        None => tasks.into_iter().filter_map(&step).collect(),
    };
    pb.finish_and_clear();
    contents
}

/// A label mapper that gives every key the same value.
///
/// Single-class datasets (text detection, HRSC ships) label every object with
/// class 0 regardless of the name written in the annotation file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConstMapper<T> {
    const_value: T,
}

impl<T: Copy> ConstMapper<T> {
    pub fn new(const_value: T) -> Self {
        Self { const_value }
    }

    pub fn get<K: ?Sized>(&self, _key: &K) -> T {
        self.const_value
    }

    pub fn contains<K: ?Sized>(&self, _key: &K) -> bool {
        true
    }
}
