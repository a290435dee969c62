pub mod dereplicate;

pub use dereplicate::{Dereplicate, DereplicateCMD};

pub fn determine_thread_counts_1(total: Option<usize>) -> anyhow::Result<usize> {
    match total {
        Some(0) => anyhow::bail!("At least one worker thread is needed"),
        Some(total) => Ok(total),
        None => match std::thread::available_parallelism() {
            Ok(total) => Ok(total.get()),
            Err(_) => {
                log::warn!("Could not autodetect the number of threads available. Setting to 1, but it is better if you specify");
                Ok(1)
            }
        },
    }
}
