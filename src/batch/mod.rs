//! The keyed group-by boundary between stages.
//!
//! A [`Stage`] is a pure map function and a pure reduce function. The
//! substrate maps every input independently, shuffles the emitted pairs so
//! that all values of one key meet in a single reduce call, and reduces
//! every key independently. Nothing of a stage is visible to the next until
//! the whole stage has been materialised.
//!
//! [`LocalSubstrate`] runs this in-process on a rayon pool. Values reach a
//! reduce call in no particular order, and a failed task is simply rerun.

use std::hash::Hash;

use log::{debug, info, warn};
use rayon::prelude::*;
use rustc_hash::FxHashMap;

use crate::runtime::{Error, Result};

pub trait Stage: Sync {
    type Input: Sync;
    type Key: Clone + Eq + Hash + Ord + Send + Sync;
    type Value: Send + Sync;
    type Output: Send;

    fn name(&self) -> &str;

    fn map(&self, input: &Self::Input) -> Result<Vec<(Self::Key, Self::Value)>>;

    fn reduce(&self, key: &Self::Key, values: &[Self::Value]) -> Result<Vec<Self::Output>>;
}

pub struct LocalSubstrate {
    pool: rayon::ThreadPool,
    task_attempts: usize,
}

impl LocalSubstrate {
    pub fn new(threads: usize, task_attempts: usize) -> Result<Self> {
        if task_attempts == 0 {
            return Err(Error::configuration("at least one task attempt is needed"));
        }
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .thread_name(|i| format!("dereplicate-worker-{}", i))
            .build()
            .map_err(|e| Error::configuration(format!("could not create thread pool: {}", e)))?;

        Ok(LocalSubstrate {
            pool,
            task_attempts,
        })
    }

    pub fn num_threads(&self) -> usize {
        self.pool.current_num_threads()
    }

    ///////////////////////////////
    /// Run one stage to completion. Groups are reduced in key order so the output is reproducible
    pub fn run<S: Stage>(&self, stage: &S, inputs: &[S::Input]) -> Result<Vec<S::Output>> {
        debug!("Stage {}: mapping {} inputs", stage.name(), inputs.len());

        self.pool.install(|| {
            let mapped = inputs
                .par_iter()
                .map(|input| self.attempt(stage.name(), || stage.map(input)))
                .collect::<Result<Vec<_>>>()?;

            //Shuffle
            let mut groups: FxHashMap<S::Key, Vec<S::Value>> = FxHashMap::default();
            for (key, value) in mapped.into_iter().flatten() {
                groups.entry(key).or_default().push(value);
            }
            let mut groups: Vec<(S::Key, Vec<S::Value>)> = groups.into_iter().collect();
            groups.par_sort_unstable_by(|a, b| a.0.cmp(&b.0));
            debug!("Stage {}: reducing {} groups", stage.name(), groups.len());

            let reduced = groups
                .par_iter()
                .map(|(key, values)| self.attempt(stage.name(), || stage.reduce(key, values)))
                .collect::<Result<Vec<_>>>()?;

            let outputs: Vec<S::Output> = reduced.into_iter().flatten().collect();
            info!(
                "Stage {}: {} inputs => {} outputs",
                stage.name(),
                inputs.len(),
                outputs.len()
            );
            Ok(outputs)
        })
    }

    fn attempt<T, F>(&self, stage: &str, task: F) -> Result<T>
    where
        F: Fn() -> Result<T>,
    {
        let mut last_error = None;
        for attempt in 1..=self.task_attempts {
            match task() {
                Ok(result) => return Ok(result),
                Err(e) => {
                    warn!(
                        "Stage {}: task failed on attempt {}/{}: {}",
                        stage, attempt, self.task_attempts, e
                    );
                    last_error = Some(e);
                }
            }
        }
        Err(Error::stage_failure(
            stage,
            self.task_attempts,
            last_error.map(|e| e.to_string()),
        ))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;

    struct WordCount;
    impl Stage for WordCount {
        type Input = String;
        type Key = String;
        type Value = usize;
        type Output = (String, usize);

        fn name(&self) -> &str {
            "wordcount"
        }

        fn map(&self, line: &String) -> Result<Vec<(String, usize)>> {
            Ok(line.split_whitespace().map(|w| (w.to_string(), 1)).collect())
        }

        fn reduce(&self, word: &String, counts: &[usize]) -> Result<Vec<(String, usize)>> {
            Ok(vec![(word.clone(), counts.iter().sum())])
        }
    }

    struct Flaky {
        calls: AtomicUsize,
        failures: usize,
    }
    impl Stage for Flaky {
        type Input = u32;
        type Key = u32;
        type Value = u32;
        type Output = u32;

        fn name(&self) -> &str {
            "flaky"
        }

        fn map(&self, input: &u32) -> Result<Vec<(u32, u32)>> {
            if self.calls.fetch_add(1, Ordering::SeqCst) < self.failures {
                return Err(Error::malformed_record("input", Some("transient")));
            }
            Ok(vec![(*input, *input)])
        }

        fn reduce(&self, _key: &u32, values: &[u32]) -> Result<Vec<u32>> {
            Ok(values.to_vec())
        }
    }

    #[test]
    fn groups_by_key() {
        let substrate = LocalSubstrate::new(2, 1).unwrap();
        let lines = vec!["a b a".to_string(), "b c".to_string(), "a".to_string()];
        let counts = substrate.run(&WordCount, &lines).unwrap();
        assert_eq!(
            counts,
            vec![("a".to_string(), 3), ("b".to_string(), 2), ("c".to_string(), 1)]
        );
    }

    #[test]
    fn failed_tasks_are_retried() {
        let substrate = LocalSubstrate::new(1, 2).unwrap();
        let stage = Flaky {
            calls: AtomicUsize::new(0),
            failures: 1,
        };
        assert_eq!(substrate.run(&stage, &[7]).unwrap(), vec![7]);
    }

    #[test]
    fn persistent_failure_is_a_stage_failure() {
        let substrate = LocalSubstrate::new(1, 2).unwrap();
        let stage = Flaky {
            calls: AtomicUsize::new(0),
            failures: usize::MAX,
        };
        let err = substrate.run(&stage, &[7]).unwrap_err();
        assert!(matches!(err, Error::StageFailure { attempts: 2, .. }));
    }

    #[test]
    fn zero_attempts_is_rejected() {
        assert!(matches!(
            LocalSubstrate::new(1, 0),
            Err(Error::Configuration { .. })
        ));
    }
}
