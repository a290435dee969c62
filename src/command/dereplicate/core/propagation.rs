use std::sync::Arc;

use log::info;

use crate::batch::{LocalSubstrate, Stage};
use crate::record::{ReadRecordSet, Signature};
use crate::runtime::Result;

///////////////////////////////
/// Folds identical partial views of one cluster together. Views with equal signatures hold the same ids
pub struct CollapseStage;

impl Stage for CollapseStage {
    type Input = ReadRecordSet;
    type Key = Signature;
    type Value = ReadRecordSet;
    type Output = ReadRecordSet;

    fn name(&self) -> &str {
        "collapse"
    }

    fn map(&self, set: &ReadRecordSet) -> Result<Vec<(Signature, ReadRecordSet)>> {
        Ok(vec![(set.signature(), set.clone())])
    }

    fn reduce(&self, _: &Signature, sets: &[ReadRecordSet]) -> Result<Vec<ReadRecordSet>> {
        match sets {
            [single] => Ok(vec![single.clone()]),
            _ => Ok(vec![ReadRecordSet::union_all(sets)]),
        }
    }
}

///////////////////////////////
/// Sends every set to each of its member ids, then unions all sets that meet at one id.
/// The sets are shared between their members, not copied per member
pub struct MergeStage;

impl Stage for MergeStage {
    type Input = ReadRecordSet;
    type Key = String;
    type Value = Arc<ReadRecordSet>;
    type Output = ReadRecordSet;

    fn name(&self) -> &str {
        "merge"
    }

    fn map(&self, set: &ReadRecordSet) -> Result<Vec<(String, Arc<ReadRecordSet>)>> {
        let shared = Arc::new(set.clone());
        Ok(set
            .ids()
            .map(|id| (id.to_string(), Arc::clone(&shared)))
            .collect())
    }

    fn reduce(&self, _: &String, sets: &[Arc<ReadRecordSet>]) -> Result<Vec<ReadRecordSet>> {
        Ok(vec![ReadRecordSet::union_all(sets.iter().map(Arc::as_ref))])
    }
}

///////////////////////////////
/// Where the iterated stage 1 currently is
#[derive(Debug)]
pub enum Propagation {
    Seed(Vec<ReadRecordSet>),
    Iterating {
        completed: usize,
        fragments: Vec<ReadRecordSet>,
    },
    Done(Vec<ReadRecordSet>),
}

impl Propagation {
    ///////////////////////////////
    /// Take one step. `round` is handed the index of the round to run and its input fragments,
    /// which lets the caller checkpoint or reload each round
    pub fn advance<F>(self, rounds: usize, mut round: F) -> Result<Propagation>
    where
        F: FnMut(usize, Vec<ReadRecordSet>) -> Result<Vec<ReadRecordSet>>,
    {
        match self {
            Propagation::Seed(fragments) => Ok(Propagation::Iterating {
                completed: 0,
                fragments,
            }),
            Propagation::Iterating {
                completed,
                fragments,
            } if completed < rounds => Ok(Propagation::Iterating {
                completed: completed + 1,
                fragments: round(completed, fragments)?,
            }),
            Propagation::Iterating { fragments, .. } => Ok(Propagation::Done(fragments)),
            done @ Propagation::Done(_) => Ok(done),
        }
    }
}

///////////////////////////////
/// Stage 1: a fixed number of merge rounds over the candidate groups.
///
/// Each round at least doubles the hop distance a cluster spans, so chains longer than
/// the round budget can stay split. There is no convergence loop.
pub struct PropagationStage {
    pub rounds: usize,
}

impl PropagationStage {
    /// One merge pass followed by deduplication of the merged views
    pub fn round(
        &self,
        substrate: &LocalSubstrate,
        fragments: &[ReadRecordSet],
    ) -> Result<Vec<ReadRecordSet>> {
        let merged = substrate.run(&MergeStage, fragments)?;
        substrate.run(&CollapseStage, &merged)
    }

    pub fn run(
        &self,
        substrate: &LocalSubstrate,
        seed: Vec<ReadRecordSet>,
    ) -> Result<Vec<ReadRecordSet>> {
        self.run_with(seed, |k, fragments| {
            info!("Propagation round {}/{}", k + 1, self.rounds);
            self.round(substrate, &fragments)
        })
    }

    /// Drive the state machine to the end, running each round through `round`
    pub fn run_with<F>(&self, seed: Vec<ReadRecordSet>, mut round: F) -> Result<Vec<ReadRecordSet>>
    where
        F: FnMut(usize, Vec<ReadRecordSet>) -> Result<Vec<ReadRecordSet>>,
    {
        let mut state = Propagation::Seed(seed);
        loop {
            state = match state {
                Propagation::Done(fragments) => return Ok(fragments),
                state => state.advance(self.rounds, &mut round)?,
            };
        }
    }
}
