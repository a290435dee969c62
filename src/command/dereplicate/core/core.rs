use std::sync::Arc;

use itertools::Itertools;
use log::{info, warn};

use super::aggregation::{AggregationStage, Claim};
use super::mate_join::MateJoinStage;
use super::pairing::PairingStage;
use super::params;
use super::propagation::PropagationStage;
use super::representative::{ClusterOutput, RepresentativeStage};
use crate::batch::LocalSubstrate;
use crate::fileformat::{self, Checkpoints};
use crate::record::{ReadRecord, ReadRecordSet};
use crate::runtime::Result;

pub struct Dereplicate;

impl Dereplicate {
    pub fn run(
        params_io: Arc<params::IO>,
        params_runtime: Arc<params::Runtime>,
        params_threading: Arc<params::Threading>,
    ) -> anyhow::Result<()> {
        info!("Running command: dereplicate");
        info!(
            "Link radius {}, {} propagation round(s), key window {:?}",
            params_runtime.link_radius, params_runtime.rounds, params_runtime.window
        );
        if !params_runtime.covers_max_radius() {
            warn!(
                "{} round(s) do not cover max radius {}; longer near-duplicate chains may stay split",
                params_runtime.rounds, params_runtime.max_radius
            );
        }

        let substrate =
            LocalSubstrate::new(params_threading.threads_work, params_threading.task_attempts)?;
        info!("Using {} worker threads", substrate.num_threads());

        let mut reads = Vec::new();
        for path in &params_io.path_in {
            reads.extend(fileformat::read_fasta(path, params_runtime.window)?);
        }
        let reads = drop_duplicate_ids(reads);
        info!(
            "Read {} reads from {} input file(s)",
            reads.len(),
            params_io.path_in.len()
        );

        std::fs::create_dir_all(&params_io.path_tmp)?;
        let mut checkpoints = Checkpoints::new(&params_io.path_tmp, params_io.format, params_io.force);
        let clusters = Self::cluster(reads, &params_runtime, &substrate, &mut checkpoints)?;

        if let Some(parent) = params_io.path_out.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        fileformat::write_fasta(
            &params_io.path_out,
            clusters.iter().map(|c| (c.name(), c.consensus.as_str())),
        )?;
        info!(
            "Wrote {} clusters to {}",
            clusters.len(),
            params_io.path_out.display()
        );

        if params_io.cleanup {
            info!("Removing stage checkpoints in {}", params_io.path_tmp.display());
            std::fs::remove_dir_all(&params_io.path_tmp)?;
        }

        info!("Done dereplicating");
        Ok(())
    }

    ///////////////////////////////
    /// All four stages, plus mate joining when asked for. Every stage is materialised
    /// through `checkpoints` before the next one starts
    pub fn cluster(
        reads: Vec<ReadRecord>,
        params_runtime: &params::Runtime,
        substrate: &LocalSubstrate,
        checkpoints: &mut Checkpoints,
    ) -> Result<Vec<ClusterOutput>> {
        let reads = if params_runtime.join_mates {
            let joined = substrate.run(
                &MateJoinStage {
                    window: params_runtime.window,
                },
                &reads,
            )?;
            info!("Joined {} reads into {} pairs", reads.len(), joined.len());
            joined
        } else {
            reads
        };

        let pairing = PairingStage {
            link_radius: params_runtime.link_radius,
        };
        let groups: Vec<ReadRecordSet> =
            checkpoints.resume_or("step0", || substrate.run(&pairing, &reads))?;

        let propagation = PropagationStage {
            rounds: params_runtime.rounds,
        };
        let fragments = propagation.run_with(groups, |k, fragments| {
            checkpoints.resume_or(&format!("step1/iteration{}", k), || {
                info!("Propagation round {}/{}", k + 1, propagation.rounds);
                propagation.round(substrate, &fragments)
            })
        })?;

        let claims: Vec<Claim> =
            checkpoints.resume_or("step2", || AggregationStage.run(substrate, &fragments))?;

        substrate.run(&RepresentativeStage, &claims)
    }
}

/// Keep the first read of every id
fn drop_duplicate_ids(reads: Vec<ReadRecord>) -> Vec<ReadRecord> {
    let total = reads.len();
    let unique: Vec<ReadRecord> = reads
        .into_iter()
        .unique_by(|read| read.id().to_string())
        .collect();
    if unique.len() < total {
        warn!(
            "Dropped {} reads whose id was already taken",
            total - unique.len()
        );
    }
    unique
}
