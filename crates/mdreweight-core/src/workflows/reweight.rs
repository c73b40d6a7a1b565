use crate::core::io::traits::Trajectory;
use crate::core::models::frame::Frame;
use crate::core::models::group::Group;
use crate::core::models::topology::Topology;
use crate::core::perturbation::Perturbation;
use crate::engine::config::ReweightConfig;
use crate::engine::contribution::ContributionFilter;
use crate::engine::error::EngineError;
use crate::engine::progress::{Progress, ProgressReporter};
use crate::engine::result::ReweightResult;
use crate::engine::tasks::frame_energy::{FrameEnergyTask, GROUP_LABELS, Interaction};
use tracing::{debug, info, instrument, warn};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Reweights a trajectory by the interactions of one group with itself.
///
/// Every distance between two distinct atoms of `group` (or, in minimum-distance mode, every
/// closest approach between two distinct molecule blocks) within the cutoff contributes
/// `perturbation(distance)` to its frame's energy.
///
/// # Errors
///
/// Fails before reading any frame if the configuration is invalid or the group references an
/// atom outside the topology, and aborts on the first frame that cannot be read or whose atom
/// count differs from the topology.
pub fn reweight<T, P>(
    trajectory: &T,
    perturbation: P,
    group: &Group,
    config: &ReweightConfig,
) -> Result<ReweightResult, EngineError>
where
    T: Trajectory,
    P: Perturbation,
{
    reweight_with_progress(
        trajectory,
        perturbation,
        group,
        config,
        &ProgressReporter::new(),
    )
}

pub fn reweight_with_progress<T, P>(
    trajectory: &T,
    perturbation: P,
    group: &Group,
    config: &ReweightConfig,
    reporter: &ProgressReporter,
) -> Result<ReweightResult, EngineError>
where
    T: Trajectory,
    P: Perturbation,
{
    run(
        trajectory,
        &perturbation,
        Interaction::Single(group),
        &ContributionFilter::unrestricted(),
        config,
        reporter,
    )
}

/// Reweights a trajectory by the interactions between two groups.
///
/// Distances run from each atom (or molecule block) of `group_1` to each atom (or block) of
/// `group_2`; pairs referring to the same atom are skipped, so the groups may overlap. `filter`
/// restricts which atoms of each group may contribute.
///
/// Every pair is seen once from each group. Passing the same group twice therefore gives
/// exactly twice the energy [`reweight`] computes for that group, not the same energy.
///
/// # Errors
///
/// Same conditions as [`reweight`], checked for both groups.
pub fn reweight_pair<T, P>(
    trajectory: &T,
    perturbation: P,
    group_1: &Group,
    group_2: &Group,
    filter: &ContributionFilter,
    config: &ReweightConfig,
) -> Result<ReweightResult, EngineError>
where
    T: Trajectory,
    P: Perturbation,
{
    reweight_pair_with_progress(
        trajectory,
        perturbation,
        group_1,
        group_2,
        filter,
        config,
        &ProgressReporter::new(),
    )
}

pub fn reweight_pair_with_progress<T, P>(
    trajectory: &T,
    perturbation: P,
    group_1: &Group,
    group_2: &Group,
    filter: &ContributionFilter,
    config: &ReweightConfig,
    reporter: &ProgressReporter,
) -> Result<ReweightResult, EngineError>
where
    T: Trajectory,
    P: Perturbation,
{
    run(
        trajectory,
        &perturbation,
        Interaction::Pair(group_1, group_2),
        filter,
        config,
        reporter,
    )
}

#[instrument(skip_all, name = "reweight_workflow")]
fn run<T, P>(
    trajectory: &T,
    perturbation: &P,
    interaction: Interaction,
    filter: &ContributionFilter,
    config: &ReweightConfig,
    reporter: &ProgressReporter,
) -> Result<ReweightResult, EngineError>
where
    T: Trajectory,
    P: Perturbation,
{
    // === Phase 0: Validation ===
    config.validate()?;
    let topology = trajectory.topology();
    validate_groups(&interaction, topology)?;

    let expected_frames = trajectory.len();
    info!(
        frames = expected_frames,
        atoms = topology.len(),
        cutoff = config.cutoff,
        mode = ?config.mode,
        "Starting reweighting workflow."
    );

    // === Phase 1: Per-frame perturbation energies ===
    reporter.report(Progress::PhaseStart {
        name: "Frame Energies",
    });
    reporter.report(Progress::TaskStart {
        total_steps: expected_frames as u64,
    });

    let task = FrameEnergyTask {
        topology,
        interaction,
        mode: config.mode,
        cutoff: config.cutoff,
        perturbation,
        filter,
    };

    // The reader is never pulled past its first error; `read_error` keeps that error.
    let mut read_error = None;
    let frames = trajectory
        .frames()
        .enumerate()
        .map_while(|(index, frame)| match frame {
            Ok(frame) => Some((index, frame)),
            Err(e) => {
                read_error = Some(EngineError::Trajectory {
                    frame: index,
                    source: Box::new(e),
                });
                None
            }
        })
        .fuse();

    let evaluate = |(index, frame): (usize, Frame)| {
        if index == 0 {
            check_cutoff(frame.unit_cell().max_cutoff(), config.cutoff, reporter);
        }
        let energy = task.run(index, &frame)?;
        debug!(frame = index, energy, "Frame processed.");
        reporter.report(Progress::FrameDone {
            frame: index,
            energy,
        });
        Ok::<_, EngineError>((index, energy))
    };

    #[cfg(not(feature = "parallel"))]
    let computed: Result<Vec<(usize, f64)>, EngineError> = frames.map(evaluate).collect();

    #[cfg(feature = "parallel")]
    let computed: Result<Vec<(usize, f64)>, EngineError> =
        frames.par_bridge().map(evaluate).collect();

    reporter.report(Progress::TaskFinish);

    // Frames are read in order, so a failed evaluation always precedes the read error.
    let mut computed = computed?;
    if let Some(error) = read_error {
        return Err(error);
    }
    computed.sort_unstable_by_key(|&(index, _)| index);

    if computed.len() != expected_frames {
        warn!(
            expected = expected_frames,
            processed = computed.len(),
            "Trajectory yielded a different number of frames than it reported."
        );
    }

    let mut energy = vec![0.0; computed.len()];
    for (index, frame_energy) in computed {
        energy[index] = frame_energy;
    }

    reporter.report(Progress::PhaseFinish);

    // === Phase 2: Boltzmann weights ===
    let result = ReweightResult::from_energies(energy, config.kt());
    info!(
        frames = result.len(),
        effective_sample_size = result.effective_sample_size(),
        "Reweighting workflow complete."
    );
    Ok(result)
}

fn validate_groups(interaction: &Interaction, topology: &Topology) -> Result<(), EngineError> {
    let num_atoms = topology.len();
    for (label, group) in GROUP_LABELS.into_iter().zip(interaction.groups()) {
        let Some(group) = group else { continue };
        if let Some(&index) = group.indices().iter().find(|&&index| index >= num_atoms) {
            return Err(EngineError::AtomIndexOutOfRange {
                group: label,
                index,
                num_atoms,
            });
        }
    }
    Ok(())
}

fn check_cutoff(max_cutoff: f64, cutoff: f64, reporter: &ProgressReporter) {
    if cutoff > max_cutoff {
        reporter.report(Progress::Message(format!(
            "Cutoff {cutoff} exceeds half the smallest cell width ({max_cutoff}); only the nearest image of each atom is counted."
        )));
        warn!(
            cutoff,
            max_cutoff,
            "Cutoff exceeds half the smallest cell width; only the nearest periodic image of each atom is considered."
        );
    }
}
