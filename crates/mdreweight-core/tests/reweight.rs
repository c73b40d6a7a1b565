use mdreweight::core::geometry::UnitCell;
use mdreweight::core::io::memory::InMemoryTrajectory;
use mdreweight::core::io::traits::{FrameIter, Trajectory};
use mdreweight::core::models::atom::Atom;
use mdreweight::core::models::frame::Frame;
use mdreweight::core::models::group::{Group, GroupError};
use mdreweight::core::models::topology::Topology;
use mdreweight::core::perturbation::{gaussian_decay, poly_decay};
use mdreweight::engine::config::{DistanceMode, ReweightConfig};
use mdreweight::engine::contribution::ContributionFilter;
use mdreweight::engine::error::EngineError;
use mdreweight::{reweight, reweight_pair};
use nalgebra::{Point3, Vector3};
use std::sync::atomic::{AtomicUsize, Ordering};

const TOLERANCE: f64 = 1e-9;

fn f64_approx_equal(a: f64, b: f64) -> bool {
    (a - b).abs() <= TOLERANCE * a.abs().max(b.abs()).max(1.0)
}

fn assert_series_approx_equal(actual: &[f64], expected: &[f64]) {
    assert_eq!(actual.len(), expected.len());
    for (frame, (a, e)) in actual.iter().zip(expected).enumerate() {
        assert!(f64_approx_equal(*a, *e), "frame {frame}: {a} != {e}");
    }
}

fn assert_normalized(probability: &[f64]) {
    assert!(f64_approx_equal(probability.iter().sum(), 1.0));
}

fn config(mode: DistanceMode, cutoff: f64) -> ReweightConfig {
    ReweightConfig::builder()
        .mode(mode)
        .cutoff(cutoff)
        .build()
        .unwrap()
}

// A 2-atom solute molecule (N, H) and one water (OW, HW1), in open boundaries.
fn solute_water_trajectory() -> InMemoryTrajectory {
    let atoms = vec![
        Atom::new("N", "ALA", 1),
        Atom::new("H", "ALA", 1),
        Atom::new("OW", "SOL", 2),
        Atom::new("HW1", "SOL", 2),
    ];
    let frame = |xs: [f64; 4]| {
        Frame::new(
            xs.iter().map(|&x| Point3::new(x, 0.0, 0.0)).collect(),
            UnitCell::non_periodic(),
        )
    };
    InMemoryTrajectory::new(
        atoms,
        vec![frame([0.0, 1.0, 2.5, 3.5]), frame([0.0, 10.0, -2.0, -2.5])],
    )
    .unwrap()
}

// One solute molecule of 4 atoms and three 3-atom waters drifting through a 30 A box.
fn drifting_waters_trajectory(num_frames: usize) -> InMemoryTrajectory {
    let mut atoms: Vec<Atom> = (0..4).map(|_| Atom::new("C", "LIG", 1)).collect();
    for m in 0..3 {
        let residue = 2 + m as isize;
        atoms.push(Atom::new("OW", "SOL", residue));
        atoms.push(Atom::new("HW1", "SOL", residue));
        atoms.push(Atom::new("HW2", "SOL", residue));
    }

    let cell = UnitCell::orthorhombic(30.0, 30.0, 30.0).unwrap();
    let frames = (0..num_frames)
        .map(|f| {
            let f = f as f64;
            let mut positions: Vec<Point3<f64>> =
                (0..4).map(|k| Point3::new(5.0 + k as f64, 5.0, 5.0)).collect();
            for m in 0..3 {
                let m = m as f64;
                for a in 0..3 {
                    let a = a as f64;
                    positions.push(Point3::new(
                        5.0 + 6.0 * m + 0.3 * a + 0.5 * f,
                        15.0 - 1.7 * f + 0.2 * a,
                        5.0 + 0.1 * m - 0.4 * a,
                    ));
                }
            }
            Frame::new(positions, cell.clone())
        })
        .collect();
    InMemoryTrajectory::new(atoms, frames).unwrap()
}

fn minimum_image_distance(a: &Point3<f64>, b: &Point3<f64>, box_length: f64) -> f64 {
    let delta: Vector3<f64> = b - a;
    delta
        .map(|d| d - box_length * (d / box_length).round())
        .norm()
}

fn brute_force_block_minimum(
    frame: &Frame,
    block_1: &[usize],
    block_2: &[usize],
    box_length: f64,
) -> f64 {
    let positions = frame.positions();
    block_1
        .iter()
        .flat_map(|&i| block_2.iter().map(move |&j| (i, j)))
        .map(|(i, j)| minimum_image_distance(&positions[i], &positions[j], box_length))
        .fold(f64::INFINITY, f64::min)
}

#[test]
fn single_atom_against_residue_with_scaled_distance() {
    // An ion at the origin and a 5-atom residue along x; the last atom is beyond the cutoff.
    let mut atoms = vec![Atom::new("NA", "ION", 1)];
    atoms.extend((0..5).map(|_| Atom::new("C", "RES", 2)));
    let cell = UnitCell::orthorhombic(100.0, 100.0, 100.0).unwrap();
    let frames = [0.0, 1.0]
        .iter()
        .map(|&shift| {
            let mut positions = vec![Point3::origin()];
            positions.extend(
                [2.0, 4.0, 6.0, 8.0, 30.0]
                    .iter()
                    .map(|&x| Point3::new(x + shift, 0.0, 0.0)),
            );
            Frame::new(positions, cell.clone())
        })
        .collect();
    let trajectory = InMemoryTrajectory::new(atoms, frames).unwrap();

    let ion = Group::atoms(vec![0]);
    let residue = Group::atoms(vec![1, 2, 3, 4, 5]);
    let result = reweight_pair(
        &trajectory,
        |r: f64| r / 10.0,
        &ion,
        &residue,
        &ContributionFilter::unrestricted(),
        &config(DistanceMode::AllPairs, 25.0),
    )
    .unwrap();

    assert_series_approx_equal(result.energy(), &[2.0, 2.4]);
    for (relative, e) in result.relative_probability().iter().zip(result.energy()) {
        assert_eq!(*relative, (-e).exp());
    }
    assert_normalized(result.probability());
    assert!(result.probability()[0] > result.probability()[1]);
}

#[test]
fn solute_water_minimum_distances_match_brute_force() {
    let trajectory = drifting_waters_trajectory(10);
    let solute = Group::new(vec![0, 1, 2, 3], 4).unwrap();
    let waters = Group::new((4..13).collect(), 3).unwrap();
    let perturbation = gaussian_decay(0.05, 2.0);

    let result = reweight_pair(
        &trajectory,
        perturbation,
        &solute,
        &waters,
        &ContributionFilter::unrestricted(),
        &ReweightConfig::default(),
    )
    .unwrap();

    let expected: Vec<f64> = (0..10)
        .map(|f| {
            let frame = trajectory.frame(f).unwrap();
            waters
                .molecules()
                .map(|water| brute_force_block_minimum(frame, solute.indices(), water, 30.0))
                .filter(|&d| d <= 12.0)
                .map(perturbation)
                .sum()
        })
        .collect();

    assert_series_approx_equal(result.energy(), &expected);
    assert_normalized(result.probability());
}

#[test]
fn water_self_interaction_counts_each_molecule_pair_once() {
    let trajectory = drifting_waters_trajectory(10);
    let waters = Group::new((4..13).collect(), 3).unwrap();
    let perturbation = poly_decay(2);

    let result = reweight(&trajectory, perturbation, &waters, &ReweightConfig::default()).unwrap();

    let blocks: Vec<&[usize]> = waters.molecules().collect();
    let expected: Vec<f64> = (0..10)
        .map(|f| {
            let frame = trajectory.frame(f).unwrap();
            let mut energy = 0.0;
            for a in 0..blocks.len() {
                for b in a + 1..blocks.len() {
                    let d = brute_force_block_minimum(frame, blocks[a], blocks[b], 30.0);
                    if d <= 12.0 {
                        energy += perturbation(d);
                    }
                }
            }
            energy
        })
        .collect();

    assert_series_approx_equal(result.energy(), &expected);
}

#[test]
fn minimum_image_sees_atoms_across_the_boundary() {
    let atoms = vec![Atom::new("AR", "AR", 1), Atom::new("AR", "AR", 2)];
    let cell = UnitCell::orthorhombic(20.0, 20.0, 20.0).unwrap();
    let frames = vec![Frame::new(
        vec![Point3::new(1.0, 10.0, 10.0), Point3::new(19.0, 10.0, 10.0)],
        cell,
    )];
    let trajectory = InMemoryTrajectory::new(atoms, frames).unwrap();

    let group = Group::atoms(vec![0, 1]);
    let result = reweight(
        &trajectory,
        |r: f64| r,
        &group,
        &config(DistanceMode::AllPairs, 5.0),
    )
    .unwrap();
    assert!(f64_approx_equal(result.energy()[0], 2.0));
}

#[test]
fn name_predicates_give_sparser_energies_with_exact_zeros() {
    let trajectory = solute_water_trajectory();
    let solute = Group::atoms(vec![0, 1]);
    let water = Group::atoms(vec![2, 3]);
    let all_pairs = config(DistanceMode::AllPairs, 3.0);

    let unrestricted = reweight_pair(
        &trajectory,
        |r: f64| r,
        &solute,
        &water,
        &ContributionFilter::unrestricted(),
        &all_pairs,
    )
    .unwrap();
    let filter = ContributionFilter::unrestricted()
        .group_1(|atom| atom.name == "H")
        .group_2(|atom| atom.name == "OW");
    let restricted =
        reweight_pair(&trajectory, |r: f64| r, &solute, &water, &filter, &all_pairs).unwrap();

    assert_series_approx_equal(unrestricted.energy(), &[6.5, 4.5]);
    assert_series_approx_equal(restricted.energy(), &[1.5, 0.0]);
    assert_eq!(restricted.energy()[1], 0.0);
    assert_eq!(restricted.relative_probability()[1], 1.0);
    assert_normalized(restricted.probability());
}

#[test]
fn complementary_predicates_partition_the_energy() {
    let trajectory = drifting_waters_trajectory(6);
    let solute = Group::new(vec![0, 1, 2, 3], 1).unwrap();
    let waters = Group::new((4..13).collect(), 1).unwrap();
    let all_pairs = config(DistanceMode::AllPairs, 12.0);
    let run = |filter: &ContributionFilter| {
        reweight_pair(&trajectory, poly_decay(1), &solute, &waters, filter, &all_pairs).unwrap()
    };

    let total = run(&ContributionFilter::unrestricted());
    let oxygens = run(&ContributionFilter::unrestricted().group_2(|atom| atom.name == "OW"));
    let hydrogens = run(&ContributionFilter::unrestricted().group_2(|atom| atom.name != "OW"));

    let recombined: Vec<f64> = oxygens
        .energy()
        .iter()
        .zip(hydrogens.energy())
        .map(|(o, h)| o + h)
        .collect();
    assert_series_approx_equal(&recombined, total.energy());
}

#[test]
fn pair_entry_with_identical_groups_doubles_the_self_energy() {
    let trajectory = drifting_waters_trajectory(8);
    let waters = Group::new((4..13).collect(), 3).unwrap();
    let perturbation = poly_decay(3);

    for mode in [DistanceMode::AllPairs, DistanceMode::MinimumPerMolecule] {
        let config = config(mode, 12.0);
        let single = reweight(&trajectory, perturbation, &waters, &config).unwrap();
        let pair = reweight_pair(
            &trajectory,
            perturbation,
            &waters,
            &waters,
            &ContributionFilter::unrestricted(),
            &config,
        )
        .unwrap();

        let doubled: Vec<f64> = single.energy().iter().map(|e| 2.0 * e).collect();
        assert_series_approx_equal(pair.energy(), &doubled);
    }
}

#[test]
fn repeated_runs_are_identical() {
    let trajectory = drifting_waters_trajectory(10);
    let solute = Group::new(vec![0, 1, 2, 3], 4).unwrap();
    let waters = Group::new((4..13).collect(), 3).unwrap();
    let filter = ContributionFilter::unrestricted();
    let config = ReweightConfig::default();

    let first =
        reweight_pair(&trajectory, poly_decay(6), &solute, &waters, &filter, &config).unwrap();
    let second =
        reweight_pair(&trajectory, poly_decay(6), &solute, &waters, &filter, &config).unwrap();
    assert_eq!(first, second);
}

#[test]
fn identical_frames_get_uniform_probabilities() {
    let trajectory = drifting_waters_trajectory(1);
    let frame = trajectory.frame(0).unwrap().clone();
    let atoms = trajectory.topology().atoms().to_vec();
    let repeated = InMemoryTrajectory::new(atoms, vec![frame; 4]).unwrap();

    let waters = Group::new((4..13).collect(), 3).unwrap();
    let result = reweight(&repeated, poly_decay(1), &waters, &ReweightConfig::default()).unwrap();
    assert!(result.probability().iter().all(|&p| p == 0.25));
    assert!(result.summary().energy.std.unwrap() < TOLERANCE);
}

#[test]
fn empty_trajectory_gives_empty_result() {
    let atoms = vec![Atom::new("OW", "SOL", 1), Atom::new("OW", "SOL", 2)];
    let trajectory = InMemoryTrajectory::new(atoms, Vec::new()).unwrap();
    let group = Group::atoms(vec![0, 1]);

    let result = reweight(&trajectory, poly_decay(1), &group, &ReweightConfig::default()).unwrap();
    assert!(result.is_empty());
    assert!(result.energy().is_empty());
    assert!(result.probability().is_empty());
    assert!(result.relative_probability().is_empty());
}

#[test]
fn indivisible_group_is_rejected_at_construction() {
    assert_eq!(
        Group::new(vec![0, 1, 2], 2),
        Err(GroupError::IndivisibleSize {
            size: 3,
            atoms_per_molecule: 2
        })
    );
}

#[test]
fn config_loaded_from_toml_drives_the_run() {
    let trajectory = solute_water_trajectory();
    let config = ReweightConfig::from_toml_str("mode = \"all-pairs\"\ncutoff = 3.0\n").unwrap();
    let group = Group::atoms(vec![0, 1, 2, 3]);

    let result = reweight(&trajectory, |r: f64| r, &group, &config).unwrap();
    // N-H 1.0, N-OW 2.5, H-OW 1.5, H-HW1 2.5, OW-HW1 1.0
    assert!(f64_approx_equal(result.energy()[0], 8.5));
}

#[derive(Debug, thiserror::Error)]
#[error("corrupt frame record")]
struct CorruptFrame;

/// Yields `good` frames and then a decoding error, while reporting `reported` frames.
struct FlakyTrajectory {
    topology: Topology,
    frame: Frame,
    good: usize,
    fail: bool,
    reported: usize,
}

impl FlakyTrajectory {
    fn new(good: usize, fail: bool, reported: usize) -> Self {
        Self {
            topology: Topology::new(vec![Atom::new("OW", "SOL", 1), Atom::new("OW", "SOL", 2)]),
            frame: Frame::new(
                vec![Point3::origin(), Point3::new(2.0, 0.0, 0.0)],
                UnitCell::non_periodic(),
            ),
            good,
            fail,
            reported,
        }
    }
}

impl Trajectory for FlakyTrajectory {
    type Error = CorruptFrame;

    fn topology(&self) -> &Topology {
        &self.topology
    }

    fn len(&self) -> usize {
        self.reported
    }

    fn frames(&self) -> FrameIter<'_, Self::Error> {
        let good = std::iter::repeat_n(self.frame.clone(), self.good).map(Ok);
        let bad = self.fail.then_some(Err(CorruptFrame));
        Box::new(good.chain(bad))
    }
}

#[test]
fn trajectory_read_error_aborts_the_run() {
    let trajectory = FlakyTrajectory::new(2, true, 3);
    let group = Group::atoms(vec![0, 1]);

    let result = reweight(&trajectory, poly_decay(1), &group, &ReweightConfig::default());
    match result {
        Err(EngineError::Trajectory { frame, source }) => {
            assert_eq!(frame, 2);
            assert_eq!(source.to_string(), "corrupt frame record");
        }
        other => panic!("expected a trajectory error, got {other:?}"),
    }
}

#[test]
fn result_is_sized_by_frames_actually_read() {
    let trajectory = FlakyTrajectory::new(3, false, 5);
    let group = Group::atoms(vec![0, 1]);

    let result = reweight(&trajectory, poly_decay(1), &group, &ReweightConfig::default()).unwrap();
    assert_eq!(result.len(), 3);
    assert_series_approx_equal(result.energy(), &[0.5, 0.5, 0.5]);
}

#[test]
fn frame_with_wrong_atom_count_is_rejected() {
    let mut trajectory = FlakyTrajectory::new(1, false, 1);
    trajectory.topology = Topology::new(vec![
        Atom::new("OW", "SOL", 1),
        Atom::new("OW", "SOL", 2),
        Atom::new("OW", "SOL", 3),
    ]);
    let group = Group::atoms(vec![0, 1]);

    let result = reweight(&trajectory, poly_decay(1), &group, &ReweightConfig::default());
    assert!(matches!(
        result,
        Err(EngineError::FrameSize {
            frame: 0,
            expected: 3,
            found: 2
        })
    ));
}

/// Fails on the first frame and would then yield `good_after` valid frames, counting reads.
struct BrokenHeaderTrajectory {
    topology: Topology,
    frame: Frame,
    good_after: Option<usize>,
    reads: AtomicUsize,
}

impl BrokenHeaderTrajectory {
    fn new(good_after: Option<usize>) -> Self {
        Self {
            topology: Topology::new(vec![Atom::new("OW", "SOL", 1), Atom::new("OW", "SOL", 2)]),
            frame: Frame::new(
                vec![Point3::origin(), Point3::new(2.0, 0.0, 0.0)],
                UnitCell::non_periodic(),
            ),
            good_after,
            reads: AtomicUsize::new(0),
        }
    }
}

impl Trajectory for BrokenHeaderTrajectory {
    type Error = CorruptFrame;

    fn topology(&self) -> &Topology {
        &self.topology
    }

    fn len(&self) -> usize {
        self.good_after.map_or(usize::MAX, |good| good + 1)
    }

    fn frames(&self) -> FrameIter<'_, Self::Error> {
        let reads = &self.reads;
        let frame = self.frame.clone();
        let items = (0usize..).map(move |index| {
            reads.fetch_add(1, Ordering::SeqCst);
            if index == 0 {
                Err(CorruptFrame)
            } else {
                Ok(frame.clone())
            }
        });
        match self.good_after {
            Some(good) => Box::new(items.take(good + 1)),
            // A stuck decoder: every read after the first keeps failing.
            None => Box::new((0usize..).map(move |_| {
                reads.fetch_add(1, Ordering::SeqCst);
                Err::<Frame, _>(CorruptFrame)
            })),
        }
    }
}

#[test]
fn read_error_stops_the_run_before_later_frames() {
    let trajectory = BrokenHeaderTrajectory::new(Some(10_000));
    let group = Group::atoms(vec![0, 1]);
    let calls = AtomicUsize::new(0);
    let counting = |r: f64| {
        calls.fetch_add(1, Ordering::SeqCst);
        r
    };

    let result = reweight(&trajectory, counting, &group, &ReweightConfig::default());

    assert!(matches!(result, Err(EngineError::Trajectory { frame: 0, .. })));
    assert_eq!(calls.load(Ordering::SeqCst), 0);
    assert_eq!(trajectory.reads.load(Ordering::SeqCst), 1);
}

#[test]
fn endlessly_failing_reader_terminates() {
    let trajectory = BrokenHeaderTrajectory::new(None);
    let group = Group::atoms(vec![0, 1]);

    let result = reweight(&trajectory, poly_decay(1), &group, &ReweightConfig::default());

    assert!(matches!(result, Err(EngineError::Trajectory { frame: 0, .. })));
    assert_eq!(trajectory.reads.load(Ordering::SeqCst), 1);
}

// Solute (N, H) against two waters (OW, HW1, HW2), all on the x axis in open boundaries.
// Water A sits next to N: its closest approach is N-OW even though H and HW1 exist.
// Water B sits next to H: its closest approach is H-HW1.
fn hydrogen_contact_trajectory() -> InMemoryTrajectory {
    let atoms = vec![
        Atom::new("N", "ALA", 1),
        Atom::new("H", "ALA", 1),
        Atom::new("OW", "SOL", 2),
        Atom::new("HW1", "SOL", 2),
        Atom::new("HW2", "SOL", 2),
        Atom::new("OW", "SOL", 3),
        Atom::new("HW1", "SOL", 3),
        Atom::new("HW2", "SOL", 3),
    ];
    let frame = |water_b_shift: f64| {
        let xs = [
            0.0,
            3.0,
            -1.0,
            -1.5,
            -2.0,
            5.0 + water_b_shift,
            4.0 + water_b_shift,
            6.0 + water_b_shift,
        ];
        Frame::new(
            xs.iter().map(|&x| Point3::new(x, 0.0, 0.0)).collect(),
            UnitCell::non_periodic(),
        )
    };
    // Frame 1 moves water B out of the cutoff, leaving only the rejected water A contact.
    InMemoryTrajectory::new(atoms, vec![frame(0.0), frame(100.0)]).unwrap()
}

fn brute_force_filtered_minimum_energy(
    trajectory: &InMemoryTrajectory,
    solute: &Group,
    waters: &Group,
    cutoff: f64,
    accepts: impl Fn(&Atom, &Atom) -> bool,
    perturbation: impl Fn(f64) -> f64,
) -> Vec<f64> {
    let atoms = trajectory.topology().atoms();
    (0..trajectory.len())
        .map(|f| {
            let positions = trajectory.frame(f).unwrap().positions();
            let mut energy = 0.0;
            for block_1 in solute.molecules() {
                for block_2 in waters.molecules() {
                    let (i, j, d) = block_1
                        .iter()
                        .flat_map(|&i| block_2.iter().map(move |&j| (i, j)))
                        .map(|(i, j)| (i, j, (positions[j] - positions[i]).norm()))
                        .fold((0, 0, f64::INFINITY), |best, c| if c.2 < best.2 { c } else { best });
                    if d <= cutoff && accepts(&atoms[i], &atoms[j]) {
                        energy += perturbation(d);
                    }
                }
            }
            energy
        })
        .collect()
}

#[test]
fn minimum_mode_predicates_apply_to_the_atoms_realizing_each_minimum() {
    let trajectory = hydrogen_contact_trajectory();
    let solute = Group::new(vec![0, 1], 2).unwrap();
    let waters = Group::new((2..8).collect(), 3).unwrap();
    let perturbation = poly_decay(1);
    let filter = ContributionFilter::unrestricted()
        .group_1(|atom| atom.name == "H")
        .group_2(|atom| atom.name_in(&["HW1", "HW2"]));

    let restricted = reweight_pair(
        &trajectory,
        perturbation,
        &solute,
        &waters,
        &filter,
        &ReweightConfig::default(),
    )
    .unwrap();
    let unrestricted = reweight_pair(
        &trajectory,
        perturbation,
        &solute,
        &waters,
        &ContributionFilter::unrestricted(),
        &ReweightConfig::default(),
    )
    .unwrap();

    let expected = brute_force_filtered_minimum_energy(
        &trajectory,
        &solute,
        &waters,
        12.0,
        |a, b| a.name == "H" && b.name_in(&["HW1", "HW2"]),
        perturbation,
    );
    assert_series_approx_equal(restricted.energy(), &expected);

    // Frame 0: only water B's H-HW1 contact (1.0) passes; water A's N-OW contact is rejected.
    assert!(f64_approx_equal(restricted.energy()[0], 1.0));
    assert!(f64_approx_equal(unrestricted.energy()[0], 2.0));
    // Frame 1: water A still touches the solute, but through a rejected atom.
    assert_eq!(restricted.energy()[1], 0.0);
    assert!(f64_approx_equal(unrestricted.energy()[1], 1.0));
}
