//! End-to-end solver scenarios: convergence on reachable targets, plateau
//! detection on unreachable ones, and rollback guarantees.

use super::test_utils::{single_joint_arm, six_axis_arm};
use crate::inverse_kinematics::{ConvergenceCriterion, InverseKinematics};
use crate::joint_path::JointPath;
use crate::link::{Link, LinkTree};
use nalgebra::{Isometry3, Rotation3, UnitQuaternion, Vector3};
use std::f64::consts::FRAC_PI_2;

fn pose(p: Vector3<f64>, r: Rotation3<f64>) -> Isometry3<f64> {
    Isometry3::from_parts(p.into(), UnitQuaternion::from_rotation_matrix(&r))
}

#[test]
fn test_single_joint_converges_on_reachable_circle() {
    let (mut tree, base, joint, tip) = single_joint_arm();
    let mut chain = JointPath::between(&tree, base, tip);

    // A quarter turn puts the tip at (0, 1, 0) with matching orientation.
    let target = pose(Vector3::y(), Rotation3::new(Vector3::z() * FRAC_PI_2));
    assert!(chain.calc_inverse_kinematics(&mut tree, &target));

    let error = (tree.link(tip).p - Vector3::y()).norm_squared();
    assert!(error < chain.max_ik_error_sqr(), "residual error {}", error);
    assert!((tree.link(joint).q - FRAC_PI_2).abs() < 1e-5);
}

#[test]
fn test_strict_unreachable_target_fails_and_rolls_back() {
    let (mut tree, base, joint, tip) = single_joint_arm();
    tree.link_mut(joint).q = 0.2;
    tree.calc_forward_kinematics(base);
    let tip_before = tree.link(tip).p;

    let mut chain = JointPath::between(&tree, base, tip);
    // Three times the arm's reach.
    let target = pose(Vector3::new(3.0, 0.0, 0.0), Rotation3::identity());
    assert!(!chain.calc_inverse_kinematics(&mut tree, &target));

    // No partial mutation survives: the joint value is bit-identical and the
    // poses are recomputed from it.
    assert_eq!(tree.link(joint).q, 0.2);
    assert_eq!(tree.link(tip).p, tip_before);

    // A repeated failing solve from the same state is deterministic.
    assert!(!chain.calc_inverse_kinematics(&mut tree, &target));
    assert_eq!(tree.link(joint).q, 0.2);
    assert_eq!(tree.link(tip).p, tip_before);
}

#[test]
fn test_best_effort_accepts_the_plateau() {
    let (mut tree, base, joint, tip) = single_joint_arm();
    tree.link_mut(joint).q = 0.2;
    tree.calc_forward_kinematics(base);

    let mut chain = JointPath::between(&tree, base, tip);
    chain.set_max_ik_error(1e-3);
    let target = pose(Vector3::new(3.0, 0.0, 0.0), Rotation3::identity());

    // Strict mode cannot get the error itself below the threshold.
    assert!(!chain.calc_inverse_kinematics(&mut tree, &target));
    assert_eq!(tree.link(joint).q, 0.2);

    // Best-effort mode detects the plateau before the iteration cap and
    // keeps the closest configuration it found.
    chain.set_convergence_criterion(ConvergenceCriterion::BestEffort);
    assert!(chain.calc_inverse_kinematics(&mut tree, &target));
    assert!(tree.link(joint).q.abs() < 0.2);
}

#[test]
fn test_six_axis_chain_uses_the_square_solve() {
    let (mut tree, base, tip, joints) = six_axis_arm();
    let solution = [0.3, 0.5, -0.4, 0.2, 0.6, -0.3];
    for (id, q) in joints.iter().zip(solution) {
        tree.link_mut(*id).q = q;
    }
    tree.calc_forward_kinematics(base);
    let target = pose(tree.link(tip).p, tree.link(tip).r);

    // Start nearby and require the solver to come back.
    for id in joints {
        tree.link_mut(id).q += 0.03;
    }
    tree.calc_forward_kinematics(base);

    let mut chain = JointPath::between(&tree, base, tip);
    assert_eq!(chain.num_joints(), 6);
    assert!(chain.calc_inverse_kinematics(&mut tree, &target));

    let dp = tree.link(tip).p - target.translation.vector;
    let dr = tree.link(tip).r.angle_to(&target.rotation.to_rotation_matrix());
    assert!(dp.norm_squared() + dr * dr < 1e-10);
}

#[test]
fn test_path_without_joints_is_not_solvable() {
    let mut tree = LinkTree::new();
    let base = tree.add_root(Link::fixed("base", Vector3::zeros()));
    let plate = tree.add_child(base, Link::fixed("plate", Vector3::x()));
    tree.calc_forward_kinematics(base);

    let mut chain = JointPath::between(&tree, base, plate);
    assert_eq!(chain.num_joints(), 0);
    let target = pose(Vector3::x(), Rotation3::identity());
    assert!(!chain.calc_inverse_kinematics(&mut tree, &target));
    assert!(!JointPath::new().calc_inverse_kinematics(&mut tree, &target));
}

#[test]
fn test_solve_from_seeded_base_pose() {
    let (mut tree, base, _, tip) = single_joint_arm();
    let mut chain = JointPath::between(&tree, base, tip);

    // Lift the whole mechanism one unit up; the reachable circle follows.
    let base_pose = pose(Vector3::z(), Rotation3::identity());
    let target = pose(
        Vector3::new(0.0, 1.0, 1.0),
        Rotation3::new(Vector3::z() * FRAC_PI_2),
    );
    assert!(chain.calc_inverse_kinematics_from_base(&mut tree, &base_pose, &target));
    assert!((tree.link(tip).p - Vector3::new(0.0, 1.0, 1.0)).norm() < 1e-5);
    assert_eq!(tree.link(base).p, Vector3::z());
}

#[test]
fn test_reference_attitude_offsets_the_orientation_target() {
    let (mut tree, base, joint, tip) = single_joint_arm();
    let rs = Rotation3::new(Vector3::z() * 0.3);
    tree.link_mut(tip).rs = rs;

    let mut chain = JointPath::between(&tree, base, tip);
    // The target orientation is expressed in the tip's nominal frame: the
    // solver should land on the quarter turn after stripping `rs`.
    let target = pose(Vector3::y(), Rotation3::new(Vector3::z() * FRAC_PI_2) * rs);
    assert!(chain.calc_inverse_kinematics(&mut tree, &target));
    assert!((tree.link(joint).q - FRAC_PI_2).abs() < 1e-5);
}
