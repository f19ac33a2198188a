use anyhow::ensure;
use nalgebra::{Isometry3, Rotation3, UnitQuaternion, Vector3};
use rs_chain_kinematics::inverse_kinematics::{ConvergenceCriterion, InverseKinematics};
use rs_chain_kinematics::joint_path::JointPath;
use rs_chain_kinematics::link::{JointType, Link, LinkTree};
use rs_chain_kinematics::utils::dump_joint_path;

/// Usage example: a planar arm with an extra slide joint, solved for a
/// reachable and an unreachable target.
fn main() -> anyhow::Result<()> {
    let mut tree = LinkTree::new();
    let base = tree.add_root(Link::fixed("base", Vector3::zeros()));
    let shoulder = tree.add_child(
        base,
        Link::new("shoulder", JointType::Rotational, Vector3::z(), Vector3::zeros()),
    );
    let elbow = tree.add_child(
        shoulder,
        Link::new("elbow", JointType::Rotational, Vector3::z(), Vector3::x()),
    );
    let extender = tree.add_child(
        elbow,
        Link::new("extender", JointType::Slide, Vector3::x(), Vector3::x()),
    );
    let tip = tree.add_child(extender, Link::fixed("tip", Vector3::zeros()));
    tree.calc_forward_kinematics(base);

    let mut chain = JointPath::between(&tree, base, tip);
    println!("Kinematic chain: {}", chain.describe(&tree));
    println!("Initial joint values:");
    dump_joint_path(&tree, &chain);

    let target = Isometry3::from_parts(
        Vector3::new(1.2, 1.1, 0.0).into(),
        UnitQuaternion::from_rotation_matrix(&Rotation3::new(Vector3::z() * 0.8)),
    );
    let solved = chain.calc_inverse_kinematics(&mut tree, &target);
    ensure!(solved, "the reachable target did not converge");
    println!("Solved joint values for target at (1.2, 1.1):");
    dump_joint_path(&tree, &chain);
    println!("End effector at {}", tree.link(tip).p);

    // Far beyond the arm's reach: strict solving fails and rolls back, the
    // best-effort criterion accepts the plateau instead.
    let unreachable = Isometry3::translation(25.0, 0.0, 0.0);
    let solved = chain.calc_inverse_kinematics(&mut tree, &unreachable);
    println!("Strict solve against an unreachable target: {}", solved);

    chain.set_convergence_criterion(ConvergenceCriterion::BestEffort);
    chain.set_max_ik_error(1e-4);
    let solved = chain.calc_inverse_kinematics(&mut tree, &unreachable);
    println!("Best-effort solve against the same target: {}", solved);
    println!("Closest configuration reached:");
    dump_joint_path(&tree, &chain);

    Ok(())
}
