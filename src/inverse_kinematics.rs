//! Numerical inverse kinematics over a [`JointPath`]: a damped Newton
//! iteration that rebuilds the velocity Jacobian each step, solves for a
//! joint-velocity update and re-runs forward kinematics, with rollback of all
//! joint values when it fails to converge.

extern crate nalgebra as na;
use na::{DVector, Isometry3, Rotation3};

use crate::joint_path::JointPath;
use crate::link::{LinkId, LinkTree};
use crate::solvers;

/// Pose of a link: Cartesian position and rotation.
pub type Pose = Isometry3<f64>;

/// Iteration cap of the numerical solver; the only bound on solve duration.
pub const MAX_IK_ITERATIONS: usize = 50;

/// Fraction of the linearized solution applied per iteration.
pub const DAMPING: f64 = 0.9;

/// Which stopping predicate runs each iteration. The iteration loop itself is
/// single-sourced; only the check differs.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ConvergenceCriterion {
    /// Converged once the squared error norm drops below the threshold.
    #[default]
    Strict,
    /// Converged once the *change* of the squared error norm between
    /// consecutive iterations drops below the threshold. Tolerates a plateau,
    /// which is what an unreachable target or a deficient chain produces.
    BestEffort,
}

/// Numerical inverse kinematics over a joint sequence.
///
/// `has_analytical_ik` is a capability hook: mechanism families with a
/// closed-form solution override it (and the solve itself) to bypass the
/// numerical loop; the default keeps the iteration as the only path.
pub trait InverseKinematics {
    fn has_analytical_ik(&self) -> bool {
        false
    }

    /// Solves for joint values bringing the end link of the path to `target`.
    /// On success the joint values and all affected link poses stay at the
    /// solved configuration; on failure every joint value is restored and
    /// forward kinematics re-run, so no partial mutation survives.
    fn calc_inverse_kinematics(&mut self, tree: &mut LinkTree, target: &Pose) -> bool;
}

impl JointPath {
    /// Seeds the pose of the path's root link with `base`, refreshes the
    /// chain with forward kinematics unless a closed-form solution makes that
    /// redundant, and then solves for `target`.
    pub fn calc_inverse_kinematics_from_base(
        &mut self,
        tree: &mut LinkTree,
        base: &Pose,
        target: &Pose,
    ) -> bool {
        let Some(root) = self.path().root_link() else {
            return false;
        };
        {
            let link = tree.link_mut(root);
            link.p = base.translation.vector;
            link.r = base.rotation.to_rotation_matrix();
        }
        if !self.has_analytical_ik() {
            tree.calc_forward_kinematics(root);
        }
        self.calc_inverse_kinematics(tree, target)
    }

    /// The link whose pose propagation covers every joint of this path: the
    /// path root for a purely downward chain (preserving a seeded base pose),
    /// or the tree root when the path crosses upward segments and joints
    /// above the path root move links outside its subtree.
    fn propagation_root(&self, tree: &LinkTree) -> Option<LinkId> {
        let root = self.path().root_link()?;
        if self.path().num_upward_connections() == 0 {
            Some(root)
        } else {
            Some(tree.root_of(root))
        }
    }
}

impl InverseKinematics for JointPath {
    fn calc_inverse_kinematics(&mut self, tree: &mut LinkTree, target: &Pose) -> bool {
        let n = self.num_joints();
        if n == 0 {
            return false;
        }
        let (Some(end), Some(fk_root)) = (self.path().end_link(), self.propagation_root(tree))
        else {
            return false;
        };

        let target_p = target.translation.vector;
        // Orientation target compensated by the end link's reference attitude.
        let target_r = target.rotation.to_rotation_matrix() * tree.link(end).rs.transpose();

        // Rollback snapshot.
        let q_org: Vec<f64> = self.joints().iter().map(|&j| tree.link(j).q).collect();

        let max_error_sqr = self.max_ik_error_sqr();
        let criterion = self.convergence_criterion();
        let mut err_sqr = max_error_sqr * 100.0;
        let mut converged = false;

        for _ in 0..MAX_IK_ITERATIONS {
            let jacobian = self.calc_jacobian(tree);

            let end_link = tree.link(end);
            let dp = target_p - end_link.p;
            // Angle-axis equivalent of the rotation delta, back in world frame.
            let delta: Rotation3<f64> = end_link.r.transpose() * target_r;
            let omega = end_link.r * delta.scaled_axis();

            let current_sqr = dp.norm_squared() + omega.norm_squared();
            let stop = match criterion {
                ConvergenceCriterion::Strict => current_sqr < max_error_sqr,
                ConvergenceCriterion::BestEffort => {
                    let change = (current_sqr - err_sqr).abs();
                    err_sqr = current_sqr;
                    change < max_error_sqr
                }
            };
            if stop {
                converged = true;
                break;
            }

            let mut v = DVector::zeros(6);
            v.fixed_rows_mut::<3>(0).copy_from(&dp);
            v.fixed_rows_mut::<3>(3).copy_from(&omega);

            // Square solve when the chain is exactly determined, otherwise a
            // rank-deficiency-tolerant least-squares solve. A singular square
            // Jacobian degrades to the same least-squares path.
            let solved = if n == 6 {
                solvers::solve_linear_equation(&jacobian, &v, solvers::DEFAULT_SV_RATIO)
            } else {
                solvers::solve_linear_equation_svd(&jacobian, &v, solvers::DEFAULT_SV_RATIO)
            };
            let Ok(dq) = solved else {
                break;
            };

            for (i, &joint) in self.joints().iter().enumerate() {
                tree.link_mut(joint).q += DAMPING * dq[i];
            }
            tree.calc_forward_kinematics(fk_root);
        }

        if !converged {
            for (&joint, &q) in self.joints().iter().zip(q_org.iter()) {
                tree.link_mut(joint).q = q;
            }
            tree.calc_forward_kinematics(fk_root);
        }
        converged
    }
}
