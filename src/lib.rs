//! Kinematics over articulated mechanisms modeled as trees of rigid links.
//!
//! Given a link tree, this crate computes the unique path between any two
//! links, extracts the actuated joints on that path together with the
//! direction each joint is crossed in, assembles the 6xN velocity Jacobian of
//! the chain, and solves inverse kinematics numerically with a damped Newton
//! iteration. The direction bookkeeping matters: a joint crossed against its
//! parent-to-child orientation contributes its velocity with the opposite
//! sign, and both the Jacobian and the solver respect that.
//!
//! # Features
//!
//! - Arena-backed link tree with O(1) parent/child/sibling navigation and
//!   built-in forward kinematics, so chains are usable standalone.
//! - Path search that reports per-segment traversal direction, valid between
//!   any two links of the tree (not only root to tip).
//! - Joint extraction with exact direction parity, including the asymmetric
//!   endpoint rules for paths that start or end in the middle of the tree.
//! - 6xN velocity Jacobian for any mix of rotational and slide joints.
//! - Damped Newton IK with a strict threshold or a best-effort plateau
//!   stopping criterion, and full rollback of joint values on failure.
//! - LU, SVD least-squares and pseudo-inverse solvers tolerant of rank
//!   deficiency through a singular-value cutoff ratio.
//!
//! # Example
//!
//! ```
//! extern crate nalgebra as na;
//! use na::{Isometry3, Vector3};
//! use rs_chain_kinematics::inverse_kinematics::InverseKinematics;
//! use rs_chain_kinematics::joint_path::JointPath;
//! use rs_chain_kinematics::link::{JointType, Link, LinkTree};
//!
//! let mut tree = LinkTree::new();
//! let base = tree.add_root(Link::fixed("base", Vector3::zeros()));
//! let shoulder = tree.add_child(
//!     base,
//!     Link::new("shoulder", JointType::Rotational, Vector3::z(), Vector3::zeros()),
//! );
//! let elbow = tree.add_child(
//!     shoulder,
//!     Link::new("elbow", JointType::Rotational, Vector3::z(), Vector3::x()),
//! );
//! let tip = tree.add_child(elbow, Link::fixed("tip", Vector3::x()));
//! tree.calc_forward_kinematics(base);
//!
//! let mut chain = JointPath::between(&tree, base, tip);
//! let target = Isometry3::translation(1.0, 1.0, 0.0);
//! assert!(chain.calc_inverse_kinematics(&mut tree, &target));
//! ```

pub mod link;
pub mod link_path;
pub mod joint_path;
pub mod solvers;
pub mod inverse_kinematics;

pub mod utils;

#[cfg(test)]
mod tests;
