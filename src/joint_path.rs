//! The actuated-joint view of a link path: which links along the path are
//! rotational or slide joints, which way each of them is crossed, and the 6×N
//! velocity Jacobian built from that.

extern crate nalgebra as na;
use na::DMatrix;

use crate::inverse_kinematics::ConvergenceCriterion;
use crate::link::{JointType, LinkId, LinkTree};
use crate::link_path::LinkPath;

/// Default error threshold of the IK solver, squared internally.
pub const DEFAULT_MAX_IK_ERROR: f64 = 1.0e-6;

/// A [`LinkPath`] filtered down to its actuated joints, each tagged with the
/// direction it is crossed in, plus the configuration of the iterative IK
/// solver that operates on the joint sequence.
#[derive(Clone, Debug)]
pub struct JointPath {
    path: LinkPath,
    joints: Vec<LinkId>,
    num_upward_joints: usize,
    max_error_sqr: f64,
    criterion: ConvergenceCriterion,
}

impl JointPath {
    pub fn new() -> Self {
        JointPath {
            path: LinkPath::new(),
            joints: Vec::new(),
            num_upward_joints: 0,
            max_error_sqr: DEFAULT_MAX_IK_ERROR * DEFAULT_MAX_IK_ERROR,
            criterion: ConvergenceCriterion::Strict,
        }
    }

    /// Joint path between two arbitrary links.
    pub fn between(tree: &LinkTree, root: LinkId, end: LinkId) -> Self {
        let mut path = JointPath::new();
        path.find(tree, root, end);
        path
    }

    /// Joint path from the tree root down to `end`.
    pub fn from_root(tree: &LinkTree, end: LinkId) -> Self {
        let mut path = JointPath::new();
        path.find_from_root(tree, end);
        path
    }

    /// Rebuilds the underlying link path and re-extracts the joints. Returns
    /// whether any actuated joint lies on the path; with none, the solver has
    /// nothing to move and reports "not solvable".
    pub fn find(&mut self, tree: &LinkTree, root: LinkId, end: LinkId) -> bool {
        if self.path.find(tree, root, end) {
            self.extract_joints(tree);
        } else {
            self.joints.clear();
            self.num_upward_joints = 0;
        }
        !self.joints.is_empty()
    }

    /// Like [`JointPath::find`], but for the root-to-`end` path.
    pub fn find_from_root(&mut self, tree: &LinkTree, end: LinkId) -> bool {
        self.path.find_from_root(tree, end);
        self.extract_joints(tree);
        !self.joints.is_empty()
    }

    /// Filters the link sequence down to rotational and slide joints, keeping
    /// their relative order, and recomputes the upward bookkeeping in
    /// joint-sequence terms.
    ///
    /// The two path endpoints are pass-through anchors: the first link is
    /// skipped when the first segment is downward (nothing "enters" it), and
    /// the last link is emitted only when the segment before it was downward.
    /// Skipping a non-actuated link that is not crossed downward removes one
    /// upward crossing from the joint-space count.
    fn extract_joints(&mut self, tree: &LinkTree) {
        self.num_upward_joints = self.path.num_upward_connections();
        self.joints.clear();

        let n = self.path.len();
        if n <= 1 {
            return;
        }

        let mut i = 0;
        if self.path.is_downward(i) {
            i += 1;
        }
        let m = n - 1;
        while i < m {
            let id = self.path.link(i);
            if tree.link(id).joint_type.is_actuated() {
                self.joints.push(id);
            } else if !self.path.is_downward(i) {
                self.num_upward_joints -= 1;
            }
            i += 1;
        }
        if self.path.is_downward(m - 1) {
            let id = self.path.link(m);
            if tree.link(id).joint_type.is_actuated() {
                self.joints.push(id);
            }
        }
    }

    pub fn num_joints(&self) -> usize {
        self.joints.len()
    }

    pub fn joint(&self, i: usize) -> LinkId {
        self.joints[i]
    }

    pub fn joints(&self) -> &[LinkId] {
        &self.joints
    }

    /// Whether joint `i` is crossed in the parent-to-child sense; when not,
    /// its velocity contribution enters the Jacobian negated.
    pub fn is_joint_downward(&self, i: usize) -> bool {
        i >= self.num_upward_joints
    }

    /// The underlying link path, including the non-actuated links.
    pub fn path(&self) -> &LinkPath {
        &self.path
    }

    /// Configures the squared-error convergence threshold: the solver stops
    /// on squared error below `e * e`.
    pub fn set_max_ik_error(&mut self, e: f64) {
        self.max_error_sqr = e * e;
    }

    pub fn max_ik_error_sqr(&self) -> f64 {
        self.max_error_sqr
    }

    pub fn set_convergence_criterion(&mut self, criterion: ConvergenceCriterion) {
        self.criterion = criterion;
    }

    pub fn convergence_criterion(&self) -> ConvergenceCriterion {
        self.criterion
    }

    /// Assembles the 6×N velocity Jacobian of the end link with respect to
    /// the joints of this path, rows 0..3 linear and rows 3..6 angular, one
    /// column per joint in path order. The matrix is built fresh on every
    /// call; with no joints it is a valid 6×0 matrix.
    pub fn calc_jacobian(&self, tree: &LinkTree) -> DMatrix<f64> {
        let n = self.joints.len();
        let mut out = DMatrix::zeros(6, n);
        let Some(end) = self.path.end_link() else {
            return out;
        };
        let p_end = tree.link(end).p;

        for (i, &id) in self.joints.iter().enumerate() {
            let link = tree.link(id);
            match link.joint_type {
                JointType::Rotational => {
                    let mut omega = link.r * link.a;
                    if !self.is_joint_downward(i) {
                        omega = -omega;
                    }
                    let arm = p_end - link.p;
                    let dp = omega.cross(&arm);
                    out.fixed_view_mut::<3, 1>(0, i).copy_from(&dp);
                    out.fixed_view_mut::<3, 1>(3, i).copy_from(&omega);
                }
                JointType::Slide => {
                    let mut dp = link.r * link.a;
                    if !self.is_joint_downward(i) {
                        dp = -dp;
                    }
                    out.fixed_view_mut::<3, 1>(0, i).copy_from(&dp);
                }
                // Extraction never emits these; the column stays zero.
                JointType::Fixed | JointType::Free => {}
            }
        }
        out
    }

    /// Renders the joint sequence as a chain of names joined by direction
    /// arrows, for debugging and logging.
    pub fn describe(&self, tree: &LinkTree) -> String {
        let mut out = String::new();
        for (i, &id) in self.joints.iter().enumerate() {
            if i > 0 {
                out.push_str(if self.is_joint_downward(i) { " => " } else { " <= " });
            }
            out.push_str(&tree.link(id).name);
        }
        out
    }
}

impl Default for JointPath {
    fn default() -> Self {
        JointPath::new()
    }
}
