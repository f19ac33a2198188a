//! The link tree: rigid bodies connected by joints, stored in an arena and
//! addressed by stable handles. Parent, first child and next sibling are plain
//! index fields, so the tree can be navigated in O(1) in every direction
//! without reference cycles.
//!
//! The tree also owns forward kinematics: [`LinkTree::calc_forward_kinematics`]
//! recomputes the world pose of every descendant of a given link from the
//! current joint values and that link's (seedable) pose.

extern crate nalgebra as na;
use na::{Rotation3, Vector3};

/// How a link is allowed to move relative to its parent.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum JointType {
    /// Rigidly attached to the parent.
    Fixed,
    /// Rotates about the local axis by the joint value (radians).
    Rotational,
    /// Translates along the local axis by the joint value.
    Slide,
    /// Free 6-DOF attachment (floating base). Not actuated.
    Free,
}

impl JointType {
    /// Rotational and slide joints are the actuated ones; only they occupy
    /// Jacobian columns and receive IK updates.
    pub fn is_actuated(&self) -> bool {
        matches!(self, JointType::Rotational | JointType::Slide)
    }
}

/// Stable handle of a link within its [`LinkTree`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct LinkId(pub usize);

/// A rigid body node of the mechanism tree.
///
/// The pose fields `p` and `r` are outputs of forward kinematics; everything
/// else is configuration. The local axis `a` doubles as rotation axis for
/// rotational joints and slide direction for slide joints, expressed in the
/// link's own frame before the joint rotation is applied. It should be a unit
/// vector.
#[derive(Clone, Debug)]
pub struct Link {
    pub name: String,
    pub parent: Option<LinkId>,
    pub child: Option<LinkId>,
    pub sibling: Option<LinkId>,

    pub joint_type: JointType,
    /// Local joint axis (rotation axis or slide direction), unit length.
    pub a: Vector3<f64>,
    /// Position relative to the parent, in the parent frame.
    pub b: Vector3<f64>,
    /// Current joint value (radians for rotational, meters for slide).
    pub q: f64,

    /// World position, maintained by forward kinematics.
    pub p: Vector3<f64>,
    /// World attitude, maintained by forward kinematics.
    pub r: Rotation3<f64>,
    /// Reference attitude offset: orientation targets for this link are
    /// expressed in its nominal frame, so the IK solver multiplies the target
    /// rotation by the transpose of this.
    pub rs: Rotation3<f64>,
}

impl Link {
    pub fn new(
        name: impl Into<String>,
        joint_type: JointType,
        a: Vector3<f64>,
        b: Vector3<f64>,
    ) -> Self {
        Link {
            name: name.into(),
            parent: None,
            child: None,
            sibling: None,
            joint_type,
            a,
            b,
            q: 0.0,
            p: Vector3::zeros(),
            r: Rotation3::identity(),
            rs: Rotation3::identity(),
        }
    }

    /// A link rigidly attached to its parent at offset `b`.
    pub fn fixed(name: impl Into<String>, b: Vector3<f64>) -> Self {
        Link::new(name, JointType::Fixed, Vector3::zeros(), b)
    }
}

/// Arena of links. Multiple disjoint trees may live in one arena; each tree is
/// identified by a root link without a parent.
#[derive(Clone, Debug, Default)]
pub struct LinkTree {
    links: Vec<Link>,
}

impl LinkTree {
    pub fn new() -> Self {
        LinkTree { links: Vec::new() }
    }

    /// Adds a link without a parent, starting a new tree in this arena.
    pub fn add_root(&mut self, link: Link) -> LinkId {
        let id = LinkId(self.links.len());
        self.links.push(link);
        id
    }

    /// Adds a link as the last child of `parent` (sibling order is insertion
    /// order, which is the order the path search explores branches in).
    pub fn add_child(&mut self, parent: LinkId, link: Link) -> LinkId {
        let id = LinkId(self.links.len());
        let mut link = link;
        link.parent = Some(parent);
        self.links.push(link);

        match self.links[parent.0].child {
            None => self.links[parent.0].child = Some(id),
            Some(first) => {
                let mut last = first;
                while let Some(next) = self.links[last.0].sibling {
                    last = next;
                }
                self.links[last.0].sibling = Some(id);
            }
        }
        id
    }

    pub fn link(&self, id: LinkId) -> &Link {
        &self.links[id.0]
    }

    pub fn link_mut(&mut self, id: LinkId) -> &mut Link {
        &mut self.links[id.0]
    }

    pub fn len(&self) -> usize {
        self.links.len()
    }

    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }

    /// The topmost ancestor of `id` (the root of its tree within the arena).
    pub fn root_of(&self, id: LinkId) -> LinkId {
        let mut current = id;
        while let Some(parent) = self.links[current.0].parent {
            current = parent;
        }
        current
    }

    /// Recomputes `p` and `r` of every descendant of `root` from the current
    /// joint values and the pose stored in `root` itself. The root pose is
    /// taken as-is, so it can be seeded before calling (floating base, or the
    /// base-pose variant of the IK solver).
    pub fn calc_forward_kinematics(&mut self, root: LinkId) {
        let mut stack = vec![root];
        while let Some(id) = stack.pop() {
            if id != root {
                self.update_pose(id);
            }
            let mut child = self.links[id.0].child;
            while let Some(c) = child {
                stack.push(c);
                child = self.links[c.0].sibling;
            }
        }
    }

    fn update_pose(&mut self, id: LinkId) {
        let Some(parent_id) = self.links[id.0].parent else {
            return;
        };
        let parent_p = self.links[parent_id.0].p;
        let parent_r = self.links[parent_id.0].r;

        let link = &mut self.links[id.0];
        match link.joint_type {
            JointType::Rotational => {
                link.p = parent_p + parent_r * link.b;
                link.r = parent_r * Rotation3::new(link.a * link.q);
            }
            JointType::Slide => {
                link.p = parent_p + parent_r * (link.b + link.a * link.q);
                link.r = parent_r;
            }
            JointType::Fixed | JointType::Free => {
                link.p = parent_p + parent_r * link.b;
                link.r = parent_r;
            }
        }
    }
}
