//! Helper functions

use crate::joint_path::JointPath;
use crate::link::LinkTree;

/// Print the joint values of a path, converting radians to degrees.
#[allow(dead_code)]
pub fn dump_joint_values(tree: &LinkTree, path: &JointPath) {
    if path.num_joints() == 0 {
        println!("No joints");
        return;
    }
    let mut row_str = String::new();
    for &joint in path.joints() {
        row_str.push_str(&format!("{:5.2} ", tree.link(joint).q.to_degrees()));
    }
    println!("[{}]", row_str.trim_end());
}

/// Print the joint chain with names, directions and values.
#[allow(dead_code)]
pub fn dump_joint_path(tree: &LinkTree, path: &JointPath) {
    println!("{}", path.describe(tree));
    dump_joint_values(tree, path);
}
