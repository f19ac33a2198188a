
mod ik_test;
