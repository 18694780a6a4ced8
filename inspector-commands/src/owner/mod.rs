pub mod blacklist;
pub mod lifecycle;
pub mod su;
pub mod tasks;
