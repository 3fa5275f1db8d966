pub mod controller;
pub mod storage;
