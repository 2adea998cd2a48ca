#![allow(dead_code)]

pub mod fake_provider;
pub mod fixtures;
