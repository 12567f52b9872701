#![deny(clippy::all)]

pub mod catalog;
pub mod domain;
pub mod keys;
pub mod popularity;
pub mod ports;
pub mod search;
