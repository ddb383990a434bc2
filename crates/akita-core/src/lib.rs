//! Core types and trait definitions for the Akita pedigree service.
//!
//! This crate is deliberately free of HTTP and database dependencies.
//! All other crates depend on it: storage backends implement
//! [`store::AnimalStore`], and the assembler, renderer state and enrollment
//! logic are written against that trait.

// We intentionally use native `async fn` in traits (stabilised in Rust 1.75).
// Suppress the advisory lint about `Send` bounds on the returned futures.
#![allow(async_fn_in_trait)]

pub mod animal;
pub mod enroll;
pub mod error;
pub mod pedigree;
pub mod store;
pub mod view;

#[cfg(test)]
mod testing;

pub use error::{Error, Result};
