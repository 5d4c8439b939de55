//! Local history of a project tree.
//!
//! An in-memory versioned tree ([`tree`]) is mutated only through
//! structural [`changes`], grouped into change sets and logged in a
//! change list that can revert the tree to an earlier point, tell which
//! changes depend on each other, and purge old change sets while handing
//! back the [`content`] they were keeping alive. [`history`] ties these
//! together for one project and [`storage`] persists it.

#![allow(clippy::enum_variant_names)]

pub mod changes;
pub mod content;
pub mod history;
pub mod storage;
pub mod tree;
