// SPDX-FileCopyrightText: 2026 Newsbot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Delivery engine and fleet scheduler for newsbot.
//!
//! - [`DeliveryEngine`] runs one delivery cycle for one user.
//! - [`FleetScheduler`] runs cycles for every user on a fixed tick.
//! - [`SeenCache`] stands in for the ledger while it is unavailable.
//! - [`NewsDesk`] exposes on-demand operations to the command layer.

pub mod cache;
pub mod engine;
pub mod scheduler;
pub mod service;
pub mod shutdown;

pub use cache::SeenCache;
pub use engine::{DeliveryEngine, DeliverySettings, Suppliers};
pub use scheduler::{BatchReport, FleetScheduler, SchedulerState};
pub use service::NewsDesk;
pub use shutdown::install_signal_handler;
