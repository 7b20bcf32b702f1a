//! biossa is a discrete-event stochastic simulator of a cell's molecular
//! reaction network — a Gillespie-style kinetic Monte Carlo engine
//! specialized for polymer biology: free species react with one another,
//! but also bind to positions on linear sequences, elongate along them,
//! and release products.
//!
//! The simulation kernel lives in this crate: the data model of reactants
//! and reactions ([`reactant`], [`reaction`]), the rate-propagation
//! substrate that keeps per-reaction rates consistent with the current
//! state under incremental updates ([`rate`], [`manager`], [`validity`]),
//! the stochastic event selector ([`solver`]), the sequence-occupancy
//! structure governing binding-site availability ([`occupancy`],
//! [`site`]), and the façade tying it all together ([`cellstate`]).
//!
//! Text input parsing, table/CSV loading, and the command-line entry
//! point are external collaborators; see [`config`] for the values they
//! pass in and [`logger`] for the persisted-log contract they consume.

pub mod biasedwheel;
pub mod cellstate;
pub mod config;
pub mod error;
pub mod event;
pub mod ids;
pub mod logger;
pub mod manager;
pub mod occupancy;
pub mod random;
pub mod rate;
pub mod reactant;
pub mod reaction;
pub mod site;
pub mod solver;
pub mod table;
pub mod validity;
pub mod world;

#[cfg(feature = "pylib")]
mod pylib;

pub use cellstate::CellState;
pub use config::Config;
pub use error::{Result, SimError};
