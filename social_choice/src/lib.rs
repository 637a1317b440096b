/*!
Social choice functions over ranked ballots.

A [`Profile`] holds the distinct rankings cast by a population of voters, each
with the number of voters behind it. Profiles are built from weighted ballots
or from raw voter rows through [`ballot_box::ballot_box`]. Every rule is then
a method of the profile, and [`Profile::rank`] and [`Profile::elect`] dispatch
on a rule chosen at runtime.

See the [`manual`] for the catalogue of rules and their conventions.
*/

pub mod ballot_box;
pub mod builder;
pub mod classify;
mod config;
mod elimination;
mod errors;
pub mod generators;
mod kemeny;
pub mod manual;
mod profile;
mod schulze;
mod stv;

pub use crate::classify::classify;
pub use crate::config::*;
pub use crate::errors::*;
pub use crate::kemeny::kendall_tau_distance;
pub use crate::profile::Profile;
