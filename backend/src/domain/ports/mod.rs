//! Domain ports and supporting types for the hexagonal boundary.

mod macros;
pub(crate) use macros::define_port_error;

mod connectivity_probe;
mod user_repository;

#[cfg(test)]
pub use connectivity_probe::MockConnectivityProbe;
pub use connectivity_probe::{ConnectivityError, ConnectivityProbe, FixtureConnectivityProbe};
#[cfg(test)]
pub use user_repository::MockUserRepository;
pub use user_repository::{FixtureUserRepository, UserPersistenceError, UserRepository};
