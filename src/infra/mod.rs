pub mod collaborators;
pub mod factory;
pub mod repositories;
