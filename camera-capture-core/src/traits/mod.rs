pub mod backend;
pub mod collaborators;
pub mod delegate;
