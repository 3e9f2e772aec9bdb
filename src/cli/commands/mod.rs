pub mod remote;
pub mod routes;
pub mod token;
