pub mod bluray;
pub mod config;
pub mod db;
pub mod environment;
pub mod errors;
pub mod genre;
pub mod isbn;
pub mod routes;
pub mod urls;
pub mod validation;
