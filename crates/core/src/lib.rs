//! Domain types and business rules for the COPEJEM membership core.
//!
//! This crate has no storage dependencies. Persistence lives in
//! `copejem-db`, audit fan-out in `copejem-events`.

mod text_enum;

pub mod audit;
pub mod company;
pub mod entity;
pub mod error;
pub mod history;
pub mod member;
pub mod project;
pub mod session;
pub mod types;
