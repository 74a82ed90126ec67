//! Demo application assembled in a [`vial::Container`].
//!
//! The container holds two parameters, the application `name` and the output
//! `writer`, and two services: a `logger` writing to the output and the `app`
//! feature that logs its name when run.

mod app;
mod di;

pub use app::*;
pub use di::*;
