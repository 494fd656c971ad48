//! EatEase cart service, repositories and command line front end.

pub mod cli;
pub mod config;
pub mod domain;
pub mod logging;

#[cfg(test)]
mod test;
