pub mod app;
pub mod cli;
pub mod config;
pub mod filter;
pub mod model;
pub mod ordinal;
pub mod output;
pub mod pagination;
pub mod session;
pub mod source;

#[cfg(test)]
mod tests;
