pub mod analyzer;
pub mod api_client;
pub mod config;
pub mod editor;
pub mod errors;
pub mod models;
pub mod state;

#[cfg(test)]
mod test_support;
