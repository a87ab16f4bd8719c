pub mod analysis;
pub mod draft;
pub mod version;
