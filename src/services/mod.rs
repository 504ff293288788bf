//! Domain services used by HTTP routes.
//!
//! ARCHITECTURE
//! ============
//! Service modules own the data-shaping logic around the core resolvers so
//! route handlers stay focused on request/response translation. Both sit on
//! shared collaborators (key-value store, movie catalog) handed in at
//! construction.

pub mod library;
pub mod suggestions;
