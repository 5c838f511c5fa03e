//! # lazy-db
//!
//! Persistence for access records and application decisions.
//!
//! ## Overview
//!
//! This crate implements the repository traits defined in `lazy-core`:
//!
//! - Connection pool management and migrations
//! - Database models with SQLx `FromRow` derives
//! - Entity ↔ Model mappers
//! - PostgreSQL repositories
//! - In-memory repositories with the same contracts
//!
//! ## Usage
//!
//! ```rust,ignore
//! use lazy_db::pool::{create_pool, run_migrations, DatabaseConfig};
//! use lazy_db::repositories::PgUserRepository;
//!
//! async fn example(config: DatabaseConfig) -> Result<(), Box<dyn std::error::Error>> {
//!     let pool = create_pool(&config).await?;
//!     run_migrations(&pool).await?;
//!     let users = PgUserRepository::new(pool);
//!     Ok(())
//! }
//! ```

pub mod mappers;
pub mod memory;
pub mod models;
pub mod pool;
pub mod repositories;

// Re-export commonly used types
pub use memory::{InMemoryApplicationRepository, InMemoryUserRepository};
pub use pool::{create_pool, run_migrations, DatabaseConfig, PgPool};
pub use repositories::{PgApplicationRepository, PgUserRepository};
