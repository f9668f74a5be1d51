//! # Repository Module
//!
//! Generic repositories over the external statement engine.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  Application                                                            │
//! │       │  users.find_page(&pageable, &filter, &[])                       │
//! │       ▼                                                                 │
//! │  SimpleRepository<User>                                                 │
//! │       │  builds {condition, sorts, offset, pageSize, ...}               │
//! │       ▼                                                                 │
//! │  RepositorySupport                                                      │
//! │       │  "<type path>_countByPager", "<type path>_selectByPager"        │
//! │       ▼                                                                 │
//! │  StatementExecutor (external engine)                                    │
//! │       │  rows as JSON                                                   │
//! │       ▼                                                                 │
//! │  Page<User>                                                             │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Contents
//!
//! - [`RepositoryFactory`] - Builds repositories, registers statements
//! - [`SimpleRepository`] - CRUD, paging and conditional queries
//! - [`RepositorySupport`] - Namespaced dispatch helpers

pub mod factory;
pub mod simple;
pub mod support;

pub use factory::RepositoryFactory;
pub use simple::SimpleRepository;
pub use support::RepositorySupport;
