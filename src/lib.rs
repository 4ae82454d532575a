//! # listhub
//!
//! Multi-user list management backend built around an in-process domain
//! event pipeline.
//!
//! Write operations on lists commit through the repository, then publish a
//! domain event. Subscriber processors consume those events to keep
//! derived projections (item counts, search documents) eventually
//! consistent, without the write path ever waiting for them.
//!
//! ## Architecture
//!
//! ```text
//! Clients (HTTP)
//!     │
//!     ├── REST Handlers (api/)
//!     │
//!     ├── ListService (service/) ──publish──▶ EventBus (events/)
//!     │                                          │
//!     │                     ┌────────────────────┼──────────────────┐
//!     │                     ▼                    ▼                  ▼
//!     │            item count processor   search upsert      search delete
//!     │                     │             (processors/)             │
//!     │                     ▼                    ▼                  ▼
//!     │             ItemCountService      SearchIndexService ──▶ SearchClient (search/)
//!     │
//!     └── ListRepository (persistence/): PostgreSQL or in-memory
//! ```

pub mod api;
pub mod app_state;
pub mod config;
pub mod domain;
pub mod error;
pub mod events;
pub mod persistence;
pub mod pipeline;
pub mod processors;
pub mod reporting;
pub mod search;
pub mod service;
