//! # Bahumati
//!
//! Domain library for the Bahumati gifting/investment platform's internal
//! administration console. The platform backend owns every entity and all
//! business rules; this library is the console's client-side core:
//!
//! - [`session`]: operator login/logout with a persisted bearer token,
//!   behind an injectable credential store.
//! - [`access`]: role/route guard deciding which console pages an operator
//!   may see, plus the role-filtered menu.
//! - [`services`]: one module per backend resource (users, KYC, events,
//!   transactions, withdrawals, agents, ads, config). Each wraps a fixed set
//!   of REST endpoints, strictly parses the wire shapes, and maps them to
//!   the flat view models in [`models`].
//! - [`client`]: the shared HTTP plumbing (bearer header, `success`
//!   envelope discriminator, error taxonomy).
//!
//! ## Example
//!
//! ```no_run
//! use bahumati::client::ApiClient;
//! use bahumati::services::Services;
//!
//! # async fn demo(token: String) {
//! let api = ApiClient::new("http://localhost:5000/api/v1".into()).with_token(token);
//! let services = Services::new(api);
//! let events = services.events.list().await;
//! # let _ = events;
//! # }
//! ```

/// Shared HTTP plumbing and the service error taxonomy.
pub mod client;
pub use client::{ApiClient, ServiceError, ServiceResult};

/// Role/route guard and menu filtering.
pub mod access;
pub use access::{GuardDecision, Page};

/// Flat view-model entities and their closed enums.
pub mod models;

/// Operator session: login, logout, persisted current operator.
pub mod session;
pub use session::{SessionManager, StoredSession};

/// Per-resource backend services.
pub mod services;
pub use services::Services;
