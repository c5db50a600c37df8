//! Endpoint registry for callback routing
//!
//! The registry maps integer identifiers to live endpoints. Engine callbacks
//! carry nothing but an identifier, so every dispatch starts with a lookup
//! here.
//!
//! # Architecture
//!
//! ```text
//!                         Arc<EndpointRegistry>
//!                     ┌──────────────────────────┐
//!                     │ Mutex {                  │
//!                     │   last_id,               │
//!                     │   endpoints: HashMap<Id, │
//!                     │     Stream | Bus>        │
//!                     │ }                        │
//!                     └────────────┬─────────────┘
//!                                  │
//!         ┌────────────────────────┼────────────────────────┐
//!         │                        │                        │
//!         ▼                        ▼                        ▼
//!   [engine thread]          [engine thread]          [controller]
//!   on_buffer(id)            on_bus_message(id)       create / stop
//!         │                        │                        │
//!         └── lookup ──► endpoint.deliver() ──► queue ──► consumer
//! ```
//!
//! # Teardown ordering
//!
//! Controllers always deregister before closing an endpoint's queue, so a
//! racing callback either finds the endpoint intact or does not find it.

pub mod entry;
pub mod id;
pub mod store;

pub use entry::Endpoint;
pub use id::EndpointId;
pub use store::EndpointRegistry;
