//! # gehi_core
//!
//! The operation-orchestration layer for historical imagery requests.
//!
//! A request flows through these parts:
//! - [`validation`] turns raw area-of-interest input into a [`ResolvedAoi`] (or a list of messages),
//! - [`operation`] holds the closed set of operations and the [`ImageryEngine`] contract that runs them,
//! - [`coordinator`] picks the execution mode, serializes captured-text runs through a [`KeyedMutex`],
//!   and owns the temporary files and directories produced by file operations.
//!
//! ```no_run
//! use gehi_core::{ExecutionCoordinator, GeoPoint, InfoRequest, MockEngine};
//! use std::sync::Arc;
//! use tokio_util::sync::CancellationToken;
//!
//! # async fn demo() {
//! let coordinator = ExecutionCoordinator::new(Arc::new(MockEngine::new().with_stdout("2023/05/01")));
//! let request = InfoRequest {
//!     location: GeoPoint::new(37.58289, -106.52305),
//!     zoom: 17,
//!     ..Default::default()
//! };
//! let result = coordinator.run_info(&request, &CancellationToken::new()).await.unwrap();
//! assert_eq!(result.stdout, "2023/05/01");
//! # }
//! ```

pub mod concurrency;
pub mod coordinator;
pub mod operation;
pub mod request;
pub mod sync;
pub mod types;
pub mod utils;
pub mod validation;

pub use concurrency::*;
pub use coordinator::*;
pub use operation::*;
pub use request::*;
pub use sync::*;
pub use types::*;
pub use validation::*;
