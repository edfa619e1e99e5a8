//! formmeta
//!
//! Enriches machine-readable API description documents with presentation
//! metadata, so a front-end can render forms and grids without hand-written
//! UI config.
//!
//! Given a path, an HTTP operation, and a schema role (request/response),
//! the pipeline routes the path to its document group, locates the target
//! type definition (unwrapping generic response envelopes), optionally
//! inlines internal references, infers a rendering-hint map per field
//! through a six-stage precedence pipeline, and returns a canonical,
//! content-addressed payload suitable for ETag revalidation.
//!
//! # Example
//!
//! ```
//! use formmeta::{Conditional, Enricher, GroupIndex, GroupPattern, QueryParams, StaticSource};
//! use serde_json::json;
//!
//! let document = json!({
//!     "paths": {
//!         "/api/hr/employees/all": {
//!             "get": {
//!                 "responses": {
//!                     "200": { "$ref": "#/definitions/ResponseEnvelopeListEmployeeView" }
//!                 }
//!             }
//!         }
//!     },
//!     "definitions": {
//!         "EmployeeView": {
//!             "type": "object",
//!             "properties": {
//!                 "firstName": { "type": "string" },
//!                 "hireDate": { "type": "string", "format": "date" }
//!             }
//!         },
//!         "ResponseEnvelopeListEmployeeView": {
//!             "type": "object",
//!             "properties": {
//!                 "data": {
//!                     "type": "array",
//!                     "items": { "$ref": "#/definitions/EmployeeView" }
//!                 }
//!             }
//!         }
//!     }
//! });
//!
//! let enricher = Enricher::new(
//!     StaticSource::new(document),
//!     GroupIndex::new(vec![GroupPattern::new("hr", vec!["/api/hr/**".into()])]),
//! );
//!
//! let outcome = enricher
//!     .query(QueryParams::new("/api/hr/employees/all", "get"), None)
//!     .unwrap();
//!
//! match outcome {
//!     Conditional::Fresh { payload, .. } => {
//!         assert_eq!(payload["schemaName"], "EmployeeView");
//!         assert_eq!(
//!             payload["schema"]["properties"]["hireDate"]["controlType"],
//!             "datepicker"
//!         );
//!     }
//!     Conditional::NotModified { .. } => unreachable!(),
//! }
//! ```
//!
//! # Precedence
//!
//! | Stage | Source | Behavior |
//! |-------|--------|----------|
//! | 1 | directive sentinels | fills unset keys only |
//! | 2 | type shape | fills unset keys only |
//! | 3 | naming convention | replaces control type |
//! | 4 | explicit directive | replaces stages 1–3 |
//! | 5 | validation constraints | fills unset validation keys |
//! | 6 | raw overrides | replaces everything |

mod canonical;
pub mod catalog;
mod deref;
mod directive;
mod error;
mod groups;
mod infer;
mod loader;
mod locator;
mod service;
mod store;
mod types;

pub use canonical::{canonicalize, digest, etag_for, Conditional, DigestCache};
pub use deref::inline;
pub use directive::{FieldDirective, ValidationConstraints};
pub use error::{EnrichError, ErrorKind};
pub use groups::{GroupIndex, GroupPattern};
pub use infer::{annotate, infer, InferContext};
pub use loader::{is_url, load_document, load_document_auto, load_document_str};
pub use locator::{locate, Located};
pub use service::{CacheClearReport, Enricher};
pub use store::{DocumentSource, DocumentStore, FileSource, StaticSource};
pub use types::{humanize, CacheKey, QueryParams, SchemaRole};

#[cfg(feature = "remote")]
pub use loader::load_document_url;

#[cfg(feature = "remote")]
pub use store::RemoteSource;
