//! Record and row identifiers.
//!
//! Rx deals with two kinds of identifier:
//!
//! - **Record identifiers** assigned by a data gateway to enterprises, templates,
//!   prescriptions and user accounts. Gateways in this workspace mint them as [`RecordId`], a
//!   v4 UUID rendered in *canonical* form: **32 lowercase hexadecimal characters** (no hyphens).
//! - **Medication row identifiers**, which only need to be unique within one medication list.
//!   Rows read back from stored templates may carry identifiers in any format, so the core treats
//!   them as opaque strings. New rows get theirs from an [`IdGenerator`].
//!
//! Identifiers coming back from a gateway or a client are never parsed into a [`RecordId`]: a
//! hosted store may use its own format, so the rest of the workspace holds them as strings.
//!
//! ## Canonical UUID form
//! - Length: 32
//! - Characters: `0-9` and `a-f` only
//! - Example: `550e8400e29b41d4a716446655440000`

mod service;

pub use service::{IdGenerator, RandomIds, RecordId, SequentialIds};
