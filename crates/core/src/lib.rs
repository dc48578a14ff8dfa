//! Domain core of the thumbnail forge client.
//!
//! I/O-free building blocks: the data model, pre-flight validation, the
//! wire format of the generation service, response normalisation and the
//! generation state machine. The async client lives in
//! `thumbforge-client`.

pub mod error;
pub mod normalize;
pub mod state;
pub mod types;
pub mod validation;
pub mod wire;
