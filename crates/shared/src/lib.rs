//! Domain identifiers, stored document schema, view models, and wire errors
//! shared between the store seam, the repository layer, and the desktop app.

pub mod doc;
pub mod domain;
pub mod error;
pub mod time;
pub mod view;
