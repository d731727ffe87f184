// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

pub mod error;
pub mod filter;
pub mod form;
pub mod layout;
pub mod model;
pub mod rows;
pub mod session;

pub use error::*;
pub use filter::*;
pub use form::*;
pub use layout::*;
pub use model::*;
pub use rows::*;
pub use session::*;
