//! Pure data structures: resources of the content graph and the forms they expose.

pub mod form;
pub mod resource;

pub use form::*;
pub use resource::*;
