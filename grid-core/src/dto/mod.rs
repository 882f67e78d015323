//! Data Transfer Objects for the Microgrid site
//!
//! The site speaks URL-encoded forms. Every DTO here knows the `action`
//! it is posted under and the form fields it contributes; the client adds
//! the session token.

pub mod auth;
pub mod task;

/// A request body posted to the site's single form endpoint
pub trait FormAction {
    /// Value of the `action` form field
    const ACTION: &'static str;

    /// Form fields specific to this action
    ///
    /// Fails only when a field holds a value that cannot be encoded.
    fn fields(&self) -> serde_json::Result<Vec<(&'static str, String)>>;
}
