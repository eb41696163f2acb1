//! Request middleware applied around the router.
//!
//! - [`method_override::method_override`] -- Lets HTML forms issue `PUT` and
//!   `DELETE` through `POST ...?_method=`.

pub mod method_override;
