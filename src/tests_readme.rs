// #![include_doc("../README.md", start)]
//! # path-template-ex
//!
//! Typed, bidirectional URL path templates.
//!
//! ## Overview
//!
//! `path-template-ex` compiles a path template such as `/profile/:id<number>+` once,
//! then uses it both to parse concrete paths into typed parameters and to build
//! paths back from parameters.
//!
//! ## Template syntax
//!
//! A template is split on `/`; empty tokens are ignored.
//!
//! - `profile` — a literal segment, matched exactly.
//! - `:id` — a required parameter matching any one segment.
//! - `:id<number>` — a parameter whose segment must start with an integer.
//! - `:id<hello|world>` — a parameter restricted to the listed values.
//!
//! Each parameter may end with a modifier:
//!
//! | Modifier | Segments | Parsed value  |
//! | -------- | -------- | ------------- |
//! | (none)   | 1        | value         |
//! | `?`      | 0 or 1   | value or none |
//! | `*`      | 0 or more| list          |
//! | `+`      | 1 or more| list          |
//!
//! A `*` or `+` parameter consumes every following segment it accepts, so it
//! should be the last segment of the template.
//!
//! ## Usage
//!
//! ### Building a path
//!
//! ```rust
//! use std::collections::BTreeMap;
//! use path_template_ex::{PathTemplate, Value};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let template = PathTemplate::new("/users/:id<number>/files/:path+")?;
//!     let mut params = BTreeMap::new();
//!     params.insert("id", Value::from(42));
//!     params.insert("path", Value::from(vec!["docs", "read me.txt"]));
//!
//!     let path = template.build(&params)?;
//!     assert_eq!(path, "/users/42/files/docs/read%20me.txt");
//!     Ok(())
//! }
//! ```
//!
//! ### Parsing a path
//!
//! ```rust
//! use path_template_ex::{PathTemplate, Value};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let template = PathTemplate::new("/users/:id<number>/files/:path+")?;
//!
//!     let m = template.parse("/users/42/files/docs/read%20me.txt").unwrap();
//!     assert_eq!(m.get("id"), Some(&Value::Number(42)));
//!     assert_eq!(
//!         m.get("path"),
//!         Some(&Value::from(vec!["docs", "read me.txt"]))
//!     );
//!
//!     assert!(template.parse("/users/alice/files/x").is_none());
//!     Ok(())
//! }
//! ```
//!
//! ### Templates in configuration
//!
//! `PathTemplate` deserializes from a string, so route tables can live in
//! configuration files.
//!
//! ```rust
//! use path_template_ex::PathTemplate;
//! use serde::Deserialize;
//!
//! #[derive(Deserialize)]
//! struct Route {
//!     name: String,
//!     path: PathTemplate,
//! }
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let route: Route = serde_json::from_str(r#"{"name": "post", "path": "/posts/:slug"}"#)?;
//!     assert_eq!(route.name, "post");
//!     assert!(route.path.parse("/posts/hello").is_some());
//!     Ok(())
//! }
//! ```
//!
//! ## License
//!
//! This project is dual licensed under Apache-2.0/MIT. See the two LICENSE-\* files for details.
//!
//! ## Contribution
//!
//! Unless you explicitly state otherwise, any contribution intentionally submitted for inclusion in the work by you, as defined in the Apache-2.0 license, shall be dual licensed as above, without any additional terms or conditions.
// #![include_doc("../README.md", end)]
