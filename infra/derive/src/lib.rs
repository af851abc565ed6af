#![allow(unreachable_pub)]
#![allow(clippy::needless_pass_by_value)]

//! # Macros
//!
//! Procedural macros shared by every UniReg crate.
//!
//! * [`unireg_error`] turns an enum into a context-aware `thiserror` error.
//! * [`unireg_slice`] turns a struct into a registrable feature slice.
//! * [`api_model`] / [`api_handler`] wire DTOs and Axum handlers into `utoipa`.
//! * [`main`] bootstraps a tuned Tokio runtime (re-exported by `unireg-runtime`).
//!
//! The examples are `ignore`d here because a proc-macro crate cannot use its own
//! macros in doctests.

mod macros;

use proc_macro::TokenStream;
use syn::{DeriveInput, ItemFn, ItemStruct, parse_macro_input};

/// Attribute macro to bootstrap the Tokio runtime with a named profile.
///
/// # Arguments
///
/// * `high_performance` - Server profile: all cores, larger stacks.
/// * `memory_efficient` - Half the cores, smaller stacks.
/// * `default` - Worker threads auto-detected.
///
/// # Examples
///
/// ```rust,ignore
/// #[unireg_runtime::main(high_performance)]
/// async fn main() -> anyhow::Result<()> {
///     Ok(())
/// }
/// ```
#[proc_macro_attribute]
pub fn main(args: TokenStream, item: TokenStream) -> TokenStream {
    let input = parse_macro_input!(item as ItemFn);
    macros::runtime::expand_main(args.into(), input).into()
}

/// Defines a DTO exchanged over the REST boundary.
///
/// Adds `Debug`, `Serialize` and `Deserialize` when missing, derives
/// `utoipa::ToSchema` when the consuming crate enables its `server` feature,
/// and applies `rename_all = "camelCase"` plus `deny_unknown_fields` unless told
/// otherwise.
///
/// # Example
///
/// ```rust,ignore
/// #[api_model(deny_unknown_fields = false)]
/// pub struct SubmitRequest {
///     pub course_ids: Vec<String>,
/// }
/// ```
#[proc_macro_attribute]
pub fn api_model(attr: TokenStream, item: TokenStream) -> TokenStream {
    let input = parse_macro_input!(item as ItemStruct);
    macros::api::expand_api_model(attr.into(), input).into()
}

/// Registers an Axum handler with `utoipa::path` when the `server` feature is on.
///
/// Accepts the regular `utoipa::path` arguments.
///
/// # Example
///
/// ```rust,ignore
/// #[api_handler(get, path = "/courses", responses((status = OK, body = [CourseView])), tag = "Courses")]
/// pub async fn list_courses() -> Json<Vec<CourseView>> {
///     Json(Vec::new())
/// }
/// ```
#[proc_macro_attribute]
pub fn api_handler(args: TokenStream, item: TokenStream) -> TokenStream {
    let input = parse_macro_input!(item as ItemFn);
    macros::api::expand_api_handler(args.into(), input).into()
}

/// Declares a domain error enum.
///
/// # Generated Items
///
/// * `#[derive(Debug, thiserror::Error)]` unless already derived.
/// * `<Name>Ext` trait adding `.context(...)` to `Result<T, Name>` and to
///   `Result<T, Source>` for every variant wrapping a `source`.
/// * `From<Source>` for those variants, so `?` works on upstream errors.
/// * `From<&'static str>` and `From<String>` when an `Internal` variant exists.
/// * A private `format_context` helper for the `#[error(...)]` strings.
///
/// # Requirements
///
/// Variants must use named fields. A variant with a `source` field (or a field
/// marked `#[source]`/`#[from]`) must also carry
/// `context: Option<Cow<'static, str>>`.
///
/// # Example
///
/// ```rust,ignore
/// use std::borrow::Cow;
///
/// #[unireg_derive::unireg_error]
/// pub enum StorageError {
///     #[error("I/O failure{}: {source}", format_context(.context))]
///     Io { source: std::io::Error, context: Option<Cow<'static, str>> },
///
///     #[error("Internal fault{}: {message}", format_context(.context))]
///     Internal { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
/// }
/// ```
#[proc_macro_attribute]
pub fn unireg_error(_args: TokenStream, item: TokenStream) -> TokenStream {
    let input = parse_macro_input!(item as DeriveInput);
    macros::error::expand_derive(input).into()
}

/// Declares a feature slice handle.
///
/// The annotated struct becomes `<Name>Inner`; `<Name>` is an `Arc` wrapper that
/// derefs to it and implements `FeatureSlice` so it can be registered in the
/// kernel's `ApiState`.
///
/// # Example
/// ```rust,ignore
/// #[unireg_derive::unireg_slice]
/// pub struct Enrollment {
///     pub ledger: EnrollmentLedger,
/// }
///
/// let slice = Enrollment::new(EnrollmentInner { ledger });
/// ```
#[proc_macro_attribute]
pub fn unireg_slice(_attr: TokenStream, item: TokenStream) -> TokenStream {
    let input = syn::parse_macro_input!(item as ItemStruct);
    macros::slice::expand_slice(input).into()
}
