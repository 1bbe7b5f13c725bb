//! Procedural macros shared by the rastile crates.

mod args;

use args::ContextArgs;
use proc_macro::TokenStream;
use proc_macro2::{Ident, Span};
use quote::{ToTokens, quote};
use syn::{ItemFn, ReturnType, parse_macro_input};

/// Attaches a formatted message as context to every error leaving the annotated function.
///
/// The function must be synchronous and return an `anyhow::Result`. The message is
/// formatted lazily, only when an error actually occurs, and may reference the
/// function's parameters by name.
///
/// ```
/// use anyhow::{Result, bail};
/// use rastile_derive::context;
///
/// #[context("Failed to read tile {index}")]
/// fn read(index: usize) -> Result<()> {
/// 	bail!("device not ready")
/// }
///
/// let err = read(3).unwrap_err();
/// assert_eq!(err.to_string(), "Failed to read tile 3");
/// assert_eq!(err.root_cause().to_string(), "device not ready");
/// ```
#[proc_macro_attribute]
pub fn context(args: TokenStream, input: TokenStream) -> TokenStream {
	let ContextArgs { move_token, message } = parse_macro_input!(args);
	let mut function = parse_macro_input!(input as ItemFn);

	if let Some(asyncness) = function.sig.asyncness {
		return syn::Error::new_spanned(asyncness, "#[context] does not support async functions")
			.to_compile_error()
			.into();
	}

	let ReturnType::Type(_, return_type) = &function.sig.output else {
		return syn::Error::new_spanned(&function.sig, "#[context] requires a function returning Result")
			.to_compile_error()
			.into();
	};

	let body = &function.block;
	let err = Ident::new("err", Span::mixed_site());
	let once = Ident::new("once", Span::mixed_site());

	// Moving a non-Copy value into the closure forces borrowck to treat it as FnOnce.
	let wrapped = quote! {
		let #once = ::core::iter::empty::<()>();
		(#move_token || -> #return_type {
			::core::mem::drop(#once);
			#body
		})()
		.map_err(|#err| #err.context(format!(#message)).into())
	};

	function.block.stmts = vec![syn::Stmt::Expr(syn::Expr::Verbatim(wrapped), None)];
	function.into_token_stream().into()
}
