use proc_macro2::TokenStream;
use syn::{
	Token,
	parse::{Parse, ParseStream, Result},
};

/// Arguments of `#[context(...)]`: an optional leading `move,` followed by `format!` arguments.
pub struct ContextArgs {
	pub move_token: Option<Token![move]>,
	pub message: TokenStream,
}

impl Parse for ContextArgs {
	fn parse(input: ParseStream<'_>) -> Result<Self> {
		let mut move_token = None;
		if input.peek(Token![move]) {
			move_token = Some(input.parse()?);
			input.parse::<Token![,]>()?;
		}
		if input.is_empty() {
			return Err(input.error("expected a context message"));
		}
		Ok(Self {
			move_token,
			message: input.parse()?,
		})
	}
}

#[cfg(test)]
mod tests {
	use super::ContextArgs;
	use syn::parse_str;

	#[test]
	fn message_only() {
		let args: ContextArgs = parse_str("\"tile {index}\"").unwrap();
		assert!(args.move_token.is_none());
		assert_eq!(args.message.to_string(), "\"tile {index}\"");
	}

	#[test]
	fn message_with_arguments() {
		let args: ContextArgs = parse_str("\"tile {}\", region.index").unwrap();
		assert_eq!(args.message.to_string(), "\"tile {}\" , region . index");
	}

	#[test]
	fn leading_move() {
		let args: ContextArgs = parse_str("move, \"reader {id}\"").unwrap();
		assert!(args.move_token.is_some());
		assert_eq!(args.message.to_string(), "\"reader {id}\"");
	}

	#[test]
	fn move_without_comma_is_rejected() {
		assert!(parse_str::<ContextArgs>("move \"x\"").is_err());
	}

	#[test]
	fn empty_is_rejected() {
		let err = parse_str::<ContextArgs>("").err().unwrap();
		assert!(err.to_string().contains("context message"));
	}
}
