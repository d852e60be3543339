// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
	Open,
	Close,
	/// Bare token, such as an operation name, a reference or a number.
	Word(String),
	/// Contents of a quoted literal with escapes removed.
	Quoted(String),
}

/// Where and why tokenizing failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fault {
	pub position: usize,
	pub message: String,
}

impl Fault {
	fn at(position: usize, message: impl Into<String>) -> Self {
		Self {
			position,
			message: message.into(),
		}
	}
}

pub fn tokenize(text: &str) -> Result<Vec<Token>, Fault> {
	let mut tokens = Vec::new();
	let chars: Vec<char> = text.chars().collect();
	let len = chars.len();
	let mut i = 0;

	while i < len {
		let c = chars[i];

		if c.is_whitespace() {
			i += 1;
			continue;
		}

		match c {
			'(' => {
				tokens.push(Token::Open);
				i += 1;
			}
			')' => {
				tokens.push(Token::Close);
				i += 1;
			}
			'"' | '\'' => {
				let start = i;
				let quote = c;
				let mut value = String::new();
				i += 1;
				loop {
					if i >= len {
						return Err(Fault::at(start, "unterminated quoted literal"));
					}
					match chars[i] {
						'\\' if i + 1 < len => {
							value.push(chars[i + 1]);
							i += 2;
						}
						ch if ch == quote => {
							i += 1;
							break;
						}
						ch => {
							value.push(ch);
							i += 1;
						}
					}
				}
				tokens.push(Token::Quoted(value));
			}
			_ => {
				let start = i;
				while i < len && !chars[i].is_whitespace() && !matches!(chars[i], '(' | ')' | '"' | '\'') {
					i += 1;
				}
				tokens.push(Token::Word(chars[start..i].iter().collect()));
			}
		}
	}

	Ok(tokens)
}

/// Splits a step's text into its operation name and argument tokens. The
/// text must be exactly one non-empty, flat parenthesized list.
pub fn split_step(text: &str) -> Result<(String, Vec<Token>), Fault> {
	let tokens = tokenize(text)?;
	let mut iter = tokens.into_iter();

	if iter.next() != Some(Token::Open) {
		return Err(Fault::at(0, "a step must start with '('"));
	}

	let operation = match iter.next() {
		Some(Token::Word(word)) => word,
		Some(Token::Close) => return Err(Fault::at(0, "empty step")),
		Some(Token::Quoted(_)) => return Err(Fault::at(0, "operation name cannot be quoted")),
		Some(Token::Open) => return Err(Fault::at(0, "nested lists are not allowed")),
		None => return Err(Fault::at(text.len(), "missing closing ')'")),
	};

	let mut args = Vec::new();
	loop {
		match iter.next() {
			Some(Token::Close) => break,
			Some(Token::Open) => return Err(Fault::at(0, "nested lists are not allowed")),
			Some(token) => args.push(token),
			None => return Err(Fault::at(text.len(), "missing closing ')'")),
		}
	}

	if iter.next().is_some() {
		return Err(Fault::at(text.len(), "unexpected text after ')'"));
	}

	Ok((operation, args))
}

#[cfg(test)]
mod tests {
	use super::*;

	fn word(s: &str) -> Token {
		Token::Word(s.to_string())
	}

	#[test]
	fn test_tokenize_step() {
		let tokens = tokenize("(retrieve_attribute |1| age)").unwrap();
		assert_eq!(tokens, vec![Token::Open, word("retrieve_attribute"), word("|1|"), word("age"), Token::Close]);
	}

	#[test]
	fn test_quoted_strings_stay_whole() {
		let tokens = tokenize(r#"(exact |2| "New York (NY)")"#).unwrap();
		assert_eq!(tokens[3], Token::Quoted("New York (NY)".to_string()));

		let tokens = tokenize(r"(exact |2| 'O\'Brien')").unwrap();
		assert_eq!(tokens[3], Token::Quoted("O'Brien".to_string()));
	}

	#[test]
	fn test_unterminated_quote() {
		let fault = tokenize(r#"(exact |2| "New York)"#).unwrap_err();
		assert_eq!(fault.position, 11);
	}

	#[test]
	fn test_split_step() {
		let (op, args) = split_step("( sort |3| desc )").unwrap();
		assert_eq!(op, "sort");
		assert_eq!(args, vec![word("|3|"), word("desc")]);
	}

	#[test]
	fn test_split_rejects_malformed_lists() {
		assert!(split_step("()").is_err());
		assert!(split_step("(add 1 2").is_err());
		assert!(split_step("(add 1 (2))").is_err());
		assert!(split_step("(add 1 2) trailing").is_err());
		assert!(split_step("add 1 2").is_err());
		assert!(split_step("(add 1 2))").is_err());
	}
}
