// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::{
	fmt::{Display, Formatter},
	ops::{Deref, DerefMut},
};

use serde::{de, ser};

pub mod diagnostic;
pub mod render;

use diagnostic::{Diagnostic, ErrorKind};
use render::DefaultRenderer;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Clone, PartialEq)]
pub struct Error(pub Diagnostic);

impl Error {
	pub fn diagnostic(self) -> Diagnostic {
		self.0
	}

	pub fn kind(&self) -> ErrorKind {
		self.0.kind
	}

	pub fn code(&self) -> &str {
		&self.0.code
	}
}

impl Deref for Error {
	type Target = Diagnostic;

	fn deref(&self) -> &Self::Target {
		&self.0
	}
}

impl DerefMut for Error {
	fn deref_mut(&mut self) -> &mut Self::Target {
		&mut self.0
	}
}

impl Display for Error {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		let out = DefaultRenderer::render_string(&self.0);
		f.write_str(out.trim_end())
	}
}

impl std::error::Error for Error {}

impl From<Diagnostic> for Error {
	fn from(diagnostic: Diagnostic) -> Self {
		Error(diagnostic)
	}
}

impl de::Error for Error {
	fn custom<T: Display>(msg: T) -> Self {
		Error(diagnostic::internal::serde(msg.to_string()))
	}
}

impl ser::Error for Error {
	fn custom<T: Display>(msg: T) -> Self {
		Error(diagnostic::internal::serde(msg.to_string()))
	}
}

impl From<serde_json::Error> for Error {
	fn from(err: serde_json::Error) -> Self {
		Error(diagnostic::internal::serde(err.to_string()))
	}
}

#[macro_export]
macro_rules! return_error {
	($diagnostic:expr) => {
		return Err($crate::error::Error($diagnostic))
	};
}

/// Creates an internal error with the source location attached.
#[macro_export]
macro_rules! internal_error {
	($($arg:tt)*) => {
		$crate::error::Error($crate::error::diagnostic::internal::internal_with_location(
			format!($($arg)*),
			file!(),
			line!(),
		))
	};
}

#[macro_export]
macro_rules! internal_err {
	($($arg:tt)*) => {
		Err($crate::internal_error!($($arg)*))
	};
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_display_renders_code_and_message() {
		let err = Error(diagnostic::internal::internal("broken invariant"));
		let rendered = err.to_string();
		assert!(rendered.starts_with("error[INTERNAL_001]: broken invariant"));
		assert_eq!(err.kind(), ErrorKind::Internal);
	}

	#[test]
	fn test_internal_error_macro_records_location() {
		let err = internal_error!("missing {}", "thing");
		assert_eq!(err.code(), "INTERNAL_001");
		assert!(err.notes.iter().any(|n| n.contains("mod.rs")));
	}

	#[test]
	fn test_serde_json_error_converts() {
		let parsed: std::result::Result<serde_json::Value, _> = serde_json::from_str("{");
		let err: Error = parsed.unwrap_err().into();
		assert_eq!(err.code(), "SERDE_001");
	}
}
