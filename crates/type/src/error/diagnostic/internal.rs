// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use crate::error::diagnostic::{Diagnostic, ErrorKind};

pub fn internal(reason: impl Into<String>) -> Diagnostic {
	Diagnostic::new("INTERNAL_001", ErrorKind::Internal, reason)
		.with_label("internal invariant violated")
		.with_help("this is a bug in the compiler, please report it together with the plan that triggered it")
}

pub fn internal_with_location(reason: impl Into<String>, file: &str, line: u32) -> Diagnostic {
	internal(reason).with_note(format!("raised at {}:{}", file, line))
}

pub fn serde(message: impl Into<String>) -> Diagnostic {
	Diagnostic::new("SERDE_001", ErrorKind::Configuration, message)
		.with_label("serialization failed")
		.with_help("check that the document is valid JSON of the expected shape")
}

pub fn io(path: impl std::fmt::Display, err: impl std::fmt::Display) -> Diagnostic {
	Diagnostic::new("IO_001", ErrorKind::Configuration, format!("cannot read {}: {}", path, err))
		.with_label("file could not be read")
}

pub fn unsupported(message: impl Into<String>) -> Diagnostic {
	Diagnostic::new("CONFIG_001", ErrorKind::Configuration, message).with_label("unsupported configuration")
}
