// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::{
	fmt::{Display, Formatter},
	str::FromStr,
};

use serde::{Deserialize, Serialize};
use sqr_type::Value;

use crate::NamePair;

/// Semantic type of an attribute or of an operation argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum SemanticType {
	Arithmetic,
	Categorical,
	Document,
	Datetime,
	Metric,
	Identifier,
	Entity,
	Attribute,
	Group,
	Filter,
	Sort,
	Limit,
	RowNum,
	AttributeCollection,
	String,
	StartDate,
	EndDate,
	Quantity,
	RelatedIdentifier,
}

impl FromStr for SemanticType {
	type Err = String;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		let result = match s.to_ascii_lowercase().as_str() {
			"arithmetic" => SemanticType::Arithmetic,
			"categorical" => SemanticType::Categorical,
			"document" => SemanticType::Document,
			"datetime" => SemanticType::Datetime,
			"metric" => SemanticType::Metric,
			"identifier" => SemanticType::Identifier,
			"relatedidentifier" => SemanticType::RelatedIdentifier,
			"entity" => SemanticType::Entity,
			"attribute" => SemanticType::Attribute,
			"group" => SemanticType::Group,
			"string" => SemanticType::String,
			"startdate" => SemanticType::StartDate,
			"enddate" => SemanticType::EndDate,
			"quantity" => SemanticType::Quantity,
			other => return Err(format!("unknown semantic type '{}'", other)),
		};
		Ok(result)
	}
}

impl Display for SemanticType {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		write!(f, "{:?}", self)
	}
}

/// Expands declared types with the types they imply. Every attribute is an
/// `Attribute`; start and end dates are also `Datetime`.
pub fn expand_semantic_types(declared: Vec<SemanticType>) -> Vec<SemanticType> {
	let mut types = declared;
	let implied: Vec<SemanticType> = types
		.iter()
		.filter(|t| matches!(t, SemanticType::StartDate | SemanticType::EndDate))
		.map(|_| SemanticType::Datetime)
		.collect();
	types.push(SemanticType::Attribute);
	for t in implied {
		if !types.contains(&t) {
			types.push(t);
		}
	}
	types
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NullHandling {
	#[default]
	Keep,
	/// Nulls are replaced with the attribute's null value.
	Cast,
}

impl FromStr for NullHandling {
	type Err = String;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s.to_ascii_lowercase().as_str() {
			"cast" => Ok(NullHandling::Cast),
			"keep" | "ignore" | "none" => Ok(NullHandling::Keep),
			other => Err(format!("unknown null handling '{}'", other)),
		}
	}
}

/// Date part requested through an attribute suffix such as `filed:year`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DatePart {
	Day,
	DayOfWeek,
	Month,
	OnlyDay,
	OnlyMonth,
	Year,
}

impl DatePart {
	pub fn suffix(&self) -> &'static str {
		match self {
			DatePart::Day => "day",
			DatePart::DayOfWeek => "dayofweek",
			DatePart::Month => "month",
			DatePart::OnlyDay => "onlyday",
			DatePart::OnlyMonth => "onlymonth",
			DatePart::Year => "year",
		}
	}

	/// Prefix for the display name of an attribute read through this part.
	pub fn label(&self) -> &'static str {
		match self {
			DatePart::Day => "year/month/day of",
			DatePart::DayOfWeek => "day of the week of",
			DatePart::Month => "year/month of",
			DatePart::OnlyDay => "day of",
			DatePart::OnlyMonth => "month of",
			DatePart::Year => "year of",
		}
	}

	fn from_suffix(suffix: &str) -> Option<Self> {
		match suffix {
			"day" => Some(DatePart::Day),
			"dayofweek" => Some(DatePart::DayOfWeek),
			"month" => Some(DatePart::Month),
			"onlyday" => Some(DatePart::OnlyDay),
			"onlymonth" => Some(DatePart::OnlyMonth),
			"year" => Some(DatePart::Year),
			_ => None,
		}
	}
}

/// Splits `name:part` into the attribute name and its date part. Names without
/// a recognised suffix are returned unchanged.
pub fn split_date_part(name: &str) -> (&str, Option<DatePart>) {
	if let Some((base, suffix)) = name.rsplit_once(':') {
		if !base.is_empty() {
			if let Some(part) = DatePart::from_suffix(suffix) {
				return (base, Some(part));
			}
		}
	}
	(name, None)
}

#[derive(Debug, Clone, PartialEq)]
pub struct Attribute {
	pub name: String,
	pub display_name: NamePair,
	pub semantic_types: Vec<SemanticType>,
	pub units: Option<NamePair>,
	pub source_table: String,
	pub source_columns: Vec<String>,
	/// Joins from the entity's primary table to `source_table`.
	pub joins: Vec<String>,
	pub null_handling: NullHandling,
	pub null_value: Option<Value>,
	/// Digits to round to, when rounding is enabled.
	pub rounding: Option<u32>,
}

impl Attribute {
	pub fn has_type(&self, ty: SemanticType) -> bool {
		self.semantic_types.contains(&ty)
	}

	/// The first source column, which is the one the attribute reads.
	pub fn column(&self) -> Option<&str> {
		self.source_columns.first().map(String::as_str)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_split_date_part() {
		assert_eq!(split_date_part("hired:year"), ("hired", Some(DatePart::Year)));
		assert_eq!(split_date_part("hired:dayofweek"), ("hired", Some(DatePart::DayOfWeek)));
		assert_eq!(split_date_part("hired"), ("hired", None));
		assert_eq!(split_date_part("hired:decade"), ("hired:decade", None));
		assert_eq!(split_date_part(":year"), (":year", None));
	}

	#[test]
	fn test_expand_semantic_types() {
		let types = expand_semantic_types(vec![SemanticType::StartDate]);
		assert_eq!(types, vec![SemanticType::StartDate, SemanticType::Attribute, SemanticType::Datetime]);
	}

	#[test]
	fn test_semantic_type_from_str_is_case_insensitive() {
		assert_eq!("Arithmetic".parse::<SemanticType>(), Ok(SemanticType::Arithmetic));
		assert!("vector".parse::<SemanticType>().is_err());
	}
}
