// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::fmt::{Display, Formatter};

use sqr_ring::SemanticType::{self, *};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Category {
	Retrieval,
	Aggregation,
	Boolean,
	Arithmetic,
	Analysis,
	Sort,
	Limit,
	RowNum,
	Collect,
	Return,
}

impl Display for Category {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		let name = match self {
			Category::Retrieval => "retrieval",
			Category::Aggregation => "aggregation",
			Category::Boolean => "boolean",
			Category::Arithmetic => "arithmetic",
			Category::Analysis => "analysis",
			Category::Sort => "sort",
			Category::Limit => "limit",
			Category::RowNum => "rownum",
			Category::Collect => "collect",
			Category::Return => "return",
		};
		f.write_str(name)
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Operation {
	RetrieveEntity,
	RetrieveAttribute,
	Groupby,
	Exact,
	Contains,
	LessThan,
	LessThanEq,
	GreaterThan,
	GreaterThanEq,
	And,
	Or,
	Not,
	Add,
	Subtract,
	Multiply,
	Divide,
	Sqrt,
	Abs,
	PercentChange,
	Percentage,
	Duration,
	Average,
	Count,
	CountUnique,
	Max,
	Min,
	Median,
	Sum,
	StdDev,
	StringAgg,
	GetOne,
	Correlation,
	Sort,
	Limit,
	RowNum,
	Collect,
	Return,
}

/// A positional run of arguments sharing one set of accepted types.
/// `max == None` is unbounded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArgGroup {
	pub min: usize,
	pub max: Option<usize>,
	pub types: &'static [SemanticType],
}

#[derive(Debug, PartialEq, Eq)]
pub struct OperationDescriptor {
	pub operation: Operation,
	pub category: Category,
	pub arg_groups: &'static [ArgGroup],
	/// Types of the value the operation produces. Empty when it depends on the operand.
	pub output: &'static [SemanticType],
	pub template: &'static str,
}

const NUMERIC: &[SemanticType] = &[Arithmetic, Metric, Quantity];
const ORDERED: &[SemanticType] = &[Arithmetic, Metric, Quantity, Datetime, StartDate, EndDate];
const COMPARABLE: &[SemanticType] = &[
	Arithmetic,
	Metric,
	Quantity,
	Datetime,
	StartDate,
	EndDate,
	Categorical,
	Identifier,
	RelatedIdentifier,
	String,
	Document,
];
const TEXTUAL: &[SemanticType] = &[Categorical, String, Document, Identifier];
const ANY: &[SemanticType] = &[Attribute];

const fn one(types: &'static [SemanticType]) -> ArgGroup {
	ArgGroup {
		min: 1,
		max: Some(1),
		types,
	}
}

const fn optional(types: &'static [SemanticType]) -> ArgGroup {
	ArgGroup {
		min: 0,
		max: Some(1),
		types,
	}
}

const fn at_least(min: usize, types: &'static [SemanticType]) -> ArgGroup {
	ArgGroup {
		min,
		max: None,
		types,
	}
}

const GROUPED_NUMERIC: &[ArgGroup] = &[one(NUMERIC), optional(&[Group])];
const GROUPED_ORDERED: &[ArgGroup] = &[one(ORDERED), optional(&[Group])];
const GROUPED_ANY: &[ArgGroup] = &[one(ANY), optional(&[Group])];
const BINARY_ORDERED: &[ArgGroup] = &[one(ORDERED), one(ORDERED)];
const BINARY_NUMERIC: &[ArgGroup] = &[one(NUMERIC), one(NUMERIC)];
const UNARY_NUMERIC: &[ArgGroup] = &[one(NUMERIC)];
const VARIADIC_NUMERIC: &[ArgGroup] = &[at_least(2, NUMERIC)];

macro_rules! descriptor {
	($op:ident, $category:ident, $groups:expr, $output:expr, $template:literal) => {{
		const DESCRIPTOR: &OperationDescriptor = &OperationDescriptor {
			operation: Operation::$op,
			category: Category::$category,
			arg_groups: $groups,
			output: $output,
			template: $template,
		};
		DESCRIPTOR
	}};
}

impl Operation {
	pub const ALL: [Operation; 37] = [
		Operation::RetrieveEntity,
		Operation::RetrieveAttribute,
		Operation::Groupby,
		Operation::Exact,
		Operation::Contains,
		Operation::LessThan,
		Operation::LessThanEq,
		Operation::GreaterThan,
		Operation::GreaterThanEq,
		Operation::And,
		Operation::Or,
		Operation::Not,
		Operation::Add,
		Operation::Subtract,
		Operation::Multiply,
		Operation::Divide,
		Operation::Sqrt,
		Operation::Abs,
		Operation::PercentChange,
		Operation::Percentage,
		Operation::Duration,
		Operation::Average,
		Operation::Count,
		Operation::CountUnique,
		Operation::Max,
		Operation::Min,
		Operation::Median,
		Operation::Sum,
		Operation::StdDev,
		Operation::StringAgg,
		Operation::GetOne,
		Operation::Correlation,
		Operation::Sort,
		Operation::Limit,
		Operation::RowNum,
		Operation::Collect,
		Operation::Return,
	];

	pub fn name(&self) -> &'static str {
		match self {
			Operation::RetrieveEntity => "retrieve_entity",
			Operation::RetrieveAttribute => "retrieve_attribute",
			Operation::Groupby => "groupby",
			Operation::Exact => "exact",
			Operation::Contains => "contains",
			Operation::LessThan => "lessthan",
			Operation::LessThanEq => "lessthan_eq",
			Operation::GreaterThan => "greaterthan",
			Operation::GreaterThanEq => "greaterthan_eq",
			Operation::And => "and",
			Operation::Or => "or",
			Operation::Not => "not",
			Operation::Add => "add",
			Operation::Subtract => "subtract",
			Operation::Multiply => "multiply",
			Operation::Divide => "divide",
			Operation::Sqrt => "sqrt",
			Operation::Abs => "abs",
			Operation::PercentChange => "percent_change",
			Operation::Percentage => "percentage",
			Operation::Duration => "duration",
			Operation::Average => "average",
			Operation::Count => "count",
			Operation::CountUnique => "count_unique",
			Operation::Max => "max",
			Operation::Min => "min",
			Operation::Median => "median",
			Operation::Sum => "sum",
			Operation::StdDev => "stddev",
			Operation::StringAgg => "string_agg",
			Operation::GetOne => "get_one",
			Operation::Correlation => "correlation",
			Operation::Sort => "sort",
			Operation::Limit => "limit",
			Operation::RowNum => "rownum",
			Operation::Collect => "collect",
			Operation::Return => "return",
		}
	}

	pub fn descriptor(&self) -> &'static OperationDescriptor {
		match self {
			Operation::RetrieveEntity => descriptor!(RetrieveEntity, Retrieval, &[one(&[String])], &[Entity], "{0}"),
			Operation::RetrieveAttribute => descriptor!(
				RetrieveAttribute,
				Retrieval,
				&[one(&[Entity]), one(&[String])],
				&[SemanticType::Attribute],
				"{1} of {0}"
			),
			Operation::Groupby => descriptor!(
				Groupby,
				Aggregation,
				&[at_least(1, &[Categorical, Datetime, Identifier, RelatedIdentifier])],
				&[Group],
				"grouped by {0}"
			),
			Operation::Exact => {
				descriptor!(Exact, Boolean, &[one(COMPARABLE), one(COMPARABLE)], &[Filter], "{0} is {1}")
			}
			Operation::Contains => {
				descriptor!(Contains, Boolean, &[one(TEXTUAL), one(TEXTUAL)], &[Filter], "{0} contains {1}")
			}
			Operation::LessThan => descriptor!(LessThan, Boolean, BINARY_ORDERED, &[Filter], "{0} is less than {1}"),
			Operation::LessThanEq => descriptor!(
				LessThanEq,
				Boolean,
				BINARY_ORDERED,
				&[Filter],
				"{0} is less than or equal to {1}"
			),
			Operation::GreaterThan => {
				descriptor!(GreaterThan, Boolean, BINARY_ORDERED, &[Filter], "{0} is greater than {1}")
			}
			Operation::GreaterThanEq => descriptor!(
				GreaterThanEq,
				Boolean,
				BINARY_ORDERED,
				&[Filter],
				"{0} is greater than or equal to {1}"
			),
			Operation::And => descriptor!(And, Boolean, &[at_least(1, &[Filter])], &[Filter], "{0} and {1}"),
			Operation::Or => descriptor!(Or, Boolean, &[at_least(1, &[Filter])], &[Filter], "{0} or {1}"),
			Operation::Not => descriptor!(Not, Boolean, &[one(&[Filter])], &[Filter], "not {0}"),
			Operation::Add => descriptor!(Add, Arithmetic, VARIADIC_NUMERIC, &[Arithmetic], "{0} plus {1}"),
			Operation::Subtract => {
				descriptor!(Subtract, Arithmetic, VARIADIC_NUMERIC, &[Arithmetic], "{0} minus {1}")
			}
			Operation::Multiply => {
				descriptor!(Multiply, Arithmetic, VARIADIC_NUMERIC, &[Arithmetic], "{0} times {1}")
			}
			Operation::Divide => {
				descriptor!(Divide, Arithmetic, BINARY_NUMERIC, &[Arithmetic], "{0} divided by {1}")
			}
			Operation::Sqrt => descriptor!(Sqrt, Arithmetic, UNARY_NUMERIC, &[Arithmetic], "square root of {0}"),
			Operation::Abs => descriptor!(Abs, Arithmetic, UNARY_NUMERIC, &[Arithmetic], "absolute value of {0}"),
			Operation::PercentChange => descriptor!(
				PercentChange,
				Arithmetic,
				BINARY_NUMERIC,
				&[Arithmetic],
				"percent change from {0} to {1}"
			),
			Operation::Percentage => descriptor!(
				Percentage,
				Arithmetic,
				BINARY_NUMERIC,
				&[Arithmetic],
				"{0} as a percentage of {1}"
			),
			Operation::Duration => descriptor!(
				Duration,
				Arithmetic,
				&[one(&[Datetime, StartDate]), one(&[Datetime, EndDate])],
				&[Arithmetic, Quantity],
				"days from {0} to {1}"
			),
			Operation::Average => {
				descriptor!(Average, Analysis, GROUPED_NUMERIC, &[Arithmetic, Metric], "average of {target}")
			}
			Operation::Count => {
				descriptor!(Count, Analysis, GROUPED_ANY, &[Arithmetic, Quantity], "number of {target}")
			}
			Operation::CountUnique => descriptor!(
				CountUnique,
				Analysis,
				GROUPED_ANY,
				&[Arithmetic, Quantity],
				"number of unique {target}"
			),
			Operation::Max => descriptor!(Max, Analysis, GROUPED_ORDERED, &[], "max of {target}"),
			Operation::Min => descriptor!(Min, Analysis, GROUPED_ORDERED, &[], "min of {target}"),
			Operation::Median => {
				descriptor!(Median, Analysis, GROUPED_NUMERIC, &[Arithmetic, Metric], "median of {target}")
			}
			Operation::Sum => descriptor!(Sum, Analysis, GROUPED_NUMERIC, &[Arithmetic, Metric], "total {target}"),
			Operation::StdDev => descriptor!(
				StdDev,
				Analysis,
				GROUPED_NUMERIC,
				&[Arithmetic, Metric],
				"standard deviation of {target}"
			),
			Operation::StringAgg => descriptor!(
				StringAgg,
				Analysis,
				&[one(TEXTUAL), optional(&[Group])],
				&[String],
				"list of {target}"
			),
			Operation::GetOne => descriptor!(GetOne, Analysis, GROUPED_ANY, &[], "{target}"),
			Operation::Correlation => descriptor!(
				Correlation,
				Analysis,
				&[one(NUMERIC), one(NUMERIC), optional(&[Group])],
				&[Arithmetic],
				"correlation between {0} and {1}"
			),
			Operation::Sort => descriptor!(
				Sort,
				Sort,
				&[at_least(1, &[SemanticType::Attribute]), one(&[String])],
				&[SemanticType::Sort],
				"sorted by {0}"
			),
			Operation::Limit => {
				descriptor!(Limit, Limit, &[one(&[Arithmetic])], &[SemanticType::Limit], "the first {0}")
			}
			Operation::RowNum => descriptor!(
				RowNum,
				RowNum,
				&[one(&[SemanticType::Sort])],
				&[Arithmetic, SemanticType::RowNum],
				"rank by {0}"
			),
			Operation::Collect => descriptor!(
				Collect,
				Collect,
				&[at_least(1, &[SemanticType::Attribute])],
				&[AttributeCollection],
				"{0}"
			),
			Operation::Return => descriptor!(
				Return,
				Return,
				&[
					one(&[AttributeCollection]),
					ArgGroup {
						min: 0,
						max: Some(2),
						types: &[Filter],
					},
					optional(&[SemanticType::Sort]),
					optional(&[SemanticType::Limit]),
				],
				&[],
				"{0}"
			),
		}
	}

	pub fn category(&self) -> Category {
		self.descriptor().category
	}

	pub fn is_retrieval(&self) -> bool {
		self.category() == Category::Retrieval
	}

	pub fn is_aggregation(&self) -> bool {
		self.category() == Category::Aggregation
	}

	pub fn is_boolean(&self) -> bool {
		self.category() == Category::Boolean
	}

	pub fn is_arithmetic(&self) -> bool {
		self.category() == Category::Arithmetic
	}

	pub fn is_analysis(&self) -> bool {
		self.category() == Category::Analysis
	}

	pub fn is_sort(&self) -> bool {
		self.category() == Category::Sort
	}

	pub fn is_limit(&self) -> bool {
		self.category() == Category::Limit
	}

	pub fn is_rownum(&self) -> bool {
		self.category() == Category::RowNum
	}

	pub fn is_collect(&self) -> bool {
		self.category() == Category::Collect
	}

	pub fn is_return(&self) -> bool {
		self.category() == Category::Return
	}

	/// `and`, `or` and `not` combine predicates rather than compare values.
	pub fn is_connective(&self) -> bool {
		matches!(self, Operation::And | Operation::Or | Operation::Not)
	}

	pub fn is_count(&self) -> bool {
		matches!(self, Operation::Count | Operation::CountUnique)
	}

	/// Results of these are rounded to the configured precision.
	pub fn is_rounded(&self) -> bool {
		matches!(self, Operation::Average | Operation::StdDev | Operation::Divide | Operation::PercentChange)
	}
}

impl Display for Operation {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		f.write_str(self.name())
	}
}

impl OperationDescriptor {
	pub fn min_args(&self) -> usize {
		self.arg_groups.iter().map(|g| g.min).sum()
	}

	pub fn max_args(&self) -> Option<usize> {
		self.arg_groups.iter().map(|g| g.max).sum()
	}

	/// Human readable arity such as `2`, `1..=4` or `at least 1`.
	pub fn arity(&self) -> std::string::String {
		match (self.min_args(), self.max_args()) {
			(min, Some(max)) if min == max => min.to_string(),
			(min, Some(max)) => format!("{} to {}", min, max),
			(min, None) => format!("at least {}", min),
		}
	}

	/// Index of the argument group covering each of `count` arguments. Groups
	/// are filled in order; a group only takes optional arguments that later
	/// groups do not need for their minimum.
	pub fn assign_groups(&self, count: usize) -> Vec<usize> {
		let mut assigned = Vec::with_capacity(count);
		let mut remaining = count;
		for (index, group) in self.arg_groups.iter().enumerate() {
			let reserved: usize = self.arg_groups[index + 1..].iter().map(|g| g.min).sum();
			let available = remaining.saturating_sub(reserved);
			let take = match group.max {
				Some(max) => available.min(max),
				None => available,
			};
			let take = take.max(group.min.min(remaining));
			assigned.extend(std::iter::repeat_n(index, take));
			remaining -= take;
		}
		assigned
	}
}
