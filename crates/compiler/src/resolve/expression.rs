// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::collections::{BTreeSet, HashMap};

use indexmap::IndexMap;
use sqr_ring::{DatePart, Entity, NullHandling, Schema, SemanticType, split_date_part};
use sqr_type::{Dialect, Result, internal_err};

use crate::{
	config::CompilerConfig,
	error::SqrError,
	field::{FieldHandle, Operand},
	ontology::{Operation, compile_rownum, round},
	plan::{StepRef, SubplanId},
	sql::ast::{Expr, OrderBy},
};

/// Resolves field handles of one subplan into SQL expressions, collecting
/// the joins their attributes need.
pub(crate) struct ExpressionResolver<'a> {
	pub schema: &'a dyn Schema,
	pub config: &'a CompilerConfig,
	pub dialect: Dialect,
	/// Output columns of every subplan compiled so far.
	pub exposed: &'a IndexMap<SubplanId, Vec<String>>,
	pub origins: &'a HashMap<FieldHandle, StepRef>,
	pub joins: BTreeSet<String>,
}

impl ExpressionResolver<'_> {
	pub fn resolve(&mut self, handle: &FieldHandle) -> Result<Expr> {
		match handle {
			FieldHandle::Literal {
				entity,
				attribute,
			} => self.literal(entity, attribute),
			FieldHandle::Expression {
				operation: Operation::RowNum,
				operands,
			} => {
				let mut order_by = Vec::with_capacity(operands.len() / 2);
				for pair in operands.chunks(2) {
					let [Operand::Field(field), Operand::Direction(direction)] = pair else {
						return internal_err!("rownum operands are not (field, direction) pairs");
					};
					order_by.push(OrderBy {
						expr: self.resolve(field)?,
						direction: *direction,
						nulls_last: self.config.nulls_last,
					});
				}
				Ok(compile_rownum(order_by))
			}
			FieldHandle::Expression {
				operation,
				operands,
			} => {
				if self.config.validate_semantic_types {
					let step = self.origins.get(handle).map(StepRef::to_string);
					self.check_semantic_types(*operation, operands, step)?;
				}

				let mut compiled = Vec::with_capacity(operands.len());
				for operand in operands {
					match operand {
						Operand::Field(field) => compiled.push(self.resolve(field)?),
						Operand::Value(literal) => compiled.push(Expr::Value(literal.to_value())),
						Operand::Direction(_) => {}
					}
				}

				let expr = operation.compile(compiled, self.dialect)?;
				if operation.is_rounded() {
					return Ok(round(expr, self.config.rounding_precision, self.dialect));
				}
				Ok(expr)
			}
			FieldHandle::CrossSubplanRef {
				subplan,
				column,
				..
			} => {
				let exposed = self.exposed.get(subplan).is_some_and(|columns| columns.contains(column));
				if !exposed {
					return Err(SqrError::ColumnNotExposed {
						step: None,
						subplan: subplan.to_string(),
						column: column.clone(),
					}
					.into());
				}
				Ok(Expr::column(subplan.to_string(), column))
			}
		}
	}

	fn literal(&mut self, entity_name: &str, attribute_name: &str) -> Result<Expr> {
		let schema = self.schema;
		let entity = schema.get_entity(entity_name)?;
		let (base, part) = split_date_part(attribute_name);

		if entity.is_identifier(base) {
			let column = identifier(entity)?;
			return Ok(self.date_part(Expr::column(&entity.primary_table, column), part));
		}

		let attribute = schema.get_attribute(entity_name, base)?;
		self.joins.extend(schema.get_attribute_joins(entity_name, base)?);

		let Some(column) = attribute.column() else {
			return internal_err!("attribute {}.{} has no source column", entity_name, base);
		};
		let physical = schema.get_physical_column(&attribute.source_table, column)?;
		let mut expr = self.date_part(Expr::column(physical.table, physical.column), part);

		if attribute.null_handling == NullHandling::Cast {
			if let Some(value) = attribute.null_value.as_ref().filter(|v| !v.is_null()) {
				expr = Expr::function("COALESCE", vec![expr, Expr::Value(value.clone())]);
			}
		}
		if let Some(digits) = attribute.rounding {
			expr = round(expr, digits, self.dialect);
		}
		Ok(expr)
	}

	fn date_part(&self, expr: Expr, part: Option<DatePart>) -> Expr {
		let Some(part) = part else {
			return expr;
		};
		match self.dialect {
			Dialect::Sqlite => {
				let format = match part {
					DatePart::Year => "%Y",
					DatePart::Month => "%Y/%m",
					DatePart::Day => "%Y/%m/%d",
					DatePart::OnlyMonth => "%m",
					DatePart::OnlyDay => "%d",
					DatePart::DayOfWeek => "%w",
				};
				Expr::function("strftime", vec![Expr::constant(format), expr])
			}
			Dialect::Postgres => {
				let format = match part {
					DatePart::Year => "YYYY",
					DatePart::Month => "YYYY/MM",
					DatePart::Day => "YYYY/MM/DD",
					DatePart::OnlyMonth => "MM",
					DatePart::OnlyDay => "DD",
					DatePart::DayOfWeek => {
						let dow = Expr::function("date_part", vec![Expr::constant("dow"), expr]);
						return Expr::cast(Expr::cast(dow, "INTEGER"), "TEXT");
					}
				};
				Expr::function("to_char", vec![expr, Expr::constant(format)])
			}
		}
	}

	/// Declared semantic types of attribute operands must fit the argument
	/// group they are passed in.
	fn check_semantic_types(&self, operation: Operation, operands: &[Operand], step: Option<String>) -> Result<()> {
		let checked = (operation.is_boolean() && !operation.is_connective())
			|| operation.is_arithmetic()
			|| operation.is_analysis();
		if !checked {
			return Ok(());
		}

		let descriptor = operation.descriptor();
		let groups = descriptor.assign_groups(operands.len());
		for (operand, group) in operands.iter().zip(groups) {
			let Some(FieldHandle::Literal {
				entity,
				attribute,
			}) = operand.as_field()
			else {
				continue;
			};
			let allowed = descriptor.arg_groups[group].types;
			if allowed.contains(&SemanticType::Attribute) {
				continue;
			}

			let Some(declared) = self.declared_types(entity, attribute)? else {
				continue;
			};
			if !declared.iter().any(|t| allowed.contains(t)) {
				return Err(SqrError::SemanticTypeMismatch {
					step,
					operation: operation.name().to_string(),
					operand: format!("{}//{}", entity, attribute),
					expected: join_types(allowed),
					found: join_types(&declared),
				}
				.into());
			}
		}
		Ok(())
	}

	/// Types declared for an attribute, or `None` when it declares none or is
	/// read through a date part.
	fn declared_types(&self, entity: &str, attribute: &str) -> Result<Option<Vec<SemanticType>>> {
		let (base, part) = split_date_part(attribute);
		if part.is_some() {
			return Ok(None);
		}
		if self.schema.get_entity(entity)?.is_identifier(base) {
			return Ok(Some(vec![SemanticType::Identifier]));
		}
		let declared: Vec<SemanticType> = self
			.schema
			.get_attribute(entity, base)?
			.semantic_types
			.iter()
			.copied()
			.filter(|t| *t != SemanticType::Attribute)
			.collect();
		Ok(if declared.is_empty() {
			None
		} else {
			Some(declared)
		})
	}
}

fn identifier(entity: &Entity) -> Result<&str> {
	match entity.identifiers.first() {
		Some(column) => Ok(column.as_str()),
		None => internal_err!("entity {} has no identifier column", entity.name),
	}
}

fn join_types(types: &[SemanticType]) -> String {
	types.iter().map(|t| t.to_string()).collect::<Vec<_>>().join(", ")
}
