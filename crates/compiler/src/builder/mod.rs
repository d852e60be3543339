// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

//! Builds the dialect independent arguments of every subplan: which columns
//! it evaluates and returns, how it filters, groups, orders and limits, and
//! which sources it reads.

use std::collections::HashMap;

use indexmap::IndexMap;
use sqr_type::{Result, internal_err};
use tracing::{debug, instrument};

use crate::{
	error::SqrError,
	field::{FieldHandle, Operand, SortDirection},
	ontology::{Category, Operation},
	plan::{Argument, Plan, Step, StepRef, Subplan, SubplanId},
};

mod arguments;

pub use arguments::{SortKey, Source, SubplanArguments};

pub struct QueryBuilder<'a> {
	plan: &'a Plan,
	handles: HashMap<StepRef, FieldHandle>,
	entities: HashMap<StepRef, String>,
	sorts: HashMap<StepRef, Vec<(FieldHandle, SortDirection)>>,
	limits: HashMap<StepRef, u64>,
	built: IndexMap<SubplanId, SubplanArguments>,
}

impl<'a> QueryBuilder<'a> {
	pub fn new(plan: &'a Plan) -> Self {
		Self {
			plan,
			handles: HashMap::new(),
			entities: HashMap::new(),
			sorts: HashMap::new(),
			limits: HashMap::new(),
			built: IndexMap::new(),
		}
	}

	/// One set of arguments per subplan, innermost first.
	#[instrument(name = "builder::build", level = "debug", skip_all)]
	pub fn build(mut self) -> Result<Vec<SubplanArguments>> {
		let plan = self.plan;
		for subplan in plan.subplans().values() {
			let arguments = self.build_subplan(subplan)?;
			debug!(
				subplan = %subplan.id,
				select = ?arguments.select,
				group_by = ?arguments.group_by,
				sources = arguments.sources.len(),
				"built subplan arguments"
			);
			self.built.insert(subplan.id, arguments);
		}
		Ok(self.built.into_values().collect())
	}

	fn build_subplan(&mut self, subplan: &Subplan) -> Result<SubplanArguments> {
		let plan = self.plan;
		let mut arguments = SubplanArguments::new(subplan.id);

		for reference in plan.topological_order().iter().filter(|r| subplan.contains(r)) {
			let Some(step) = plan.step(reference) else {
				return internal_err!("step {} is missing from the plan", reference);
			};

			match step.operation.category() {
				Category::Retrieval => match step.operation {
					Operation::RetrieveEntity => {
						let entity = step.args[0].text().to_string();
						arguments.add_source(Source::Entity(entity.clone()));
						self.entities.insert(reference.clone(), entity);
					}
					_ => {
						let handle = self.retrieve_attribute(subplan, step, &mut arguments)?;
						self.handles.insert(reference.clone(), handle);
					}
				},
				Category::Boolean | Category::Arithmetic => {
					let operands = self.operands(step, |_| true)?;
					self.insert_expression(step, FieldHandle::expression(step.operation, operands), &mut arguments);
				}
				Category::Analysis => {
					let operands = self.operands(step, |target| {
						plan.step(target).is_none_or(|s| !s.operation.is_aggregation())
					})?;
					self.insert_expression(step, FieldHandle::expression(step.operation, operands), &mut arguments);
				}
				Category::Aggregation => {
					for target in step.reference_args() {
						let handle = self.handle(step, target)?.clone();
						let column = arguments.add_field(handle);
						arguments.add_group_by(column);
					}
				}
				Category::RowNum => {
					let operands = self
						.sort_pairs(step, &step.args[0])?
						.iter()
						.flat_map(|(handle, direction)| {
							[Operand::Field(handle.clone()), Operand::Direction(*direction)]
						})
						.collect();
					self.insert_expression(step, FieldHandle::expression(Operation::RowNum, operands), &mut arguments);
				}
				Category::Sort => {
					let mut pairs = Vec::with_capacity(step.args.len() / 2);
					for pair in step.args.chunks(2) {
						let [key, direction] = pair else {
							return internal_err!("sort step {} has an unpaired key", reference);
						};
						let Some(target) = key.as_reference() else {
							return internal_err!("sort key of {} is not a reference", reference);
						};
						let handle = self.handle(step, target)?.clone();
						let direction = direction.text().parse::<SortDirection>().unwrap_or(SortDirection::Asc);
						pairs.push((handle, direction));
					}
					self.sorts.insert(reference.clone(), pairs);
				}
				Category::Limit => {
					let Ok(limit) = step.args[0].text().parse::<u64>() else {
						return internal_err!("limit step {} is not a non-negative integer", reference);
					};
					self.limits.insert(reference.clone(), limit);
				}
				Category::Collect => {}
				Category::Return => {
					if *reference == subplan.root {
						self.build_return(step, &mut arguments)?;
					}
				}
			}
		}

		Ok(arguments)
	}

	fn insert_expression(&mut self, step: &Step, handle: FieldHandle, arguments: &mut SubplanArguments) {
		arguments.origins.entry(handle.clone()).or_insert_with(|| step.reference.clone());
		self.handles.insert(step.reference.clone(), handle);
	}

	fn retrieve_attribute(
		&self,
		subplan: &Subplan,
		step: &Step,
		arguments: &mut SubplanArguments,
	) -> Result<FieldHandle> {
		let Some(target) = step.args[0].as_reference() else {
			return internal_err!("retrieve_attribute {} does not read a step", step.reference);
		};

		if subplan.contains(target) {
			let Some(entity) = self.entities.get(target) else {
				return Err(SqrError::NotAnEntity {
					step: step.reference.to_string(),
					reference: target.to_string(),
				}
				.into());
			};
			return Ok(FieldHandle::literal(entity.clone(), step.args[1].text()));
		}

		let parent = match self.plan.subplans_containing(target, subplan.id).as_slice() {
			[] => {
				return Err(SqrError::MissingParentSubplan {
					step: step.reference.to_string(),
					reference: target.to_string(),
				}
				.into());
			}
			[parent] => *parent,
			many => {
				return Err(SqrError::AmbiguousParentSubplan {
					step: step.reference.to_string(),
					reference: target.to_string(),
					candidates: many.iter().map(|s| s.id.to_string()).collect(),
				}
				.into());
			}
		};

		if parent.root != *target {
			return Err(SqrError::NotAReturn {
				step: step.reference.to_string(),
				reference: target.to_string(),
			}
			.into());
		}

		let Some(parent_arguments) = self.built.get(&parent.id) else {
			return internal_err!("{} is read before it is built", parent.id);
		};

		let column = match &step.args[1] {
			Argument::Reference(attribute) if parent.contains(attribute) => {
				match self.handles.get(attribute) {
					Some(handle) => handle.column_name(),
					None => {
						return Err(SqrError::UnresolvedField {
							step: step.reference.to_string(),
							operation: step.operation.name().to_string(),
							reference: attribute.to_string(),
						}
						.into());
					}
				}
			}
			Argument::Reference(attribute) => {
				return Err(SqrError::UnresolvedField {
					step: step.reference.to_string(),
					operation: step.operation.name().to_string(),
					reference: attribute.to_string(),
				}
				.into());
			}
			Argument::Literal(literal) => exposed_column(step, parent_arguments, literal.text())?,
		};

		let origin = match parent_arguments.fields.get(&column) {
			Some(origin) if parent_arguments.is_exposed(&column) => origin.clone(),
			_ => {
				return Err(SqrError::ColumnNotExposed {
					step: Some(step.reference.to_string()),
					subplan: parent.id.to_string(),
					column,
				}
				.into());
			}
		};

		arguments.add_source(Source::Subplan(parent.id));
		Ok(FieldHandle::CrossSubplanRef {
			subplan: parent.id,
			column,
			origin: Box::new(origin),
		})
	}

	fn build_return(&self, step: &Step, arguments: &mut SubplanArguments) -> Result<()> {
		let mut args = step.reference_args();
		let Some(collect) = args.next().and_then(|r| self.plan.step(r)) else {
			return internal_err!("return {} does not read a collect step", step.reference);
		};

		for target in collect.reference_args() {
			let handle = self.handle(collect, target)?.clone();
			let column = arguments.add_field(handle);
			arguments.add_select(column);
		}

		for target in args {
			let Some(clause) = self.plan.step(target) else {
				return internal_err!("return {} reads missing step {}", step.reference, target);
			};

			match clause.operation.category() {
				Category::Boolean => {
					let predicate = self.handle(step, target)?.clone();
					let (slot, name) = if predicate.contains_aggregate() {
						(&mut arguments.having, "having")
					} else {
						(&mut arguments.filter, "filter")
					};
					if slot.is_some() {
						return Err(SqrError::DuplicateReturnClause {
							step: step.reference.to_string(),
							clause: name.to_string(),
						}
						.into());
					}
					*slot = Some(predicate);
				}
				Category::Sort => {
					for (handle, direction) in self.sorts.get(target).into_iter().flatten() {
						let column = arguments.add_field(handle.clone());
						arguments.sort.push(SortKey {
							column,
							direction: *direction,
						});
					}
				}
				Category::Limit => {
					arguments.limit = self.limits.get(target).copied();
				}
				category => {
					return Err(SqrError::UnsupportedReturnArgument {
						step: step.reference.to_string(),
						argument: target.to_string(),
						category: category.to_string(),
					}
					.into());
				}
			}
		}

		Ok(())
	}

	fn handle(&self, step: &Step, target: &StepRef) -> Result<&FieldHandle> {
		self.handles.get(target).ok_or_else(|| {
			SqrError::UnresolvedField {
				step: step.reference.to_string(),
				operation: step.operation.name().to_string(),
				reference: target.to_string(),
			}
			.into()
		})
	}

	fn operands(&self, step: &Step, include: impl Fn(&StepRef) -> bool) -> Result<Vec<Operand>> {
		let mut operands = Vec::with_capacity(step.args.len());
		for arg in &step.args {
			match arg {
				Argument::Reference(target) if include(target) => {
					operands.push(Operand::Field(self.handle(step, target)?.clone()));
				}
				Argument::Reference(_) => {}
				Argument::Literal(literal) => operands.push(Operand::Value(literal.clone())),
			}
		}
		Ok(operands)
	}

	fn sort_pairs(&self, step: &Step, arg: &Argument) -> Result<&[(FieldHandle, SortDirection)]> {
		let Some(target) = arg.as_reference() else {
			return internal_err!("{} does not read a sort step", step.reference);
		};
		match self.sorts.get(target) {
			Some(pairs) => Ok(pairs),
			None => Err(SqrError::UnresolvedField {
				step: step.reference.to_string(),
				operation: step.operation.name().to_string(),
				reference: target.to_string(),
			}
			.into()),
		}
	}
}

/// Finds the parent column a literal names, either in full or by the part
/// after its last `//`.
fn exposed_column(step: &Step, parent: &SubplanArguments, name: &str) -> Result<String> {
	if parent.fields.contains_key(name) {
		return Ok(name.to_string());
	}

	let suffix = format!("//{}", name);
	let candidates: Vec<&String> = parent.select.iter().filter(|c| c.ends_with(&suffix)).collect();
	match candidates.as_slice() {
		[] => Ok(name.to_string()),
		[column] => Ok((*column).clone()),
		many => Err(SqrError::AmbiguousColumn {
			step: step.reference.to_string(),
			subplan: parent.id.to_string(),
			column: name.to_string(),
			candidates: many.iter().map(|c| c.to_string()).collect(),
		}
		.into()),
	}
}

#[cfg(test)]
mod tests {
	use sqr_type::ErrorKind;

	use super::*;
	use crate::parse::parse;

	fn build(raw: &[(&str, &str)]) -> Result<Vec<SubplanArguments>> {
		let plan = parse(&raw.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect())?;
		QueryBuilder::new(&plan).build()
	}

	const SALARY_BY_DEPARTMENT: &[(&str, &str)] = &[
		("|1|", "(retrieve_entity Employee)"),
		("|2|", "(retrieve_attribute |1| salary)"),
		("|3|", "(retrieve_attribute |1| department)"),
		("|4|", "(groupby |3|)"),
		("|5|", "(average |2| |4|)"),
		("|6|", "(collect |3| |5|)"),
		("|7|", "(return |6|)"),
		("|8|", "(retrieve_attribute |7| |5|)"),
		("|9|", "(retrieve_attribute |7| |3|)"),
		("|10|", "(sort |8| desc)"),
		("|11|", "(limit 5)"),
		("|12|", "(collect |9| |8|)"),
		("|13|", "(return |12| |10| |11|)"),
	];

	#[test]
	fn test_single_subplan_selects_literal() {
		let args = build(&[
			("|1|", "(retrieve_entity Person)"),
			("|2|", "(retrieve_attribute |1| age)"),
			("|3|", "(collect |2|)"),
			("|4|", "(return |3|)"),
		])
		.unwrap();
		assert_eq!(args.len(), 1);
		assert_eq!(args[0].select, vec!["Person//age"]);
		assert_eq!(args[0].sources, vec![Source::Entity("Person".to_string())]);
		assert!(args[0].group_by.is_empty());
	}

	#[test]
	fn test_nested_aggregate_reads_inner_columns() {
		let args = build(SALARY_BY_DEPARTMENT).unwrap();
		assert_eq!(args.len(), 2);

		let inner = &args[0];
		assert_eq!(inner.select, vec!["Employee//department", "average(Employee//salary)"]);
		assert_eq!(inner.group_by, vec!["Employee//department"]);

		let outer = &args[1];
		assert_eq!(outer.select, vec![
			"alias_0//Employee//department",
			"alias_0//average(Employee//salary)"
		]);
		assert!(outer.group_by.is_empty());
		assert_eq!(outer.sort, vec![SortKey {
			column: "alias_0//average(Employee//salary)".to_string(),
			direction: SortDirection::Desc,
		}]);
		assert_eq!(outer.limit, Some(5));
		assert_eq!(outer.sources, vec![Source::Subplan(SubplanId(0))]);
	}

	#[test]
	fn test_predicate_on_aggregate_becomes_having() {
		let args = build(&[
			("|1|", "(retrieve_entity Employee)"),
			("|2|", "(retrieve_attribute |1| salary)"),
			("|3|", "(retrieve_attribute |1| department)"),
			("|4|", "(groupby |3|)"),
			("|5|", "(average |2| |4|)"),
			("|6|", "(greaterthan |5| 50000)"),
			("|7|", "(exact |3| \"Sales\")"),
			("|8|", "(collect |3| |5|)"),
			("|9|", "(return |8| |6| |7|)"),
		])
		.unwrap();
		assert!(args[0].having.as_ref().is_some_and(|h| h.contains_aggregate()));
		assert_eq!(
			args[0].filter.as_ref().map(FieldHandle::column_name).as_deref(),
			Some("exact(Employee//department,Sales)")
		);
	}

	#[test]
	fn test_inner_aggregate_is_plain_filter_outside() {
		let mut raw = SALARY_BY_DEPARTMENT[..9].to_vec();
		raw.extend([
			("|10|", "(greaterthan |8| 50000)"),
			("|11|", "(collect |9| |8|)"),
			("|12|", "(return |11| |10|)"),
		]);
		let args = build(&raw).unwrap();
		assert!(args[1].having.is_none());
		assert!(args[1].filter.is_some());
	}

	#[test]
	fn test_two_filters_are_rejected() {
		let err = build(&[
			("|1|", "(retrieve_entity Person)"),
			("|2|", "(retrieve_attribute |1| age)"),
			("|3|", "(greaterthan |2| 18)"),
			("|4|", "(lessthan |2| 65)"),
			("|5|", "(collect |2|)"),
			("|6|", "(return |5| |3| |4|)"),
		])
		.unwrap_err();
		assert_eq!(err.code(), "ONTOLOGY_006");
	}

	#[test]
	fn test_return_rejects_arithmetic_clause() {
		let err = build(&[
			("|1|", "(retrieve_entity Person)"),
			("|2|", "(retrieve_attribute |1| age)"),
			("|3|", "(add |2| 1)"),
			("|4|", "(collect |2|)"),
			("|5|", "(return |4| |3|)"),
		])
		.unwrap_err();
		assert_eq!(err.kind(), ErrorKind::Ontology);
		assert_eq!(err.code(), "ONTOLOGY_005");
	}

	#[test]
	fn test_unexposed_column_is_rejected() {
		let err = build(&[
			("|1|", "(retrieve_entity Person)"),
			("|2|", "(retrieve_attribute |1| age)"),
			("|3|", "(collect |2|)"),
			("|4|", "(return |3|)"),
			("|5|", "(retrieve_attribute |4| height)"),
			("|6|", "(collect |5|)"),
			("|7|", "(return |6|)"),
		])
		.unwrap_err();
		assert_eq!(err.code(), "RESOLUTION_007");
	}

	#[test]
	fn test_parent_column_by_short_name() {
		let mut raw = SALARY_BY_DEPARTMENT[..7].to_vec();
		raw.extend([("|8|", "(retrieve_attribute |7| department)"), ("|9|", "(collect |8|)"), ("|10|", "(return |9|)")]);
		let args = build(&raw).unwrap();
		let Some(FieldHandle::CrossSubplanRef {
			column,
			..
		}) = args[1].fields.values().next()
		else {
			panic!("expected a cross subplan column");
		};
		assert_eq!(column, "Employee//department");
		assert_eq!(args[1].select, vec!["alias_0//Employee//department"]);
	}

	#[test]
	fn test_ambiguous_short_name_is_rejected() {
		let err = build(&[
			("|1|", "(retrieve_entity Employee)"),
			("|2|", "(retrieve_entity Company)"),
			("|3|", "(retrieve_attribute |1| name)"),
			("|4|", "(retrieve_attribute |2| name)"),
			("|5|", "(collect |3| |4|)"),
			("|6|", "(return |5|)"),
			("|7|", "(retrieve_attribute |6| name)"),
			("|8|", "(collect |7|)"),
			("|9|", "(return |8|)"),
		])
		.unwrap_err();
		assert_eq!(err.code(), "RESOLUTION_010");
		assert_eq!(err.step.as_deref(), Some("|7|"));
	}

	#[test]
	fn test_reading_inner_step_directly_shares_it() {
		let err = build(&[
			("|1|", "(retrieve_entity Person)"),
			("|2|", "(retrieve_attribute |1| age)"),
			("|3|", "(collect |2|)"),
			("|4|", "(return |3|)"),
			("|5|", "(retrieve_attribute |4| |2|)"),
			("|6|", "(retrieve_attribute |2| age)"),
			("|7|", "(collect |5| |6|)"),
			("|8|", "(return |7|)"),
		])
		.unwrap_err();
		assert_eq!(err.kind(), ErrorKind::Graph);
	}

	#[test]
	fn test_cross_subplan_reference_is_not_transitive() {
		let mut raw = SALARY_BY_DEPARTMENT[..7].to_vec();
		raw.extend([
			("|8|", "(retrieve_attribute |7| |5|)"),
			("|9|", "(collect |8|)"),
			("|10|", "(return |9|)"),
			("|11|", "(retrieve_attribute |10| |5|)"),
			("|12|", "(collect |11|)"),
			("|13|", "(return |12|)"),
		]);
		let err = build(&raw).unwrap_err();
		assert_eq!(err.kind(), ErrorKind::Resolution);
		assert_eq!(err.step.as_deref(), Some("|11|"));
	}

	#[test]
	fn test_rownum_uses_sort_pairs() {
		let args = build(&[
			("|1|", "(retrieve_entity Person)"),
			("|2|", "(retrieve_attribute |1| age)"),
			("|3|", "(sort |2| desc)"),
			("|4|", "(rownum |3|)"),
			("|5|", "(collect |2| |4|)"),
			("|6|", "(return |5|)"),
		])
		.unwrap();
		assert_eq!(args[0].select, vec!["Person//age", "rownum(Person//age,desc)"]);
	}
}
