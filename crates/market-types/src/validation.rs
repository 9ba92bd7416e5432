//! Validation helpers.
//!
//! Two kinds of validation live here. Form payloads derive
//! `validator::Validate` and share the [`non_blank`] rule, which rejects
//! input that is empty once whitespace is trimmed; a payload failing it is
//! never sent. Backend implementation tables in the TOML configuration are
//! checked against a [`Schema`] before the backend is built.

use std::borrow::Cow;
use thiserror::Error;

/// Rejects strings that are empty after trimming.
pub fn non_blank(value: &str) -> Result<(), validator::ValidationError> {
	if value.trim().is_empty() {
		let mut error = validator::ValidationError::new("non_blank");
		error.message = Some(Cow::Borrowed("This field cannot be empty."));
		return Err(error);
	}
	Ok(())
}

/// Collects the messages of a failed `validator` run into one line,
/// field by field in name order.
pub fn flatten_validation_errors(errors: &validator::ValidationErrors) -> String {
	let mut fields: Vec<_> = errors.field_errors().into_iter().collect();
	fields.sort_by(|a, b| a.0.cmp(&b.0));

	fields
		.into_iter()
		.flat_map(|(field, errs)| {
			errs.iter().map(move |e| match &e.message {
				Some(message) => message.to_string(),
				None => format!("Invalid value for {}.", field),
			})
		})
		.collect::<Vec<_>>()
		.join(" ")
}

/// Errors that can occur while validating a configuration table.
#[derive(Debug, Error)]
pub enum ValidationError {
	#[error("Missing required field: {0}")]
	MissingField(String),
	#[error("Invalid value for field '{field}': {message}")]
	InvalidValue { field: String, message: String },
	#[error("Type mismatch for field '{field}': expected {expected}, got {actual}")]
	TypeMismatch {
		field: String,
		expected: String,
		actual: String,
	},
}

/// Expected type of a configuration field.
#[derive(Debug)]
pub enum FieldType {
	String,
	/// Integer with optional inclusive bounds.
	Integer {
		min: Option<i64>,
		max: Option<i64>,
	},
	Boolean,
}

/// Custom check run after the type check passes.
pub type FieldValidator = Box<dyn Fn(&toml::Value) -> Result<(), String> + Send + Sync>;

/// A named, typed configuration field.
pub struct Field {
	pub name: String,
	pub field_type: FieldType,
	pub validator: Option<FieldValidator>,
}

impl std::fmt::Debug for Field {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("Field")
			.field("name", &self.name)
			.field("field_type", &self.field_type)
			.field("validator", &self.validator.is_some())
			.finish()
	}
}

impl Field {
	pub fn new(name: impl Into<String>, field_type: FieldType) -> Self {
		Self {
			name: name.into(),
			field_type,
			validator: None,
		}
	}

	/// Adds a custom check to this field.
	pub fn with_validator<F>(mut self, validator: F) -> Self
	where
		F: Fn(&toml::Value) -> Result<(), String> + Send + Sync + 'static,
	{
		self.validator = Some(Box::new(validator));
		self
	}
}

/// Required and optional fields of a configuration table.
#[derive(Debug)]
pub struct Schema {
	pub required: Vec<Field>,
	pub optional: Vec<Field>,
}

impl Schema {
	pub fn new(required: Vec<Field>, optional: Vec<Field>) -> Self {
		Self { required, optional }
	}

	/// Validates a TOML table: required fields must be present, and every
	/// present field must have the declared type and pass its validator.
	pub fn validate(&self, config: &toml::Value) -> Result<(), ValidationError> {
		let table = config
			.as_table()
			.ok_or_else(|| ValidationError::TypeMismatch {
				field: "root".to_string(),
				expected: "table".to_string(),
				actual: config.type_str().to_string(),
			})?;

		for field in &self.required {
			let value = table
				.get(&field.name)
				.ok_or_else(|| ValidationError::MissingField(field.name.clone()))?;
			check_field(field, value)?;
		}

		for field in &self.optional {
			if let Some(value) = table.get(&field.name) {
				check_field(field, value)?;
			}
		}

		Ok(())
	}
}

fn check_field(field: &Field, value: &toml::Value) -> Result<(), ValidationError> {
	let mismatch = |expected: &str| ValidationError::TypeMismatch {
		field: field.name.clone(),
		expected: expected.to_string(),
		actual: value.type_str().to_string(),
	};

	match &field.field_type {
		FieldType::String => {
			if !value.is_str() {
				return Err(mismatch("string"));
			}
		},
		FieldType::Integer { min, max } => {
			let int_val = value.as_integer().ok_or_else(|| mismatch("integer"))?;
			if min.is_some_and(|min| int_val < min) || max.is_some_and(|max| int_val > max) {
				return Err(ValidationError::InvalidValue {
					field: field.name.clone(),
					message: format!(
						"Value {} is outside the range {}..={}",
						int_val,
						min.map_or("".to_string(), |m| m.to_string()),
						max.map_or("".to_string(), |m| m.to_string())
					),
				});
			}
		},
		FieldType::Boolean => {
			if !value.is_bool() {
				return Err(mismatch("boolean"));
			}
		},
	}

	if let Some(validator) = &field.validator {
		validator(value).map_err(|message| ValidationError::InvalidValue {
			field: field.name.clone(),
			message,
		})?;
	}

	Ok(())
}

/// A configuration schema owned by a backend implementation.
pub trait ConfigSchema: Send + Sync {
	fn validate(&self, config: &toml::Value) -> Result<(), ValidationError>;
}
