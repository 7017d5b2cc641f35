//! Finite-state stepper that gathers and validates input to produce a config.

use crate::config::{validate, Config, PageConfig, ValidationError};
use crate::schema::{map_columns, ColumnInfo, FieldDescriptor};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WizardStep {
    Basics,
    Fields,
    Page,
    Confirm,
    Complete,
}

#[derive(Error, Clone, Debug)]
pub enum WizardError {
    #[error("step is {actual:?}, operation requires {expected:?}")]
    StepMismatch {
        expected: WizardStep,
        actual: WizardStep,
    },
    #[error("table schema produced no fields")]
    EmptySchema,
    #[error("input failed validation with {} error(s)", .0.len())]
    Invalid(Vec<ValidationError>),
}

#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BasicsInput {
    pub module_name: String,
    pub table_name: String,
    pub datasource_id: String,
    pub author: String,
}

/// One in-flight wizard run. Advances `Basics -> Fields -> Page -> Confirm ->
/// Complete`; each step validates only the input it owns, and `finish` runs
/// the full config validation.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WizardSession {
    pub id: Uuid,
    step: WizardStep,
    module_name: String,
    table_name: String,
    datasource_id: String,
    author: String,
    fields: Vec<FieldDescriptor>,
    page: PageConfig,
}

impl WizardSession {
    pub fn new() -> Self {
        WizardSession {
            id: Uuid::new_v4(),
            step: WizardStep::Basics,
            module_name: String::new(),
            table_name: String::new(),
            datasource_id: String::new(),
            author: String::new(),
            fields: Vec::new(),
            page: PageConfig::default(),
        }
    }

    pub fn step(&self) -> WizardStep {
        self.step
    }

    pub fn table_ref(&self) -> (&str, &str) {
        (&self.datasource_id, &self.table_name)
    }

    /// Set module identity and advance to field selection. A probe config
    /// checks only the rules this step owns (name present and slug-safe).
    pub fn apply_basics(&mut self, input: BasicsInput) -> Result<(), WizardError> {
        self.require_step(WizardStep::Basics)?;
        let probe = {
            let mut c = Config::new(&input.module_name, &input.table_name, &input.datasource_id, &input.author);
            c.fields = crate::config::build_default("probe", "probe").fields;
            c
        };
        let errors = validate(&probe);
        if !errors.is_empty() {
            return Err(WizardError::Invalid(errors));
        }
        self.module_name = input.module_name;
        self.table_name = input.table_name;
        self.datasource_id = input.datasource_id;
        self.author = input.author;
        self.step = WizardStep::Fields;
        Ok(())
    }

    /// Run the schema mapper over introspected columns and replace the field
    /// set. Re-import overwrites any manual edits. An empty column list is a
    /// hard precondition failure for generation.
    pub fn import_columns(&mut self, columns: &[ColumnInfo]) -> Result<usize, WizardError> {
        self.require_step(WizardStep::Fields)?;
        let fields = map_columns(columns);
        if fields.is_empty() {
            return Err(WizardError::EmptySchema);
        }
        let count = fields.len();
        self.fields = fields;
        Ok(count)
    }

    /// Replace the field set wholesale (manual entry or per-field edits from
    /// the UI).
    pub fn set_fields(&mut self, fields: Vec<FieldDescriptor>) -> Result<(), WizardError> {
        self.require_step(WizardStep::Fields)?;
        self.fields = fields;
        Ok(())
    }

    /// Leave field selection; requires a non-empty field set.
    pub fn confirm_fields(&mut self) -> Result<(), WizardError> {
        self.require_step(WizardStep::Fields)?;
        if self.fields.is_empty() {
            return Err(WizardError::EmptySchema);
        }
        self.step = WizardStep::Page;
        Ok(())
    }

    pub fn set_page(&mut self, page: PageConfig) -> Result<(), WizardError> {
        self.require_step(WizardStep::Page)?;
        self.page = page;
        self.step = WizardStep::Confirm;
        Ok(())
    }

    /// Step back one screen. Completed sessions cannot be reopened.
    pub fn back(&mut self) -> Result<(), WizardError> {
        self.step = match self.step {
            WizardStep::Basics => WizardStep::Basics,
            WizardStep::Fields => WizardStep::Basics,
            WizardStep::Page => WizardStep::Fields,
            WizardStep::Confirm => WizardStep::Page,
            WizardStep::Complete => {
                return Err(WizardError::StepMismatch {
                    expected: WizardStep::Confirm,
                    actual: WizardStep::Complete,
                })
            }
        };
        Ok(())
    }

    /// Produce the config. Runs the full validation and rejects on any error;
    /// the session stays at `Confirm` so the user can fix input and retry.
    pub fn finish(&mut self) -> Result<Config, WizardError> {
        self.require_step(WizardStep::Confirm)?;
        let mut config = Config::new(
            &self.module_name,
            &self.table_name,
            &self.datasource_id,
            &self.author,
        );
        config.fields = self.fields.clone();
        config.page = self.page.clone();
        if config.page.list.title.is_empty() {
            config.page.list.title = self.module_name.clone();
        }
        let errors = validate(&config);
        if !errors.is_empty() {
            return Err(WizardError::Invalid(errors));
        }
        self.step = WizardStep::Complete;
        Ok(config)
    }

    fn require_step(&self, expected: WizardStep) -> Result<(), WizardError> {
        if self.step != expected {
            return Err(WizardError::StepMismatch {
                expected,
                actual: self.step,
            });
        }
        Ok(())
    }
}

impl Default for WizardSession {
    fn default() -> Self {
        Self::new()
    }
}
