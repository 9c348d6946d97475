//! Message layouts and conditional records

use std::collections::{BTreeMap, BTreeSet};

use crate::error::{CodecError, CodecResult, DefinitionError, DefinitionResult};
use crate::record::DataRecord;

/// Ordered sequence of layout elements describing one message
pub type Layout = Vec<LayoutElement>;

/// Element of a message layout
#[derive(Debug, Clone, PartialEq)]
pub enum LayoutElement {
    Record(DataRecord),
    Conditional(ConditionalRecord),
}

impl LayoutElement {
    pub fn name(&self) -> &str {
        match self {
            LayoutElement::Record(record) => record.name(),
            LayoutElement::Conditional(conditional) => conditional.name(),
        }
    }
}

impl From<DataRecord> for LayoutElement {
    fn from(record: DataRecord) -> Self {
        LayoutElement::Record(record)
    }
}

impl From<ConditionalRecord> for LayoutElement {
    fn from(conditional: ConditionalRecord) -> Self {
        LayoutElement::Conditional(conditional)
    }
}

/// Selects a sub-layout from the raw value of the record decoded just before it
///
/// Unmapped trigger values fall back to the default layout, which is empty
/// unless set. A conditional marked [`required`](Self::required) instead
/// rejects unmapped triggers.
#[derive(Debug, Clone, PartialEq)]
pub struct ConditionalRecord {
    name: String,
    mapping: BTreeMap<u64, Layout>,
    default: Layout,
    required: bool,
}

impl ConditionalRecord {
    pub fn new(name: impl Into<String>, mapping: impl IntoIterator<Item = (u64, Layout)>) -> Self {
        Self {
            name: name.into(),
            mapping: mapping.into_iter().collect(),
            default: Vec::new(),
            required: false,
        }
    }

    /// Treat triggers without a branch as malformed instead of using the default
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn with_default(mut self, default: Layout) -> Self {
        self.default = default;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Layout for a trigger value
    pub fn resolve(&self, trigger: u64) -> &Layout {
        self.mapping.get(&trigger).unwrap_or(&self.default)
    }

    /// Whether the trigger value has an explicit branch
    pub fn is_mapped(&self, trigger: u64) -> bool {
        self.mapping.contains_key(&trigger)
    }

    /// Layout the translator splices in for a trigger value
    pub(crate) fn branch(&self, trigger: u64) -> CodecResult<&Layout> {
        if self.required && !self.is_mapped(trigger) {
            return Err(CodecError::MappingMiss {
                record: self.name.clone(),
                value: format!("0x{:X}", trigger),
            });
        }
        Ok(self.resolve(trigger))
    }
}

/// Check a layout for structural mistakes
///
/// `names` holds the record names already used on the path leading here, and
/// `has_trigger` tells whether the element just before the layout is a
/// single-occurrence record.
pub fn validate_layout(
    layout: &[LayoutElement],
    names: &BTreeSet<String>,
    has_trigger: bool,
) -> DefinitionResult<()> {
    let mut names = names.clone();
    let mut has_trigger = has_trigger;

    for (index, element) in layout.iter().enumerate() {
        let is_last = index + 1 == layout.len();
        match element {
            LayoutElement::Record(record) => {
                record.validate()?;
                if !names.insert(record.name().to_string()) {
                    return Err(DefinitionError::DuplicateName(record.name().to_string()));
                }
                if !record.has_fixed_count() && !is_last {
                    return Err(DefinitionError::VariableRecordNotLast {
                        record: record.name().to_string(),
                    });
                }
                has_trigger = !record.is_reoccurring();
            }
            LayoutElement::Conditional(conditional) => {
                if !has_trigger {
                    return Err(DefinitionError::MissingTrigger(conditional.name.clone()));
                }
                let rest = &layout[index + 1..];
                for branch in conditional
                    .mapping
                    .values()
                    .chain(std::iter::once(&conditional.default))
                {
                    // The branch is spliced in place of the conditional, so it
                    // is checked together with whatever follows it.
                    let mut spliced: Layout = branch.clone();
                    spliced.extend(rest.iter().cloned());
                    validate_layout(&spliced, &names, true)?;
                }
                return Ok(());
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::Mapping;

    fn names() -> BTreeSet<String> {
        BTreeSet::new()
    }

    #[test]
    fn test_resolve_falls_back_to_default() {
        let conditional = ConditionalRecord::new(
            "powerDownTime",
            [(0x04, vec![DataRecord::raw("powerDownTime", 8).into()])],
        );
        assert_eq!(conditional.resolve(0x04).len(), 1);
        assert!(conditional.resolve(0x01).is_empty());
        assert!(conditional.is_mapped(0x04));

        let with_default = conditional
            .with_default(vec![DataRecord::raw("data", 8).with_occurrences(0, 0).into()]);
        assert_eq!(with_default.resolve(0x01)[0].name(), "data");
        assert_eq!(with_default.branch(0x01).unwrap()[0].name(), "data");
    }

    #[test]
    fn test_required_conditional_rejects_unmapped_trigger() {
        let conditional = ConditionalRecord::new(
            "maxNumberOfBlockLength",
            [(0x20, vec![DataRecord::raw("maxNumberOfBlockLength", 16).into()])],
        )
        .required();
        assert_eq!(conditional.branch(0x20).unwrap().len(), 1);
        assert!(matches!(
            conditional.branch(0x00),
            Err(CodecError::MappingMiss { record, value })
                if record == "maxNumberOfBlockLength" && value == "0x0"
        ));
    }

    #[test]
    fn test_conditional_needs_trigger() {
        let layout: Layout = vec![ConditionalRecord::new("orphan", []).into()];
        assert!(matches!(
            validate_layout(&layout, &names(), false),
            Err(DefinitionError::MissingTrigger(name)) if name == "orphan"
        ));

        let after_sequence: Layout = vec![
            DataRecord::raw("bytes", 8).with_occurrences(2, 2).into(),
            ConditionalRecord::new("orphan", []).into(),
        ];
        assert!(validate_layout(&after_sequence, &names(), false).is_err());
    }

    #[test]
    fn test_duplicate_names_across_branches() {
        let layout: Layout = vec![
            DataRecord::mapped(
                "resetType",
                8,
                Mapping::strict([(4, "enableRapidPowerShutDown")]),
            )
            .into(),
            ConditionalRecord::new(
                "powerDownTime",
                [(4, vec![DataRecord::raw("resetType", 8).into()])],
            )
            .into(),
        ];
        assert!(matches!(
            validate_layout(&layout, &names(), false),
            Err(DefinitionError::DuplicateName(_))
        ));
    }

    #[test]
    fn test_variable_record_must_be_last() {
        let layout: Layout = vec![
            DataRecord::raw("data", 8).with_occurrences(0, 0).into(),
            DataRecord::raw("crc", 16).into(),
        ];
        assert!(matches!(
            validate_layout(&layout, &names(), false),
            Err(DefinitionError::VariableRecordNotLast { .. })
        ));
    }

    #[test]
    fn test_valid_nested_layout() {
        let layout: Layout = vec![
            DataRecord::raw("selector", 8).into(),
            ConditionalRecord::new(
                "branch",
                [
                    (1, vec![DataRecord::raw("a", 8).into()]),
                    (2, vec![DataRecord::raw("b", 16).into()]),
                ],
            )
            .into(),
        ];
        assert!(validate_layout(&layout, &names(), false).is_ok());
        assert!(validate_layout(&layout, &names(), false).is_ok());
    }
}
