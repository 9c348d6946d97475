//! Data record definitions
//!
//! A [`DataRecord`] is the atomic (or bit-grouped composite) unit of a
//! service layout. It knows its bit length, how often it may occur, and how
//! to turn one raw occurrence into a physical value and back.

use std::collections::{BTreeMap, BTreeSet};

use crate::decoded::DecodedDataRecord;
use crate::error::{CodecError, CodecResult, DefinitionError, DefinitionResult};
use crate::precision::round_for_factor;
use crate::types::{FieldValues, MissPolicy, PhysicalValue, RawValue};

/// Widest raw value a single record occurrence can carry
pub const MAX_RECORD_BITS: u32 = 64;

/// Raw integer ↔ label table of a mapped record
#[derive(Debug, Clone, PartialEq)]
pub struct Mapping {
    labels: BTreeMap<u64, String>,
    policy: MissPolicy,
}

impl Mapping {
    pub fn new<L: Into<String>>(
        labels: impl IntoIterator<Item = (u64, L)>,
        policy: MissPolicy,
    ) -> Self {
        Self {
            labels: labels.into_iter().map(|(raw, l)| (raw, l.into())).collect(),
            policy,
        }
    }

    /// Unmapped raw values fail to decode
    pub fn strict<L: Into<String>>(labels: impl IntoIterator<Item = (u64, L)>) -> Self {
        Self::new(labels, MissPolicy::Fail)
    }

    /// Unmapped raw values decode to the raw integer
    pub fn pass_through<L: Into<String>>(labels: impl IntoIterator<Item = (u64, L)>) -> Self {
        Self::new(labels, MissPolicy::PassThrough)
    }

    /// Unmapped raw values decode to `ERROR`
    pub fn error_label<L: Into<String>>(labels: impl IntoIterator<Item = (u64, L)>) -> Self {
        Self::new(labels, MissPolicy::ErrorLabel)
    }

    pub fn policy(&self) -> MissPolicy {
        self.policy
    }

    pub fn label(&self, raw: u64) -> Option<&str> {
        self.labels.get(&raw).map(String::as_str)
    }

    pub fn raw_for(&self, label: &str) -> Option<u64> {
        self.labels
            .iter()
            .find(|(_, l)| l.as_str() == label)
            .map(|(raw, _)| *raw)
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    fn decode(&self, record: &str, raw: u64) -> CodecResult<PhysicalValue> {
        if let Some(label) = self.labels.get(&raw) {
            return Ok(PhysicalValue::Label(label.clone()));
        }
        match self.policy {
            MissPolicy::Fail => Err(CodecError::MappingMiss {
                record: record.to_string(),
                value: format!("raw value 0x{:X}", raw),
            }),
            MissPolicy::PassThrough => Ok(PhysicalValue::Raw(raw)),
            MissPolicy::ErrorLabel => Ok(PhysicalValue::Error),
        }
    }
}

/// `physical = raw * factor + offset`
#[derive(Debug, Clone, PartialEq)]
pub struct LinearFormula {
    factor: f64,
    offset: f64,
    valid_raw: Option<(u64, u64)>,
}

impl LinearFormula {
    pub fn new(factor: f64, offset: f64) -> Self {
        Self {
            factor,
            offset,
            valid_raw: None,
        }
    }

    /// Raw values outside `min..=max` decode to `ERROR`
    pub fn with_valid_raw_range(mut self, min: u64, max: u64) -> Self {
        self.valid_raw = Some((min, max));
        self
    }

    pub fn factor(&self) -> f64 {
        self.factor
    }

    pub fn offset(&self) -> f64 {
        self.offset
    }

    fn is_valid(&self, raw: u64) -> bool {
        self.valid_raw
            .map_or(true, |(min, max)| (min..=max).contains(&raw))
    }

    fn decode(&self, raw: u64) -> PhysicalValue {
        if !self.is_valid(raw) {
            return PhysicalValue::Error;
        }
        let physical = raw as f64 * self.factor + self.offset;
        PhysicalValue::Float(round_for_factor(physical, self.factor, self.offset))
    }

    fn encode(&self, record: &str, physical: f64, max: u64) -> CodecResult<u64> {
        let out_of_range = || CodecError::ValueOutOfRange {
            record: record.to_string(),
            value: physical.to_string(),
            max,
        };
        if !physical.is_finite() {
            return Err(out_of_range());
        }
        let raw = ((physical - self.offset) / self.factor).round();
        if raw < 0.0 || raw > max as f64 {
            return Err(out_of_range());
        }
        let raw = raw as u64;
        if !self.is_valid(raw) {
            return Err(out_of_range());
        }
        Ok(raw)
    }
}

/// Variant-specific behaviour of a data record
#[derive(Debug, Clone, PartialEq)]
pub enum RecordKind {
    /// Physical value equals the raw value
    Raw,
    /// Raw value ↔ enumerated label
    Mapped(Mapping),
    /// Scaled value
    Linear(LinearFormula),
    /// One ASCII character per occurrence
    Text,
    /// Bit-grouped children, most significant child first
    Composite(Vec<DataRecord>),
}

/// Named field (or bit-grouped field group) of a diagnostic payload
#[derive(Debug, Clone, PartialEq)]
pub struct DataRecord {
    name: String,
    length: u32,
    unit: Option<String>,
    min_occurrences: usize,
    max_occurrences: Option<usize>,
    kind: RecordKind,
}

impl DataRecord {
    fn new(name: impl Into<String>, length: u32, kind: RecordKind) -> Self {
        Self {
            name: name.into(),
            length,
            unit: None,
            min_occurrences: 1,
            max_occurrences: Some(1),
            kind,
        }
    }

    pub fn raw(name: impl Into<String>, length: u32) -> Self {
        Self::new(name, length, RecordKind::Raw)
    }

    pub fn mapped(name: impl Into<String>, length: u32, mapping: Mapping) -> Self {
        Self::new(name, length, RecordKind::Mapped(mapping))
    }

    pub fn linear(name: impl Into<String>, length: u32, formula: LinearFormula) -> Self {
        Self::new(name, length, RecordKind::Linear(formula))
    }

    /// Single 8-bit ASCII character (reoccurring text records join into one string)
    pub fn text(name: impl Into<String>) -> Self {
        Self::new(name, 8, RecordKind::Text)
    }

    /// Bit-grouped record whose children must fill exactly `length` bits
    pub fn composite(name: impl Into<String>, length: u32, children: Vec<DataRecord>) -> Self {
        Self::new(name, length, RecordKind::Composite(children))
    }

    pub fn with_unit(mut self, unit: impl Into<String>) -> Self {
        self.unit = Some(unit.into());
        self
    }

    /// Set the occurrence bounds; a `max` of 0 means unbounded.
    pub fn with_occurrences(mut self, min: usize, max: usize) -> Self {
        self.min_occurrences = min;
        self.max_occurrences = if max == 0 { None } else { Some(max) };
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Bit length of one occurrence
    pub fn length(&self) -> u32 {
        self.length
    }

    pub fn unit(&self) -> Option<&str> {
        self.unit.as_deref()
    }

    pub fn kind(&self) -> &RecordKind {
        &self.kind
    }

    pub fn min_occurrences(&self) -> usize {
        self.min_occurrences
    }

    /// `None` when unbounded
    pub fn max_occurrences(&self) -> Option<usize> {
        self.max_occurrences
    }

    /// Whether the record decodes to a sequence rather than a single value
    pub fn is_reoccurring(&self) -> bool {
        self.max_occurrences != Some(1)
    }

    /// Whether the number of occurrences is known up front
    pub fn has_fixed_count(&self) -> bool {
        self.max_occurrences == Some(self.min_occurrences)
    }

    /// Child records (empty for atomic variants)
    pub fn children(&self) -> &[DataRecord] {
        match &self.kind {
            RecordKind::Composite(children) => children,
            _ => &[],
        }
    }

    /// Largest raw value one occurrence can hold
    pub fn max_raw(&self) -> u64 {
        bit_mask(self.length)
    }

    /// Decode one occurrence
    pub fn decode(&self, raw: u64) -> CodecResult<DecodedDataRecord> {
        let (physical, children) = self.decode_value(raw)?;
        Ok(DecodedDataRecord::new(
            self.name.clone(),
            self.length,
            RawValue::Single(raw),
            physical,
            self.unit.clone(),
            children,
        ))
    }

    /// Decode all occurrences of a reoccurring record
    pub fn decode_occurrences(&self, raws: Vec<u64>) -> CodecResult<DecodedDataRecord> {
        let physical = if matches!(self.kind, RecordKind::Text) {
            PhysicalValue::Text(raws.iter().map(|&r| char::from(r as u8)).collect())
        } else {
            PhysicalValue::Sequence(
                raws.iter()
                    .map(|&r| self.decode_value(r).map(|(physical, _)| physical))
                    .collect::<CodecResult<_>>()?,
            )
        };
        Ok(DecodedDataRecord::new(
            self.name.clone(),
            self.length,
            RawValue::Multiple(raws),
            physical,
            self.unit.clone(),
            Vec::new(),
        ))
    }

    fn decode_value(&self, raw: u64) -> CodecResult<(PhysicalValue, Vec<DecodedDataRecord>)> {
        match &self.kind {
            RecordKind::Raw => Ok((PhysicalValue::Raw(raw), Vec::new())),
            RecordKind::Mapped(mapping) => Ok((mapping.decode(&self.name, raw)?, Vec::new())),
            RecordKind::Linear(formula) => Ok((formula.decode(raw), Vec::new())),
            RecordKind::Text => Ok((
                PhysicalValue::Text(char::from(raw as u8).to_string()),
                Vec::new(),
            )),
            RecordKind::Composite(children) => {
                let mut remaining = self.length;
                let mut group = FieldValues::new();
                let mut decoded = Vec::with_capacity(children.len());
                for child in children {
                    remaining = remaining.saturating_sub(child.length);
                    let child_raw = shift_right(raw, remaining) & bit_mask(child.length);
                    let record = child.decode(child_raw)?;
                    group.insert(child.name.clone(), record.physical_value().clone());
                    decoded.push(record);
                }
                Ok((PhysicalValue::Group(group), decoded))
            }
        }
    }

    /// Encode one occurrence into its raw value
    ///
    /// Integer values pass through unchanged for every variant; labels,
    /// floats, text and groups go through the variant's own mapping.
    pub fn encode(&self, value: &PhysicalValue) -> CodecResult<u64> {
        let raw = match (&self.kind, value) {
            (_, PhysicalValue::Raw(raw)) => *raw,
            (RecordKind::Mapped(mapping), PhysicalValue::Label(label))
            | (RecordKind::Mapped(mapping), PhysicalValue::Text(label)) => {
                mapping
                    .raw_for(label)
                    .ok_or_else(|| CodecError::MappingMiss {
                        record: self.name.clone(),
                        value: format!("label '{}'", label),
                    })?
            }
            (RecordKind::Linear(formula), PhysicalValue::Float(physical)) => {
                formula.encode(&self.name, *physical, self.max_raw())?
            }
            (RecordKind::Text, PhysicalValue::Text(text))
            | (RecordKind::Text, PhysicalValue::Label(text)) => {
                let mut chars = text.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) => self.encode_char(c)?,
                    _ => {
                        return Err(self.unencodable(format!(
                            "text '{}' as a single character",
                            text
                        )))
                    }
                }
            }
            (RecordKind::Composite(children), PhysicalValue::Group(values)) => {
                self.encode_group(children, values)?
            }
            (_, PhysicalValue::Error) => {
                return Err(self.unencodable(format!("the {} placeholder", value)))
            }
            (_, other) => {
                return Err(self.unencodable(format!(
                    "{} for a {} record",
                    describe(other),
                    self.kind_name()
                )))
            }
        };
        self.check_width(raw)?;
        Ok(raw)
    }

    /// Encode all occurrences of a reoccurring record
    ///
    /// Accepts a sequence, a single value (one occurrence), or a string for
    /// text records.
    pub fn encode_occurrences(&self, value: &PhysicalValue) -> CodecResult<Vec<u64>> {
        let raws = match (&self.kind, value) {
            (RecordKind::Text, PhysicalValue::Text(text)) => text
                .chars()
                .map(|c| self.encode_char(c))
                .collect::<CodecResult<Vec<_>>>()?,
            (_, PhysicalValue::Sequence(items)) => items
                .iter()
                .map(|item| self.encode(item))
                .collect::<CodecResult<Vec<_>>>()?,
            (_, single) => vec![self.encode(single)?],
        };
        self.check_occurrences(raws.len())?;
        Ok(raws)
    }

    pub(crate) fn check_occurrences(&self, count: usize) -> CodecResult<()> {
        let too_many = self.max_occurrences.is_some_and(|max| count > max);
        if count < self.min_occurrences || too_many {
            return Err(CodecError::OccurrenceCount {
                record: self.name.clone(),
                count,
                min: self.min_occurrences,
                max: self
                    .max_occurrences
                    .map_or_else(|| "unbounded".to_string(), |m| m.to_string()),
            });
        }
        Ok(())
    }

    fn encode_group(&self, children: &[DataRecord], values: &FieldValues) -> CodecResult<u64> {
        let mut raw = 0u64;
        for child in children {
            let value = values
                .get(&child.name)
                .ok_or_else(|| CodecError::MissingValue(format!("{}.{}", self.name, child.name)))?;
            let child_raw = child.encode(value)?;
            raw = shift_left(raw, child.length) | child_raw;
        }
        Ok(raw)
    }

    fn encode_char(&self, c: char) -> CodecResult<u64> {
        let code = c as u32;
        if code > 0xFF {
            return Err(self.unencodable(format!("non-byte character '{}'", c)));
        }
        Ok(code as u64)
    }

    fn check_width(&self, raw: u64) -> CodecResult<()> {
        if raw > self.max_raw() {
            return Err(CodecError::ValueOutOfRange {
                record: self.name.clone(),
                value: format!("0x{:X}", raw),
                max: self.max_raw(),
            });
        }
        Ok(())
    }

    fn unencodable(&self, reason: String) -> CodecError {
        CodecError::UnencodableValue {
            record: self.name.clone(),
            reason,
        }
    }

    fn kind_name(&self) -> &'static str {
        match self.kind {
            RecordKind::Raw => "raw",
            RecordKind::Mapped(_) => "mapped",
            RecordKind::Linear(_) => "linear",
            RecordKind::Text => "text",
            RecordKind::Composite(_) => "composite",
        }
    }

    /// Check the record's own invariants (and its children's)
    pub fn validate(&self) -> DefinitionResult<()> {
        if self.length == 0 || self.length > MAX_RECORD_BITS {
            return Err(DefinitionError::InvalidLength {
                record: self.name.clone(),
                length: self.length,
                max: MAX_RECORD_BITS,
            });
        }
        if let Some(max) = self.max_occurrences {
            if self.min_occurrences > max {
                return Err(DefinitionError::InvalidOccurrences {
                    record: self.name.clone(),
                    min: self.min_occurrences,
                    max,
                });
            }
        }

        match &self.kind {
            RecordKind::Raw | RecordKind::Text => Ok(()),
            RecordKind::Mapped(mapping) => {
                let mut seen = BTreeSet::new();
                for (&raw, label) in &mapping.labels {
                    if raw > self.max_raw() {
                        return Err(DefinitionError::LabelOutOfRange {
                            record: self.name.clone(),
                            raw,
                            length: self.length,
                        });
                    }
                    if !seen.insert(label.as_str()) {
                        return Err(DefinitionError::DuplicateLabel {
                            record: self.name.clone(),
                            label: label.clone(),
                        });
                    }
                }
                Ok(())
            }
            RecordKind::Linear(formula) => {
                if formula.factor == 0.0
                    || !formula.factor.is_finite()
                    || !formula.offset.is_finite()
                {
                    return Err(DefinitionError::InvalidFormula {
                        record: self.name.clone(),
                        reason: format!("factor {} offset {}", formula.factor, formula.offset),
                    });
                }
                Ok(())
            }
            RecordKind::Composite(children) => {
                if children.is_empty() {
                    return Err(DefinitionError::InvalidComposite {
                        record: self.name.clone(),
                        reason: "no children".to_string(),
                    });
                }
                let mut names = BTreeSet::new();
                for child in children {
                    child.validate()?;
                    if child.is_reoccurring() || child.min_occurrences != 1 {
                        return Err(DefinitionError::InvalidComposite {
                            record: self.name.clone(),
                            reason: format!("child '{}' must occur exactly once", child.name),
                        });
                    }
                    if !names.insert(child.name.as_str()) {
                        return Err(DefinitionError::DuplicateName(child.name.clone()));
                    }
                }
                let total: u32 = children.iter().map(|c| c.length).sum();
                if total != self.length {
                    return Err(DefinitionError::CompositeLengthMismatch {
                        record: self.name.clone(),
                        declared: self.length,
                        children: total,
                    });
                }
                Ok(())
            }
        }
    }
}

fn describe(value: &PhysicalValue) -> &'static str {
    match value {
        PhysicalValue::Raw(_) => "an integer",
        PhysicalValue::Label(_) => "a label",
        PhysicalValue::Float(_) => "a float",
        PhysicalValue::Text(_) => "text",
        PhysicalValue::Error => "ERROR",
        PhysicalValue::Group(_) => "a group",
        PhysicalValue::Sequence(_) => "a sequence",
    }
}

fn bit_mask(bits: u32) -> u64 {
    if bits >= 64 {
        u64::MAX
    } else {
        (1u64 << bits) - 1
    }
}

fn shift_left(value: u64, bits: u32) -> u64 {
    if bits >= 64 {
        0
    } else {
        value << bits
    }
}

fn shift_right(value: u64, bits: u32) -> u64 {
    if bits >= 64 {
        0
    } else {
        value >> bits
    }
}
