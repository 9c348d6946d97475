//! Payload encoding
//!
//! Mirror of [`crate::decode`]: walks a layout, pulling each record's value
//! from a [`FieldValues`] mapping and packing it MSB-first.

use std::collections::BTreeSet;

use tracing::{debug, trace};

use crate::bits::BitWriter;
use crate::error::{CodecError, CodecResult};
use crate::layout::LayoutElement;
use crate::record::DataRecord;
use crate::types::FieldValues;

/// Encode physical values into payload bytes following a layout
///
/// Values whose names the layout never reaches are ignored.
pub fn encode_payload(layout: &[LayoutElement], values: &FieldValues) -> CodecResult<Vec<u8>> {
    let mut encoder = Encoder {
        values,
        writer: BitWriter::new(),
        used: BTreeSet::new(),
        trigger: None,
    };
    encoder.walk(layout)?;

    for name in values.keys().filter(|name| !encoder.used.contains(name.as_str())) {
        debug!(record = name.as_str(), "Ignoring value not used by the layout");
    }

    encoder
        .writer
        .into_bytes()
        .map_err(|bits| CodecError::UnalignedPayload { bits })
}

struct Encoder<'a> {
    values: &'a FieldValues,
    writer: BitWriter,
    used: BTreeSet<&'a str>,
    trigger: Option<u64>,
}

impl<'a> Encoder<'a> {
    fn walk(&mut self, layout: &[LayoutElement]) -> CodecResult<()> {
        for element in layout {
            match element {
                LayoutElement::Record(record) => self.write_record(record)?,
                LayoutElement::Conditional(conditional) => {
                    let trigger = self
                        .trigger
                        .ok_or_else(|| CodecError::MissingTrigger(conditional.name().to_string()))?;
                    trace!(
                        conditional = conditional.name(),
                        trigger = format!("0x{:X}", trigger),
                        "Resolved conditional layout"
                    );
                    self.walk(conditional.branch(trigger)?)?;
                }
            }
        }
        Ok(())
    }

    fn write_record(&mut self, record: &DataRecord) -> CodecResult<()> {
        let values = self.values;
        let Some((name, value)) = values.get_key_value(record.name()) else {
            if record.min_occurrences() == 0 {
                self.trigger = None;
                return Ok(());
            }
            return Err(CodecError::MissingValue(record.name().to_string()));
        };
        self.used.insert(name.as_str());

        if record.is_reoccurring() {
            for raw in record.encode_occurrences(value)? {
                self.writer.push(raw, record.length());
            }
            self.trigger = None;
        } else {
            let raw = record.encode(value)?;
            self.writer.push(raw, record.length());
            self.trigger = Some(raw);
        }
        Ok(())
    }
}
