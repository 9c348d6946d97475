//! Payload decoding
//!
//! Walks a layout over the payload bits, resolving conditional records from
//! the raw value of the record decoded immediately before them.

use tracing::trace;

use crate::bits::BitReader;
use crate::decoded::DecodedDataRecord;
use crate::error::{CodecError, CodecResult};
use crate::layout::LayoutElement;
use crate::record::DataRecord;

/// Decode a complete payload against a layout
///
/// Every bit of the payload must be consumed by the layout.
pub fn decode_payload(
    layout: &[LayoutElement],
    payload: &[u8],
) -> CodecResult<Vec<DecodedDataRecord>> {
    let mut decoder = Decoder {
        reader: BitReader::new(payload),
        records: Vec::new(),
        trigger: None,
    };
    decoder.walk(layout)?;

    let trailing = decoder.reader.remaining();
    if trailing > 0 {
        return Err(CodecError::TrailingData { bits: trailing });
    }
    Ok(decoder.records)
}

struct Decoder<'a> {
    reader: BitReader<'a>,
    records: Vec<DecodedDataRecord>,
    trigger: Option<u64>,
}

impl Decoder<'_> {
    fn walk(&mut self, layout: &[LayoutElement]) -> CodecResult<()> {
        for element in layout {
            match element {
                LayoutElement::Record(record) if record.is_reoccurring() => {
                    self.read_occurrences(record)?
                }
                LayoutElement::Record(record) => self.read_single(record)?,
                LayoutElement::Conditional(conditional) => {
                    let trigger = self
                        .trigger
                        .ok_or_else(|| CodecError::MissingTrigger(conditional.name().to_string()))?;
                    let branch = conditional.branch(trigger)?;
                    trace!(
                        conditional = conditional.name(),
                        trigger = format!("0x{:X}", trigger),
                        records = branch.len(),
                        "Resolved conditional layout"
                    );
                    self.walk(branch)?;
                }
            }
        }
        Ok(())
    }

    fn read_single(&mut self, record: &DataRecord) -> CodecResult<()> {
        let available = self.reader.remaining();
        let Some(raw) = self.reader.read(record.length()) else {
            if record.min_occurrences() == 0 {
                trace!(record = record.name(), "Optional record absent");
                self.trigger = None;
                return Ok(());
            }
            return Err(CodecError::PayloadTooShort {
                record: record.name().to_string(),
                needed: record.length() as usize,
                available,
            });
        };
        self.records.push(record.decode(raw)?);
        self.trigger = Some(raw);
        Ok(())
    }

    fn read_occurrences(&mut self, record: &DataRecord) -> CodecResult<()> {
        let available = self.reader.remaining();
        let mut raws = Vec::new();
        while record.max_occurrences().map_or(true, |max| raws.len() < max) {
            match self.reader.read(record.length()) {
                Some(raw) => raws.push(raw),
                None => break,
            }
        }
        if raws.len() < record.min_occurrences() {
            return Err(CodecError::PayloadTooShort {
                record: record.name().to_string(),
                needed: record.min_occurrences() * record.length() as usize,
                available,
            });
        }

        self.trigger = None;
        if raws.is_empty() {
            return Ok(());
        }
        self.records.push(record.decode_occurrences(raws)?);
        Ok(())
    }
}
