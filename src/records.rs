//! Flat persisted form of a fault chain.
//!
//! A chain is stored as a list of [`FaultRecord`]s, innermost cause first.
//! Each record may name the index of its cause, which must be an earlier
//! record, so a well-formed list can never describe a cycle.
//!
//! # Line format
//!
//! One record per line, four tab-separated fields:
//!
//! ```text
//! System.TimeoutException	0x80131505	-	The operation has timed out.
//! System.TypeInitializationException	0x80131534	0	Loader failed.
//! ```
//!
//! The third field is the cause index or `-`. Backslash, tab, carriage
//! return and newline in the message are escaped as `\\`, `\t`, `\r` and `\n`.
//!
//! Parameter names and cancellation tokens are not persisted; the message
//! already carries the interpolated parameter text.

use crate::{Fault, FaultKind, LegacyCode, Result};
use std::fmt;

const FIELD_SEPARATOR: char = '\t';
const NO_CAUSE: &str = "-";

/// One fault of a flattened chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FaultRecord {
    /// Kind of the persisted fault.
    pub kind: FaultKind,
    /// Code as persisted; checked against the kind on rebuild.
    pub code: LegacyCode,
    /// Message text.
    pub message: String,
    /// Index of the cause record, which must precede this one.
    pub cause_index: Option<usize>,
}

impl FaultRecord {
    /// Write the record as a single line (no trailing newline).
    pub fn write_line(&self, f: &mut impl fmt::Write) -> fmt::Result {
        write!(f, "{}\t{}\t", self.kind.type_name(), self.code)?;
        match self.cause_index {
            Some(index) => write!(f, "{}", index)?,
            None => f.write_str(NO_CAUSE)?,
        }
        f.write_char(FIELD_SEPARATOR)?;
        for c in self.message.chars() {
            match c {
                '\\' => f.write_str("\\\\")?,
                '\t' => f.write_str("\\t")?,
                '\r' => f.write_str("\\r")?,
                '\n' => f.write_str("\\n")?,
                other => f.write_char(other)?,
            }
        }
        Ok(())
    }

    /// Parse a line written by [`FaultRecord::write_line`].
    ///
    /// Malformed input yields a `Format` fault.
    pub fn parse_line(line: &str) -> Result<Self> {
        let mut fields = line.splitn(4, FIELD_SEPARATOR);
        let (Some(type_name), Some(code), Some(cause), Some(message)) =
            (fields.next(), fields.next(), fields.next(), fields.next())
        else {
            return Err(malformed("Fault record needs four tab-separated fields."));
        };

        let kind = FaultKind::from_type_name(type_name)
            .ok_or_else(|| malformed(format!("Unknown fault type '{}'.", type_name)))?;

        let code = code
            .strip_prefix("0x")
            .and_then(|hex| u32::from_str_radix(hex, 16).ok())
            .map(LegacyCode::from_hresult)
            .ok_or_else(|| malformed(format!("Invalid fault code '{}'.", code)))?;

        let cause_index = if cause == NO_CAUSE {
            None
        } else {
            Some(
                cause
                    .parse::<usize>()
                    .map_err(|_| malformed(format!("Invalid cause index '{}'.", cause)))?,
            )
        };

        Ok(Self {
            kind,
            code,
            message: unescape(message)?,
            cause_index,
        })
    }
}

impl fmt::Display for FaultRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.write_line(f)
    }
}

impl Fault {
    /// Flatten this fault and its causes, innermost first.
    ///
    /// The last record is `self`; each record's cause is the one before it.
    pub fn to_records(&self) -> Vec<FaultRecord> {
        let mut chain: Vec<&Fault> = self.chain().collect();
        chain.reverse();
        chain
            .into_iter()
            .enumerate()
            .map(|(i, fault)| FaultRecord {
                kind: fault.kind(),
                code: fault.code(),
                message: fault.message().to_owned(),
                cause_index: i.checked_sub(1),
            })
            .collect()
    }

    /// Rebuild a chain from records; the last record is the outermost fault.
    ///
    /// Fails with a `Format` fault when the list is empty, when a record
    /// names itself or a later record as its cause, when two records share
    /// one cause, or when a kind that does not accept code overrides carries
    /// a code other than its default.
    pub fn from_records(records: &[FaultRecord]) -> Result<Fault> {
        if records.is_empty() {
            return Err(malformed("No fault records."));
        }

        let mut built: Vec<Option<Fault>> = Vec::with_capacity(records.len());
        for (i, record) in records.iter().enumerate() {
            if !record.kind.accepts_code_override() && record.code != record.kind.default_code() {
                return Err(malformed(format!(
                    "Record {} has code {} but {} always uses {}.",
                    i,
                    record.code,
                    record.kind.type_name(),
                    record.kind.default_code()
                )));
            }

            let cause = match record.cause_index {
                None => None,
                Some(index) if index >= i => {
                    return Err(malformed(format!(
                        "Record {} names cause {}, which does not precede it.",
                        i, index
                    )));
                }
                Some(index) => match built[index].take() {
                    Some(cause) => Some(cause),
                    None => {
                        return Err(malformed(format!(
                            "Record {} reuses cause {}.",
                            i, index
                        )));
                    }
                },
            };

            built.push(Some(Fault::from_parts(
                record.kind,
                Some(record.message.clone().into()),
                None,
                cause,
                Some(record.code),
                None,
            )));
        }

        built
            .pop()
            .flatten()
            .ok_or_else(|| malformed("Outermost record is used as a cause."))
    }
}

fn malformed(message: impl Into<std::borrow::Cow<'static, str>>) -> Fault {
    Fault::with_message(FaultKind::Format, message)
}

fn unescape(text: &str) -> Result<String> {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('\\') => out.push('\\'),
            Some('t') => out.push('\t'),
            Some('r') => out.push('\r'),
            Some('n') => out.push('\n'),
            Some(other) => {
                return Err(malformed(format!("Unknown escape '\\{}'.", other)));
            }
            None => return Err(malformed("Dangling escape at end of message.")),
        }
    }
    Ok(out)
}
